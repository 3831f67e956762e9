use vsl_core::Msg;

pub const HELP: &str = "\
Type to search transcripts; an empty line clears the search.
  :open N        open result N
  :back          return to search
  :copy          copy the open VSL's transcript
  :download      save the open VSL's video
  :admin         open the admin page
  :urls URL...   set the URLs to submit (admin)
  :batch [N]     set or clear the ingest batch size (admin)
  :submit        submit the URLs (admin)
  :ingest        run ingest now (admin)
  :help          show this help
  :quit          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Msg(Msg),
    Help,
    Invalid(String),
}

/// Maps one line of terminal input to an action. Lines not starting with
/// `:` are search input, kept raw so the core decides on trimming.
pub fn parse_line(line: &str) -> Input {
    let Some(command) = line.trim_start().strip_prefix(':') else {
        return Input::Msg(Msg::SearchInputChanged(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let args: Vec<&str> = parts.collect();

    let msg = match (name, args.as_slice()) {
        ("open", [n]) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Msg::ResultOpened { index: n - 1 },
            _ => return Input::Invalid(format!("not a result number: {n}")),
        },
        ("back", []) => Msg::BackClicked,
        ("copy", []) => Msg::CopyTranscriptClicked,
        ("download", []) => Msg::DownloadClicked,
        ("admin", []) => Msg::AdminOpened,
        ("urls", urls) => Msg::AdminUrlsChanged(urls.join("\n")),
        ("batch", []) => Msg::AdminBatchSizeChanged(String::new()),
        ("batch", [n]) => Msg::AdminBatchSizeChanged((*n).to_string()),
        ("submit", []) => Msg::AdminUrlsSubmitted,
        ("ingest", []) => Msg::AdminRunIngestClicked,
        ("quit" | "q", []) => Msg::QuitRequested,
        ("help" | "h" | "?", []) => return Input::Help,
        _ => return Input::Invalid(format!("unknown command: :{command}")),
    };
    Input::Msg(msg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_raw_search_input() {
        assert_eq!(
            parse_line("  weight loss "),
            Input::Msg(Msg::SearchInputChanged("  weight loss ".to_string()))
        );
        assert_eq!(parse_line(""), Input::Msg(Msg::SearchInputChanged(String::new())));
    }

    #[test]
    fn open_is_one_based() {
        assert_eq!(parse_line(":open 1"), Input::Msg(Msg::ResultOpened { index: 0 }));
        assert!(matches!(parse_line(":open 0"), Input::Invalid(_)));
        assert!(matches!(parse_line(":open x"), Input::Invalid(_)));
    }

    #[test]
    fn urls_are_joined_as_lines() {
        assert_eq!(
            parse_line(":urls https://a/main.m3u8 https://b/main.m3u8"),
            Input::Msg(Msg::AdminUrlsChanged(
                "https://a/main.m3u8\nhttps://b/main.m3u8".to_string()
            ))
        );
    }

    #[test]
    fn batch_with_and_without_value() {
        assert_eq!(
            parse_line(":batch 200"),
            Input::Msg(Msg::AdminBatchSizeChanged("200".to_string()))
        );
        assert_eq!(
            parse_line(":batch"),
            Input::Msg(Msg::AdminBatchSizeChanged(String::new()))
        );
    }

    #[test]
    fn help_quit_and_unknown() {
        assert_eq!(parse_line(":help"), Input::Help);
        assert_eq!(parse_line(" :q"), Input::Msg(Msg::QuitRequested));
        assert!(matches!(parse_line(":frobnicate"), Input::Invalid(_)));
        assert!(matches!(parse_line(":back now"), Input::Invalid(_)));
    }
}
