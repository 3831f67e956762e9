use std::fmt::Write;

use vsl_core::{
    AdminRequest, AppViewModel, Page, QueryStatus, QueryView, VslDetailView, NOTICE_NO_VSL,
};

/// Default the backend applies when no batch size is sent.
const BACKEND_DEFAULT_BATCH: u32 = 50;

pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();
    match view.page {
        Page::Swipe => render_swipe(&mut out, &view.query),
        Page::Vsl => render_detail(&mut out, view.detail.as_ref()),
        Page::Admin => render_admin(&mut out, view),
    }
    if let Some(notice) = &view.notice {
        let _ = writeln!(out, "» {notice}");
    }
    out
}

fn render_swipe(out: &mut String, query: &QueryView) {
    let _ = writeln!(out, "── Swipe ──");
    match query.status {
        QueryStatus::Idle => {
            let _ = writeln!(out, "Type to search VSL transcripts (:help for commands).");
        }
        QueryStatus::Loading => {
            let _ = writeln!(out, "Searching for \"{}\"…", query.term);
        }
        QueryStatus::Failed => {
            let message = query.error_message.as_deref().unwrap_or_default();
            let _ = writeln!(out, "{message}");
        }
        QueryStatus::Succeeded if query.results.is_empty() => {
            let _ = writeln!(out, "No VSLs match \"{}\".", query.term);
        }
        QueryStatus::Succeeded => {
            let _ = writeln!(
                out,
                "{} result(s) for \"{}\":",
                query.results.len(),
                query.term
            );
            for (index, card) in query.results.iter().enumerate() {
                let _ = writeln!(out, "{:>3}. {}", index + 1, card.title);
                if !card.snippet.is_empty() {
                    let _ = writeln!(out, "     {}", card.snippet);
                }
            }
        }
    }
}

fn render_detail(out: &mut String, detail: Option<&VslDetailView>) {
    let _ = writeln!(out, "── VSL Details ──");
    let Some(detail) = detail else {
        let _ = writeln!(out, "{NOTICE_NO_VSL} (:back to return)");
        return;
    };
    let _ = writeln!(out, "{}", detail.title);
    let _ = writeln!(out, "Video: {}", detail.video_path);
    let _ = writeln!(out);
    if detail.transcript.is_empty() {
        let _ = writeln!(out, "(no transcript)");
    } else {
        let _ = writeln!(out, "{}", detail.transcript);
    }
    let _ = writeln!(out);
    let mut actions = vec![":download", ":back"];
    if detail.can_copy {
        actions.insert(0, ":copy");
    }
    let _ = writeln!(out, "[{}]", actions.join("  "));
}

fn render_admin(out: &mut String, view: &AppViewModel) {
    let admin = &view.admin;
    let _ = writeln!(out, "── Admin ingest ──");

    let url_count = admin.urls_text.lines().filter(|l| !l.trim().is_empty()).count();
    let _ = writeln!(out, "1. Submit URLs ({url_count} pasted)  [:urls, :submit]");
    render_request(out, &admin.bulk, "Sending URLs...");

    let batch = if admin.batch_size_text.trim().is_empty() {
        format!("default {BACKEND_DEFAULT_BATCH}")
    } else {
        admin.batch_size_text.trim().to_string()
    };
    let _ = writeln!(
        out,
        "2. Run ingest of pending URLs (batch_size: {batch})  [:batch, :ingest]"
    );
    render_request(out, &admin.ingest, "Running ingest...");
}

fn render_request(out: &mut String, request: &AdminRequest, pending: &str) {
    match request {
        AdminRequest::Idle => {
            let _ = writeln!(out, "   No response yet.");
        }
        AdminRequest::Pending => {
            let _ = writeln!(out, "   {pending}");
        }
        AdminRequest::Done(body) | AdminRequest::Failed(body) => {
            for line in body.lines() {
                let _ = writeln!(out, "   {line}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use vsl_core::{
        AdminView, AppViewModel, Page, QueryStatus, QueryView, ResultCardView, VslDetailView,
        SEARCH_FAILED_MESSAGE,
    };

    use super::render;

    fn swipe(query: QueryView) -> AppViewModel {
        AppViewModel {
            query,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn idle_prompts_for_input() {
        let text = render(&AppViewModel::default());
        assert!(text.contains("Type to search"));
    }

    #[test]
    fn results_are_numbered_from_one() {
        let text = render(&swipe(QueryView {
            term: "abc".into(),
            status: QueryStatus::Succeeded,
            results: vec![
                ResultCardView {
                    id: "1".into(),
                    title: "First".into(),
                    snippet: "alpha".into(),
                },
                ResultCardView {
                    id: "2".into(),
                    title: "Second".into(),
                    snippet: String::new(),
                },
            ],
            error_message: None,
        }));
        assert!(text.contains("2 result(s) for \"abc\""));
        assert!(text.contains("  1. First\n     alpha\n"));
        assert!(text.contains("  2. Second\n"));
    }

    #[test]
    fn empty_success_differs_from_idle() {
        let text = render(&swipe(QueryView {
            term: "zzz".into(),
            status: QueryStatus::Succeeded,
            ..QueryView::default()
        }));
        assert!(text.contains("No VSLs match \"zzz\""));
    }

    #[test]
    fn failure_shows_only_the_generic_message() {
        let text = render(&swipe(QueryView {
            term: "x".into(),
            status: QueryStatus::Failed,
            results: Vec::new(),
            error_message: Some(SEARCH_FAILED_MESSAGE.into()),
        }));
        assert!(text.contains(SEARCH_FAILED_MESSAGE));
    }

    #[test]
    fn detail_lists_copy_only_with_transcript() {
        let mut view = AppViewModel {
            page: Page::Vsl,
            detail: Some(VslDetailView {
                id: "1".into(),
                title: "Promo".into(),
                video_path: "http://localhost:8000/storage/videos/a.mp4".into(),
                transcript: "hello".into(),
                can_copy: true,
            }),
            notice: Some("transcription copied".into()),
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("Video: http://localhost:8000/storage/videos/a.mp4"));
        assert!(text.contains("[:copy  :download  :back]"));
        assert!(text.ends_with("» transcription copied\n"));

        if let Some(detail) = view.detail.as_mut() {
            detail.transcript.clear();
            detail.can_copy = false;
        }
        assert!(render(&view).contains("[:download  :back]"));
    }

    #[test]
    fn admin_shows_request_states() {
        let view = AppViewModel {
            page: Page::Admin,
            admin: AdminView {
                urls_text: "https://a\n\nhttps://b".into(),
                batch_size_text: String::new(),
                bulk: vsl_core::AdminRequest::Pending,
                ingest: vsl_core::AdminRequest::Done("{\n  \"status\": \"queued\"\n}".into()),
            },
            ..AppViewModel::default()
        };
        let text = render(&view);
        assert!(text.contains("(2 pasted)"));
        assert!(text.contains("Sending URLs..."));
        assert!(text.contains("batch_size: default 50"));
        assert!(text.contains("   \"status\": \"queued\""));
    }
}
