use std::sync::Once;

use pretty_assertions::assert_eq;
use vsl_core::{
    update, AppState, Effect, Generation, Msg, QueryState, QueryStatus, SearchRequest,
    SearchResultItem, SEARCH_FAILED_MESSAGE,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(vsl_logging::initialize_for_tests);
}

fn item(id: &str) -> SearchResultItem {
    SearchResultItem {
        id: id.to_string(),
        title: format!("https://cdn.example.com/{id}/main.m3u8"),
        video_path: format!("http://localhost:8000/storage/videos/{id}.mp4"),
        transcript_snippet: format!("snippet {id}"),
        transcript_full: format!("full transcript {id}"),
    }
}

fn type_term(state: AppState, raw: &str) -> (AppState, Option<SearchRequest>) {
    let (state, effects) = update(state, Msg::SearchInputChanged(raw.to_string()));
    let request = effects.into_iter().find_map(|effect| match effect {
        Effect::Search(request) => Some(request),
        _ => None,
    });
    (state, request)
}

fn resolve_ok(state: AppState, generation: Generation, items: Vec<SearchResultItem>) -> AppState {
    update(
        state,
        Msg::SearchResolved {
            generation,
            result: Ok(items),
        },
    )
    .0
}

fn resolve_err(state: AppState, generation: Generation, detail: &str) -> AppState {
    update(
        state,
        Msg::SearchResolved {
            generation,
            result: Err(detail.to_string()),
        },
    )
    .0
}

fn idle() -> QueryState {
    QueryState::default()
}

#[test]
fn empty_term_goes_idle_without_lookup() {
    init_logging();
    let (state, request) = type_term(AppState::new(), "");

    assert_eq!(request, None);
    assert_eq!(state.query().state(), &idle());
}

#[test]
fn successful_lookup_is_applied() {
    init_logging();
    let (state, request) = type_term(AppState::new(), "abc");
    let request = request.expect("lookup issued");
    assert_eq!(request.term, "abc");
    assert_eq!(state.query().state().status, QueryStatus::Loading);

    let state = resolve_ok(state, request.generation, vec![item("1")]);

    assert_eq!(
        state.query().state(),
        &QueryState {
            term: "abc".to_string(),
            status: QueryStatus::Succeeded,
            results: vec![item("1")],
            error_message: None,
        }
    );
}

#[test]
fn earlier_request_resolving_first_is_discarded() {
    init_logging();
    let (state, abc) = type_term(AppState::new(), "abc");
    let (state, abcd) = type_term(state, "abcd");
    let (abc, abcd) = (abc.unwrap(), abcd.unwrap());

    let state = resolve_ok(state, abc.generation, vec![item("1")]);
    assert_eq!(state.query().state().status, QueryStatus::Loading);
    assert!(state.query().state().results.is_empty());

    let state = resolve_ok(state, abcd.generation, Vec::new());
    assert_eq!(
        state.query().state(),
        &QueryState {
            term: "abcd".to_string(),
            status: QueryStatus::Succeeded,
            results: Vec::new(),
            error_message: None,
        }
    );
}

#[test]
fn transport_failure_shows_generic_message() {
    init_logging();
    let (state, request) = type_term(AppState::new(), "xyz");
    let state = resolve_err(state, request.unwrap().generation, "connection refused");

    let query = state.query().state();
    assert_eq!(query.status, QueryStatus::Failed);
    assert!(query.results.is_empty());
    assert_eq!(query.error_message.as_deref(), Some(SEARCH_FAILED_MESSAGE));
    assert!(!SEARCH_FAILED_MESSAGE.contains("connection refused"));
}

#[test]
fn clearing_the_term_silences_outstanding_lookups() {
    init_logging();
    let (state, abc) = type_term(AppState::new(), "abc");
    let (state, xyz) = type_term(state, "xyz");
    let (state, cleared) = type_term(state, "");
    assert_eq!(cleared, None);
    assert_eq!(state.query().state(), &idle());

    let state = resolve_ok(state, abc.unwrap().generation, vec![item("1")]);
    let state = resolve_err(state, xyz.unwrap().generation, "boom");
    assert_eq!(state.query().state(), &idle());
}

#[test]
fn any_sequence_ending_blank_is_idle() {
    init_logging();
    let inputs: [&[&str]; 4] = [
        &["abc", "   "],
        &["", "", "\t"],
        &["abc", "abc", "a", " \n "],
        &["x", "xy", "xyz", ""],
    ];
    for sequence in inputs {
        let mut state = AppState::new();
        let mut generations = Vec::new();
        for raw in sequence {
            let (next, request) = type_term(state, raw);
            state = next;
            generations.extend(request.map(|r| r.generation));
            // Resolve some of them as we go to vary the prior state.
            if let Some(&generation) = generations.first() {
                state = resolve_ok(state, generation, vec![item("9")]);
            }
        }
        assert_eq!(state.query().state(), &idle(), "sequence {sequence:?}");
    }
}

#[test]
fn last_issued_request_wins_under_any_resolution_order() {
    init_logging();
    let terms = ["a", "ab", "abc", "abcd"];
    let orders: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [3, 0, 2, 1], [1, 3, 0, 2]];

    for order in orders {
        let mut state = AppState::new();
        let mut requests = Vec::new();
        for term in terms {
            let (next, request) = type_term(state, term);
            state = next;
            requests.push(request.unwrap());
        }
        for index in order {
            let request = &requests[index];
            state = resolve_ok(state, request.generation, vec![item(&request.term)]);
            let query = state.query().state();
            assert!(query.results.is_empty() || query.status == QueryStatus::Succeeded);
        }
        let query = state.query().state();
        assert_eq!(query.term, "abcd", "order {order:?}");
        assert_eq!(query.status, QueryStatus::Succeeded);
        assert_eq!(query.results, vec![item("abcd")], "order {order:?}");
    }
}

#[test]
fn repeating_the_current_term_refetches() {
    init_logging();
    let (state, first) = type_term(AppState::new(), "abc");
    let first = first.unwrap();
    let state = resolve_ok(state, first.generation, vec![item("1")]);

    let (state, second) = type_term(state, "abc");
    let second = second.expect("identical term still issues a lookup");
    assert!(second.generation > first.generation);
    assert_eq!(state.query().state().status, QueryStatus::Loading);
    assert!(state.query().state().results.is_empty());

    let state = resolve_err(state, second.generation, "503");
    assert_eq!(state.query().state().status, QueryStatus::Failed);
}

#[test]
fn quitting_disposes_and_ignores_late_results() {
    init_logging();
    let (state, request) = type_term(AppState::new(), "abc");
    let (state, effects) = update(state, Msg::QuitRequested);
    assert_eq!(effects, vec![Effect::Shutdown]);
    assert!(state.query().is_disposed());

    let before = state.query().state().clone();
    let state = resolve_ok(state, request.unwrap().generation, vec![item("1")]);
    assert_eq!(state.query().state(), &before);
}

#[test]
fn input_marks_dirty_and_resolution_of_stale_does_not() {
    init_logging();
    let (state, abc) = type_term(AppState::new(), "abc");
    let (mut state, _) = type_term(state, "abcd");
    assert!(state.consume_dirty());

    let mut state = resolve_ok(state, abc.unwrap().generation, vec![item("1")]);
    assert!(!state.consume_dirty());
}
