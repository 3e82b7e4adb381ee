use pretty_assertions::assert_eq;
use profile_form::selector::{DEFAULT_LARGE_LIST_THRESHOLD, DEFAULT_MAX_VISIBLE, DEFAULT_MIN_QUERY_LEN};
use profile_form::{CandidateList, Selector, SelectorConfig, SelectorEvent, SelectorOutcome, SelectorView};
use proptest::prelude::*;

fn numbered(n: usize) -> CandidateList {
    (0..n).map(|i| format!("Entry {i:05}")).collect()
}

fn rendered_labels(view: &SelectorView<'_>) -> Vec<String> {
    match view {
        SelectorView::Rows { rows, .. } => rows.iter().map(|r| r.label.to_string()).collect(),
        _ => Vec::new(),
    }
}

#[test]
fn defaults_match_documented_limits() {
    let config = SelectorConfig::default();
    assert_eq!(config.large_list_threshold, DEFAULT_LARGE_LIST_THRESHOLD);
    assert_eq!(config.min_query_len, DEFAULT_MIN_QUERY_LEN);
    assert_eq!(config.max_visible, DEFAULT_MAX_VISIBLE);
    assert!(config.allow_free_input);
}

#[test]
fn free_input_accepts_custom_company() {
    let mut selector = Selector::with_candidates(
        SelectorConfig::default(),
        ["Google", "Microsoft", "Other"].into_iter().map(String::from).collect(),
    );
    selector.handle(SelectorEvent::Focus);
    for c in "Custom Corp".chars() {
        selector.handle(SelectorEvent::Input(c));
    }
    assert_eq!(selector.view(), SelectorView::NoResults);
    assert_eq!(
        selector.handle(SelectorEvent::Enter),
        SelectorOutcome::FreeText("Custom Corp".into())
    );
}

#[test]
fn selection_only_rejects_unknown_text_on_blur() {
    let mut selector = Selector::with_candidates(
        SelectorConfig::default().selection_only(),
        ["Canada", "Germany"].into_iter().map(String::from).collect(),
    );
    selector.sync_value("Canada");
    selector.handle(SelectorEvent::Focus);
    selector.handle(SelectorEvent::SetQuery("Zzzz".into()));
    assert_eq!(selector.handle(SelectorEvent::Blur), SelectorOutcome::Reverted);
    assert_eq!(selector.committed(), "Canada");
    assert_eq!(selector.display_text(), "Canada");
}

#[test]
fn large_list_becomes_searchable_at_min_query_len() {
    let mut selector = Selector::with_candidates(SelectorConfig::default(), numbered(1200));
    selector.handle(SelectorEvent::Focus);
    selector.handle(SelectorEvent::Input('1'));
    assert!(matches!(selector.view(), SelectorView::TypeMore { total: 1200, .. }));
    selector.handle(SelectorEvent::Input('1'));
    let view = selector.view();
    assert!(view.row_count() > 0);
    assert!(rendered_labels(&view).iter().all(|l| l.contains("11")));
}

proptest! {
    #[test]
    fn small_lists_render_fully_on_focus(n in 0usize..=500) {
        let mut selector = Selector::with_candidates(SelectorConfig::default(), numbered(n));
        selector.handle(SelectorEvent::Focus);
        let view = selector.view();
        if n == 0 {
            prop_assert_eq!(view, SelectorView::NoResults);
        } else {
            prop_assert_eq!(view.row_count(), n.min(DEFAULT_MAX_VISIBLE));
            prop_assert_eq!(view.is_truncated(), n > DEFAULT_MAX_VISIBLE);
        }
    }

    #[test]
    fn large_lists_need_typing(n in 501usize..2000, query in "[0-9 ]{0,1}") {
        let mut selector = Selector::with_candidates(SelectorConfig::default(), numbered(n));
        selector.handle(SelectorEvent::SetQuery(query));
        let view = selector.view();
        prop_assert_eq!(view.row_count(), 0);
        prop_assert_eq!(view, SelectorView::TypeMore { min_query_len: 2, total: n });
    }

    #[test]
    fn rendered_rows_are_the_capped_filter(
        items in proptest::collection::vec("[a-dA-D]{1,5}", 0..400),
        query in "[a-dA-D]{1,2}",
        max_visible in 1usize..50,
    ) {
        let candidates: CandidateList = items.iter().cloned().collect();
        let config = SelectorConfig::default().max_visible(max_visible);
        let mut selector = Selector::with_candidates(config, candidates);
        selector.handle(SelectorEvent::SetQuery(query.clone()));

        let expected: Vec<String> = items
            .iter()
            .filter(|s| s.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        let view = selector.view();
        prop_assert_eq!(selector.match_count(), expected.len());
        if expected.is_empty() {
            prop_assert_eq!(view, SelectorView::NoResults);
        } else {
            let shown = rendered_labels(&view);
            prop_assert_eq!(&shown[..], &expected[..expected.len().min(max_visible)]);
            if expected.len() > max_visible {
                let status = format!("Showing {} of {} results", max_visible, expected.len());
                prop_assert_eq!(view.status_line(), Some(status));
            } else {
                prop_assert_eq!(view.status_line(), None);
            }
        }
    }

    #[test]
    fn committing_twice_is_idempotent(pick in 0usize..20) {
        let candidates = numbered(20);
        let label = candidates.get(pick).map(String::from).unwrap_or_default();
        let mut selector = Selector::with_candidates(SelectorConfig::default(), candidates);
        selector.handle(SelectorEvent::SetQuery(label.clone()));
        prop_assert_eq!(selector.handle(SelectorEvent::Enter), SelectorOutcome::Committed(label.clone()));
        selector.handle(SelectorEvent::SetQuery(label.clone()));
        prop_assert_eq!(selector.handle(SelectorEvent::Enter), SelectorOutcome::Unchanged);
        prop_assert_eq!(selector.committed(), label.as_str());
    }
}
