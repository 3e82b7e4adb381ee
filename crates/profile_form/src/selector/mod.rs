//! Searchable selector (typeahead) state machine.
//!
//! The selector owns transient UI state only: the query text, whether the
//! dropdown is open and which row is highlighted. The committed value is
//! mirrored from the form via [`Selector::sync_value`]; the only way the
//! selector proposes a new value is [`SelectorOutcome::Committed`] (or
//! [`SelectorOutcome::FreeText`] on free-input fields).
//!
//! States and transitions:
//!
//! ```text
//!   Closed ──Focus / keystroke──▶ OpenEmptyQuery ◀──▶ OpenFiltered
//!     ▲                                 │                  │
//!     └──── Escape / Enter / Blur / Pick / ClickOutside ───┘
//! ```
//!
//! Rendering is bounded twice: lists above `large_list_threshold` produce
//! no rows until the query has `min_query_len` characters, and at most
//! `max_visible` rows are ever produced.

pub mod filter;

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::field::CandidateList;

pub const DEFAULT_LARGE_LIST_THRESHOLD: usize = 500;
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_MAX_VISIBLE: usize = 200;

/// Selector policy. Deserializable so thresholds can come from settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Accept typed text without an exact candidate match.
    pub allow_free_input: bool,
    /// Lists longer than this need `min_query_len` characters before rows render.
    pub large_list_threshold: usize,
    pub min_query_len: usize,
    /// Upper bound on rendered rows.
    pub max_visible: usize,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            allow_free_input: true,
            large_list_threshold: DEFAULT_LARGE_LIST_THRESHOLD,
            min_query_len: DEFAULT_MIN_QUERY_LEN,
            max_visible: DEFAULT_MAX_VISIBLE,
        }
    }
}

impl SelectorConfig {
    pub fn selection_only(mut self) -> Self {
        self.allow_free_input = false;
        self
    }

    pub fn free_input(mut self) -> Self {
        self.allow_free_input = true;
        self
    }

    pub fn large_list_threshold(mut self, threshold: usize) -> Self {
        self.large_list_threshold = threshold;
        self
    }

    pub fn min_query_len(mut self, len: usize) -> Self {
        self.min_query_len = len;
        self
    }

    pub fn max_visible(mut self, max: usize) -> Self {
        self.max_visible = max.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SelectorState {
    Closed,
    OpenEmptyQuery,
    OpenFiltered,
}

/// Input dispatched by the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorEvent {
    Focus,
    Input(char),
    Backspace,
    /// Replace the whole query (paste, programmatic input).
    SetQuery(String),
    Up,
    Down,
    Enter,
    Escape,
    Blur,
    /// Click on a rendered row (position within the rendered rows).
    Pick(usize),
    /// Pointer-down anywhere outside the selector.
    ClickOutside,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorOutcome {
    /// Only transient query/display state changed.
    Idle,
    /// A candidate label was chosen; the owner decides whether to store it.
    Committed(String),
    /// The chosen label equals the committed one.
    Unchanged,
    /// Enter without matches on a free-input selector.
    FreeText(String),
    /// An invalid commit attempt was undone; query shows the committed value again.
    Reverted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewRow<'a> {
    /// Index into the candidate list.
    pub index: usize,
    pub label: &'a str,
    pub highlighted: bool,
}

/// Render-ready description of the dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorView<'a> {
    Closed,
    /// List too large for the current query.
    TypeMore { min_query_len: usize, total: usize },
    NoResults,
    Rows {
        rows: Vec<ViewRow<'a>>,
        total_matches: usize,
    },
}

impl SelectorView<'_> {
    pub fn row_count(&self) -> usize {
        match self {
            SelectorView::Rows { rows, .. } => rows.len(),
            _ => 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, SelectorView::Rows { rows, total_matches } if *total_matches > rows.len())
    }

    /// Hint line shown below (or instead of) the rows.
    pub fn status_line(&self) -> Option<String> {
        match self {
            SelectorView::Closed => None,
            SelectorView::TypeMore {
                min_query_len,
                total,
            } => Some(format!(
                "Type {min_query_len}+ characters to search {total} items"
            )),
            SelectorView::NoResults => Some("No results".to_string()),
            SelectorView::Rows {
                rows,
                total_matches,
            } => (*total_matches > rows.len())
                .then(|| format!("Showing {} of {} results", rows.len(), total_matches)),
        }
    }
}

/// Typeahead selector over one candidate list.
#[derive(Debug, Clone)]
pub struct Selector {
    config: SelectorConfig,
    candidates: CandidateList,
    committed: String,
    query: String,
    state: SelectorState,
    /// Candidate indices matching `query`, recomputed on every edit.
    matches: Vec<usize>,
    /// Highlighted row, always < rendered row count (or 0 when empty).
    highlight: usize,
}

impl Selector {
    pub fn new(config: SelectorConfig) -> Self {
        Self::with_candidates(config, CandidateList::empty())
    }

    pub fn with_candidates(config: SelectorConfig, candidates: CandidateList) -> Self {
        let mut selector = Self {
            config,
            candidates,
            committed: String::new(),
            query: String::new(),
            state: SelectorState::Closed,
            matches: Vec::new(),
            highlight: 0,
        };
        selector.refilter();
        selector
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SelectorConfig) {
        self.config = config;
        self.refilter();
    }

    pub fn candidates(&self) -> &CandidateList {
        &self.candidates
    }

    /// Swap in a newly produced candidate list.
    pub fn set_candidates(&mut self, candidates: CandidateList) {
        if self.candidates.same_list(&candidates) {
            return;
        }
        self.candidates = candidates;
        self.highlight = 0;
        self.refilter();
    }

    /// Mirror an externally changed committed value; the query follows it.
    pub fn sync_value(&mut self, label: &str) {
        if self.committed == label {
            return;
        }
        self.committed = label.to_string();
        self.query = label.to_string();
        self.highlight = 0;
        self.refilter();
        if self.is_open() {
            self.open();
        }
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Text for the input line: the query, or the committed label when empty.
    pub fn display_text(&self) -> &str {
        if self.query.is_empty() {
            &self.committed
        } else {
            &self.query
        }
    }

    pub fn state(&self) -> SelectorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state != SelectorState::Closed
    }

    /// Number of filtered matches, before the visible cap.
    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn requires_typing(&self) -> bool {
        filter::requires_typing(
            self.candidates.len(),
            &self.query,
            self.config.large_list_threshold,
            self.config.min_query_len,
        )
    }

    /// Highlighted row position, if any row is rendered.
    pub fn highlighted(&self) -> Option<usize> {
        (self.visible_count() > 0).then_some(self.highlight)
    }

    pub fn handle(&mut self, event: SelectorEvent) -> SelectorOutcome {
        match event {
            SelectorEvent::Focus => {
                self.open();
                SelectorOutcome::Idle
            }
            SelectorEvent::Input(c) => {
                self.query.push(c);
                self.edited()
            }
            SelectorEvent::Backspace => {
                self.query.pop();
                self.edited()
            }
            SelectorEvent::SetQuery(text) => {
                self.query = text;
                self.edited()
            }
            SelectorEvent::Up => {
                if self.is_open() {
                    self.highlight = self.highlight.saturating_sub(1);
                } else {
                    self.open();
                }
                SelectorOutcome::Idle
            }
            SelectorEvent::Down => {
                if self.is_open() {
                    if self.highlight + 1 < self.visible_count() {
                        self.highlight += 1;
                    }
                } else {
                    self.open();
                }
                SelectorOutcome::Idle
            }
            SelectorEvent::Enter => self.enter(),
            SelectorEvent::Escape => {
                self.close();
                self.revert_query();
                SelectorOutcome::Idle
            }
            SelectorEvent::Blur => self.blur(),
            SelectorEvent::Pick(row) => {
                if !self.is_open() || row >= self.visible_count() {
                    return SelectorOutcome::Idle;
                }
                let index = self.matches[row];
                self.commit_index(index)
            }
            SelectorEvent::ClickOutside => {
                self.close();
                SelectorOutcome::Idle
            }
        }
    }

    pub fn view(&self) -> SelectorView<'_> {
        if !self.is_open() {
            return SelectorView::Closed;
        }
        if self.requires_typing() {
            return SelectorView::TypeMore {
                min_query_len: self.config.min_query_len,
                total: self.candidates.len(),
            };
        }
        if self.matches.is_empty() {
            return SelectorView::NoResults;
        }
        let rows = self
            .matches
            .iter()
            .take(self.config.max_visible)
            .enumerate()
            .filter_map(|(position, &index)| {
                self.candidates.get(index).map(|label| ViewRow {
                    index,
                    label,
                    highlighted: position == self.highlight,
                })
            })
            .collect();
        SelectorView::Rows {
            rows,
            total_matches: self.matches.len(),
        }
    }

    fn enter(&mut self) -> SelectorOutcome {
        if let Some(&index) = self.matches.get(self.highlight) {
            return self.commit_index(index);
        }
        self.close();
        if self.config.allow_free_input {
            SelectorOutcome::FreeText(self.query.clone())
        } else {
            self.revert_query();
            SelectorOutcome::Reverted
        }
    }

    fn blur(&mut self) -> SelectorOutcome {
        if self.config.allow_free_input || self.query == self.committed {
            self.close();
            return SelectorOutcome::Idle;
        }
        if self.candidates.contains(&self.query) {
            let label = self.query.clone();
            return self.commit(label);
        }
        self.close();
        self.revert_query();
        SelectorOutcome::Reverted
    }

    fn commit_index(&mut self, index: usize) -> SelectorOutcome {
        match self.candidates.get(index) {
            Some(label) => {
                let label = label.to_string();
                self.commit(label)
            }
            None => SelectorOutcome::Idle,
        }
    }

    fn commit(&mut self, label: String) -> SelectorOutcome {
        self.close();
        self.query = label.clone();
        self.refilter();
        if label == self.committed {
            return SelectorOutcome::Unchanged;
        }
        self.committed = label.clone();
        SelectorOutcome::Committed(label)
    }

    fn edited(&mut self) -> SelectorOutcome {
        self.highlight = 0;
        self.refilter();
        self.open();
        SelectorOutcome::Idle
    }

    fn revert_query(&mut self) {
        self.query = self.committed.clone();
        self.highlight = 0;
        self.refilter();
    }

    fn open(&mut self) {
        self.state = if self.query.is_empty() {
            SelectorState::OpenEmptyQuery
        } else {
            SelectorState::OpenFiltered
        };
    }

    fn close(&mut self) {
        self.state = SelectorState::Closed;
        self.highlight = 0;
    }

    fn refilter(&mut self) {
        self.matches = if self.requires_typing() {
            Vec::new()
        } else {
            filter::filter_indices(self.candidates.as_slice(), &self.query)
        };
        let visible = self.visible_count();
        if self.highlight >= visible {
            self.highlight = visible.saturating_sub(1);
        }
    }

    fn visible_count(&self) -> usize {
        self.matches.len().min(self.config.max_visible)
    }
}
