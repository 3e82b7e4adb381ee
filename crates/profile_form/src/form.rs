//! Form session: one selector per field, the location graph, the flat
//! catalog fields and the bookkeeping for remote collection fetches.
//!
//! The session is synchronous and single-owner. Background work is only
//! described ([`Effect`]); results come back through [`ProfileForm::apply`]
//! and are accepted only while their [`FetchTicket`] is current.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use strum::{Display, IntoEnumIterator};
use tracing::{debug, info, warn};

use crate::cascade::{LocationGraph, LocationState};
use crate::catalog::{Collection, FallbackCatalog};
use crate::effects::{Effect, FetchTicket, TaskKind, TaskResultKind};
use crate::field::{FieldId, FieldState};
use crate::geo::SharedGeo;
use crate::selector::{Selector, SelectorConfig, SelectorEvent, SelectorOutcome};

/// Session level knobs, usually filled from the application settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormSettings {
    /// Thresholds shared by every selector. `allow_free_input` is
    /// overridden per field.
    pub selector: SelectorConfig,
    /// Whether [`ProfileForm::start`] asks for remote collections.
    pub remote_enabled: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            selector: SelectorConfig::default(),
            remote_enabled: true,
        }
    }
}

/// Where a flat field's candidates currently come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CandidateSource {
    #[strum(to_string = "bundled")]
    Fallback,
    #[strum(to_string = "remote")]
    Remote,
}

/// Result of routing one selector event through the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    /// Only transient selector state moved.
    Idle,
    /// The stored value changed (identifier for country/state).
    Committed { field: FieldId, value: String },
    Unchanged(FieldId),
    /// The attempted value was not accepted and the field shows its
    /// previous value again.
    Rejected(FieldId),
}

pub struct ProfileForm {
    settings: FormSettings,
    catalog: FallbackCatalog,
    location: LocationGraph<SharedGeo>,
    flat: BTreeMap<FieldId, FieldState>,
    sources: HashMap<FieldId, CandidateSource>,
    selectors: BTreeMap<FieldId, Selector>,
    generations: HashMap<FieldId, u64>,
    focus: Option<FieldId>,
    closed: bool,
}

impl ProfileForm {
    pub fn new(geo: SharedGeo, catalog: FallbackCatalog, settings: FormSettings) -> Self {
        let location = LocationGraph::new(geo);
        let mut flat = BTreeMap::new();
        let mut sources = HashMap::new();
        for collection in Collection::iter() {
            let items = catalog.items(collection).to_vec();
            flat.insert(collection.field(), FieldState::from_labels(items));
            sources.insert(collection.field(), CandidateSource::Fallback);
        }
        let selectors = FieldId::iter()
            .map(|field| {
                let config = if field.allows_free_input() {
                    settings.selector.free_input()
                } else {
                    settings.selector.selection_only()
                };
                (field, Selector::new(config))
            })
            .collect();

        let mut form = Self {
            settings,
            catalog,
            location,
            flat,
            sources,
            selectors,
            generations: HashMap::new(),
            focus: None,
            closed: false,
        };
        form.sync_location();
        for field in form.flat.keys().copied().collect::<Vec<_>>() {
            form.sync_flat(field);
        }
        form
    }

    pub fn settings(&self) -> &FormSettings {
        &self.settings
    }

    pub fn location(&self) -> &LocationState {
        self.location.state()
    }

    pub fn field(&self, field: FieldId) -> Option<&FieldState> {
        if field.is_location() {
            self.location.state().field(field)
        } else {
            self.flat.get(&field)
        }
    }

    /// Stored value of a field (empty when nothing is committed).
    pub fn value(&self, field: FieldId) -> &str {
        self.field(field).map_or("", |f| f.selection.as_str())
    }

    pub fn selector(&self, field: FieldId) -> Option<&Selector> {
        self.selectors.get(&field)
    }

    pub fn source(&self, field: FieldId) -> Option<CandidateSource> {
        self.sources.get(&field).copied()
    }

    pub fn focus(&self) -> Option<FieldId> {
        self.focus
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_visible(&self, field: FieldId) -> bool {
        if field.is_location() {
            self.location.state().is_visible(field)
        } else {
            true
        }
    }

    /// Fields to render, in form order.
    pub fn visible_fields(&self) -> Vec<FieldId> {
        FieldId::iter().filter(|f| self.is_visible(*f)).collect()
    }

    /// Committed display labels, in form order.
    pub fn summary(&self) -> Vec<(FieldId, String)> {
        FieldId::iter()
            .filter_map(|field| {
                let state = self.field(field)?;
                state
                    .is_selected()
                    .then(|| (field, state.selected_label().to_string()))
            })
            .collect()
    }

    /// Move focus. The previously focused selector is blurred first, which
    /// may commit or revert it.
    pub fn set_focus(&mut self, field: Option<FieldId>) -> Vec<FieldChange> {
        if field == self.focus {
            return Vec::new();
        }
        let mut changes = Vec::new();
        if let Some(previous) = self.focus.take() {
            changes.push(self.dispatch(previous, SelectorEvent::Blur));
        }
        if let Some(next) = field.filter(|f| self.is_visible(*f)) {
            self.focus = Some(next);
            changes.push(self.dispatch(next, SelectorEvent::Focus));
        }
        changes.retain(|c| *c != FieldChange::Idle);
        changes
    }

    /// Pointer-down outside every selector: close whatever is open.
    pub fn click_outside(&mut self) {
        for selector in self.selectors.values_mut().filter(|s| s.is_open()) {
            selector.handle(SelectorEvent::ClickOutside);
        }
    }

    /// Route one event to a field's selector and apply its outcome.
    pub fn dispatch(&mut self, field: FieldId, event: SelectorEvent) -> FieldChange {
        if self.closed || !self.is_visible(field) {
            return FieldChange::Idle;
        }
        let Some(selector) = self.selectors.get_mut(&field) else {
            return FieldChange::Idle;
        };
        match selector.handle(event) {
            SelectorOutcome::Idle => FieldChange::Idle,
            SelectorOutcome::Unchanged => FieldChange::Unchanged(field),
            SelectorOutcome::Reverted => {
                debug!(%field, "selection-only field reverted");
                FieldChange::Rejected(field)
            }
            SelectorOutcome::Committed(label) => self.commit(field, label, false),
            SelectorOutcome::FreeText(text) if field.allows_free_input() => {
                self.commit(field, text, true)
            }
            SelectorOutcome::FreeText(_) => FieldChange::Rejected(field),
        }
    }

    /// Remote fetch effects for every collection, if enabled.
    pub fn start(&mut self) -> Vec<Effect> {
        if !self.settings.remote_enabled {
            debug!("remote collections disabled; using bundled lists");
            return Vec::new();
        }
        Collection::iter()
            .filter_map(|c| self.refresh(c.field()))
            .collect()
    }

    /// Issue a fresh fetch for one catalog field. Any fetch still in
    /// flight for it becomes stale.
    pub fn refresh(&mut self, field: FieldId) -> Option<Effect> {
        if self.closed {
            return None;
        }
        let collection = Collection::for_field(field)?;
        let ticket = self.bump(field);
        debug!(%collection, %ticket, "collection fetch issued");
        Some(Effect::async_task(TaskKind::FetchCollection { ticket, collection }))
    }

    /// Go back to the bundled list and invalidate pending fetches.
    pub fn use_fallback(&mut self, field: FieldId) {
        let Some(collection) = Collection::for_field(field) else {
            return;
        };
        self.bump(field);
        let items = self.catalog.items(collection).to_vec();
        self.replace_candidates(field, items, CandidateSource::Fallback);
    }

    /// Apply a finished task. Returns `false` when the result was stale
    /// or did not change anything.
    pub fn apply(&mut self, result: TaskResultKind) -> bool {
        let ticket = result.ticket();
        if self.closed || !self.is_current(ticket) {
            debug!(%ticket, current = self.generation(ticket.field), "stale fetch result dropped");
            return false;
        }
        match result {
            TaskResultKind::CollectionFetched {
                collection, items, ..
            } if !items.is_empty() => {
                info!(%collection, count = items.len(), "remote collection applied");
                self.replace_candidates(ticket.field, items, CandidateSource::Remote);
                true
            }
            TaskResultKind::CollectionFetched { collection, .. } => {
                warn!(%collection, "remote collection empty; keeping bundled list");
                false
            }
            TaskResultKind::CollectionFailed {
                collection, error, ..
            } => {
                warn!(%collection, %error, "remote collection unavailable; keeping bundled list");
                false
            }
        }
    }

    /// Tear down: every outstanding ticket becomes stale.
    pub fn close(&mut self) {
        for field in FieldId::iter() {
            self.bump(field);
        }
        self.closed = true;
        self.focus = None;
        self.click_outside();
    }

    pub fn generation(&self, field: FieldId) -> u64 {
        self.generations.get(&field).copied().unwrap_or(0)
    }

    fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation(ticket.field)
    }

    fn bump(&mut self, field: FieldId) -> FetchTicket {
        let generation = self.generations.entry(field).or_insert(0);
        *generation += 1;
        FetchTicket {
            field,
            generation: *generation,
        }
    }

    fn commit(&mut self, field: FieldId, value: String, free: bool) -> FieldChange {
        if field.is_location() {
            self.commit_location(field, &value)
        } else {
            self.commit_flat(field, value, free)
        }
    }

    fn commit_location(&mut self, field: FieldId, label: &str) -> FieldChange {
        let change = match self.location.commit_label(field, label) {
            Ok(true) => FieldChange::Committed {
                field,
                value: self.value(field).to_string(),
            },
            Ok(false) => FieldChange::Unchanged(field),
            Err(e) => {
                debug!(%field, error = %e, "location commit rejected");
                FieldChange::Rejected(field)
            }
        };
        self.sync_location();
        change
    }

    fn commit_flat(&mut self, field: FieldId, value: String, free: bool) -> FieldChange {
        let Some(state) = self.flat.get_mut(&field) else {
            return FieldChange::Idle;
        };
        let change = if !free && !value.is_empty() && !state.candidates.contains(&value) {
            debug!(%field, %value, "value not in candidate list");
            FieldChange::Rejected(field)
        } else if state.selection == value {
            FieldChange::Unchanged(field)
        } else {
            state.selection = value.clone();
            FieldChange::Committed { field, value }
        };
        self.sync_flat(field);
        change
    }

    fn replace_candidates(&mut self, field: FieldId, items: Vec<String>, source: CandidateSource) {
        let Some(state) = self.flat.get_mut(&field) else {
            return;
        };
        let selection = std::mem::take(&mut state.selection);
        *state = FieldState::from_labels(items);
        state.selection = selection;
        self.sources.insert(field, source);
        self.sync_flat(field);
    }

    /// Push location candidates and values into their selectors.
    fn sync_location(&mut self) {
        let state = self.location.state();
        for (field, record) in [
            (FieldId::Country, &state.country),
            (FieldId::State, &state.state),
            (FieldId::City, &state.city),
        ] {
            if let Some(selector) = self.selectors.get_mut(&field) {
                selector.set_candidates(record.candidates.clone());
                selector.sync_value(record.selected_label());
            }
        }
        if let Some(focus) = self.focus {
            if !state.is_visible(focus) {
                self.focus = None;
            }
        }
    }

    fn sync_flat(&mut self, field: FieldId) {
        if let (Some(state), Some(selector)) = (self.flat.get(&field), self.selectors.get_mut(&field)) {
            selector.set_candidates(state.candidates.clone());
            selector.sync_value(state.selected_label());
        }
    }
}
