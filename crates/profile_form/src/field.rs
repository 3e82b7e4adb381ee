//! Per-field data records.
//!
//! Every form field owns one [`FieldState`]:
//!   * `candidates`: the ordered labels currently selectable
//!   * `labels`:     label → identifier map scoped to `candidates`
//!   * `selection`:  the committed value (identifier for country/state,
//!                   label for everything else)
//!
//! Candidate lists and label maps are replaced wholesale whenever an
//! ancestor changes; they are never edited in place.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::geo::GeoRecord;

/// Identifies a field of the profile form.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FieldId {
    Country,
    State,
    City,
    Degree,
    Institution,
    Role,
    Company,
}

impl FieldId {
    /// Human readable label used as the field caption.
    pub fn caption(self) -> &'static str {
        match self {
            FieldId::Country => "Country",
            FieldId::State => "State",
            FieldId::City => "City",
            FieldId::Degree => "Degree",
            FieldId::Institution => "Institution",
            FieldId::Role => "Role",
            FieldId::Company => "Company",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            FieldId::Country => "Select a country",
            FieldId::State => "Select a state",
            FieldId::City => "Select a city",
            FieldId::Degree => "Select your degree",
            FieldId::Institution => "Select your institution",
            FieldId::Role => "Select your role",
            FieldId::Company => "Select your company",
        }
    }

    /// Fields that are invalidated when this one changes, in cascade order.
    pub fn dependents(self) -> &'static [FieldId] {
        match self {
            FieldId::Country => &[FieldId::State, FieldId::City],
            FieldId::State => &[FieldId::City],
            _ => &[],
        }
    }

    /// Whether the committed value is an identifier rather than a label.
    pub fn stores_identifier(self) -> bool {
        matches!(self, FieldId::Country | FieldId::State)
    }

    /// Institution and company accept typed text; everything else must
    /// match a candidate.
    pub fn allows_free_input(self) -> bool {
        matches!(self, FieldId::Institution | FieldId::Company)
    }

    pub fn is_location(self) -> bool {
        matches!(self, FieldId::Country | FieldId::State | FieldId::City)
    }
}

/// Immutable, cheaply clonable list of display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateList(Arc<[String]>);

impl CandidateList {
    pub fn new(items: Vec<String>) -> Self {
        Self(Arc::from(items))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, label: &str) -> bool {
        self.0.iter().any(|item| item == label)
    }

    /// True when both handles point at the same produced list.
    pub fn same_list(&self, other: &CandidateList) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for CandidateList {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<String>> for CandidateList {
    fn from(items: Vec<String>) -> Self {
        Self::new(items)
    }
}

impl FromIterator<String> for CandidateList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Label → identifier map scoped to one candidate list.
///
/// When a label occurs twice the first occurrence wins, matching the
/// "first filtered match" rule of the selector. The reverse lookup follows
/// the same rule: an identifier shared by several labels maps back to the
/// first of them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelMap {
    by_label: HashMap<String, String>,
    by_identifier: HashMap<String, String>,
}

impl LabelMap {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut by_label = HashMap::new();
        let mut by_identifier = HashMap::new();
        for (label, identifier) in pairs {
            if let Entry::Vacant(slot) = by_label.entry(label) {
                by_identifier
                    .entry(identifier.clone())
                    .or_insert_with(|| slot.key().clone());
                slot.insert(identifier);
            }
        }
        Self {
            by_label,
            by_identifier,
        }
    }

    /// Identity map: every label is its own identifier.
    pub fn identity<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        Self::from_pairs(labels.into_iter().map(|l| (l.to_string(), l.to_string())))
    }

    pub fn identifier(&self, label: &str) -> Option<&str> {
        self.by_label.get(label).map(String::as_str)
    }

    /// Reverse lookup, used to display a stored identifier.
    pub fn label_of(&self, identifier: &str) -> Option<&str> {
        self.by_identifier.get(identifier).map(String::as_str)
    }

    pub fn contains_identifier(&self, identifier: &str) -> bool {
        self.by_identifier.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

/// Candidate list, label map and committed value of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub candidates: CandidateList,
    pub labels: LabelMap,
    pub selection: String,
}

impl FieldState {
    pub fn with_candidates(candidates: CandidateList, labels: LabelMap) -> Self {
        Self {
            candidates,
            labels,
            selection: String::new(),
        }
    }

    /// Flat list where labels double as identifiers.
    pub fn from_labels(items: Vec<String>) -> Self {
        let labels = LabelMap::identity(items.iter().map(String::as_str));
        Self::with_candidates(CandidateList::new(items), labels)
    }

    /// Build from geo records, keeping their order.
    pub fn from_records<R: GeoRecord>(records: &[R]) -> Self {
        let candidates = records.iter().map(|r| r.name().to_string()).collect();
        let labels = LabelMap::from_pairs(
            records
                .iter()
                .map(|r| (r.name().to_string(), r.identifier().to_string())),
        );
        Self::with_candidates(candidates, labels)
    }

    pub fn is_selected(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Label shown for the committed value. Values without a map entry
    /// (free text) are shown as-is.
    pub fn selected_label(&self) -> &str {
        self.labels
            .label_of(&self.selection)
            .unwrap_or(self.selection.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::Country;

    #[test]
    fn label_map_first_occurrence_wins() {
        let map = LabelMap::from_pairs([
            ("Georgia".to_string(), "GA".to_string()),
            ("Georgia".to_string(), "GE".to_string()),
        ]);
        assert_eq!(map.identifier("Georgia"), Some("GA"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn shared_identifier_maps_back_to_first_label() {
        let pairs = || {
            [
                ("Côte d'Ivoire", "CI"),
                ("Ivory Coast", "CI"),
                ("Ghana", "GH"),
            ]
            .map(|(label, id)| (label.to_string(), id.to_string()))
        };
        for _ in 0..16 {
            let map = LabelMap::from_pairs(pairs());
            assert_eq!(map.label_of("CI"), Some("Côte d'Ivoire"));
            assert_eq!(map.identifier("Ivory Coast"), Some("CI"));
            assert!(map.contains_identifier("GH"));
            assert!(!map.contains_identifier("XX"));
        }
    }

    #[test]
    fn reverse_lookup_finds_label() {
        let state = FieldState::from_records(&[
            Country::new("Germany", "DE"),
            Country::new("France", "FR"),
        ]);
        assert_eq!(state.labels.label_of("FR"), Some("France"));
        assert_eq!(state.candidates.as_slice(), ["Germany", "France"]);
    }

    #[test]
    fn selected_label_falls_back_to_raw_value() {
        let mut state = FieldState::from_labels(vec!["Google".into()]);
        state.selection = "Custom Corp".into();
        assert_eq!(state.selected_label(), "Custom Corp");
    }

    #[test]
    fn dependents_follow_cascade_order() {
        assert_eq!(
            FieldId::Country.dependents(),
            &[FieldId::State, FieldId::City]
        );
        assert!(FieldId::City.dependents().is_empty());
        assert!(FieldId::Company.dependents().is_empty());
    }

    #[test]
    fn field_ids_parse_from_snake_case() {
        assert_eq!("institution".parse::<FieldId>(), Ok(FieldId::Institution));
        assert_eq!(FieldId::Country.to_string(), "country");
    }
}
