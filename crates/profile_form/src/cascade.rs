//! Country → state → city dependency graph.
//!
//! The `on_*_committed` functions are pure: they take the current
//! [`LocationState`] and return the next one, recomputing child candidate
//! lists and clearing descendant values parent first. [`LocationGraph`]
//! owns a state plus the geo source and adds label translation on top.

use tracing::debug;

use crate::error::FormError;
use crate::field::{FieldId, FieldState};
use crate::geo::{GeoSource, sort_by_name};

/// Field records of the location section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationState {
    pub country: FieldState,
    pub state: FieldState,
    pub city: FieldState,
}

impl LocationState {
    pub fn field(&self, field: FieldId) -> Option<&FieldState> {
        match field {
            FieldId::Country => Some(&self.country),
            FieldId::State => Some(&self.state),
            FieldId::City => Some(&self.city),
            _ => None,
        }
    }

    pub fn state_visible(&self) -> bool {
        !self.state.candidates.is_empty()
    }

    /// Shown when it has candidates, or when the selected country has no
    /// states (its cities come straight from the country).
    pub fn city_visible(&self) -> bool {
        !self.city.candidates.is_empty()
            || (self.country.is_selected() && self.state.candidates.is_empty())
    }

    pub fn is_visible(&self, field: FieldId) -> bool {
        match field {
            FieldId::Country => true,
            FieldId::State => self.state_visible(),
            FieldId::City => self.city_visible(),
            _ => false,
        }
    }
}

/// Country list populated, nothing selected.
pub fn initial<G: GeoSource + ?Sized>(geo: &G) -> LocationState {
    let mut countries = geo.countries_sorted_by_name();
    sort_by_name(&mut countries);
    LocationState {
        country: FieldState::from_records(&countries),
        ..LocationState::default()
    }
}

/// Commit a country identifier. An empty identifier clears the section.
pub fn on_country_committed<G: GeoSource + ?Sized>(
    current: &LocationState,
    geo: &G,
    identifier: &str,
) -> Result<LocationState, FormError> {
    if identifier == current.country.selection {
        return Ok(current.clone());
    }
    if !identifier.is_empty() && !current.country.labels.contains_identifier(identifier) {
        return Err(FormError::UnknownIdentifier {
            field: FieldId::Country,
            identifier: identifier.to_string(),
        });
    }

    let mut next = current.clone();
    next.country.selection = identifier.to_string();
    next.state = FieldState::default();
    next.city = FieldState::default();
    if identifier.is_empty() {
        debug!("country cleared");
        return Ok(next);
    }

    let mut states = geo.states_of_country(identifier);
    if !states.is_empty() {
        sort_by_name(&mut states);
        next.state = FieldState::from_records(&states);
        debug!(country = identifier, states = states.len(), "state list rebuilt");
    } else {
        let mut cities = geo.cities_of_country(identifier);
        sort_by_name(&mut cities);
        next.city = FieldState::from_records(&cities);
        debug!(
            country = identifier,
            cities = cities.len(),
            "country has no states, city list rebuilt"
        );
    }
    Ok(next)
}

/// Commit a state identifier. Requires a committed country.
pub fn on_state_committed<G: GeoSource + ?Sized>(
    current: &LocationState,
    geo: &G,
    identifier: &str,
) -> Result<LocationState, FormError> {
    if identifier == current.state.selection {
        return Ok(current.clone());
    }
    if !current.country.is_selected() {
        return Err(FormError::MissingParent {
            field: FieldId::State,
            parent: FieldId::Country,
        });
    }
    if !identifier.is_empty() && !current.state.labels.contains_identifier(identifier) {
        return Err(FormError::UnknownIdentifier {
            field: FieldId::State,
            identifier: identifier.to_string(),
        });
    }

    let mut next = current.clone();
    next.state.selection = identifier.to_string();
    next.city = FieldState::default();
    if identifier.is_empty() {
        debug!("state cleared");
        return Ok(next);
    }

    let mut cities = geo.cities_of_state(&current.country.selection, identifier);
    sort_by_name(&mut cities);
    next.city = FieldState::from_records(&cities);
    debug!(
        country = %current.country.selection,
        state = identifier,
        cities = cities.len(),
        "city list rebuilt"
    );
    Ok(next)
}

/// Commit a city. Terminal: nothing depends on it.
pub fn on_city_committed(current: &LocationState, value: &str) -> Result<LocationState, FormError> {
    if value == current.city.selection {
        return Ok(current.clone());
    }
    if !value.is_empty() && !current.city.labels.contains_identifier(value) {
        return Err(FormError::UnknownIdentifier {
            field: FieldId::City,
            identifier: value.to_string(),
        });
    }
    let mut next = current.clone();
    next.city.selection = value.to_string();
    Ok(next)
}

/// Owns the location state and the geo source it is derived from.
///
/// Commits take `&mut self`, so a cascade always finishes before the next
/// commit is accepted.
#[derive(Debug)]
pub struct LocationGraph<G> {
    geo: G,
    state: LocationState,
}

impl<G: GeoSource> LocationGraph<G> {
    pub fn new(geo: G) -> Self {
        let state = initial(&geo);
        Self { geo, state }
    }

    pub fn state(&self) -> &LocationState {
        &self.state
    }

    pub fn geo(&self) -> &G {
        &self.geo
    }

    /// Drop every selection and rebuild the country list.
    pub fn reset(&mut self) {
        self.state = initial(&self.geo);
    }

    /// Commit a stored value (identifier for country/state, name for city).
    /// Returns whether anything changed.
    pub fn commit_identifier(&mut self, field: FieldId, identifier: &str) -> Result<bool, FormError> {
        let next = match field {
            FieldId::Country => on_country_committed(&self.state, &self.geo, identifier)?,
            FieldId::State => on_state_committed(&self.state, &self.geo, identifier)?,
            FieldId::City => on_city_committed(&self.state, identifier)?,
            other => return Err(FormError::UnsupportedField(other)),
        };
        let changed = next != self.state;
        self.state = next;
        Ok(changed)
    }

    /// Commit a display label, translating it through the field's label map.
    /// An empty label clears the field.
    pub fn commit_label(&mut self, field: FieldId, label: &str) -> Result<bool, FormError> {
        if label.is_empty() {
            return self.commit_identifier(field, "");
        }
        let record = self
            .state
            .field(field)
            .ok_or(FormError::UnsupportedField(field))?;
        let identifier = record
            .labels
            .identifier(label)
            .ok_or_else(|| FormError::UnknownLabel {
                field,
                label: label.to_string(),
            })?
            .to_string();
        self.commit_identifier(field, &identifier)
    }
}
