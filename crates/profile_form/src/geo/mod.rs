//! Geographic records and the read-only data collaborator.
//!
//! Country, state and city records differ in shape, so each gets its own
//! type; [`GeoRecord`] normalizes them to `{name, identifier}` for the
//! field layer. Cities have no code of their own and use their name.

mod dataset;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use dataset::GeoDataset;

/// Normalized view used to build candidate lists and label maps.
pub trait GeoRecord {
    fn name(&self) -> &str;
    fn identifier(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub iso_code: String,
}

impl Country {
    pub fn new(name: impl Into<String>, iso_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            iso_code: iso_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub name: String,
    pub iso_code: String,
    pub country_code: String,
}

impl State {
    pub fn new(
        name: impl Into<String>,
        iso_code: impl Into<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            iso_code: iso_code.into(),
            country_code: country_code.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub country_code: String,
    #[serde(default)]
    pub state_code: Option<String>,
}

impl City {
    pub fn new(name: impl Into<String>, country_code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            country_code: country_code.into(),
            state_code: None,
        }
    }

    pub fn in_state(mut self, state_code: impl Into<String>) -> Self {
        self.state_code = Some(state_code.into());
        self
    }
}

impl GeoRecord for Country {
    fn name(&self) -> &str {
        &self.name
    }
    fn identifier(&self) -> &str {
        &self.iso_code
    }
}

impl GeoRecord for State {
    fn name(&self) -> &str {
        &self.name
    }
    fn identifier(&self) -> &str {
        &self.iso_code
    }
}

impl GeoRecord for City {
    fn name(&self) -> &str {
        &self.name
    }
    fn identifier(&self) -> &str {
        &self.name
    }
}

/// Read-only geo dataset.
///
/// Implementations are not required to return sorted results; the cascade
/// sorts with [`sort_by_name`] before building candidate lists.
pub trait GeoSource {
    fn countries_sorted_by_name(&self) -> Vec<Country>;
    fn states_of_country(&self, country: &str) -> Vec<State>;
    fn cities_of_country(&self, country: &str) -> Vec<City>;
    fn cities_of_state(&self, country: &str, state: &str) -> Vec<City>;
}

/// Shared handle used by the form session and the front end.
pub type SharedGeo = Arc<dyn GeoSource + Send + Sync>;

impl<T: GeoSource + ?Sized> GeoSource for Arc<T> {
    fn countries_sorted_by_name(&self) -> Vec<Country> {
        (**self).countries_sorted_by_name()
    }
    fn states_of_country(&self, country: &str) -> Vec<State> {
        (**self).states_of_country(country)
    }
    fn cities_of_country(&self, country: &str) -> Vec<City> {
        (**self).cities_of_country(country)
    }
    fn cities_of_state(&self, country: &str, state: &str) -> Vec<City> {
        (**self).cities_of_state(country, state)
    }
}

impl<T: GeoSource + ?Sized> GeoSource for &T {
    fn countries_sorted_by_name(&self) -> Vec<Country> {
        (**self).countries_sorted_by_name()
    }
    fn states_of_country(&self, country: &str) -> Vec<State> {
        (**self).states_of_country(country)
    }
    fn cities_of_country(&self, country: &str) -> Vec<City> {
        (**self).cities_of_country(country)
    }
    fn cities_of_state(&self, country: &str, state: &str) -> Vec<City> {
        (**self).cities_of_state(country, state)
    }
}

/// Stable, case-sensitive ordering by display name.
pub fn sort_by_name<R: GeoRecord>(records: &mut [R]) {
    records.sort_by(|a, b| a.name().cmp(b.name()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_case_sensitive_and_stable() {
        let mut cities = vec![
            City::new("berlin", "DE"),
            City::new("Bremen", "DE"),
            City::new("Aachen", "DE"),
            City::new("Bremen", "DE").in_state("HB"),
        ];
        sort_by_name(&mut cities);
        let names: Vec<_> = cities.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Aachen", "Bremen", "Bremen", "berlin"]);
        assert_eq!(cities[1].state_code, None);
        assert_eq!(cities[2].state_code.as_deref(), Some("HB"));
    }

    #[test]
    fn city_identifier_is_its_name() {
        let city = City::new("Singapore", "SG");
        assert_eq!(city.identifier(), "Singapore");
    }
}
