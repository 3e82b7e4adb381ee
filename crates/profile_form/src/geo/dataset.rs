use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{City, Country, GeoSource, State, sort_by_name};
use crate::assets;
use crate::error::DataError;

/// In-memory geo dataset loaded from RON.
///
/// File layout:
/// ```ron
/// (
///     countries: [(name: "United States", iso_code: "US")],
///     states: [(name: "California", iso_code: "CA", country_code: "US")],
///     cities: [(name: "San Diego", country_code: "US", state_code: Some("CA"))],
/// )
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoDataset {
    #[serde(default)]
    pub countries: Vec<Country>,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub cities: Vec<City>,
}

impl GeoDataset {
    /// The dataset bundled with the crate.
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_ron_str(&assets::default_geo()?)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, DataError> {
        let dataset: Self = ron::from_str(text)?;
        dataset.report_dangling();
        debug!(
            countries = dataset.countries.len(),
            states = dataset.states.len(),
            cities = dataset.cities.len(),
            "geo dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Records pointing at unknown parents are kept but never reachable.
    fn report_dangling(&self) {
        let orphan_states = self
            .states
            .iter()
            .filter(|s| !self.countries.iter().any(|c| c.iso_code == s.country_code))
            .count();
        let orphan_cities = self
            .cities
            .iter()
            .filter(|c| !self.countries.iter().any(|k| k.iso_code == c.country_code))
            .count();
        if orphan_states + orphan_cities > 0 {
            warn!(
                orphan_states,
                orphan_cities, "geo dataset references unknown countries"
            );
        }
    }
}

impl GeoSource for GeoDataset {
    fn countries_sorted_by_name(&self) -> Vec<Country> {
        let mut countries = self.countries.clone();
        sort_by_name(&mut countries);
        countries
    }

    fn states_of_country(&self, country: &str) -> Vec<State> {
        self.states
            .iter()
            .filter(|s| s.country_code == country)
            .cloned()
            .collect()
    }

    fn cities_of_country(&self, country: &str) -> Vec<City> {
        self.cities
            .iter()
            .filter(|c| c.country_code == country)
            .cloned()
            .collect()
    }

    fn cities_of_state(&self, country: &str, state: &str) -> Vec<City> {
        self.cities
            .iter()
            .filter(|c| c.country_code == country && c.state_code.as_deref() == Some(state))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SMALL: &str = r#"(
        countries: [
            (name: "Singapore", iso_code: "SG"),
            (name: "Germany", iso_code: "DE"),
        ],
        states: [
            (name: "Bavaria", iso_code: "BY", country_code: "DE"),
        ],
        cities: [
            (name: "Singapore", country_code: "SG"),
            (name: "Munich", country_code: "DE", state_code: Some("BY")),
        ],
    )"#;

    #[test]
    fn parses_ron_and_sorts_countries() {
        let geo = GeoDataset::from_ron_str(SMALL).expect("parse");
        let names: Vec<_> = geo
            .countries_sorted_by_name()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Germany", "Singapore"]);
    }

    #[test]
    fn lookups_filter_by_parent() {
        let geo = GeoDataset::from_ron_str(SMALL).expect("parse");
        assert_eq!(geo.states_of_country("DE").len(), 1);
        assert!(geo.states_of_country("SG").is_empty());
        assert_eq!(geo.cities_of_country("SG")[0].name, "Singapore");
        assert_eq!(geo.cities_of_state("DE", "BY")[0].name, "Munich");
        assert!(geo.cities_of_state("SG", "BY").is_empty());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(SMALL.as_bytes()).expect("write");
        let geo = GeoDataset::from_path(file.path()).expect("load");
        assert_eq!(geo.countries.len(), 2);
    }

    #[test]
    fn malformed_ron_is_an_error() {
        let err = GeoDataset::from_ron_str("(countries: [oops])").unwrap_err();
        assert!(matches!(err, DataError::Ron(_)));
    }

    #[test]
    fn embedded_dataset_has_scenario_countries() {
        let geo = GeoDataset::embedded().expect("embedded dataset");
        assert!(geo.countries.iter().any(|c| c.iso_code == "US"));
        assert!(geo.states_of_country("SG").is_empty());
        assert!(!geo.cities_of_country("SG").is_empty());
        assert!(!geo.cities_of_state("US", "CA").is_empty());
    }
}
