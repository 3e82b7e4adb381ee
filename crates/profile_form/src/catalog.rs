//! Flat option lists for the education and experience sections.
//!
//! Each list has a bundled fallback and may be replaced at runtime by a
//! remote collection of the same name.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::assets;
use crate::error::DataError;
use crate::field::FieldId;

/// Remote collection names accepted by the backend.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    AsRefStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Institutions,
    Companies,
    Roles,
    Degrees,
}

impl Collection {
    pub fn field(self) -> FieldId {
        match self {
            Collection::Institutions => FieldId::Institution,
            Collection::Companies => FieldId::Company,
            Collection::Roles => FieldId::Role,
            Collection::Degrees => FieldId::Degree,
        }
    }

    pub fn for_field(field: FieldId) -> Option<Self> {
        match field {
            FieldId::Institution => Some(Collection::Institutions),
            FieldId::Company => Some(Collection::Companies),
            FieldId::Role => Some(Collection::Roles),
            FieldId::Degree => Some(Collection::Degrees),
            FieldId::Country | FieldId::State | FieldId::City => None,
        }
    }
}

/// Built-in lists used until (or instead of) a remote collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FallbackCatalog {
    #[serde(default)]
    pub degrees: Vec<String>,
    #[serde(default)]
    pub institutions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub companies: Vec<String>,
}

impl FallbackCatalog {
    pub fn embedded() -> Result<Self, DataError> {
        Self::from_ron_str(&assets::fallback_catalog()?)
    }

    pub fn from_ron_str(text: &str) -> Result<Self, DataError> {
        Ok(ron::from_str(text)?)
    }

    pub fn items(&self, collection: Collection) -> &[String] {
        match collection {
            Collection::Degrees => &self.degrees,
            Collection::Institutions => &self.institutions,
            Collection::Roles => &self.roles,
            Collection::Companies => &self.companies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn collection_names_match_backend_routes() {
        let names: Vec<String> = Collection::iter().map(|c| c.to_string()).collect();
        assert_eq!(names, ["institutions", "companies", "roles", "degrees"]);
        assert_eq!("roles".parse::<Collection>(), Ok(Collection::Roles));
    }

    #[test]
    fn field_mapping_round_trips() {
        for collection in Collection::iter() {
            assert_eq!(Collection::for_field(collection.field()), Some(collection));
        }
        assert_eq!(Collection::for_field(FieldId::City), None);
    }

    #[test]
    fn embedded_catalog_is_complete() {
        let catalog = FallbackCatalog::embedded().expect("embedded catalog");
        for collection in Collection::iter() {
            assert!(!catalog.items(collection).is_empty(), "{collection} empty");
        }
        assert_eq!(catalog.companies.last().map(String::as_str), Some("Other"));
    }
}
