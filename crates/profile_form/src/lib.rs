//! Core of the profile builder form.
//!
//! Two pieces carry all of the state and policy:
//!   * [`selector`]: the searchable, size-capped typeahead state machine
//!   * [`cascade`]: the country → state → city dependency graph
//!
//! Everything else supports them: the geo dataset ([`geo`]), the static
//! fallback lists ([`catalog`]), the optional remote collections
//! ([`remote`], [`executor`]) and the form session tying it together
//! ([`form`]).

pub mod assets;
pub mod cascade;
pub mod catalog;
pub mod effects;
pub mod error;
pub mod executor;
pub mod field;
pub mod form;
pub mod geo;
pub mod remote;
pub mod selector;

pub use cascade::{LocationGraph, LocationState};
pub use catalog::{Collection, FallbackCatalog};
pub use effects::{Effect, FetchTicket, InternalEvent, TaskKind, TaskResultKind};
pub use error::{DataError, FetchError, FormError};
pub use executor::TaskExecutor;
pub use field::{CandidateList, FieldId, FieldState, LabelMap};
pub use form::{CandidateSource, FieldChange, FormSettings, ProfileForm};
pub use geo::{City, Country, GeoDataset, GeoSource, SharedGeo, State};
pub use remote::{CollectionClient, TimedItems};
pub use selector::{Selector, SelectorConfig, SelectorEvent, SelectorOutcome, SelectorView};
