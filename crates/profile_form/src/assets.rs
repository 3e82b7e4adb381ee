use rust_embed::RustEmbed;
use std::{borrow::Cow, str};

use crate::error::DataError;

#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "geo/*"]
#[include = "catalog/*"]
#[exclude = "*.DS_Store"]
pub struct FormAssets;

pub const DEFAULT_GEO_PATH: &str = "geo/world.ron";
pub const FALLBACK_CATALOG_PATH: &str = "catalog/fallback.ron";

/// Read an embedded asset as UTF-8 text.
pub fn asset_str<A: RustEmbed>(path: &str) -> Result<Cow<'static, str>, DataError> {
    let file = A::get(path).ok_or_else(|| DataError::MissingAsset(path.to_string()))?;
    match file.data {
        Cow::Borrowed(bytes) => str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| DataError::InvalidAsset(path.to_string())),
        Cow::Owned(bytes) => String::from_utf8(bytes)
            .map(Cow::Owned)
            .map_err(|_| DataError::InvalidAsset(path.to_string())),
    }
}

pub fn default_geo() -> Result<Cow<'static, str>, DataError> {
    asset_str::<FormAssets>(DEFAULT_GEO_PATH)
}

pub fn fallback_catalog() -> Result<Cow<'static, str>, DataError> {
    asset_str::<FormAssets>(FALLBACK_CATALOG_PATH)
}
