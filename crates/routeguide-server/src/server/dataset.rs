//! Startup feature dataset.
//!
//! The dataset is a JSON array of records shaped like
//!
//! ```json
//! [{"location": {"latitude": 407838351, "longitude": -746143763}, "name": "Patriots Path, Mendham, NJ 07945, USA"}]
//! ```
//!
//! A record without `name` is an unnamed feature; a record without
//! `location` (or either of its fields) reads as zero. `null` counts as
//! missing. Unknown keys are
//! ignored. Records keep their file order.

use routeguide_core::{
    Error, Result,
    proto::Feature,
    types::{Coordinate, null_as_default},
};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FeatureRecord {
    #[serde(deserialize_with = "null_as_default")]
    name: String,
    #[serde(deserialize_with = "null_as_default")]
    location: Coordinate,
}

impl From<FeatureRecord> for Feature {
    fn from(record: FeatureRecord) -> Self {
        Feature {
            name: record.name,
            location: Some(record.location.into()),
        }
    }
}

/// Reads and parses the dataset at `path`.
///
/// # Errors
///
/// Returns [`Error::Dataset`] if the file cannot be read or is not a valid
/// feature list.
pub fn load_features(path: &Path) -> Result<Vec<Feature>> {
    let dataset_err = |reason: String| Error::Dataset {
        path: path.display().to_string(),
        reason,
    };

    let raw = std::fs::read(path).map_err(|e| dataset_err(e.to_string()))?;
    parse_features(&raw).map_err(|e| dataset_err(e.to_string()))
}

/// Parses an in-memory dataset.
pub fn parse_features(raw: &[u8]) -> serde_json::Result<Vec<Feature>> {
    let records: Vec<FeatureRecord> = serde_json::from_slice(raw)?;
    Ok(records.into_iter().map(Feature::from).collect())
}
