//! Immutable, load-ordered feature index.
//!
//! [`FeatureIndex`] is built once at startup and shared read-only across all
//! calls through an `Arc`. Both queries are linear scans in load order.

use crate::server::dataset::load_features;
use routeguide_core::{
    Result,
    geo::in_range,
    proto::Feature,
    types::{BoundingBox, Coordinate},
};
use std::path::Path;

#[derive(Debug, Clone)]
struct Entry {
    location: Coordinate,
    feature: Feature,
}

/// The set of known features.
#[derive(Debug, Clone, Default)]
pub struct FeatureIndex {
    entries: Vec<Entry>,
}

impl FeatureIndex {
    /// Builds an index preserving the iteration order of `features`.
    pub fn new(features: impl IntoIterator<Item = Feature>) -> Self {
        let entries = features
            .into_iter()
            .map(|feature| Entry {
                location: Coordinate::from_point(feature.location.as_ref()),
                feature,
            })
            .collect();
        Self { entries }
    }

    /// Loads the index from the configured dataset, or returns an empty index
    /// when no dataset is configured.
    ///
    /// # Errors
    ///
    /// Propagates [`routeguide_core::Error::Dataset`] from the loader.
    pub fn from_dataset(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Ok(Self::new(load_features(path)?)),
            None => Ok(Self::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first feature located exactly at `point`, or an unnamed
    /// feature at `point` if there is none.
    pub fn lookup(&self, point: Coordinate) -> Feature {
        self.entries
            .iter()
            .find(|entry| entry.location == point)
            .map(|entry| entry.feature.clone())
            .unwrap_or_else(|| Feature {
                name: String::new(),
                location: Some(point.into()),
            })
    }

    /// Returns `true` if any feature is located exactly at `point`.
    pub fn contains(&self, point: Coordinate) -> bool {
        self.entries.iter().any(|entry| entry.location == point)
    }

    /// Lazily yields, in load order, every feature inside `bounds`
    /// (boundaries included, corners in any order).
    pub fn scan(&self, bounds: BoundingBox) -> impl Iterator<Item = &Feature> + '_ {
        self.entries
            .iter()
            .filter(move |entry| in_range(entry.location, &bounds))
            .map(|entry| &entry.feature)
    }
}
