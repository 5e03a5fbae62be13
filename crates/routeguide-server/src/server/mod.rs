//! Route guide server internals.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env configuration and validation.
//! - [`dataset`] - one-shot JSON loader for the startup feature list.
//! - [`index`] - the immutable [`index::FeatureIndex`].
//! - [`registry`] - the shared, append-only [`registry::RouteNoteRegistry`].
//! - [`streaming`] - transport-agnostic bodies of the streaming RPCs.
//! - [`service`] - the `RouteGuide` gRPC service and its lifecycle.
//! - [`telemetry`] - logging, tracing and metrics setup.

pub mod config;
pub mod dataset;
pub mod index;
pub mod registry;
pub mod service;
pub mod streaming;
pub mod telemetry;
