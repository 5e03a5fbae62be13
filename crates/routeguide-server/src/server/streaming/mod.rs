//! Bodies of the three streaming RPCs.
//!
//! Each function takes its inbound side as a [`futures::Stream`] of
//! `Result<T, Status>` (what `tonic::Streaming` yields) and pushes outbound
//! items into a bounded [`tokio::sync::mpsc::Sender`] that backs the gRPC
//! response stream. Nothing here knows about `tonic` requests, so tests drive
//! these with in-memory streams and channels.
//!
//! - [`features`] - `ListFeatures`: forward matches of a range scan.
//! - [`route`] - `RecordRoute`: fold a point stream into a summary.
//! - [`chat`] - `RouteChat`: append notes and replay their coordinate's log.

pub mod chat;
pub mod features;
pub mod route;
