//! gRPC service implementation and call lifecycle.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`RouteGuideService`).
//! - [`lifecycle`] - admission, in-flight tracking and graceful shutdown.

pub mod handler;
pub mod lifecycle;
