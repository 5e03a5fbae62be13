pub mod error;
pub mod geo;
pub mod types;

pub use error::{Error, Result};

/// Generated protobuf messages, client and server bindings.
pub mod proto {
    tonic::include_proto!("routeguide");

    /// Encoded descriptor set for `tonic-reflection`.
    pub const FILE_DESCRIPTOR_SET: &[u8] =
        tonic::include_file_descriptor_set!("routeguide_descriptor");
}
