/// Builds the gRPC client and server code for `route_guide.proto` using
/// `tonic-prost-build`.
///
/// Besides the message types and service traits, a serialized
/// `FileDescriptorSet` is written next to the generated code so the server can
/// expose it through gRPC reflection.
///
/// # Files and Paths
///
/// - Proto file: `proto/route_guide.proto`
/// - Includes: `proto/`
///
/// # Output
///
/// ```rust
/// pub mod proto {
///     tonic::include_proto!("routeguide");
/// }
/// ```
///
/// # Panics
///
/// Panics if code generation fails (e.g. `protoc` is missing).
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("routeguide_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/route_guide.proto"], &["proto"])
        .unwrap();
}
