use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;
use std::path::PathBuf;

/// Console log output format.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line, human-readable output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Runtime configuration for the `routeguide-server` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is honored), with defaults suitable for local use.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "routeguide-server",
    version,
    about = "A gRPC route guide: feature lookup, range streaming, route summaries and location chat"
)]
pub struct CliArgs {
    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "127.0.0.1:10000" or "/tmp/routeguide.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("127.0.0.1:10000"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,

    /// JSON file holding the features to serve.
    ///
    /// Loaded once, in file order, before the listener starts. Without it the
    /// service runs with no features: every lookup returns an unnamed feature
    /// and every range scan is empty.
    ///
    /// Environment variable: `JSON_DB_FILE`
    #[arg(long, env = "JSON_DB_FILE")]
    pub json_db_file: Option<PathBuf>,

    /// Capacity of the response buffer between a streaming task and the gRPC
    /// response stream.
    ///
    /// The default of 1 keeps a streaming task at most one item ahead of the
    /// transport. Larger values let `ListFeatures` and `RouteChat` queue that
    /// many items before a stalled or departed client is noticed.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 1)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for in-flight streams to finish during shutdown before
    /// they are cancelled.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,

    /// Console log format.
    ///
    /// Environment variable: `LOG_FORMAT`
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// OTLP collector endpoint, used when built with the `otlp` feature.
    ///
    /// Environment variable: `OTEL_EXPORTER_OTLP_ENDPOINT`
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server_addr: String,
    pub uds: bool,
    pub json_db_file: Option<PathBuf>,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: Duration,
    pub log_format: LogFormat,
    pub otlp_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_addr: String::from("127.0.0.1:10000"),
            uds: false,
            json_db_file: None,
            stream_buffer_size: 1,
            shutdown_timeout: Duration::from_secs(3),
            log_format: LogFormat::Pretty,
            otlp_endpoint: None,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        if args.server_addr.trim().is_empty() {
            bail!("SERVER_ADDR must not be empty");
        }

        if let Some(path) = &args.json_db_file {
            if !path.is_file() {
                bail!("JSON_DB_FILE ({}) is not a readable file", path.display());
            }
        }

        Ok(Self {
            server_addr: args.server_addr,
            uds: args.uds,
            json_db_file: args.json_db_file,
            stream_buffer_size: args.stream_buffer_size,
            shutdown_timeout: Duration::from_secs(args.shutdown_timeout),
            log_format: args.log_format,
            otlp_endpoint: args.otlp_endpoint,
        })
    }
}
