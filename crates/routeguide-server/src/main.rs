//! # `routeguide-server`
//!
//! Route guide gRPC service built on [`tonic`].
//!
//! ## Highlights
//! - **Four call shapes**: unary lookup, server, client and bidirectional
//!   streaming.
//! - **Read-only feature index** loaded once from JSON.
//! - **Shared chat log** with a short, non-blocking critical section.
//! - **Graceful shutdown**: Ctrl+C or SIGTERM drains streams before exiting.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin routeguide-server --release -- --json-db-file data/route_guide_db.json
//! ```

use clap::Parser;
use futures::Stream;
use routeguide_core::proto::{FILE_DESCRIPTOR_SET, route_guide_server::RouteGuideServer};
use routeguide_server::server::{
    config::{CliArgs, ServerConfig},
    index::FeatureIndex,
    service::handler::RouteGuideService,
    telemetry::{TelemetryProviders, init_telemetry},
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::server::Connected;
use tonic::{codec::CompressionEncoding, transport::Server};
use tonic_health::server::HealthReporter;
use tonic_reflection::server::Builder;
use tonic_web::GrpcWebLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry(&config)?;

    // A broken dataset is fatal before anything starts listening.
    let index = FeatureIndex::from_dataset(config.json_db_file.as_deref())?;
    let service = RouteGuideService::new(config.clone(), index);

    if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;
            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            let incoming = UnixListenerStream::new(uds);
            log_startup_info(&uds_path, &config, &service);
            let res = run_server_with_incoming(providers, incoming, service).await;
            // TODO: also remove the socket from a panic hook; a panic skips
            // this cleanup and the next bind fails with AddrInUse.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp_path = config.server_addr.clone();
        let tcp = TcpListener::bind(&tcp_path).await?;
        let incoming = TcpListenerStream::new(tcp);
        log_startup_info(&tcp_path, &config, &service);
        run_server_with_incoming(providers, incoming, service).await
    }
}

async fn run_server_with_incoming<I, IO, IE>(
    providers: TelemetryProviders,
    incoming: I,
    service: RouteGuideService,
) -> anyhow::Result<()>
where
    I: Stream<Item = Result<IO, IE>>,
    IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
    IE: Into<tower::BoxError>,
{
    let (health_reporter, health_service) = tonic_health::server::health_reporter();
    health_reporter
        .set_serving::<RouteGuideServer<RouteGuideService>>()
        .await;

    let reflection = Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    Server::builder()
        .accept_http1(true)
        .http2_adaptive_window(Some(true))
        .layer(
            ServiceBuilder::new()
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(GrpcWebLayer::new()),
        )
        .add_service(health_service)
        .add_service(reflection)
        .add_service(build_route_guide_service(service.clone()))
        .serve_with_incoming_shutdown(
            incoming,
            shutdown_signal(service, health_reporter, providers),
        )
        .await?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(addr: &str, config: &ServerConfig, service: &RouteGuideService) {
    tracing::debug!("Full config: {:#?}", config);
    if service.index().is_empty() {
        tracing::info!("Starting route guide on {} without a feature dataset", addr);
    } else {
        tracing::info!(
            "Starting route guide on {} with {} features",
            addr,
            service.index().len()
        );
    }
}

fn build_route_guide_service(service: RouteGuideService) -> RouteGuideServer<RouteGuideService> {
    RouteGuideServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .send_compressed(CompressionEncoding::Deflate)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Deflate)
}

async fn shutdown_signal(
    service: RouteGuideService,
    health_reporter: HealthReporter,
    providers: TelemetryProviders,
) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C signal"),
        () = terminate => tracing::info!("Received SIGTERM signal"),
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");

    // 1. Publish the status
    health_reporter
        .set_not_serving::<RouteGuideServer<RouteGuideService>>()
        .await;

    // 2. Drain and cancel streaming calls
    service.shutdown().await;

    // 3. Flush exporters
    providers.shutdown();
}
