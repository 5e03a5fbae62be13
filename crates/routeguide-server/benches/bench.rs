use core::{fmt, hint::black_box};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use routeguide_core::{
    proto::{
        Feature, Rectangle, route_guide_client::RouteGuideClient,
        route_guide_server::RouteGuideServer,
    },
    types::{BoundingBox, Coordinate},
};
use routeguide_server::server::{
    config::ServerConfig, index::FeatureIndex, service::handler::RouteGuideService,
};
use tokio::{net::TcpListener, runtime::Builder};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::{
    codec::CompressionEncoding,
    transport::{Channel, Server},
};

const GRID: i32 = 100;
const STEP: i32 = 10_000;

#[derive(Clone, Copy, Debug)]
enum Compression {
    None,
    Gzip,
    Zstd,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => write!(f, "none"),
            Compression::Gzip => write!(f, "gzip"),
            Compression::Zstd => write!(f, "zstd"),
        }
    }
}

impl From<Compression> for Option<CompressionEncoding> {
    fn from(value: Compression) -> Self {
        match value {
            Compression::None => None,
            Compression::Gzip => Some(CompressionEncoding::Gzip),
            Compression::Zstd => Some(CompressionEncoding::Zstd),
        }
    }
}

/// A `GRID` x `GRID` lattice of named features.
fn grid_index() -> FeatureIndex {
    FeatureIndex::new((0..GRID).flat_map(|row| {
        (0..GRID).map(move |col| Feature {
            name: format!("feature-{row}-{col}"),
            location: Some(Coordinate::new(row * STEP, col * STEP).into()),
        })
    }))
}

fn index_bench(c: &mut Criterion) {
    let index = grid_index();
    let mut group = c.benchmark_group("index");

    let last = Coordinate::new((GRID - 1) * STEP, (GRID - 1) * STEP);
    group.throughput(Throughput::Elements(1));
    group.bench_function("lookup/hit_last", |b| {
        b.iter(|| black_box(index.lookup(black_box(last))));
    });
    group.bench_function("lookup/miss", |b| {
        b.iter(|| black_box(index.lookup(black_box(Coordinate::new(1, 1)))));
    });

    let quarter = BoundingBox::new(
        Coordinate::new(0, 0),
        Coordinate::new(GRID / 2 * STEP, GRID / 2 * STEP),
    );
    group.throughput(Throughput::Elements(index.len() as u64));
    group.bench_function("scan/quarter", |b| {
        b.iter(|| black_box(index.scan(black_box(quarter)).count()));
    });

    group.finish();
}

fn grpc_bench(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();

    let client: RouteGuideClient<Channel> = rt.block_on(async {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let service = RouteGuideService::new(ServerConfig::default(), grid_index());
        tokio::spawn(
            Server::builder()
                .add_service(
                    RouteGuideServer::new(service)
                        .send_compressed(CompressionEncoding::Gzip)
                        .send_compressed(CompressionEncoding::Zstd),
                )
                .serve_with_incoming(TcpListenerStream::new(listener)),
        );
        RouteGuideClient::connect(format!("http://{addr}"))
            .await
            .unwrap()
    });

    let everything = Rectangle {
        lo: Some(Coordinate::new(0, 0).into()),
        hi: Some(Coordinate::new(GRID * STEP, GRID * STEP).into()),
    };

    let mut group = c.benchmark_group("grpc");
    group.throughput(Throughput::Elements((GRID * GRID) as u64));

    for compression in [Compression::None, Compression::Gzip, Compression::Zstd] {
        let mut client = client.clone();
        if let Some(encoding) = Option::<CompressionEncoding>::from(compression) {
            client = client.accept_compressed(encoding);
        }

        group.bench_function(format!("list_features/compression={compression}"), |b| {
            b.iter(|| {
                let mut client = client.clone();
                let rect = everything.clone();
                rt.block_on(async move {
                    let mut stream = client.list_features(rect).await.unwrap().into_inner();
                    let mut received = 0usize;
                    while let Some(feature) = stream.message().await.unwrap() {
                        black_box(&feature);
                        received += 1;
                    }
                    assert_eq!(received, (GRID * GRID) as usize);
                });
            });
        });
    }

    group.finish();
}

criterion_group!(benches, index_bench, grpc_bench);
criterion_main!(benches);
