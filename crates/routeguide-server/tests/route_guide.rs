use routeguide_core::{
    geo::distance,
    proto::{
        Point, Rectangle, RouteNote, route_guide_client::RouteGuideClient,
        route_guide_server::RouteGuideServer,
    },
    types::Coordinate,
};
use routeguide_server::server::{
    config::ServerConfig, index::FeatureIndex, service::handler::RouteGuideService,
};
use std::path::Path;
use tokio::{net::TcpListener, sync::mpsc};
use tokio_stream::wrappers::{ReceiverStream, TcpListenerStream};
use tonic::transport::{Channel, Server};

const PATRIOTS_PATH: Coordinate = Coordinate::new(407_838_351, -746_143_763);
const WHIPPANY: Coordinate = Coordinate::new(408_122_808, -743_999_179);
const NOWHERE: Coordinate = Coordinate::new(400_000_000, -750_000_000);

fn dataset_index() -> FeatureIndex {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/route_guide_db.json");
    FeatureIndex::from_dataset(Some(&path)).expect("bundled dataset loads")
}

async fn spawn_server(index: FeatureIndex) -> RouteGuideClient<Channel> {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = RouteGuideService::new(ServerConfig::default(), index);

    tokio::spawn(
        Server::builder()
            .add_service(RouteGuideServer::new(service))
            .serve_with_incoming(TcpListenerStream::new(listener)),
    );

    RouteGuideClient::connect(format!("http://{addr}"))
        .await
        .expect("client connects")
}

fn note(at: Coordinate, message: &str) -> RouteNote {
    RouteNote {
        location: Some(at.into()),
        message: message.to_string(),
    }
}

async fn next_messages(stream: &mut tonic::Streaming<RouteNote>, n: usize) -> Vec<String> {
    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        let note = stream.message().await.unwrap().expect("note");
        out.push(note.message);
    }
    out
}

#[tokio::test]
async fn get_feature_over_grpc() {
    let mut client = spawn_server(dataset_index()).await;

    let hit = client
        .get_feature(Point::from(PATRIOTS_PATH))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(hit.name, "Patriots Path, Mendham, NJ 07945, USA");

    let miss = client
        .get_feature(Point::from(NOWHERE))
        .await
        .unwrap()
        .into_inner();
    assert_eq!(miss.name, "");
    assert_eq!(miss.location, Some(Point::from(NOWHERE)));
}

#[tokio::test]
async fn list_features_ignores_corner_order() {
    let mut client = spawn_server(dataset_index()).await;

    let lo = Coordinate::new(400_000_000, -750_000_000);
    let hi = Coordinate::new(420_000_000, -730_000_000);

    let mut listed = Vec::new();
    for (a, b) in [
        (lo, hi),
        (hi, lo),
        (
            Coordinate::new(lo.latitude, hi.longitude),
            Coordinate::new(hi.latitude, lo.longitude),
        ),
    ] {
        let mut stream = client
            .list_features(Rectangle {
                lo: Some(a.into()),
                hi: Some(b.into()),
            })
            .await
            .unwrap()
            .into_inner();

        let mut names = Vec::new();
        while let Some(feature) = stream.message().await.unwrap() {
            names.push(feature.name);
        }
        listed.push(names);
    }

    assert_eq!(listed[0].len(), 14);
    assert_eq!(listed[0][0], "Patriots Path, Mendham, NJ 07945, USA");
    assert_eq!(listed[0], listed[1]);
    assert_eq!(listed[0], listed[2]);
}

#[tokio::test]
async fn list_features_on_an_empty_index_ends_immediately() {
    let mut client = spawn_server(FeatureIndex::default()).await;

    let mut stream = client
        .list_features(Rectangle::default())
        .await
        .unwrap()
        .into_inner();
    assert!(stream.message().await.unwrap().is_none());
}

#[tokio::test]
async fn record_route_counts_revisited_features() {
    let mut client = spawn_server(dataset_index()).await;

    let route = tokio_stream::iter(
        [PATRIOTS_PATH, PATRIOTS_PATH, NOWHERE]
            .into_iter()
            .map(Point::from)
            .collect::<Vec<_>>(),
    );
    let summary = client.record_route(route).await.unwrap().into_inner();

    assert_eq!(summary.point_count, 3);
    assert_eq!(summary.feature_count, 2);
    assert_eq!(summary.distance, distance(PATRIOTS_PATH, NOWHERE));
    assert!(summary.elapsed_time >= 0);
}

#[tokio::test]
async fn route_chat_shares_notes_per_location() {
    let mut client_one = spawn_server(dataset_index()).await;
    let mut client_two = client_one.clone();

    let (tx_one, rx_one) = mpsc::channel(4);
    let mut inbox_one = client_one
        .route_chat(ReceiverStream::new(rx_one))
        .await
        .unwrap()
        .into_inner();

    let (tx_two, rx_two) = mpsc::channel(4);
    let mut inbox_two = client_two
        .route_chat(ReceiverStream::new(rx_two))
        .await
        .unwrap()
        .into_inner();

    tx_one.send(note(WHIPPANY, "one: hello")).await.unwrap();
    assert_eq!(next_messages(&mut inbox_one, 1).await, ["one: hello"]);

    tx_two.send(note(WHIPPANY, "two: hi")).await.unwrap();
    assert_eq!(
        next_messages(&mut inbox_two, 2).await,
        ["one: hello", "two: hi"]
    );

    tx_two.send(note(PATRIOTS_PATH, "two: elsewhere")).await.unwrap();
    assert_eq!(next_messages(&mut inbox_two, 1).await, ["two: elsewhere"]);

    tx_one.send(note(WHIPPANY, "one: bye")).await.unwrap();
    assert_eq!(
        next_messages(&mut inbox_one, 3).await,
        ["one: hello", "two: hi", "one: bye"]
    );

    drop(tx_one);
    drop(tx_two);
    assert!(inbox_one.message().await.unwrap().is_none());
    assert!(inbox_two.message().await.unwrap().is_none());
}
