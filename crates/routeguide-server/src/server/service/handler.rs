//! gRPC service implementation for the route guide.
//!
//! This module defines [`RouteGuideService`], the concrete implementation of
//! the [`RouteGuide`] service from `route_guide.proto`.
//!
//! ## Responsibilities
//!
//! - Answer `GetFeature` directly from the [`FeatureIndex`].
//! - Run `ListFeatures` and `RouteChat` in spawned tasks that feed a bounded
//!   channel backing the response stream.
//! - Run `RecordRoute` inline and reply once the client half-closes.
//! - Admit streaming calls through the [`Lifecycle`] so shutdown can drain
//!   and cancel them.
//!
//! The shared state (index, registry, lifecycle) is owned by the service
//! value and injected at construction, so independent instances never share
//! anything.

use crate::server::{
    config::ServerConfig,
    index::FeatureIndex,
    registry::RouteNoteRegistry,
    service::lifecycle::{Lifecycle, StreamGuard},
    streaming::{chat::relay_notes, features::feed_features, route},
    telemetry::{
        GET_FEATURE, LIST_FEATURES, RECORD_ROUTE, ROUTE_CHAT, increment_requests,
        increment_stream_errors, record_stream_duration,
    },
};
use core::pin::Pin;
use routeguide_core::{
    Error,
    proto::{
        Feature, Point, Rectangle, RouteNote, RouteSummary, route_guide_server::RouteGuide,
    },
    types::{BoundingBox, Coordinate},
};
use std::{sync::Arc, time::Instant};
use tokio::sync::mpsc;
use tokio_stream::{Stream, wrappers::ReceiverStream};
use tonic::{Request, Response, Status, Streaming};
use tracing::Instrument;

type ResponseStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send>>;

/// gRPC route guide service.
///
/// Cheap to clone: every clone shares the same index, registry and
/// lifecycle.
#[derive(Clone)]
pub struct RouteGuideService {
    config: ServerConfig,
    index: Arc<FeatureIndex>,
    registry: Arc<RouteNoteRegistry>,
    lifecycle: Arc<Lifecycle>,
}

impl RouteGuideService {
    /// Creates a service over `index` with an empty note registry.
    pub fn new(config: ServerConfig, index: FeatureIndex) -> Self {
        Self::with_registry(config, Arc::new(index), Arc::new(RouteNoteRegistry::new()))
    }

    /// Creates a service over explicitly provided shared state.
    pub fn with_registry(
        config: ServerConfig,
        index: Arc<FeatureIndex>,
        registry: Arc<RouteNoteRegistry>,
    ) -> Self {
        Self {
            config,
            index,
            registry,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    pub fn index(&self) -> &FeatureIndex {
        &self.index
    }

    pub fn registry(&self) -> &RouteNoteRegistry {
        &self.registry
    }

    /// Initiates graceful shutdown: new calls are refused, in-flight streams
    /// get `config.shutdown_timeout` to finish, the rest are cancelled.
    pub async fn shutdown(&self) {
        self.lifecycle.shutdown(self.config.shutdown_timeout).await;
    }

    /// Spawns `work` as the producer of a streaming response.
    ///
    /// The task races `work` against service cancellation, records the
    /// outcome, and makes a best-effort attempt to surface errors to the
    /// client before dropping its end of the channel.
    fn spawn_stream<T, F>(
        method: &'static str,
        guard: StreamGuard,
        resp_tx: mpsc::Sender<Result<T, Status>>,
        work: F,
    ) where
        T: Send + 'static,
        F: Future<Output = routeguide_core::Result<usize>> + Send + 'static,
    {
        let span = tracing::info_span!("streaming", rpc = method);
        let fut = async move {
            let start = Instant::now();
            let outcome = tokio::select! {
                res = work => res,
                () = guard.cancelled() => Err(Error::ServiceShutdown),
            };

            match outcome {
                Ok(items) => {
                    record_stream_duration(method, start.elapsed().as_millis() as f64);
                    tracing::debug!(items, "Stream completed");
                }
                Err(e) => {
                    increment_stream_errors(method);
                    tracing::warn!("Stream ended with error: {}", e);
                    // A closed channel means the client is gone; anything else
                    // is worth reporting if it is still listening.
                    if !matches!(e, Error::ChannelError { .. }) {
                        if let Err(send_err) = resp_tx.send(Err(e.into())).await {
                            tracing::debug!(
                                "Response channel failed to forward error: {}",
                                send_err
                            );
                        }
                    }
                }
            }
            drop(guard);
        };

        tokio::spawn(fut.instrument(span));
    }
}

#[tonic::async_trait]
impl RouteGuide for RouteGuideService {
    type ListFeaturesStream = ResponseStream<Feature>;
    type RouteChatStream = ResponseStream<RouteNote>;

    /// Returns the feature at the requested point, or an unnamed feature
    /// there if none is known.
    #[tracing::instrument(skip_all, fields(latitude = req.get_ref().latitude, longitude = req.get_ref().longitude))]
    async fn get_feature(&self, req: Request<Point>) -> Result<Response<Feature>, Status> {
        self.lifecycle.ensure_accepting()?;
        increment_requests(GET_FEATURE);

        let point = Coordinate::from(req.get_ref());
        Ok(Response::new(self.index.lookup(point)))
    }

    /// Streams every known feature inside the requested rectangle, in load
    /// order.
    #[tracing::instrument(skip_all)]
    async fn list_features(
        &self,
        req: Request<Rectangle>,
    ) -> Result<Response<Self::ListFeaturesStream>, Status> {
        let guard = self.lifecycle.admit()?;
        increment_requests(LIST_FEATURES);

        let bounds = BoundingBox::from(req.get_ref());
        tracing::debug!(?bounds, "Listing features");

        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let index = Arc::clone(&self.index);
        let tx = resp_tx.clone();
        Self::spawn_stream(LIST_FEATURES, guard, resp_tx, async move {
            feed_features(&index, bounds, &tx).await
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }

    /// Consumes the client's route and replies with its summary.
    #[tracing::instrument(skip_all)]
    async fn record_route(
        &self,
        req: Request<Streaming<Point>>,
    ) -> Result<Response<RouteSummary>, Status> {
        let guard = self.lifecycle.admit()?;
        increment_requests(RECORD_ROUTE);

        let start = Instant::now();
        let inbound = req.into_inner();
        let outcome = tokio::select! {
            res = route::record_route(&self.index, inbound) => res,
            () = guard.cancelled() => Err(Error::ServiceShutdown),
        };

        match outcome {
            Ok(summary) => {
                record_stream_duration(RECORD_ROUTE, start.elapsed().as_millis() as f64);
                Ok(Response::new(summary))
            }
            Err(e) => {
                increment_stream_errors(RECORD_ROUTE);
                tracing::warn!("Route aborted: {}", e);
                Err(e.into())
            }
        }
    }

    /// Relays location-tagged notes: each received note is stored and every
    /// note recorded at its location is sent back.
    #[tracing::instrument(skip_all)]
    async fn route_chat(
        &self,
        req: Request<Streaming<RouteNote>>,
    ) -> Result<Response<Self::RouteChatStream>, Status> {
        let guard = self.lifecycle.admit()?;
        increment_requests(ROUTE_CHAT);

        let inbound = req.into_inner();
        let (resp_tx, resp_rx) = mpsc::channel(self.config.stream_buffer_size);
        let registry = Arc::clone(&self.registry);
        let tx = resp_tx.clone();
        Self::spawn_stream(ROUTE_CHAT, guard, resp_tx, async move {
            relay_notes(&registry, inbound, &tx).await
        });

        Ok(Response::new(Box::pin(ReceiverStream::new(resp_rx))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use tokio_stream::StreamExt;
    use tonic::Code;

    fn service() -> RouteGuideService {
        let index = FeatureIndex::new([
            Feature {
                name: "Patriots Path".to_string(),
                location: Some(Coordinate::new(407_838_351, -746_143_763).into()),
            },
            Feature {
                name: "Whippany".to_string(),
                location: Some(Coordinate::new(408_122_808, -743_999_179).into()),
            },
        ]);
        RouteGuideService::new(ServerConfig::default(), index)
    }

    fn rect(lo: Coordinate, hi: Coordinate) -> Rectangle {
        Rectangle {
            lo: Some(lo.into()),
            hi: Some(hi.into()),
        }
    }

    #[tokio::test]
    async fn get_feature_hit_and_miss() {
        let service = service();

        let hit = service
            .get_feature(Request::new(Coordinate::new(408_122_808, -743_999_179).into()))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(hit.name, "Whippany");

        let miss_point = Coordinate::new(1, 2);
        let miss = service
            .get_feature(Request::new(miss_point.into()))
            .await
            .unwrap()
            .into_inner();
        assert_eq!(miss.name, "");
        assert_eq!(miss.location, Some(Point::from(miss_point)));
    }

    #[tokio::test]
    async fn list_features_streams_matches_then_ends() {
        let service = service();
        let bounds = rect(
            Coordinate::new(410_000_000, -740_000_000),
            Coordinate::new(400_000_000, -750_000_000),
        );

        let mut stream = service
            .list_features(Request::new(bounds))
            .await
            .unwrap()
            .into_inner();

        let mut names = Vec::new();
        while let Some(item) = stream.next().await {
            names.push(item.unwrap().name);
        }
        assert_eq!(names, ["Patriots Path", "Whippany"]);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn calls_are_refused_after_shutdown() {
        let service = service();
        service.shutdown().await;

        let status = service
            .get_feature(Request::new(Point::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);

        let status = service
            .list_features(Request::new(Rectangle::default()))
            .await
            .err()
            .unwrap();
        assert_eq!(status.code(), Code::Unavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_a_stalled_stream() {
        let config = ServerConfig {
            shutdown_timeout: Duration::from_secs(1),
            ..ServerConfig::default()
        };
        let service = RouteGuideService::new(config, service().index().clone());
        let bounds = rect(
            Coordinate::new(400_000_000, -750_000_000),
            Coordinate::new(410_000_000, -740_000_000),
        );

        let mut stream = service
            .list_features(Request::new(bounds))
            .await
            .unwrap()
            .into_inner();

        // Nobody reads until the drain window has passed.
        service.shutdown().await;

        assert_eq!(stream.next().await.unwrap().unwrap().name, "Patriots Path");
        let status = stream.next().await.unwrap().unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn clones_share_state_but_instances_do_not() {
        let a = service();
        let a_clone = a.clone();
        let b = service();
        let here = Coordinate::new(1, 1);
        let note = RouteNote {
            location: Some(here.into()),
            message: "hello".to_string(),
        };

        a.registry().append_and_snapshot(here, note);
        assert_eq!(a_clone.registry().len_for(here), 1);
        assert_eq!(b.registry().len_for(here), 0);
        assert_eq!(a.index().len(), 2);
    }
}
