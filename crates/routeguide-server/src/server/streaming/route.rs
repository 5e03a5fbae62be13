use crate::server::{index::FeatureIndex, telemetry::increment_route_points};
use core::time::Duration;
use futures::{Stream, TryStreamExt};
use routeguide_core::{
    geo::distance,
    proto::{Point, RouteSummary},
    types::Coordinate,
};
use std::time::Instant;
use tonic::Status;

/// Per-call state of a `RecordRoute` stream.
///
/// Counts are kept wide and only narrowed (saturating) when the summary is
/// built, since the wire fields are `int32`.
#[derive(Debug, Default, Clone)]
pub struct RouteAccumulator {
    point_count: u64,
    feature_count: u64,
    distance: i64,
    last_point: Option<Coordinate>,
}

impl RouteAccumulator {
    /// Records one visited point.
    ///
    /// `is_feature` is whether `point` matches a known feature exactly; a
    /// feature visited twice counts twice. The first point adds no distance;
    /// every later point adds the truncated haversine distance from its
    /// predecessor.
    pub fn observe(&mut self, point: Coordinate, is_feature: bool) {
        self.point_count += 1;
        if is_feature {
            self.feature_count += 1;
        }
        if let Some(last) = self.last_point {
            self.distance += i64::from(distance(last, point));
        }
        self.last_point = Some(point);
    }

    /// Builds the wire summary for a route that took `elapsed`.
    pub fn summarize(&self, elapsed: Duration) -> RouteSummary {
        RouteSummary {
            point_count: saturate(self.point_count),
            feature_count: saturate(self.feature_count),
            distance: saturate(self.distance),
            elapsed_time: saturate(elapsed.as_secs()),
        }
    }
}

fn saturate<T: TryInto<i32>>(value: T) -> i32 {
    value.try_into().unwrap_or(i32::MAX)
}

/// Consumes a client's point stream and returns its [`RouteSummary`].
///
/// Elapsed time is measured in whole seconds from the moment this function
/// is entered until the client half-closes its stream.
///
/// # Errors
///
/// The first inbound error aborts the call and is returned as
/// [`routeguide_core::Error::Transport`] with the original status; no partial
/// summary is produced.
pub async fn record_route<S>(
    index: &FeatureIndex,
    mut inbound: S,
) -> routeguide_core::Result<RouteSummary>
where
    S: Stream<Item = Result<Point, Status>> + Unpin,
{
    let start = Instant::now();
    let mut route = RouteAccumulator::default();

    while let Some(point) = inbound.try_next().await? {
        let point = Coordinate::from(point);
        route.observe(point, index.contains(point));
        increment_route_points(1);
    }

    let summary = route.summarize(start.elapsed());
    tracing::debug!(
        points = summary.point_count,
        features = summary.feature_count,
        distance = summary.distance,
        "Route recorded"
    );
    Ok(summary)
}
