use crate::server::{index::FeatureIndex, telemetry::increment_features_streamed};
use routeguide_core::{Error, proto::Feature, types::BoundingBox};
use tokio::sync::mpsc;
use tonic::Status;

/// Streams every feature of `index` inside `bounds` to `resp_tx`, in load
/// order.
///
/// Features are sent one at a time as the scan produces them; the scan waits
/// for the channel to accept each one before moving on.
///
/// # Errors
///
/// Returns [`Error::ChannelError`] as soon as the response channel is closed
/// (the client went away). Nothing is retried.
pub async fn feed_features(
    index: &FeatureIndex,
    bounds: BoundingBox,
    resp_tx: &mpsc::Sender<Result<Feature, Status>>,
) -> routeguide_core::Result<usize> {
    let mut sent = 0;

    for feature in index.scan(bounds) {
        if let Err(e) = resp_tx.send(Ok(feature.clone())).await {
            return Err(Error::ChannelError {
                context: format!("Failed to forward feature: {e}"),
            });
        }
        sent += 1;
        increment_features_streamed(1);
    }

    Ok(sent)
}
