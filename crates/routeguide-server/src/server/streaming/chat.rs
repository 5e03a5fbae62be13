use crate::server::{registry::RouteNoteRegistry, telemetry::increment_notes_relayed};
use futures::{Stream, TryStreamExt};
use routeguide_core::{Error, proto::RouteNote, types::Coordinate};
use tokio::sync::mpsc;
use tonic::Status;

/// Runs one `RouteChat` session until the client half-closes or fails.
///
/// For every inbound note, appends it to `registry` under its coordinate and
/// sends back the whole log for that coordinate, oldest first (the new note
/// included). The snapshot is taken under the registry lock; the sends
/// happen after the lock is released, so a slow client only stalls itself.
///
/// A client may see the same historical note more than once when other
/// sessions write to the same coordinate between its sends.
///
/// Returns the number of notes relayed.
///
/// # Errors
///
/// - [`Error::Transport`] with the original status if receiving fails.
/// - [`Error::ChannelError`] if the response channel closes mid-replay.
pub async fn relay_notes<S>(
    registry: &RouteNoteRegistry,
    mut inbound: S,
    resp_tx: &mpsc::Sender<Result<RouteNote, Status>>,
) -> routeguide_core::Result<usize>
where
    S: Stream<Item = Result<RouteNote, Status>> + Unpin,
{
    let mut relayed = 0;

    while let Some(note) = inbound.try_next().await? {
        let key = Coordinate::from_point(note.location.as_ref());
        let snapshot = registry.append_and_snapshot(key, note);

        for note in snapshot {
            if let Err(e) = resp_tx.send(Ok(note)).await {
                return Err(Error::ChannelError {
                    context: format!("Failed to forward note: {e}"),
                });
            }
            relayed += 1;
            increment_notes_relayed(1);
        }
    }

    Ok(relayed)
}
