//! Shared chat-note registry.
//!
//! Every `RouteChat` stream appends into one [`RouteNoteRegistry`], keyed by
//! the exact [`Coordinate`] a note was sent from. The map sits behind a
//! single [`parking_lot::Mutex`] and is never handed out: callers only get an
//! owned snapshot of one coordinate's notes, so the lock is released before
//! anything is written to a network stream.

use parking_lot::Mutex;
use routeguide_core::{proto::RouteNote, types::Coordinate};
use std::collections::HashMap;

/// Append-only, coordinate-keyed log of route notes.
///
/// Sequences only ever grow; notes are never removed or reordered.
#[derive(Debug, Default)]
pub struct RouteNoteRegistry {
    notes: Mutex<HashMap<Coordinate, Vec<RouteNote>>>,
}

impl RouteNoteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `note` under `key` and returns a copy of every note recorded at
    /// `key`, oldest first. The returned sequence always ends with `note`.
    ///
    /// The critical section covers the push and one clone of the sequence.
    pub fn append_and_snapshot(&self, key: Coordinate, note: RouteNote) -> Vec<RouteNote> {
        let mut notes = self.notes.lock();
        let sequence = notes.entry(key).or_default();
        sequence.push(note);
        sequence.clone()
    }

    /// Number of notes recorded at `key`.
    pub fn len_for(&self, key: Coordinate) -> usize {
        self.notes.lock().get(&key).map_or(0, Vec::len)
    }
}
