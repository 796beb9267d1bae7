//! Asynchronous conversion of accepted edits.
//!
//! Every accepted edit is converted on its own task. Results are broadcast
//! to the room (minus the editor) and persisted whenever they resolve, so
//! two in-flight edits may land out of submission order and the last save
//! to complete wins. Tasks are never cancelled on disconnect; abort handles
//! are kept only so shutdown can stop them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use texroom_core::error::{AppError, ErrorKind};
use texroom_database::store::RoomStore;
use texroom_service::conversion::Converter;

use crate::channel::fanout::Fanout;
use crate::connection::handle::ConnectionId;
use crate::message::types::OutboundMessage;

/// Identifies one in-flight conversion: room name and per-room edit number.
pub type ConversionKey = (String, u64);

/// An accepted edit awaiting conversion.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Room ID to persist the markup to.
    pub room_id: Uuid,
    /// Room name, the broadcast group key.
    pub room_name: String,
    /// Per-room edit sequence number.
    pub seq: u64,
    /// The editing connection. Excluded from the result broadcast and
    /// notified on failure.
    pub origin: ConnectionId,
    /// Raw text to convert.
    pub text: String,
}

/// Spawns and tracks conversion tasks.
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    converter: Arc<dyn Converter>,
    rooms: Arc<dyn RoomStore>,
    fanout: Fanout,
    in_flight: Arc<DashMap<ConversionKey, AbortHandle>>,
    sequences: Arc<DashMap<String, u64>>,
}

impl ConversionPipeline {
    /// Creates a pipeline.
    pub fn new(converter: Arc<dyn Converter>, rooms: Arc<dyn RoomStore>, fanout: Fanout) -> Self {
        Self {
            converter,
            rooms,
            fanout,
            in_flight: Arc::new(DashMap::new()),
            sequences: Arc::new(DashMap::new()),
        }
    }

    /// Next edit number for `room`, starting at 1. Monotonic until the
    /// counter is released by [`Self::release_room`].
    pub fn next_seq(&self, room: &str) -> u64 {
        let mut seq = self.sequences.entry(room.to_string()).or_insert(0);
        *seq += 1;
        *seq
    }

    /// Forget the edit counter of `room` unless it still has conversions
    /// in flight, whose keys a restarted counter could collide with.
    pub fn release_room(&self, room: &str) -> bool {
        self.sequences
            .remove_if(room, |_, _| !self.in_flight.iter().any(|e| e.key().0 == room))
            .is_some()
    }

    /// Number of conversions not yet resolved.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Start converting `job` in the background.
    pub fn submit(&self, job: ConversionJob) {
        let key: ConversionKey = (job.room_name.clone(), job.seq);
        let (ready_tx, ready_rx) = oneshot::channel::<()>();

        let converter = Arc::clone(&self.converter);
        let rooms = Arc::clone(&self.rooms);
        let fanout = self.fanout.clone();
        let in_flight = Arc::clone(&self.in_flight);
        let task_key = key.clone();

        let task = tokio::spawn(async move {
            // Registered in `in_flight` before any work starts.
            let _ = ready_rx.await;
            run(job, converter.as_ref(), rooms.as_ref(), &fanout).await;
            in_flight.remove(&task_key);
        });

        self.in_flight.insert(key, task.abort_handle());
        let _ = ready_tx.send(());
    }

    /// Abort every in-flight conversion.
    pub fn abort_all(&self) -> usize {
        let keys: Vec<ConversionKey> = self.in_flight.iter().map(|e| e.key().clone()).collect();
        let mut aborted = 0;
        for key in keys {
            if let Some((_, handle)) = self.in_flight.remove(&key) {
                handle.abort();
                aborted += 1;
            }
        }
        if aborted > 0 {
            info!(aborted, "Aborted in-flight conversions");
        }
        aborted
    }
}

async fn run(job: ConversionJob, converter: &dyn Converter, rooms: &dyn RoomStore, fanout: &Fanout) {
    debug!(room = %job.room_name, seq = job.seq, "Conversion started");

    match converter.convert(&job.text).await {
        Ok(markup) => {
            let msg = OutboundMessage::ReceiveText {
                markup: markup.clone(),
            };
            fanout.broadcast_except(&job.room_name, job.origin, &msg);

            if let Err(e) = rooms.save_markup(job.room_id, &markup).await {
                warn!(
                    room = %job.room_name,
                    seq = job.seq,
                    error = %e,
                    "Failed to persist markup"
                );
            }
            debug!(room = %job.room_name, seq = job.seq, "Conversion resolved");
        }
        Err(e) => {
            warn!(room = %job.room_name, seq = job.seq, error = %e, "Conversion failed");
            let err = if e.is(ErrorKind::UpstreamFailure) {
                e
            } else {
                AppError::upstream(format!("Conversion failed: {}", e.message))
            };
            fanout.send_to(job.origin, OutboundMessage::error(&err));
        }
    }
}
