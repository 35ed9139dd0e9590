//! Adapters to the collaborators that run off the interaction context:
//! the transfer engine, the watchdog timers, and the channel they use to
//! report back.

pub mod http_transfer;
pub mod scheduler;

use tokio::sync::mpsc::UnboundedSender;

use crate::types::events::{EngineEvent, TransferHandle};

/// Where background producers deliver their events. Implementations must
/// only enqueue; the single consumer applies them.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

impl EventSink for UnboundedSender<EngineEvent> {
    fn emit(&self, event: EngineEvent) {
        if self.send(event).is_err() {
            tracing::debug!("event receiver dropped, discarding engine event");
        }
    }
}

/// Byte-stream download primitives. Progress, completion and failure are
/// reported through the engine's `EventSink`.
pub trait TransferEngine: Send + Sync {
    fn request_transfer(&self, url: &str) -> TransferHandle;
    /// Requests termination. Returns immediately; the transfer may still
    /// emit a few events that the caller is expected to ignore.
    fn cancel(&self, handle: TransferHandle);
}
