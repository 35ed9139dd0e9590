use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::EventSink;
use crate::types::events::EngineEvent;

/// Cancels a scheduled event. Dropping the handle leaves the timer running.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

/// Delivers an event once after a delay.
pub trait Scheduler: Send + Sync {
    fn schedule(&self, delay: Duration, event: EngineEvent) -> TimerHandle;
}

/// Scheduler backed by tokio timers; fired events go to the sink.
pub struct TokioScheduler {
    runtime: Handle,
    sink: Arc<dyn EventSink>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle, sink: Arc<dyn EventSink>) -> Self {
        Self { runtime, sink }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, event: EngineEvent) -> TimerHandle {
        let sink = self.sink.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            sink.emit(event);
        });
        TimerHandle::new(move || task.abort())
    }
}
