use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::plan::Direction;

#[derive(Debug, Clone)]
pub enum SyncEvent {
    Started {
        run_id: Uuid,
        direction: Direction,
        target: String,
        at: DateTime<Utc>,
    },
    StepStarted {
        run_id: Uuid,
        step: &'static str,
        environment: Option<String>,
    },
    StepCompleted {
        run_id: Uuid,
        step: &'static str,
        environment: Option<String>,
    },
    StepFailed {
        run_id: Uuid,
        step: &'static str,
        environment: Option<String>,
        error: String,
    },
    Completed {
        run_id: Uuid,
        at: DateTime<Utc>,
    },
}

/// Sink for sync progress events.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: SyncEvent);
}

/// Channel-based event sink that forwards events to a receiver.
pub struct ChannelEventSink {
    tx: tokio::sync::mpsc::UnboundedSender<SyncEvent>,
}

impl ChannelEventSink {
    pub fn new() -> (Self, tokio::sync::mpsc::UnboundedReceiver<SyncEvent>) {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl EventSink for ChannelEventSink {
    async fn emit(&self, event: SyncEvent) {
        let _ = self.tx.send(event);
    }
}

/// Simple tracing-based event sink.
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn emit(&self, event: SyncEvent) {
        tracing::debug!(?event, "sync_event");
    }
}
