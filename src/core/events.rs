//! Outbound domain events. Delivery is fire-and-forget: sinks are only
//! called after the attendance transaction has committed.

use crate::errors::{AppError, AppResult};
use crate::models::events::DomainEvent;
use crate::ui::messages::warning;
use std::sync::mpsc::Sender;

pub trait EventSink {
    fn emit(&self, event: &DomainEvent) -> AppResult<()>;
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: &DomainEvent) -> AppResult<()> {
        Ok(())
    }
}

/// Forwards events to a channel drained by the notification side.
pub struct ChannelSink {
    tx: Sender<DomainEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<DomainEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &DomainEvent) -> AppResult<()> {
        self.tx
            .send(event.clone())
            .map_err(|e| AppError::Other(format!("event channel closed: {}", e)))
    }
}

/// Emit all events, reporting (never propagating) delivery failures.
pub fn publish(sink: &dyn EventSink, events: &[DomainEvent]) {
    for ev in events {
        if let Err(e) = sink.emit(ev) {
            warning(format!("Failed to deliver {} event: {}", ev.name(), e));
        }
    }
}
