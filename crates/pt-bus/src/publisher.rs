//! Outbound publishing seam.

use std::sync::Mutex;

use crate::error::BusResult;

/// Sink for state snapshots.
///
/// Implementations must tolerate being called from the tick loop only; they
/// should hand network I/O off to their own transport rather than block.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()>;
}

impl<P: Publisher + ?Sized> Publisher for &P {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        (**self).publish(topic, payload)
    }
}

impl<P: Publisher + ?Sized> Publisher for Box<P> {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        (**self).publish(topic, payload)
    }
}

/// One published message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// In-memory publisher that records every message in order.
#[derive(Debug, Default)]
pub struct MemoryBus {
    messages: Mutex<Vec<Message>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded messages.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Remove and return all recorded messages.
    pub fn take(&self) -> Vec<Message> {
        std::mem::take(&mut *self.lock())
    }

    /// Most recent payload published on `topic`.
    pub fn latest(&self, topic: &str) -> Option<String> {
        self.lock()
            .iter()
            .rev()
            .find(|m| m.topic == topic)
            .map(|m| m.payload.clone())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Message>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.messages.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Publisher for MemoryBus {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        self.lock().push(Message {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}

/// Publisher that only emits a `tracing` event per message.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingPublisher;

impl Publisher for TracingPublisher {
    fn publish(&self, topic: &str, payload: &str) -> BusResult<()> {
        tracing::debug!(target: "bus", topic, payload, "publish");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_bus_records_in_order() {
        let bus = MemoryBus::new();
        bus.publish("tank/t1/volume", "1").unwrap();
        bus.publish("tank/t1/volume", "2").unwrap();
        bus.publish("pump/p1/state", "open").unwrap();

        assert_eq!(bus.len(), 3);
        assert_eq!(bus.latest("tank/t1/volume").as_deref(), Some("2"));
        assert_eq!(bus.latest("tank/t2/volume"), None);

        let taken = bus.take();
        assert_eq!(taken[2].payload, "open");
        assert!(bus.is_empty());
    }

    #[test]
    fn references_and_boxes_publish() {
        let bus = MemoryBus::new();
        let boxed: Box<dyn Publisher> = Box::new(TracingPublisher);
        boxed.publish("a/b/c", "1").unwrap();
        (&bus).publish("a/b/c", "1").unwrap();
        assert_eq!(bus.len(), 1);
    }
}
