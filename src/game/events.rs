//! Simulation events and the bounded feed used to publish them
//!
//! Uses crossbeam-channel so the tick driver never blocks on a slow
//! subscriber: when the feed is full the event is dropped.

use std::time::Instant;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

use crate::game::agent::AgentId;
use crate::game::respawn::RespawnToken;
use crate::util::vec2::Vec2;

/// Something a tick or a respawn timer did that observers may care about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    /// `victim` was removed; its replacement is due at `respawn_at`
    AgentKilled {
        killer: AgentId,
        victim: AgentId,
        position: Vec2,
        token: RespawnToken,
        respawn_at: Instant,
    },
    /// A replacement agent appeared
    AgentRespawned {
        token: RespawnToken,
        agent: AgentId,
        position: Vec2,
    },
}

/// Bounded multi-producer event channel
pub struct EventFeed {
    sender: Sender<SimEvent>,
    receiver: Receiver<SimEvent>,
    capacity: usize,
}

impl EventFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }

    /// Clonable publishing handle (one for the tick loop, one per respawn timer)
    pub fn publisher(&self) -> EventPublisher {
        EventPublisher {
            sender: self.sender.clone(),
        }
    }

    /// Receiving side for a subscriber on another thread or task
    pub fn subscriber(&self) -> Receiver<SimEvent> {
        self.receiver.clone()
    }

    /// Drain everything published so far
    pub fn drain(&self) -> Vec<SimEvent> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

#[derive(Clone)]
pub struct EventPublisher {
    sender: Sender<SimEvent>,
}

impl EventPublisher {
    /// Publish without blocking
    #[inline]
    pub fn try_publish(&self, event: SimEvent) -> Result<(), FeedError> {
        self.sender.try_send(event).map_err(|e| match e {
            TrySendError::Full(_) => FeedError::Full,
            TrySendError::Disconnected(_) => FeedError::Disconnected,
        })
    }

    /// Publish, logging instead of failing when the feed cannot take it
    pub fn publish(&self, event: SimEvent) {
        if let Err(e) = self.try_publish(event) {
            tracing::debug!("Dropped {:?}: {}", event, e);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    #[error("event feed is full")]
    Full,
    #[error("event feed has no subscriber")]
    Disconnected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn respawned(n: f64) -> SimEvent {
        SimEvent::AgentRespawned {
            token: RespawnToken(n as u64),
            agent: Uuid::new_v4(),
            position: Vec2::new(n, n),
        }
    }

    #[test]
    fn test_publish_and_drain_in_order() {
        let feed = EventFeed::new(10);
        let publisher = feed.publisher();

        publisher.try_publish(respawned(1.0)).unwrap();
        publisher.try_publish(respawned(2.0)).unwrap();
        assert_eq!(feed.pending_count(), 2);

        let events = feed.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            SimEvent::AgentRespawned { position, .. } if position == Vec2::new(1.0, 1.0)
        ));
        assert!(feed.is_empty());
    }

    #[test]
    fn test_full_feed_rejects() {
        let feed = EventFeed::new(1);
        let publisher = feed.publisher();

        assert!(publisher.try_publish(respawned(1.0)).is_ok());
        assert_eq!(publisher.try_publish(respawned(2.0)), Err(FeedError::Full));

        // publish() swallows the error
        publisher.publish(respawned(3.0));
        assert_eq!(feed.drain().len(), 1);
    }

    #[test]
    fn test_cloned_publishers_share_feed() {
        let feed = EventFeed::new(10);
        let a = feed.publisher();
        let b = a.clone();

        a.publish(respawned(1.0));
        b.publish(respawned(2.0));

        assert_eq!(feed.subscriber().try_iter().count(), 2);
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(EventFeed::default().capacity(), 256);
    }
}
