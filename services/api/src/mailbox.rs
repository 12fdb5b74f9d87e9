//! Mailbox
//!
//! Outbound envelopes are parked here, keyed by recipient address, until the
//! recipient drains them. Each address holds at most `capacity` envelopes;
//! when full the oldest one is dropped. At most `max_addresses` queues exist
//! at once; a delivery to a new address beyond that evicts the queue that
//! was delivered to least recently.

use std::collections::{HashMap, VecDeque};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::models::Envelope;

#[derive(Default)]
struct Queue {
    envelopes: VecDeque<Envelope>,
    last_delivery: u64,
}

#[derive(Default)]
struct Queues {
    by_address: HashMap<String, Queue>,
    deliveries: u64,
}

pub struct Mailbox {
    capacity: usize,
    max_addresses: usize,
    queues: Mutex<Queues>,
}

impl Mailbox {
    pub fn new(capacity: usize, max_addresses: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            max_addresses: max_addresses.max(1),
            queues: Mutex::new(Queues::default()),
        }
    }

    /// Queues an envelope for its target.
    pub async fn deliver(&self, envelope: Envelope) {
        let mut queues = self.queues.lock().await;
        queues.deliveries += 1;
        let delivery = queues.deliveries;

        if !queues.by_address.contains_key(&envelope.target)
            && queues.by_address.len() >= self.max_addresses
        {
            let stale = queues
                .by_address
                .iter()
                .min_by_key(|(_, queue)| queue.last_delivery)
                .map(|(address, _)| address.clone());
            if let Some(address) = stale {
                let dropped = queues
                    .by_address
                    .remove(&address)
                    .map_or(0, |queue| queue.envelopes.len());
                warn!(
                    target_address = %address,
                    dropped,
                    "Mailbox address limit reached, evicting least recently used queue"
                );
            }
        }

        let queue = queues.by_address.entry(envelope.target.clone()).or_default();
        queue.last_delivery = delivery;
        if queue.envelopes.len() >= self.capacity {
            if let Some(dropped) = queue.envelopes.pop_front() {
                warn!(
                    target_address = %dropped.target,
                    schema = %dropped.schema,
                    "Mailbox full, dropping oldest envelope"
                );
            }
        }
        debug!(target_address = %envelope.target, schema = %envelope.schema, "Envelope delivered");
        queue.envelopes.push_back(envelope);
    }

    /// Removes and returns every pending envelope for `address`, oldest first.
    pub async fn drain(&self, address: &str) -> Vec<Envelope> {
        self.queues
            .lock()
            .await
            .by_address
            .remove(address)
            .map(|queue| Vec::from(queue.envelopes))
            .unwrap_or_default()
    }

    pub async fn pending(&self, address: &str) -> usize {
        self.queues
            .lock()
            .await
            .by_address
            .get(address)
            .map_or(0, |queue| queue.envelopes.len())
    }

    /// Number of addresses with a queue.
    pub async fn addresses(&self) -> usize {
        self.queues.lock().await.by_address.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutor_core::AIResponse;
    use uuid::Uuid;

    fn envelope(target: &str, text: &str) -> Envelope {
        Envelope::new(
            "agent1qtutor",
            target,
            Uuid::new_v4(),
            &AIResponse {
                response: text.to_string(),
            },
        )
        .unwrap()
    }

    fn texts(envelopes: &[Envelope]) -> Vec<String> {
        envelopes
            .iter()
            .map(|e| e.payload["response"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_drain_is_fifo_and_empties() {
        let mailbox = Mailbox::new(8, 8);
        mailbox.deliver(envelope("agent1qalice", "one")).await;
        mailbox.deliver(envelope("agent1qbob", "other")).await;
        mailbox.deliver(envelope("agent1qalice", "two")).await;

        assert_eq!(mailbox.pending("agent1qalice").await, 2);
        assert_eq!(texts(&mailbox.drain("agent1qalice").await), ["one", "two"]);
        assert_eq!(mailbox.pending("agent1qalice").await, 0);
        assert!(mailbox.drain("agent1qalice").await.is_empty());
        assert_eq!(mailbox.pending("agent1qbob").await, 1);
    }

    #[tokio::test]
    async fn test_full_queue_drops_oldest() {
        let mailbox = Mailbox::new(2, 8);
        for text in ["a", "b", "c"] {
            mailbox.deliver(envelope("agent1qalice", text)).await;
        }

        assert_eq!(texts(&mailbox.drain("agent1qalice").await), ["b", "c"]);
    }

    #[tokio::test]
    async fn test_address_limit_evicts_least_recent_queue() {
        let mailbox = Mailbox::new(8, 2);
        mailbox.deliver(envelope("agent1qalice", "a1")).await;
        mailbox.deliver(envelope("agent1qbob", "b1")).await;
        mailbox.deliver(envelope("agent1qalice", "a2")).await;

        mailbox.deliver(envelope("agent1qcarol", "c1")).await;

        assert_eq!(mailbox.addresses().await, 2);
        assert_eq!(mailbox.pending("agent1qbob").await, 0);
        assert_eq!(texts(&mailbox.drain("agent1qalice").await), ["a1", "a2"]);
        assert_eq!(texts(&mailbox.drain("agent1qcarol").await), ["c1"]);
    }

    #[tokio::test]
    async fn test_drained_address_frees_a_slot() {
        let mailbox = Mailbox::new(8, 1);
        mailbox.deliver(envelope("agent1qalice", "a1")).await;
        mailbox.drain("agent1qalice").await;
        mailbox.deliver(envelope("agent1qbob", "b1")).await;

        assert_eq!(mailbox.addresses().await, 1);
        assert_eq!(mailbox.pending("agent1qbob").await, 1);
    }
}
