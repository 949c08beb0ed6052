use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use super::{Delivery, ListenerError, MessageSource};

const DEFAULT_MAX_DELIVERY_COUNT: u32 = 10;

#[derive(Debug, Default)]
struct QueueState {
    ready: VecDeque<Delivery>,
    locked: HashMap<String, Delivery>,
    completed: Vec<Delivery>,
    dead_lettered: Vec<Delivery>,
}

/// Process-local queue with peek-lock semantics. Backs the listeners when no
/// broker is configured, and the tests.
#[derive(Debug)]
pub struct InMemoryQueue {
    state: Mutex<QueueState>,
    sequence: AtomicU64,
    max_delivery_count: u32,
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DELIVERY_COUNT)
    }
}

impl InMemoryQueue {
    pub fn new(max_delivery_count: u32) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            sequence: AtomicU64::new(1),
            max_delivery_count: max_delivery_count.max(1),
        }
    }

    /// Enqueues a message body and returns its message id.
    pub fn send(&self, body: impl Into<Vec<u8>>) -> String {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let message_id = format!("msg-{sequence}");
        let delivery = Delivery {
            message_id: message_id.clone(),
            body: body.into(),
            delivery_count: 0,
            lock_token: String::new(),
        };
        self.lock().ready.push_back(delivery);
        message_id
    }

    pub fn pending(&self) -> usize {
        self.lock().ready.len()
    }

    pub fn completed(&self) -> Vec<Delivery> {
        self.lock().completed.clone()
    }

    pub fn dead_lettered(&self) -> Vec<Delivery> {
        self.lock().dead_lettered.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, QueueState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn take_locked(state: &mut QueueState, delivery: &Delivery) -> Result<Delivery, ListenerError> {
    state
        .locked
        .remove(&delivery.lock_token)
        .ok_or_else(|| ListenerError::UnknownLock(delivery.message_id.clone()))
}

#[async_trait]
impl MessageSource for InMemoryQueue {
    async fn receive(&self) -> Result<Option<Delivery>, ListenerError> {
        let mut state = self.lock();
        let Some(mut delivery) = state.ready.pop_front() else {
            return Ok(None);
        };
        let lock = self.sequence.fetch_add(1, Ordering::Relaxed);
        delivery.delivery_count += 1;
        delivery.lock_token = format!("lock-{lock}");
        state
            .locked
            .insert(delivery.lock_token.clone(), delivery.clone());
        Ok(Some(delivery))
    }

    async fn complete(&self, delivery: &Delivery) -> Result<(), ListenerError> {
        let mut state = self.lock();
        let delivery = take_locked(&mut state, delivery)?;
        state.completed.push(delivery);
        Ok(())
    }

    async fn abandon(&self, delivery: &Delivery) -> Result<(), ListenerError> {
        let mut state = self.lock();
        let mut delivery = take_locked(&mut state, delivery)?;
        if delivery.delivery_count >= self.max_delivery_count {
            warn!(
                message_id = %delivery.message_id,
                delivery_count = delivery.delivery_count,
                "max delivery count reached, dead-lettering"
            );
            state.dead_lettered.push(delivery);
            return Ok(());
        }
        delivery.lock_token.clear();
        state.ready.push_back(delivery);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn abandon_requeues_with_a_higher_delivery_count() {
        let queue = InMemoryQueue::default();
        queue.send("{}");

        let first = queue.receive().await.expect("receive").expect("delivery");
        assert_eq!(first.delivery_count, 1);
        queue.abandon(&first).await.expect("abandon");

        let second = queue.receive().await.expect("receive").expect("delivery");
        assert_eq!(second.message_id, first.message_id);
        assert_eq!(second.delivery_count, 2);
        queue.complete(&second).await.expect("complete");

        assert_eq!(queue.pending(), 0);
        assert_eq!(queue.completed().len(), 1);
    }

    #[tokio::test]
    async fn exhausted_deliveries_are_dead_lettered() {
        let queue = InMemoryQueue::new(2);
        queue.send("poison");

        for _ in 0..2 {
            let delivery = queue.receive().await.expect("receive").expect("delivery");
            queue.abandon(&delivery).await.expect("abandon");
        }

        assert!(queue.receive().await.expect("receive").is_none());
        assert_eq!(queue.dead_lettered().len(), 1);
    }

    #[tokio::test]
    async fn settling_twice_is_rejected() {
        let queue = InMemoryQueue::default();
        queue.send("{}");
        let delivery = queue.receive().await.expect("receive").expect("delivery");
        queue.complete(&delivery).await.expect("complete");

        assert!(matches!(
            queue.complete(&delivery).await,
            Err(ListenerError::UnknownLock(_))
        ));
    }
}
