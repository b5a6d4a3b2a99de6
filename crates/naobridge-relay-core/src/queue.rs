use naobridge_core::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Ordered store-and-forward queue between the game and robot slots.
///
/// Only append, pop-front and requeue-front are exposed so the delivery
/// order cannot be disturbed from outside. The lock is never held across
/// an await point.
pub struct DeliveryQueue {
    pending: Mutex<VecDeque<Message>>,
    pushed: Notify,
}

impl DeliveryQueue {
    /// Create new, empty queue
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            pushed: Notify::new(),
        }
    }

    /// Append one message and wake the robot slot; returns the new length
    pub fn push_back(&self, message: Message) -> usize {
        self.extend(std::iter::once(message))
    }

    /// Append several messages back-to-back under one lock.
    ///
    /// Messages produced by one game event stay adjacent.
    pub fn extend<I>(&self, messages: I) -> usize
    where
        I: IntoIterator<Item = Message>,
    {
        let len = {
            let mut pending = self.pending.lock();
            pending.extend(messages);
            pending.len()
        };
        self.pushed.notify_one();
        len
    }

    /// Take the oldest message
    pub fn pop_front(&self) -> Option<Message> {
        self.pending.lock().pop_front()
    }

    /// Put a message whose delivery failed back ahead of everything else
    pub fn requeue_front(&self, message: Message) {
        self.pending.lock().push_front(message);
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Resolve once something is appended after (or shortly before) the call
    pub async fn wait_for_push(&self) {
        self.pushed.notified().await
    }

    /// Empty the queue, returning what was left (used at shutdown)
    pub fn clear(&self) -> Vec<Message> {
        self.pending.lock().drain(..).collect()
    }
}

impl Default for DeliveryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use naobridge_core::{Command, Turn};
    use std::sync::Arc;
    use std::time::Duration;

    fn say(text: &str) -> Message {
        Message::new(None, Turn::Number(1), Command::Say(text.to_string()))
    }

    fn texts(queue: &DeliveryQueue) -> Vec<String> {
        std::iter::from_fn(|| queue.pop_front())
            .map(|m| m.payload())
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let queue = DeliveryQueue::new();
        queue.push_back(say("a"));
        queue.push_back(say("b"));
        assert_eq!(queue.extend(vec![say("c"), say("d")]), 4);
        assert_eq!(texts(&queue), vec!["say:a", "say:b", "say:c", "say:d"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_requeue_front_preserves_order() {
        let queue = DeliveryQueue::new();
        for t in ["1", "2", "3"] {
            queue.push_back(say(t));
        }

        let in_flight = queue.pop_front().unwrap();
        // Arrives while message 1 is in flight
        queue.push_back(say("4"));
        queue.requeue_front(in_flight);

        assert_eq!(texts(&queue), vec!["say:1", "say:2", "say:3", "say:4"]);
    }

    #[test]
    fn test_clear() {
        let queue = DeliveryQueue::new();
        queue.push_back(say("x"));
        assert_eq!(queue.clear().len(), 1);
        assert_eq!(queue.len(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_push_wakes() {
        let queue = Arc::new(DeliveryQueue::new());
        let waiter = {
            let queue = queue.clone();
            tokio::spawn(async move { queue.wait_for_push().await })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        queue.push_back(say("wake"));

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter woke")
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_producers_keep_per_producer_order() {
        let queue = Arc::new(DeliveryQueue::new());
        let mut handles = Vec::new();
        for producer in 0..4 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..100 {
                    queue.push_back(say(&format!("{producer}-{i}")));
                    tokio::task::yield_now().await;
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let mut last = [-1i32; 4];
        for payload in texts(&queue) {
            let (p, i) = payload["say:".len()..].split_once('-').unwrap();
            let (p, i): (usize, i32) = (p.parse().unwrap(), i.parse().unwrap());
            assert!(i > last[p]);
            last[p] = i;
        }
        assert_eq!(last, [99; 4]);
    }
}
