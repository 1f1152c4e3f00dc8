// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::Broadcast;

/// A deferred event queue that accepts events from any thread.
///
/// Producers publish through cloned [`EventSender`]s; the owning thread
/// delivers everything pending with [`flush_into`](EventQueue::flush_into),
/// typically once per frame. This is how background work hands results back to
/// single-threaded listeners.
#[derive(Debug)]
pub struct EventQueue<T: Send + 'static> {
    sender: flume::Sender<T>,
    receiver: flume::Receiver<T>,
}

impl<T: Send + 'static> EventQueue<T> {
    /// Creates a new queue backed by an unbounded channel.
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        log::debug!("EventQueue initialized.");
        Self { sender, receiver }
    }

    /// Queues an event from the owning thread.
    pub fn publish(&self, event: T) {
        // The receiver lives in `self`, so this cannot be disconnected.
        let _ = self.sender.send(event);
    }

    /// Returns a sender that can be moved to other threads.
    pub fn sender(&self) -> EventSender<T> {
        EventSender {
            sender: self.sender.clone(),
        }
    }

    /// Returns the number of events waiting to be flushed.
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Raises `broadcast` once per pending event, in publish order.
    ///
    /// Only the events pending when the flush starts are delivered; events
    /// published by listeners during the flush wait for the next one. Returns
    /// the number of events delivered.
    pub fn flush_into(&self, broadcast: &Broadcast<T>) -> usize {
        let pending = self.receiver.len();
        let mut delivered = 0;
        for event in self.receiver.try_iter().take(pending) {
            broadcast.raise(&event);
            delivered += 1;
        }
        if delivered > 0 {
            log::trace!("Flushed {delivered} queued event(s).");
        }
        delivered
    }

    /// Drops every pending event without delivering it.
    pub fn discard(&self) -> usize {
        self.receiver.drain().count()
    }
}

impl<T: Send + 'static> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The producer half of an [`EventQueue`].
#[derive(Debug)]
pub struct EventSender<T: Send + 'static> {
    sender: flume::Sender<T>,
}

impl<T: Send + 'static> EventSender<T> {
    /// Queues an event, logging an error if the queue no longer exists.
    ///
    /// Returns `true` if the event was queued.
    pub fn publish(&self, event: T) -> bool {
        log::trace!("Publishing a queued event.");
        match self.sender.send(event) {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to queue event: {e}. The queue was dropped.");
                false
            }
        }
    }
}

impl<T: Send + 'static> Clone for EventSender<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::thread;

    #[derive(Debug, Clone, PartialEq)]
    enum LoadEvent {
        Started(u32),
        Finished { id: u32, bytes: usize },
    }

    fn collecting(broadcast: &Broadcast<LoadEvent>) -> Rc<RefCell<Vec<LoadEvent>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        broadcast.listen(move |event| sink.borrow_mut().push(event.clone()));
        seen
    }

    #[test]
    fn flush_delivers_in_publish_order() {
        let queue = EventQueue::new();
        let broadcast = Broadcast::new();
        let seen = collecting(&broadcast);

        queue.publish(LoadEvent::Started(1));
        queue.publish(LoadEvent::Finished { id: 1, bytes: 64 });
        assert_eq!(queue.pending(), 2);
        assert!(seen.borrow().is_empty(), "nothing is delivered before flush");

        assert_eq!(queue.flush_into(&broadcast), 2);
        assert_eq!(
            *seen.borrow(),
            vec![
                LoadEvent::Started(1),
                LoadEvent::Finished { id: 1, bytes: 64 }
            ]
        );
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn send_from_thread() {
        let queue = EventQueue::new();
        let broadcast = Broadcast::new();
        let seen = collecting(&broadcast);

        let sender = queue.sender();
        let handle = thread::spawn(move || {
            for id in 0..3 {
                assert!(sender.publish(LoadEvent::Started(id)));
            }
        });
        handle.join().expect("Thread join failed");

        assert_eq!(queue.flush_into(&broadcast), 3);
        assert_eq!(seen.borrow().len(), 3);
    }

    #[test]
    fn events_published_during_flush_wait() {
        let queue = Rc::new(EventQueue::new());
        let broadcast = Broadcast::<LoadEvent>::new();

        let requeue = Rc::clone(&queue);
        broadcast.listen(move |event| {
            if let LoadEvent::Started(id) = event {
                requeue.publish(LoadEvent::Finished { id: *id, bytes: 0 });
            }
        });

        queue.publish(LoadEvent::Started(7));
        assert_eq!(queue.flush_into(&broadcast), 1);
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.flush_into(&broadcast), 1);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn publish_after_queue_drop() {
        let queue = EventQueue::<LoadEvent>::new();
        let sender = queue.sender();
        drop(queue);
        assert!(!sender.publish(LoadEvent::Started(0)));
    }

    #[test]
    fn discard_empties_queue() {
        let queue = EventQueue::new();
        queue.publish(LoadEvent::Started(1));
        queue.publish(LoadEvent::Started(2));
        assert_eq!(queue.discard(), 2);
        assert_eq!(queue.pending(), 0);
    }
}
