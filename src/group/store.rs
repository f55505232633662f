//! Lock-protected FIFO message stores
//!
//! Every group owns two stores: the *pending* store (delayed messages, not
//! yet deliverable) and the *visible* store (deliverable, FIFO). Each store
//! is its own lock domain; the only operation that needs both is the bulk
//! splice used by revoke, which always locks the source (pending) before the
//! destination (visible).

use crate::group::message::Message;
use std::collections::VecDeque;
use std::sync::Mutex;

/// An ordered message sequence guarded by its own mutex.
#[derive(Debug, Default)]
pub(crate) struct FifoStore {
    messages: Mutex<VecDeque<Message>>,
}

impl FifoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the tail.
    pub fn push(&self, msg: Message) {
        self.messages.lock().unwrap().push_back(msg);
    }

    /// Remove and return the oldest message, if any.
    pub fn pop_oldest(&self) -> Option<Message> {
        self.messages.lock().unwrap().pop_front()
    }

    pub fn len(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().unwrap().is_empty()
    }

    /// Atomically move every message of `source`, in its internal order, to
    /// the tail of this store, leaving `source` empty.
    ///
    /// Both locks are held for the whole move. The source lock is acquired
    /// first; callers splice pending into visible, so the acquisition order
    /// is pending-then-visible, matching every other two-lock path.
    pub fn splice_all_from(&self, source: &FifoStore) {
        let mut src = source.messages.lock().unwrap();
        let mut dst = self.messages.lock().unwrap();
        dst.extend(src.drain(..));
    }

    /// Remove and discard every message, returning how many were dropped.
    pub fn drain_all(&self) -> usize {
        let mut messages = self.messages.lock().unwrap();
        let dropped = messages.len();
        messages.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(text: &str) -> Message {
        Message::capture(text.as_bytes(), 64)
    }

    #[test]
    fn test_push_pop_fifo_order() {
        let store = FifoStore::new();
        store.push(msg("one"));
        store.push(msg("two"));
        store.push(msg("three"));

        assert_eq!(store.pop_oldest().unwrap().data(), b"one");
        assert_eq!(store.pop_oldest().unwrap().data(), b"two");
        assert_eq!(store.pop_oldest().unwrap().data(), b"three");
        assert!(store.pop_oldest().is_none());
    }

    #[test]
    fn test_pop_empty_returns_none() {
        let store = FifoStore::new();
        assert!(store.pop_oldest().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_splice_appends_source_after_existing_tail() {
        let visible = FifoStore::new();
        let pending = FifoStore::new();

        visible.push(msg("v1"));
        visible.push(msg("v2"));
        pending.push(msg("p1"));
        pending.push(msg("p2"));

        visible.splice_all_from(&pending);

        assert!(pending.is_empty());
        assert_eq!(visible.len(), 4);
        assert_eq!(visible.pop_oldest().unwrap().data(), b"v1");
        assert_eq!(visible.pop_oldest().unwrap().data(), b"v2");
        assert_eq!(visible.pop_oldest().unwrap().data(), b"p1");
        assert_eq!(visible.pop_oldest().unwrap().data(), b"p2");
    }

    #[test]
    fn test_splice_from_empty_source_is_noop() {
        let visible = FifoStore::new();
        let pending = FifoStore::new();
        visible.push(msg("v1"));

        visible.splice_all_from(&pending);
        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn test_drain_all_counts_discarded() {
        let store = FifoStore::new();
        store.push(msg("a"));
        store.push(msg("b"));
        assert_eq!(store.drain_all(), 2);
        assert!(store.is_empty());
        assert_eq!(store.drain_all(), 0);
    }
}
