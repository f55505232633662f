//! Message type for the group queue engine
//!
//! A message is a byte payload captured at write time. Once stored it is
//! immutable and owned by exactly one store, until it is consumed by a read
//! or discarded during group teardown.

/// An immutable byte payload queued in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    data: Vec<u8>,
}

impl Message {
    /// Capture a payload, truncating it to `max_size` bytes.
    pub(crate) fn capture(payload: &[u8], max_size: usize) -> Self {
        let len = payload.len().min(max_size);
        Self {
            data: payload[..len].to_vec(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consume the message, delivering at most `buf_len` bytes. Bytes beyond
    /// `buf_len` are dropped with the message, not retained for a later read.
    pub(crate) fn deliver(mut self, buf_len: usize) -> Vec<u8> {
        self.data.truncate(buf_len);
        self.data
    }
}
