use std::collections::HashMap;

use crate::error::StompError;
use crate::frame::{header, Frame};

/// In-memory store of a session's in-progress transactions.
///
/// Frames added to a transaction are buffered in arrival order and handed
/// back at commit for the session to replay. The `transaction` header is
/// stripped on entry, so a replayed frame is indistinguishable from one
/// that never belonged to a transaction.
#[derive(Debug, Default)]
pub struct TxStore {
    transactions: HashMap<String, Vec<Frame>>,
}

impl TxStore {
    pub fn new() -> Self {
        TxStore {
            transactions: HashMap::new(),
        }
    }

    /// Start a transaction. Fails if the id is already in use.
    pub fn begin(&mut self, id: &str) -> Result<(), StompError> {
        if self.transactions.contains_key(id) {
            return Err(StompError::TransactionInProgress(id.to_string()));
        }
        self.transactions.insert(id.to_string(), Vec::new());
        Ok(())
    }

    /// Buffer a frame in the named transaction, stripping its
    /// `transaction` header. Fails if the transaction does not exist.
    pub fn add(&mut self, id: &str, mut frame: Frame) -> Result<(), StompError> {
        let frames = self
            .transactions
            .get_mut(id)
            .ok_or_else(|| StompError::TransactionNotInProgress(id.to_string()))?;
        frame.headers.remove(header::TRANSACTION);
        frames.push(frame);
        Ok(())
    }

    /// Close the named transaction and return its frames in insertion
    /// order for replay.
    pub fn commit(&mut self, id: &str) -> Result<Vec<Frame>, StompError> {
        self.transactions
            .remove(id)
            .ok_or_else(|| StompError::TransactionNotInProgress(id.to_string()))
    }

    /// Discard the named transaction and everything buffered in it.
    pub fn abort(&mut self, id: &str) -> Result<(), StompError> {
        self.transactions
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StompError::TransactionNotInProgress(id.to_string()))
    }

    /// Discard all in-progress transactions.
    pub fn init(&mut self) {
        self.transactions.clear();
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
