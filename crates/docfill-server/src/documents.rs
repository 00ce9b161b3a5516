//! Uploaded document text kept for `/generate`
//!
//! Holds at most `capacity` documents. Inserting beyond that evicts the
//! oldest upload, whose `/generate` then answers 404.

use docfill_domain::TaskId;
use std::collections::{HashMap, VecDeque};

/// Default number of documents retained
pub const DEFAULT_MAX_DOCUMENTS: usize = 256;

/// Bounded, insertion-ordered map from task id to document text
#[derive(Debug)]
pub struct DocumentCache {
    capacity: usize,
    order: VecDeque<TaskId>,
    texts: HashMap<TaskId, String>,
}

impl DocumentCache {
    /// Create a cache holding at most `capacity` documents (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            texts: HashMap::with_capacity(capacity),
        }
    }

    /// Store a document, evicting the oldest ones past capacity
    ///
    /// Returns the ids that were evicted.
    pub fn insert(&mut self, task_id: TaskId, text: String) -> Vec<TaskId> {
        if self.texts.insert(task_id, text).is_none() {
            self.order.push_back(task_id);
        }

        let mut evicted = Vec::new();
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.texts.remove(&oldest);
                evicted.push(oldest);
            }
        }
        evicted
    }

    /// Document text for a task, if still retained
    pub fn get(&self, task_id: &TaskId) -> Option<&str> {
        self.texts.get(task_id).map(String::as_str)
    }

    /// Number of retained documents
    pub fn len(&self) -> usize {
        self.texts.len()
    }

    /// Whether no documents are retained
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Maximum number of retained documents
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DOCUMENTS)
    }
}
