use std::sync::atomic::{AtomicU64, Ordering};

use crate::scheduler::job::ServerId;

/// Round-robin owner selection for newly admitted jobs.
///
/// Independent of the scheduling policy: the n-th call always yields server
/// `(n mod server_count) + 1`.
#[derive(Debug)]
pub struct OwnerAssigner {
    cursor: AtomicU64,
    server_count: u64,
}

impl OwnerAssigner {
    pub fn new(server_count: u64) -> Self {
        Self {
            cursor: AtomicU64::new(0),
            server_count: server_count.max(1),
        }
    }

    /// Pick the owner for the next admitted job and advance the cursor.
    pub fn assign_owner(&self) -> ServerId {
        let cursor = self.cursor.fetch_add(1, Ordering::Relaxed);
        (cursor % self.server_count) + 1
    }

    pub fn server_count(&self) -> u64 {
        self.server_count
    }
}
