//! Job queue (`spec.md` §4.5, C7). A contract, not a specific technology:
//! `push`, `scan`, `remove` over an insertion-ordered list of job ids. The
//! reference implementation backs it with a volatile in-memory list; see
//! DESIGN.md for why it is paired with an equally volatile job table
//! (`spec.md` §9: "Pair the job queue's durability with the session store's
//! — either both durable or both volatile.").

use tokio::sync::Mutex;

pub struct JobQueue {
    ids: Mutex<Vec<u64>>,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        Self {
            ids: Mutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, id: u64) {
        self.ids.lock().await.push(id);
    }

    /// Returns ids in insertion order. The processor does not rely on FIFO
    /// semantics beyond this — it shuffles anyway (`spec.md` §4.5).
    pub async fn scan(&self) -> Vec<u64> {
        self.ids.lock().await.clone()
    }

    pub async fn remove(&self, id: u64) {
        self.ids.lock().await.retain(|existing| *existing != id);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn preserves_insertion_order_until_removed() {
        let queue = JobQueue::new();
        queue.push(1).await;
        queue.push(2).await;
        queue.push(3).await;
        assert_eq!(queue.scan().await, vec![1, 2, 3]);
        queue.remove(2).await;
        assert_eq!(queue.scan().await, vec![1, 3]);
    }
}
