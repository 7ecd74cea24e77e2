use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::{Id, JoinError, JoinSet};

/// A set of labelled tokio tasks of which at most `max_parallelism` run at
/// once.
///
/// Every task is spawned immediately on a [JoinSet] but waits for a semaphore
/// permit before doing any work, so an estate with thousands of clients does
/// not turn into thousands of concurrent `c_rsh` processes. Each task keeps
/// the label it was spawned with so that a panic can still be attributed to
/// the host or resource it was working on.
pub struct BoundedTaskSet<T> {
    semaphore: Arc<Semaphore>,
    set: JoinSet<T>,
    labels: HashMap<Id, String>,
}

impl<T: Send + 'static> BoundedTaskSet<T> {
    pub fn new(max_parallelism: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max_parallelism.clamp(1, Semaphore::MAX_PERMITS))),
            set: JoinSet::new(),
            labels: HashMap::new(),
        }
    }

    pub fn spawn<F>(&mut self, label: impl Into<String>, task: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let semaphore = Arc::clone(&self.semaphore);
        let handle = self.set.spawn(async move {
            // the semaphore is never closed; hold the permit until done
            let _permit = semaphore.acquire_owned().await.ok();
            task.await
        });
        self.labels.insert(handle.id(), label.into());
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    /// Wait for every task and hand back each outcome with its label, in
    /// completion order.
    pub async fn join_all(mut self) -> Vec<(String, Result<T, JoinError>)> {
        let mut outcomes = Vec::with_capacity(self.set.len());
        while let Some(joined) = self.set.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, value)) => (id, Ok(value)),
                Err(e) => (e.id(), Err(e)),
            };
            let label = self.labels.remove(&id).unwrap_or_default();
            outcomes.push((label, outcome));
        }
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_parallelism_is_bounded() {
        let running = Arc::new(AtomicUsize::new(0));
        let limit = 4;
        let mut set = BoundedTaskSet::new(limit);

        for i in 0..limit * 8 {
            let running = running.clone();
            set.spawn(format!("task{i}"), async move {
                let watermark = running.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(Duration::from_millis((i % 5) as u64)).await;
                running.fetch_sub(1, Ordering::SeqCst);
                watermark
            });
        }
        assert_eq!(set.len(), limit * 8);

        let outcomes = set.join_all().await;
        assert_eq!(outcomes.len(), limit * 8);
        for (label, watermark) in outcomes {
            let watermark = watermark.unwrap();
            assert!(watermark <= limit, "{label} saw {watermark} concurrent tasks");
        }
    }

    #[tokio::test]
    async fn test_oversized_limit_still_runs_tasks() {
        let mut set = BoundedTaskSet::new(usize::MAX);
        set.spawn("only", async { 7 });

        let outcomes = set.join_all().await;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(*outcomes[0].1.as_ref().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_panic_keeps_its_label() {
        let mut set: BoundedTaskSet<i32> = BoundedTaskSet::new(2);
        set.spawn("good", async { 1 });
        set.spawn("bad", async { panic!("boom") });

        let mut outcomes = set.join_all().await;
        outcomes.sort_by(|a, b| a.0.cmp(&b.0));

        assert_eq!(outcomes[0].0, "bad");
        assert!(outcomes[0].1.as_ref().unwrap_err().is_panic());
        assert_eq!(outcomes[1].0, "good");
        assert_eq!(*outcomes[1].1.as_ref().unwrap(), 1);
    }
}
