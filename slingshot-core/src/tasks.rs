//! Keyed background tasks and timers
//!
//! Tasks report back to the main loop by sending a message over a channel;
//! they never touch the store. Starting a task under a key that is already
//! running cancels the old one, which is what a restartable timeout needs.
//!
//! # Example
//!
//! ```ignore
//! use slingshot::tasks::TaskManager;
//! use std::time::Duration;
//!
//! let (action_tx, mut action_rx) = tokio::sync::mpsc::unbounded_channel();
//! let mut tasks = TaskManager::new(action_tx);
//!
//! // Close the snackbar in 3 s; calling this again restarts the countdown
//! tasks.after("snackbar", Duration::from_millis(3000), AppAction::CloseSnackbar);
//!
//! // Cancel everything on shutdown
//! tasks.cancel_all();
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

/// Identifies a task for cancellation and replacement.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TaskKey(String);

impl TaskKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for TaskKey {
    fn from(s: &'static str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Manages keyed tokio tasks that report with a message of type `M`
///
/// Dropping the manager aborts every task it still owns.
pub struct TaskManager<M> {
    tasks: HashMap<TaskKey, AbortHandle>,
    tx: mpsc::UnboundedSender<M>,
}

impl<M> TaskManager<M>
where
    M: Send + 'static,
{
    /// Create a manager whose tasks report on `tx`
    pub fn new(tx: mpsc::UnboundedSender<M>) -> Self {
        Self {
            tasks: HashMap::new(),
            tx,
        }
    }

    /// Spawn a task, cancelling any existing task with the same key.
    ///
    /// The future's output is sent on the channel when it completes. A
    /// cancelled task sends nothing.
    pub fn spawn<F>(&mut self, key: impl Into<TaskKey>, future: F) -> &mut Self
    where
        F: Future<Output = M> + Send + 'static,
    {
        let key = key.into();
        self.cancel(&key);

        let tx = self.tx.clone();
        let task_name = key.name().to_string();
        let handle = tokio::spawn(async move {
            let message = future.await;
            if tx.send(message).is_err() {
                tracing::debug!(task = %task_name, "task finished after receiver closed");
            }
        });

        self.tasks.insert(key, handle.abort_handle());
        self
    }

    /// Send `message` after `delay`, restarting the countdown if `key` is
    /// already pending.
    pub fn after(&mut self, key: impl Into<TaskKey>, delay: Duration, message: M) -> &mut Self {
        self.spawn(key, async move {
            tokio::time::sleep(delay).await;
            message
        })
    }

    /// Cancel a task by key; unknown keys are a no-op.
    pub fn cancel(&mut self, key: &TaskKey) {
        if let Some(handle) = self.tasks.remove(key) {
            handle.abort();
        }
    }

    /// Cancel all tasks.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }

    /// Whether a task under `key` has been started and has not finished
    pub fn is_running(&self, key: &TaskKey) -> bool {
        self.tasks
            .get(key)
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Number of tracked tasks, finished or not
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<M> Drop for TaskManager<M> {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_key() {
        let k1 = TaskKey::new("snackbar");
        let k2 = TaskKey::from("snackbar");
        let k3: TaskKey = String::from("snackbar").into();

        assert_eq!(k1, k2);
        assert_eq!(k2, k3);
        assert_eq!(k1.name(), "snackbar");
    }

    #[tokio::test]
    async fn test_spawn_sends_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.spawn("probe", async { 42 });

        assert_eq!(rx.recv().await, Some(42));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_waits_for_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.after("snackbar", Duration::from_millis(3000), "close");
        assert!(tasks.is_running(&TaskKey::new("snackbar")));

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(rx.recv().await, Some("close"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_restarts_countdown() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.after("snackbar", Duration::from_millis(3000), 1);
        tokio::time::sleep(Duration::from_millis(2000)).await;
        tasks.after("snackbar", Duration::from_millis(3000), 2);

        tokio::time::sleep(Duration::from_millis(2000)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(rx.recv().await, Some(2));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.after("snackbar", Duration::from_millis(100), 1);
        tasks.cancel(&TaskKey::new("snackbar"));
        tasks.cancel(&TaskKey::new("unknown"));

        assert!(!tasks.is_running(&TaskKey::new("snackbar")));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_all() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut tasks = TaskManager::new(tx);

        tasks.after("a", Duration::from_secs(10), 1);
        tasks.after("b", Duration::from_secs(10), 2);
        assert_eq!(tasks.len(), 2);

        tasks.cancel_all();

        assert!(tasks.is_empty());
    }
}
