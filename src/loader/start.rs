use super::types::StarterState;
use super::StarterLoader;
use crate::error::{BoxError, LoaderError, Result};
use std::sync::Arc;
use tracing::{debug, error, info};

impl StarterLoader {
    /// Start every registered starter that is not already running.
    ///
    /// All starts run concurrently; each starter may block independently
    /// and the call returns only once every one of them has succeeded or
    /// failed. On success the setting's `on_started` hook (if any) runs
    /// with the returned instance handle before the starter is recorded
    /// as running.
    ///
    /// Starters already running are skipped, so a starter's `start` is
    /// never invoked twice within a generation; previously stopped
    /// starters are started again. If every starter was already running
    /// the call fails with [`LoaderError::AlreadyStarted`].
    ///
    /// Failures are isolated per starter: one failed start never aborts
    /// the others. When at least one failed, the call returns
    /// [`LoaderError::StartFailed`] listing the failures, while the
    /// successful starters remain running.
    pub async fn start(&self) -> Result<()> {
        if self.starters.is_empty() {
            return Ok(());
        }

        let mut tasks = Vec::with_capacity(self.starters.len());
        for (index, starter) in self.starters.iter().enumerate() {
            let label = self.registry.label(index);
            if self.registry.state(index) == StarterState::Running {
                debug!("Starter '{}' already running, skipping", label);
                continue;
            }

            let starter = Arc::clone(starter);
            let task = tokio::spawn(async move {
                let setting = starter.setting();
                let handle = starter.start().await?;
                if let Some(hook) = setting.on_started() {
                    hook(&handle);
                }
                Ok::<_, BoxError>(())
            });
            tasks.push((index, label, task));
        }

        if tasks.is_empty() {
            return Err(LoaderError::AlreadyStarted);
        }

        let mut failures = Vec::new();
        for (index, label, task) in tasks {
            match task.await {
                Ok(Ok(())) => {
                    self.registry.set_state(index, StarterState::Running);
                    info!("Starter '{}' running", label);
                }
                Ok(Err(source)) => {
                    error!("Starter '{}' failed to start: {}", label, source);
                    failures.push(LoaderError::start(label, source));
                }
                Err(_) => {
                    error!("Start task for starter '{}' panicked", label);
                    failures.push(LoaderError::StartPanicked { name: label });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LoaderError::StartFailed { failures })
        }
    }
}
