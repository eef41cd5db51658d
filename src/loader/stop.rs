use super::types::{StarterState, StopResult};
use super::StarterLoader;
use crate::error::{LoaderError, Result};
use crate::starter::Starter;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

impl StarterLoader {
    /// Stop all registered starters concurrently, each raced independently
    /// against the shared `max_wait` budget.
    ///
    /// A starter whose `stop` confirms within the budget contributes its
    /// own reported triple verbatim. A starter that misses the deadline is
    /// recorded as `stopped: true, gracefully: false` with a
    /// [`LoaderError::StopTimeout`] error: its resources are presumed
    /// released and its stop task is left to finish in the background.
    ///
    /// Results come back in registration order. When any result carries an
    /// error the call returns [`LoaderError::StopFailed`], which holds the
    /// full result list so partial successes are preserved.
    pub async fn stop(&self, max_wait: Duration) -> Result<Vec<StopResult>> {
        let mut tasks = Vec::with_capacity(self.starters.len());
        for (index, starter) in self.starters.iter().enumerate() {
            let label = self.registry.label(index);
            let graceful = starter.setting().graceful();
            let starter = Arc::clone(starter);
            tasks.push((
                index,
                tokio::spawn(race_stop(starter, label, graceful, max_wait)),
            ));
        }

        let mut results = Vec::with_capacity(tasks.len());
        for (index, task) in tasks {
            let result = match task.await {
                Ok(result) => result,
                Err(_) => panicked_result(self.registry.label(index)),
            };
            self.commit(index, &result);
            results.push(result);
        }
        collect_results(results)
    }

    /// Stop starters tier by tier in ascending weight order.
    ///
    /// The lowest weight stops first; starters sharing a weight stop
    /// concurrently within their tier, and a tier only begins once the
    /// previous one has fully finished. Within a tier, and in the returned
    /// list, registration order breaks ties.
    ///
    /// Each starter's budget is `override_timeout` when given, otherwise
    /// its own setting's timeout. Timeout and aggregate-error semantics
    /// match [`StarterLoader::stop`]; the setting's `graceful` flag only
    /// decides how loudly a deadline miss is logged, since a non-graceful
    /// starter was always eligible for forced teardown.
    pub async fn stop_by_setting(
        &self,
        override_timeout: Option<Duration>,
    ) -> Result<Vec<StopResult>> {
        let mut tiers: BTreeMap<i32, Vec<usize>> = BTreeMap::new();
        for (index, starter) in self.starters.iter().enumerate() {
            tiers.entry(starter.setting().weight()).or_default().push(index);
        }

        let mut results = Vec::with_capacity(self.starters.len());
        for (weight, tier) in tiers {
            debug!("Stopping weight {} tier ({} starter(s))", weight, tier.len());
            let mut tasks = Vec::with_capacity(tier.len());
            for index in tier {
                let setting = self.starters[index].setting();
                let wait = override_timeout.unwrap_or(setting.timeout());
                let label = self.registry.label(index);
                let starter = Arc::clone(&self.starters[index]);
                tasks.push((
                    index,
                    tokio::spawn(race_stop(starter, label, setting.graceful(), wait)),
                ));
            }
            for (index, task) in tasks {
                let result = match task.await {
                    Ok(result) => result,
                    Err(_) => panicked_result(self.registry.label(index)),
                };
                self.commit(index, &result);
                results.push(result);
            }
        }
        collect_results(results)
    }

    /// Stop the single starter whose setting name equals `name`.
    ///
    /// An empty name never matches: anonymous starters are reachable only
    /// through bulk operations. No match yields
    /// [`LoaderError::StarterNotFound`]; more than one match is a
    /// configuration error reported as
    /// [`LoaderError::AmbiguousStarterName`]. Neither touches the
    /// registry. On a unique match the usual timeout race runs and the
    /// single result is returned, its own error included, so lookup
    /// failures stay distinct from stop failures.
    pub async fn stop_starter(&self, name: &str, max_wait: Duration) -> Result<StopResult> {
        let mut matches = self
            .starters
            .iter()
            .enumerate()
            .filter(|(_, starter)| {
                let setting = starter.setting();
                !setting.name().is_empty() && setting.name() == name
            })
            .map(|(index, _)| index);

        let index = match (matches.next(), matches.next()) {
            (None, _) => return Err(LoaderError::StarterNotFound(name.to_string())),
            (Some(_), Some(_)) => return Err(LoaderError::AmbiguousStarterName(name.to_string())),
            (Some(index), None) => index,
        };

        let starter = Arc::clone(&self.starters[index]);
        let graceful = starter.setting().graceful();
        let label = self.registry.label(index);
        let result = race_stop(starter, label, graceful, max_wait).await;
        self.commit(index, &result);
        Ok(result)
    }

    fn commit(&self, index: usize, result: &StopResult) {
        if result.stopped {
            self.registry.set_state(index, StarterState::Stopped);
        }
    }
}

/// Race one starter's `stop` against a wall-clock deadline.
///
/// The stop runs on its own task; if the timer fires first the task is
/// abandoned to finish in the background and the starter is presumed
/// forcibly torn down. Bounded shutdown latency is traded for a possible
/// background leak.
async fn race_stop(
    starter: Arc<dyn Starter>,
    label: String,
    graceful: bool,
    max_wait: Duration,
) -> StopResult {
    let stop_task = tokio::spawn(async move { starter.stop(max_wait).await });

    match timeout(max_wait, stop_task).await {
        Ok(Ok(outcome)) => {
            let result = StopResult::from_outcome(label, outcome);
            if let Some(error) = &result.error {
                warn!("Starter '{}' stop reported an error: {}", result.name, error);
            } else {
                info!(
                    "Starter '{}' stopped (gracefully: {})",
                    result.name, result.gracefully
                );
            }
            result
        }
        Ok(Err(_)) => {
            error!("Stop task for starter '{}' panicked", label);
            panicked_result(label)
        }
        Err(_) => {
            if graceful {
                warn!(
                    "Starter '{}' missed its {:?} stop budget, assuming forced teardown",
                    label, max_wait
                );
            } else {
                debug!(
                    "Starter '{}' did not confirm within {:?}, forced teardown assumed",
                    label, max_wait
                );
            }
            StopResult {
                name: label.clone(),
                gracefully: false,
                stopped: true,
                error: Some(LoaderError::StopTimeout {
                    name: label,
                    timeout: max_wait,
                }),
            }
        }
    }
}

fn panicked_result(label: String) -> StopResult {
    StopResult {
        name: label.clone(),
        gracefully: false,
        stopped: false,
        error: Some(LoaderError::StopPanicked { name: label }),
    }
}

fn collect_results(results: Vec<StopResult>) -> Result<Vec<StopResult>> {
    if results.iter().any(|r| r.error.is_some()) {
        Err(LoaderError::StopFailed { results })
    } else {
        Ok(results)
    }
}
