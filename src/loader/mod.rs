mod start;
mod state;
mod stop;
mod types;


pub use types::{StarterState, StopResult};

use crate::starter::Starter;
use state::StatusRegistry;
use std::sync::Arc;

/// Coordinates the lifecycle of a fixed, ordered set of starters as a
/// single managed unit.
///
/// The starter list is immutable after construction; the internal status
/// registry is the only shared mutable state and is the source of truth
/// for [`StarterLoader::stopped_starters`].
pub struct StarterLoader {
    starters: Vec<Arc<dyn Starter>>,
    registry: StatusRegistry,
}

impl StarterLoader {
    /// Create a loader over a fixed list of starters. Registration order
    /// is preserved and breaks ties in weight-ordered shutdown.
    ///
    /// Anonymous starters (empty setting name) are labeled `#<index>` in
    /// results and queries, and cannot be targeted by
    /// [`StarterLoader::stop_starter`].
    pub fn new(starters: Vec<Arc<dyn Starter>>) -> Self {
        let labels = starters
            .iter()
            .enumerate()
            .map(|(index, starter)| {
                let setting = starter.setting();
                if setting.name().is_empty() {
                    format!("#{index}")
                } else {
                    setting.name().to_string()
                }
            })
            .collect();
        Self {
            starters,
            registry: StatusRegistry::new(labels),
        }
    }

    /// Number of registered starters.
    pub fn len(&self) -> usize {
        self.starters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starters.is_empty()
    }
}
