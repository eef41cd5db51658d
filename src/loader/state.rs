use super::types::StarterState;
use super::StarterLoader;
use parking_lot::Mutex;
use tracing::debug;

/// Shared record of each starter's lifecycle state, keyed by registration
/// index. Writes are mutually exclusive and never held across an await.
pub(super) struct StatusRegistry {
    entries: Mutex<Vec<RegistryEntry>>,
}

struct RegistryEntry {
    label: String,
    state: StarterState,
}

impl StatusRegistry {
    pub(super) fn new(labels: Vec<String>) -> Self {
        let entries = labels
            .into_iter()
            .map(|label| RegistryEntry {
                label,
                state: StarterState::Unstarted,
            })
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub(super) fn state(&self, index: usize) -> StarterState {
        self.entries.lock()[index].state
    }

    pub(super) fn set_state(&self, index: usize, state: StarterState) {
        let mut entries = self.entries.lock();
        let entry = &mut entries[index];
        entry.state = state;
        debug!("Starter '{}' state changed to: {:?}", entry.label, state);
    }

    pub(super) fn label(&self, index: usize) -> String {
        self.entries.lock()[index].label.clone()
    }

    fn snapshot(&self) -> Vec<(String, StarterState)> {
        self.entries
            .lock()
            .iter()
            .map(|entry| (entry.label.clone(), entry.state))
            .collect()
    }
}

impl StarterLoader {
    /// Labels of all starters currently recorded as stopped, in
    /// registration order.
    ///
    /// Non-blocking snapshot, safe to call concurrently with any start or
    /// stop operation. It never shows a starter as stopped before its
    /// registry entry is committed; a stop that is still in flight may or
    /// may not be included.
    pub fn stopped_starters(&self) -> Vec<String> {
        self.registry
            .snapshot()
            .into_iter()
            .filter(|(_, state)| *state == StarterState::Stopped)
            .map(|(label, _)| label)
            .collect()
    }

    /// Current state of every starter, in registration order.
    pub fn starter_states(&self) -> Vec<(String, StarterState)> {
        self.registry.snapshot()
    }
}
