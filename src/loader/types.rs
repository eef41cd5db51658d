use crate::error::LoaderError;
use crate::starter::StopOutcome;
use serde::{Serialize, Serializer};

/// Lifecycle state of one registered starter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StarterState {
    Unstarted,
    Running,
    Stopped,
}

/// Result of one stop attempt, one per starter per stop operation.
///
/// `stopped` records whether the loader considers the component's
/// resources released; `error` records whether anything went wrong along
/// the way. The two are orthogonal: a timed-out starter is reported as
/// `stopped: true` with a timeout error (best-effort release assumed,
/// anomaly kept visible).
#[derive(Debug, Serialize)]
pub struct StopResult {
    /// Setting name, or `#<index>` for anonymous starters.
    pub name: String,
    pub gracefully: bool,
    pub stopped: bool,
    #[serde(serialize_with = "error_as_string")]
    pub error: Option<LoaderError>,
}

impl StopResult {
    pub(super) fn from_outcome(name: String, outcome: StopOutcome) -> Self {
        let error = outcome
            .error
            .map(|source| LoaderError::stop(name.clone(), source));
        Self {
            name,
            gracefully: outcome.gracefully,
            stopped: outcome.stopped,
            error,
        }
    }
}

fn error_as_string<S>(error: &Option<LoaderError>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}
