use crate::loader::StopResult;
use std::time::Duration;
use thiserror::Error;

/// Opaque error reported by a managed component's own lifecycle code.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("starter '{name}' failed to start: {source}")]
    Start {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("starter '{name}' failed to stop: {source}")]
    Stop {
        name: String,
        #[source]
        source: BoxError,
    },

    /// The coordinator's own deadline fired before the starter confirmed
    /// its shutdown. Distinct from a starter-reported stop failure.
    #[error("starter '{name}' did not confirm stop within {timeout:?}")]
    StopTimeout { name: String, timeout: Duration },

    #[error("start task for starter '{name}' panicked")]
    StartPanicked { name: String },

    #[error("stop task for starter '{name}' panicked")]
    StopPanicked { name: String },

    #[error("all starters are already running")]
    AlreadyStarted,

    #[error("no starter registered with name '{0}'")]
    StarterNotFound(String),

    #[error("multiple starters registered with name '{0}'")]
    AmbiguousStarterName(String),

    #[error("{} starter(s) failed to start: {}", .failures.len(), failed_start_names(.failures))]
    StartFailed { failures: Vec<LoaderError> },

    /// At least one stop result carries an error. The full result list is
    /// kept here so partial successes are not lost to the caller.
    #[error("starters failed to stop: {}", failed_stop_names(.results))]
    StopFailed { results: Vec<StopResult> },
}

impl LoaderError {
    pub fn start<S: Into<String>, E: Into<BoxError>>(name: S, source: E) -> Self {
        Self::Start {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn stop<S: Into<String>, E: Into<BoxError>>(name: S, source: E) -> Self {
        Self::Stop {
            name: name.into(),
            source: source.into(),
        }
    }

    /// Name of the starter this error concerns, when there is one.
    pub fn starter_name(&self) -> Option<&str> {
        match self {
            Self::Start { name, .. }
            | Self::Stop { name, .. }
            | Self::StopTimeout { name, .. }
            | Self::StartPanicked { name }
            | Self::StopPanicked { name } => Some(name),
            Self::StarterNotFound(name) | Self::AmbiguousStarterName(name) => Some(name),
            _ => None,
        }
    }

    /// Whether this is a coordinator-detected deadline miss rather than a
    /// failure the starter reported itself.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StopTimeout { .. })
    }
}

fn failed_start_names(failures: &[LoaderError]) -> String {
    failures
        .iter()
        .map(|e| e.starter_name().unwrap_or("?"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn failed_stop_names(results: &[StopResult]) -> String {
    results
        .iter()
        .filter(|r| r.error.is_some())
        .map(|r| r.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, LoaderError>;
