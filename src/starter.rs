use crate::error::BoxError;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Opaque instance handle returned by a successful [`Starter::start`].
///
/// The loader passes it to the setting's `on_started` hook and then drops
/// it; starters keep their own state behind `&self`.
pub type StarterHandle = Box<dyn Any + Send + Sync>;

/// Post-start hook invoked with the live instance handle, for setup that
/// needs the concrete instance (downcast via [`std::any::Any`]).
pub type OnStarted = Arc<dyn Fn(&StarterHandle) + Send + Sync>;

/// Lifecycle contract implemented by every managed component.
///
/// `start` is called at most once per generation; `stop` must make a best
/// effort to honor `max_wait`, though the loader enforces the deadline
/// independently as a backstop.
#[async_trait]
pub trait Starter: Send + Sync {
    /// Per-component policy. Side-effect free, callable before or after
    /// start, and stable for the component's lifetime.
    fn setting(&self) -> Setting;

    /// Perform the component's own startup. May block.
    async fn start(&self) -> Result<StarterHandle, BoxError>;

    /// Attempt shutdown within `max_wait`.
    async fn stop(&self, max_wait: Duration) -> StopOutcome;
}

/// Outcome of a single stop attempt as reported by the component itself.
///
/// `stopped` and `error` are deliberately orthogonal: a component can have
/// released its resources (`stopped == true`) and still report an error,
/// e.g. when it missed its graceful deadline and was torn down forcibly.
#[derive(Debug)]
pub struct StopOutcome {
    pub gracefully: bool,
    pub stopped: bool,
    pub error: Option<BoxError>,
}

impl StopOutcome {
    /// A clean, confirmed shutdown.
    pub fn graceful() -> Self {
        Self {
            gracefully: true,
            stopped: true,
            error: None,
        }
    }

    /// A forced teardown: resources presumed released, but not cleanly.
    pub fn forced(error: Option<BoxError>) -> Self {
        Self {
            gracefully: false,
            stopped: true,
            error,
        }
    }

    /// A failed stop: the component is still holding its resources.
    pub fn failed<E: Into<BoxError>>(error: E) -> Self {
        Self {
            gracefully: false,
            stopped: false,
            error: Some(error.into()),
        }
    }
}

/// Immutable per-component policy value describing how the loader should
/// treat one starter.
#[derive(Clone)]
pub struct Setting {
    name: String,
    weight: i32,
    graceful: bool,
    timeout: Duration,
    on_started: Option<OnStarted>,
}

impl Setting {
    /// Create a setting. `name` may be empty; anonymous starters are only
    /// reachable through bulk operations.
    pub fn new<S: Into<String>>(name: S, weight: i32, graceful: bool, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            weight,
            graceful,
            timeout,
            on_started: None,
        }
    }

    /// Attach a post-start hook receiving the instance handle returned by
    /// [`Starter::start`].
    pub fn with_on_started<F>(mut self, hook: F) -> Self
    where
        F: Fn(&StarterHandle) + Send + Sync + 'static,
    {
        self.on_started = Some(Arc::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordering key for settings-driven shutdown: lower weights stop first.
    pub fn weight(&self) -> i32 {
        self.weight
    }

    /// Whether an orderly stop is preferred before a timeout is treated as
    /// a forced teardown.
    pub fn graceful(&self) -> bool {
        self.graceful
    }

    /// Default stop budget used when the caller supplies no override.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn on_started(&self) -> Option<&OnStarted> {
        self.on_started.as_ref()
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name)
            .field("weight", &self.weight)
            .field("graceful", &self.graceful)
            .field("timeout", &self.timeout)
            .field("on_started", &self.on_started.is_some())
            .finish()
    }
}
