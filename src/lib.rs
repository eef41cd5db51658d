pub mod error;
pub mod loader;
pub mod starter;

pub use error::{BoxError, LoaderError, Result};
pub use loader::{StarterLoader, StarterState, StopResult};
pub use starter::{OnStarted, Setting, Starter, StarterHandle, StopOutcome};
