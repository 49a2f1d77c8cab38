//! Fatal-failure reporting

use std::sync::{Mutex, PoisonError};

use tracing::warn;

/// Capability to fail the enclosing test.
///
/// The validator calls [`fatal`](Self::fatal) once per failed assertion and
/// then moves on to the next case. A reporter that halts (panics) stops the
/// exchange there; one that returns lets every failure surface.
pub trait Reporter: Send + Sync {
    /// Report an assertion failure
    fn fatal(&self, message: &str);
}

/// Fails the test by panicking, the way `assert!` does
#[derive(Debug, Clone, Copy, Default)]
pub struct PanicReporter;

impl Reporter for PanicReporter {
    fn fatal(&self, message: &str) {
        panic!("{message}");
    }
}

/// Records failures without halting
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<String>>,
}

impl CollectingReporter {
    /// Create a reporter with no failures
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, oldest first
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether nothing has been reported
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}

impl Reporter for CollectingReporter {
    fn fatal(&self, message: &str) {
        warn!("Assertion failed: {}", message);
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
    }
}
