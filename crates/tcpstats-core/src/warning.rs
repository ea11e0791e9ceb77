//! Reporting of recoverable parse problems.
//!
//! The parser never stops on a bad row or a bad filter token. It hands a
//! [`Warning`] to whatever [`WarningSink`] it was built with and moves on.

use std::sync::{Mutex, PoisonError};

use crate::error::{FilterTokenError, LineFormatError};

/// A recoverable problem found while building a filter or reading a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A port filter token was discarded.
    FilterToken(FilterTokenError),
    /// A table row was skipped. `line` is 1-based and counts the header.
    Line { line: usize, error: LineFormatError },
}

/// Capability to log a warning with structured fields.
pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: &Warning);
}

impl<T: WarningSink + ?Sized> WarningSink for &T {
    fn warn(&self, warning: &Warning) {
        (**self).warn(warning);
    }
}

/// Forwards warnings to `tracing` at WARN level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn warn(&self, warning: &Warning) {
        match warning {
            Warning::FilterToken(err) => {
                tracing::warn!(port = %err.token, error = %err.source, "Error parsing port filter");
            }
            Warning::Line { line, error } => {
                tracing::warn!(line, input = %error.input(), error = %error, "Skipping malformed row");
            }
        }
    }
}

/// Discards every warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

impl WarningSink for NopSink {
    fn warn(&self, _warning: &Warning) {}
}

/// Keeps every warning in memory.
#[derive(Debug, Default)]
pub struct CollectingSink {
    warnings: Mutex<Vec<Warning>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the warnings recorded so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl WarningSink for CollectingSink {
    fn warn(&self, warning: &Warning) {
        self.warnings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(warning.clone());
    }
}
