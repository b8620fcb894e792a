//! Shared diagnostic reporting for both orchestrators.
//!
//! Every phase funnels its failures through [`report`], which renders one
//! uniform diagnostic block: the phase label, the message, the cause chain,
//! and the source location when the failure originated in a stylesheet.

use std::error::Error;
use std::fmt::Write;

use crate::error::{CssError, StyleError};

/// Logs a failure under its phase label.
///
/// This is a terminal sink for diagnostics, not a recovery mechanism: it
/// never fails and never panics, regardless of the error handed to it.
pub fn report(phase: &str, error: &(dyn Error + 'static)) {
    tracing::error!("{}", render(phase, error));
}

/// Renders the diagnostic block for a failure.
pub(crate) fn render(phase: &str, error: &(dyn Error + 'static)) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "✗ Error on {phase}:");
    let _ = write!(out, "  Message: {error}");

    let mut cause = error.source();
    while let Some(err) = cause {
        let _ = write!(out, "\n  Caused by: {err}");
        cause = err.source();
    }

    if let Some(style) = find_in_chain::<StyleError>(error) {
        if let Some(path) = style.path() {
            let _ = write!(out, "\n  In: {path}");
        }
    }

    if let Some(css) = find_in_chain::<CssError>(error) {
        if let Some(location) = &css.location {
            let _ = write!(out, "\n  In: {location}");
        }
    }

    out
}

/// Walks the cause chain looking for a concrete error type.
fn find_in_chain<'a, T: Error + 'static>(error: &'a (dyn Error + 'static)) -> Option<&'a T> {
    let mut current = Some(error);

    while let Some(err) = current {
        if let Some(found) = err.downcast_ref::<T>() {
            return Some(found);
        }
        current = err.source();
    }

    None
}
