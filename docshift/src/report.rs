//! Line-oriented progress output.
//!
//! Progress lines are informational and are not meant to be parsed. They are
//! kept apart from diagnostic logging, which goes through the `log` facade.

use crate::common::{atomic, Atomic, ReadExecutor, WriteExecutor};
use std::sync::Arc;

/// Receives one progress line at a time.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, line: &str);
}

/// Prints progress lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutReporter;

impl ProgressReporter for StdoutReporter {
    fn report(&self, line: &str) {
        println!("{}", line);
    }
}

/// Collects progress lines in memory.
#[derive(Clone, Default)]
pub struct MemoryReporter {
    lines: Atomic<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        MemoryReporter {
            lines: atomic(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.read_with(|lines| lines.clone())
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .read_with(|lines| lines.iter().any(|line| line.contains(needle)))
    }

    pub fn clear(&self) {
        self.lines.write_with(|lines| lines.clear());
    }
}

impl ProgressReporter for MemoryReporter {
    fn report(&self, line: &str) {
        self.lines.write_with(|lines| lines.push(line.to_string()));
    }
}

impl<T: ProgressReporter + ?Sized> ProgressReporter for Arc<T> {
    fn report(&self, line: &str) {
        (**self).report(line)
    }
}
