//! Causal-chain storage for application errors.
//!
//! A chain is an owned sequence of frames, innermost first. Each frame
//! records the message supplied at one wrap step, optionally the foreign
//! failure that step wrapped, and a backtrace captured at that moment.
//! Root/immediate traversal and stack rendering are sequence operations over
//! the frames; nothing here allocates global state or can fail.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt;

/// Boxed foreign failure carried inside a chain frame.
pub type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Placeholder returned by stack rendering when no capture exists.
pub const NO_STACK_TRACE: &str = "no stack trace available";

/// One link in a causal chain: a wrap message, the failure it wrapped (if
/// any), and the backtrace captured when the link was created.
#[derive(Debug)]
pub struct CauseFrame {
    message: String,
    source: Option<BoxError>,
    backtrace: Backtrace,
}

impl CauseFrame {
    fn new(message: String, source: Option<BoxError>) -> Self {
        Self {
            message,
            source,
            backtrace: Backtrace::capture(),
        }
    }

    /// The message recorded at this wrap step.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The foreign failure this frame wrapped, if any. Only the innermost
    /// frame of a chain carries one.
    pub fn wrapped(&self) -> Option<&(dyn Error + 'static)> {
        match &self.source {
            Some(source) => Some(&**source),
            None => None,
        }
    }
}

impl fmt::Display for CauseFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for CauseFrame {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.wrapped()
    }
}

/// Ordered causal chain accumulated through successive wraps.
///
/// Innermost frame first: `frames[0]` is the oldest wrap step (the one that
/// captured the original failure, when there was one), the last frame is the
/// newest. An empty chain is only reachable through deserialization or
/// `Default`; every constructor on [`crate::AppError`] produces at least one
/// frame.
#[derive(Debug, Default)]
pub struct CauseChain {
    frames: Vec<CauseFrame>,
}

impl CauseChain {
    /// Starts a chain with a single frame and a fresh backtrace, no deeper
    /// failure. Used by fresh constructions.
    pub fn capture(message: impl Into<String>) -> Self {
        Self {
            frames: vec![CauseFrame::new(message.into(), None)],
        }
    }

    /// Starts a chain whose innermost frame wraps a foreign failure.
    pub fn wrapping(source: BoxError, message: impl Into<String>) -> Self {
        Self {
            frames: vec![CauseFrame::new(message.into(), Some(source))],
        }
    }

    /// Appends one wrap step to the chain.
    pub fn push(&mut self, message: impl Into<String>) {
        self.frames.push(CauseFrame::new(message.into(), None));
    }

    /// Number of wrap steps recorded.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// The recorded frames, innermost first.
    pub fn frames(&self) -> &[CauseFrame] {
        &self.frames
    }

    /// One link up the chain from the newest wrap step.
    ///
    /// With two or more frames this is the previous wrap step (itself still
    /// carrying everything beneath it); with a single frame it is the
    /// foreign failure that frame wrapped, or nothing for a fresh
    /// construction.
    pub fn immediate(&self) -> Option<&(dyn Error + 'static)> {
        match self.frames.len() {
            0 => None,
            1 => self.frames[0].wrapped(),
            n => Some(&self.frames[n - 2]),
        }
    }

    /// The deepest failure in the chain.
    ///
    /// Walks the innermost frame's wrapped failure to the end of its own
    /// `source()` links. A chain with no wrapped failure roots at its
    /// innermost frame.
    pub fn root(&self) -> Option<&(dyn Error + 'static)> {
        let innermost = self.frames.first()?;
        match innermost.wrapped() {
            Some(err) => {
                let mut current = err;
                while let Some(next) = current.source() {
                    current = next;
                }
                Some(current)
            }
            None => Some(innermost),
        }
    }

    /// Renders the chain for diagnostics: wrap messages newest-first, each
    /// followed by its captured backtrace, and the wrapped failure's own
    /// `source()` links at the end. Returns [`NO_STACK_TRACE`] for an empty
    /// chain; never fails.
    pub fn render(&self) -> String {
        if self.frames.is_empty() {
            return NO_STACK_TRACE.to_string();
        }

        let mut out = String::new();
        for frame in self.frames.iter().rev() {
            out.push_str(&frame.message);
            out.push('\n');
            if frame.backtrace.status() == BacktraceStatus::Captured {
                out.push_str(&frame.backtrace.to_string());
                out.push('\n');
            }
        }
        if let Some(err) = self.frames[0].wrapped() {
            let mut current: Option<&(dyn Error + 'static)> = Some(err);
            while let Some(e) = current {
                out.push_str("caused by: ");
                out.push_str(&e.to_string());
                out.push('\n');
                current = e.source();
            }
        }
        out
    }

    /// [`render`](Self::render) split into cleaned lines: tabs and carriage
    /// returns stripped, surrounding whitespace trimmed, blank lines
    /// dropped.
    pub fn render_lines(&self) -> Vec<String> {
        self.render()
            .lines()
            .map(|line| line.replace(['\t', '\r'], "").trim().to_string())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk failure")]
    struct DiskFailure;

    #[derive(Debug, thiserror::Error)]
    #[error("query failed")]
    struct QueryFailed(#[source] DiskFailure);

    #[test]
    fn test_capture_starts_single_frame() {
        let chain = CauseChain::capture("boom");
        assert_eq!(chain.len(), 1);
        assert!(chain.immediate().is_none());
        assert_eq!(chain.root().unwrap().to_string(), "boom");
    }

    #[test]
    fn test_wrapping_exposes_source() {
        let chain = CauseChain::wrapping(Box::new(DiskFailure), "save failed");
        assert_eq!(chain.immediate().unwrap().to_string(), "disk failure");
        assert_eq!(chain.root().unwrap().to_string(), "disk failure");
    }

    #[test]
    fn test_root_walks_nested_sources() {
        let chain = CauseChain::wrapping(Box::new(QueryFailed(DiskFailure)), "load failed");
        // Immediate stops one link up; root keeps walking.
        assert_eq!(chain.immediate().unwrap().to_string(), "query failed");
        assert_eq!(chain.root().unwrap().to_string(), "disk failure");
    }

    #[test]
    fn test_immediate_after_second_wrap_is_previous_step() {
        let mut chain = CauseChain::wrapping(Box::new(DiskFailure), "wrap A");
        chain.push("wrap B");

        let immediate = chain.immediate().unwrap();
        assert_eq!(immediate.to_string(), "wrap A");
        // The previous step still reaches the original underneath it.
        assert_eq!(immediate.source().unwrap().to_string(), "disk failure");
        assert_eq!(chain.root().unwrap().to_string(), "disk failure");
    }

    #[test]
    fn test_render_contains_messages_newest_first() {
        let mut chain = CauseChain::wrapping(Box::new(DiskFailure), "wrap A");
        chain.push("wrap B");

        let lines = chain.render_lines();
        assert!(!lines.is_empty());
        assert_eq!(lines[0], "wrap B");
        assert!(lines.iter().any(|l| l == "wrap A"));
        assert!(lines.iter().any(|l| l.contains("disk failure")));
    }

    #[test]
    fn test_render_empty_chain_is_placeholder() {
        let chain = CauseChain::default();
        assert_eq!(chain.render(), NO_STACK_TRACE);
        assert_eq!(chain.render_lines(), vec![NO_STACK_TRACE.to_string()]);
    }

    #[test]
    fn test_render_lines_are_cleaned() {
        let chain = CauseChain::capture("  padded message\t");
        let lines = chain.render_lines();
        assert!(lines.iter().all(|l| !l.is_empty()));
        assert!(lines.iter().all(|l| !l.contains('\t') && !l.contains('\r')));
        assert_eq!(lines[0], "padded message");
    }
}
