//! pt-feed
//!
//! The bar source: turns a durable CSV record into a finite, strictly
//! time-ordered bar sequence and replays it to the two downstream
//! consumers (execution simulator and strategy port).
//!
//! Recovery policy: one malformed row is skipped with a warning — a
//! single bad historical row must not void an entire backtest. An
//! unreadable source or a broken header aborts the replay instead.

mod csv;
mod replay;

pub use csv::{load_csv_file, parse_csv_bars};
pub use replay::BarSource;

use std::fmt;

/// Source-level (fatal) feed errors. Row-level problems never surface
/// here; they are skipped during parsing.
#[derive(Debug)]
pub enum FeedError {
    /// The underlying record could not be read at all.
    Io(std::io::Error),
    /// The header row is missing or does not match the bar contract.
    BadHeader(String),
    /// The record is empty (not even a header row).
    Empty,
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::Io(e) => write!(f, "bar record unreadable: {e}"),
            FeedError::BadHeader(h) => write!(f, "bad bar record header: '{h}'"),
            FeedError::Empty => write!(f, "bar record is empty"),
        }
    }
}

impl std::error::Error for FeedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FeedError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for FeedError {
    fn from(e: std::io::Error) -> Self {
        FeedError::Io(e)
    }
}
