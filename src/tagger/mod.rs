use thiserror::Error;

pub mod matcher;
pub mod report;
pub mod row_tagger;
pub mod rules;
pub mod splitter;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum TaggerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("data file has no header row")]
    MissingHeader,

    #[error("worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of one tagging run: rows seen and one match count per rule, in
/// rule-set order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSummary {
    pub rows_processed: usize,
    pub counts: Vec<u64>,
}
