use crate::types::{ChapterId, MonthId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A downstream renderer failed. Kept separate from aggregation
    /// failures: a report that aggregated cleanly is still a good report
    /// even if one output format could not be produced.
    #[error("renderer '{renderer}' failed: {detail}")]
    Render { renderer: String, detail: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Structured input rejection: which rule broke, and on which entity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no snapshots supplied")]
    NoSnapshots,

    #[error("no months selected")]
    NoMonthsSelected,

    #[error("snapshot for {month} belongs to chapter '{found}', expected '{expected}'")]
    ChapterMismatch {
        expected: ChapterId,
        found: ChapterId,
        month: MonthId,
    },

    #[error("more than one snapshot supplied for {month}")]
    DuplicateMonth { month: MonthId },

    #[error("selected month {month} has no snapshot")]
    MissingMonth { month: MonthId },

    #[error("snapshot for {month} is malformed: {detail}")]
    MalformedSnapshot { month: MonthId, detail: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
