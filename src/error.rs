use std::collections::TryReserveError;

use thiserror::Error;

use crate::{GroupId, Level, RecordId};

/// Crate result, `Error` by default
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong inside the index.
///
/// Expected misses (`RecordNotFound`, `EmptyRange`, ...) are kept apart from
/// `Allocation`, which is the only hard failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("record {0} not found")]
    RecordNotFound(RecordId),

    #[error("level {0} not found")]
    LevelNotFound(Level),

    #[error("group {0} not found")]
    GroupNotFound(GroupId),

    #[error("record {0} already exists")]
    AlreadyExists(RecordId),

    #[error("asked for top {requested} records, only {available} present")]
    NotEnoughRecords { requested: usize, available: usize },

    #[error("no records in the requested level range")]
    EmptyRange,

    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

/// Status reported at the library boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    Failure,
    InvalidInput,
    AllocationError,
}

impl Error {
    /// Translate into the boundary status code
    pub fn status(&self) -> StatusCode {
        match self {
            Error::InvalidInput(_) => StatusCode::InvalidInput,
            Error::Allocation(_) => StatusCode::AllocationError,
            Error::RecordNotFound(_)
            | Error::LevelNotFound(_)
            | Error::GroupNotFound(_)
            | Error::AlreadyExists(_)
            | Error::NotEnoughRecords { .. }
            | Error::EmptyRange => StatusCode::Failure,
        }
    }
}

impl<T> From<&Result<T>> for StatusCode {
    fn from(result: &Result<T>) -> Self {
        match result {
            Ok(_) => StatusCode::Success,
            Err(e) => e.status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::InvalidInput("score").status(),
            StatusCode::InvalidInput
        );
        assert_eq!(Error::RecordNotFound(3).status(), StatusCode::Failure);
        assert_eq!(Error::AlreadyExists(3).status(), StatusCode::Failure);
        assert_eq!(Error::EmptyRange.status(), StatusCode::Failure);
        assert_eq!(
            Error::NotEnoughRecords {
                requested: 4,
                available: 1
            }
            .status(),
            StatusCode::Failure
        );

        let err = Vec::<u64>::new().try_reserve(usize::MAX).unwrap_err();
        assert_eq!(Error::from(err).status(), StatusCode::AllocationError);
    }

    #[test]
    fn test_status_from_result() {
        let ok: Result<u32> = Ok(1);
        assert_eq!(StatusCode::from(&ok), StatusCode::Success);

        let err: Result<u32> = Err(Error::GroupNotFound(9));
        assert_eq!(StatusCode::from(&err), StatusCode::Failure);
    }
}
