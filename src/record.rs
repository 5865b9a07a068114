/// Record identifier, unique across the whole index
pub type RecordId = u64;

/// Group identifier as seen by callers, `1..=groups`
pub type GroupId = usize;

/// Key of the augmented tree
pub type Level = u64;

/// Score, always in `[0, scale)`
pub type Score = usize;

/// The baseline level every record starts at. Its tree node is never removed.
pub const SENTINEL_LEVEL: Level = 0;

/// A single indexed record (a player).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Record {
    pub id: RecordId,
    pub group: GroupId,
    pub score: Score,
    pub level: Level,
}

impl Record {
    /// Create a record at the sentinel level
    pub fn new(id: RecordId, group: GroupId, score: Score) -> Self {
        Self {
            id,
            group,
            score,
            level: SENTINEL_LEVEL,
        }
    }

    /// Same record moved to `level`
    pub fn with_level(self, level: Level) -> Self {
        Self { level, ..self }
    }

    /// Same record with `score`
    pub fn with_score(self, score: Score) -> Self {
        Self { score, ..self }
    }
}
