use tracing::{debug, warn};

use crate::{
    AugmentedTree, Config, DisjointGroupForest, Error, GroupId, HashRecordStore, Level, Record,
    RecordId, RecordStore, Result, Score,
};

/// Which records a query runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Every record in the index
    All,
    /// The set of groups `id` currently belongs to
    Group(i64),
}

/// The boundary of the index: validates arguments, resolves ids and keeps the
/// global tree, the group forest and the record store in step.
///
/// Every mutation is atomic. When a later step fails the earlier ones are
/// undone before the error is returned.
///
/// # Example
/// ```rust
/// use level_forest::{Config, Manager, Scope};
///
/// let mut manager = Manager::new(Config::new(2, 10)).unwrap();
/// manager.add_record(1, 1, 5).unwrap();
/// manager.add_record(2, 1, 5).unwrap();
/// manager.add_record(3, 2, 9).unwrap();
/// manager.add_record(4, 2, 5).unwrap();
/// manager.increase_level(2, 3).unwrap();
/// manager.increase_level(3, 3).unwrap();
/// manager.increase_level(4, 5).unwrap();
///
/// manager.merge_groups(1, 2).unwrap();
///
/// let avg = manager.average_level_of_top(Scope::Group(1), 3).unwrap();
/// assert!((avg - 11. / 3.).abs() < 1e-9);
/// assert_eq!(manager.score_bounds_among_top(Scope::All, 5, 2).unwrap(), (1, 2));
/// ```
#[derive(Debug)]
pub struct Manager<S: RecordStore = HashRecordStore> {
    config: Config,
    forest: DisjointGroupForest,
    all: AugmentedTree,
    store: S,
}

impl Manager<HashRecordStore> {
    pub fn new(config: Config) -> Result<Self> {
        Self::with_store(config, HashRecordStore::new())
    }
}

impl<S: RecordStore> Manager<S> {
    pub fn with_store(config: Config, store: S) -> Result<Self> {
        config.validate()?;
        debug!(groups = config.groups, scale = config.scale, "manager created");

        Ok(Self {
            config,
            forest: DisjointGroupForest::new(config.groups, config.scale),
            all: AugmentedTree::new(config.scale),
            store,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn record(&self, id: i64) -> Option<&Record> {
        let id = record_id(id).ok()?;
        self.store.find(id)
    }

    /// Records in the set `group` belongs to
    pub fn group_len(&mut self, group: i64) -> Result<usize> {
        let group = self.group_id(group)?;
        self.forest.group_len(group)
    }

    fn group_id(&self, id: i64) -> Result<GroupId> {
        match usize::try_from(id) {
            Ok(id) if id >= 1 && id <= self.forest.len() => Ok(id),
            _ => Err(Error::InvalidInput("group id out of range")),
        }
    }

    fn score(&self, score: i64) -> Result<Score> {
        match usize::try_from(score) {
            Ok(score) if score < self.config.scale => Ok(score),
            _ => Err(Error::InvalidInput("score out of range")),
        }
    }

    fn find_record(&self, id: RecordId) -> Result<Record> {
        self.store.find(id).copied().ok_or(Error::RecordNotFound(id))
    }

    fn tree(&mut self, scope: Scope) -> Result<&AugmentedTree> {
        match scope {
            Scope::All => Ok(&self.all),
            Scope::Group(id) => {
                let id = self.group_id(id)?;
                self.forest.tree(id)
            }
        }
    }

    pub fn add_record(&mut self, id: i64, group: i64, score: i64) -> Result<()> {
        let id = record_id(id)?;
        let group = self.group_id(group)?;
        let score = self.score(score)?;
        if self.store.find(id).is_some() {
            return Err(Error::AlreadyExists(id));
        }

        let record = Record::new(id, group, score);
        self.all.insert(&record)?;
        if let Err(e) = self.forest.insert(&record) {
            rollback("all tree insert", self.all.remove(&record));
            return Err(e);
        }
        if let Err(e) = self.store.insert(record) {
            rollback("group insert", self.forest.remove(&record));
            rollback("all tree insert", self.all.remove(&record));
            return Err(e);
        }

        debug!(record = id, group, score, "record added");
        Ok(())
    }

    pub fn remove_record(&mut self, id: i64) -> Result<()> {
        let id = record_id(id)?;
        let record = self.find_record(id)?;

        self.all.remove(&record)?;
        if let Err(e) = self.forest.remove(&record) {
            rollback("all tree remove", self.all.insert(&record));
            return Err(e);
        }
        if let Err(e) = self.store.remove(id) {
            rollback("group remove", self.forest.insert(&record));
            rollback("all tree remove", self.all.insert(&record));
            return Err(e);
        }

        debug!(record = id, group = record.group, "record removed");
        Ok(())
    }

    pub fn merge_groups(&mut self, a: i64, b: i64) -> Result<()> {
        let a = self.group_id(a)?;
        let b = self.group_id(b)?;
        let rep = self.forest.union(a, b)?;

        debug!(a, b, representative = rep, "merge groups");
        Ok(())
    }

    pub fn increase_level(&mut self, id: i64, delta: i64) -> Result<()> {
        let id = record_id(id)?;
        let delta = match Level::try_from(delta) {
            Ok(delta) if delta > 0 => delta,
            _ => return Err(Error::InvalidInput("level increase must be positive")),
        };
        let record = self.find_record(id)?;
        let level = record
            .level
            .checked_add(delta)
            .ok_or(Error::InvalidInput("level overflow"))?;
        let moved = record.with_level(level);

        replace(&mut self.all, &record, &moved)?;
        if let Err(e) = replace(&mut self.forest, &record, &moved) {
            rollback("all tree move", replace(&mut self.all, &moved, &record));
            return Err(e);
        }
        if let Err(e) = update_store(&mut self.store, record, moved) {
            rollback("group move", replace(&mut self.forest, &moved, &record));
            rollback("all tree move", replace(&mut self.all, &moved, &record));
            return Err(e);
        }

        debug!(record = id, from = record.level, to = level, "level increased");
        Ok(())
    }

    pub fn change_score(&mut self, id: i64, score: i64) -> Result<()> {
        let id = record_id(id)?;
        let score = self.score(score)?;
        let record = self.find_record(id)?;
        let changed = record.with_score(score);

        self.all.change_score(&record, score)?;
        if let Err(e) = self.forest.change_score(&record, score) {
            rollback("all tree score", self.all.change_score(&changed, record.score));
            return Err(e);
        }
        if let Err(e) = update_store(&mut self.store, record, changed) {
            rollback("group score", self.forest.change_score(&changed, record.score));
            rollback("all tree score", self.all.change_score(&changed, record.score));
            return Err(e);
        }

        debug!(record = id, from = record.score, to = score, "score changed");
        Ok(())
    }

    /// Percentage of records with `score` among those with level in
    /// `[lower, upper]`. Fails with `EmptyRange` when no record is in range.
    pub fn percent_with_score_in_level_range(
        &mut self,
        scope: Scope,
        score: i64,
        lower: i64,
        upper: i64,
    ) -> Result<f64> {
        let score = self.score(score)?;
        if upper < 0 || lower > upper {
            return Err(Error::EmptyRange);
        }
        let lower = Level::try_from(lower).unwrap_or(0);
        let upper = Level::try_from(upper).unwrap_or(0);

        self.tree(scope)?
            .percent_with_score_in_range(lower, upper, score)
            .ok_or(Error::EmptyRange)
    }

    pub fn average_level_of_top(&mut self, scope: Scope, m: i64) -> Result<f64> {
        let m = match usize::try_from(m) {
            Ok(m) if m > 0 => m,
            _ => return Err(Error::InvalidInput("m must be positive")),
        };
        self.tree(scope)?.average_level_of_top(m)
    }

    /// `(lower, upper)` bound on how many of the top `m` records have `score`
    pub fn score_bounds_among_top(
        &mut self,
        scope: Scope,
        score: i64,
        m: i64,
    ) -> Result<(usize, usize)> {
        let score = self.score(score)?;
        let m = usize::try_from(m).map_err(|_| Error::InvalidInput("m must not be negative"))?;

        let tree = self.tree(scope)?;
        let available = tree.len();
        if m > available {
            return Err(Error::NotEnoughRecords {
                requested: m,
                available,
            });
        }
        Ok(tree.score_bounds_among_top(score, m))
    }
}

fn record_id(id: i64) -> Result<RecordId> {
    match RecordId::try_from(id) {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(Error::InvalidInput("record id must be positive")),
    }
}

/// Anything records can be indexed in
trait RecordIndex {
    fn insert(&mut self, record: &Record) -> Result<()>;
    fn remove(&mut self, record: &Record) -> Result<()>;
}

impl RecordIndex for AugmentedTree {
    fn insert(&mut self, record: &Record) -> Result<()> {
        AugmentedTree::insert(self, record)
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        AugmentedTree::remove(self, record)
    }
}

impl RecordIndex for DisjointGroupForest {
    fn insert(&mut self, record: &Record) -> Result<()> {
        DisjointGroupForest::insert(self, record)
    }

    fn remove(&mut self, record: &Record) -> Result<()> {
        DisjointGroupForest::remove(self, record)
    }
}

/// Swap `from` for `to`, restoring `from` if `to` cannot go in
fn replace(index: &mut impl RecordIndex, from: &Record, to: &Record) -> Result<()> {
    index.remove(from)?;
    if let Err(e) = index.insert(to) {
        rollback("restore record", index.insert(from));
        return Err(e);
    }
    Ok(())
}

fn update_store<S: RecordStore>(store: &mut S, from: Record, to: Record) -> Result<()> {
    store.remove(from.id)?;
    if let Err(e) = store.insert(to) {
        rollback("restore stored record", store.insert(from));
        return Err(e);
    }
    Ok(())
}

/// An undo step failing means the index is no longer consistent
fn rollback(step: &'static str, result: Result<()>) {
    if let Err(error) = result {
        warn!(step, %error, "rollback failed");
    }
}
