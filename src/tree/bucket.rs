use crate::{Error, Record, Result, Score};

/// Records sharing one level, kept as a histogram over `[0, scale)`.
///
/// Members are counted, not identified: record identity lives in the
/// [`RecordStore`](crate::RecordStore), and each record there carries its
/// level. This is what lets two buckets merge in O(scale) regardless of how
/// many records they hold. Subtree totals live in [`Summary`](super::Summary).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    len: usize,
    histogram: Box<[usize]>,
}

impl Bucket {
    pub fn new(scale: usize) -> Self {
        Self {
            len: 0,
            histogram: vec![0; scale].into_boxed_slice(),
        }
    }

    /// Number of records in the bucket
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn scale(&self) -> usize {
        self.histogram.len()
    }

    /// Count of members with `score`, 0 for scores outside the scale
    #[inline]
    pub fn score_count(&self, score: Score) -> usize {
        self.histogram.get(score).copied().unwrap_or(0)
    }

    pub fn histogram(&self) -> &[usize] {
        &self.histogram
    }

    /// Iterate the score of every member, lowest score first
    pub fn scores(&self) -> impl Iterator<Item = Score> + '_ {
        self.histogram
            .iter()
            .enumerate()
            .flat_map(|(score, count)| std::iter::repeat(score).take(*count))
    }

    pub fn add(&mut self, record: &Record) -> Result<()> {
        if record.score >= self.scale() {
            return Err(Error::InvalidInput("score out of range"));
        }
        self.histogram[record.score] += 1;
        self.len += 1;
        Ok(())
    }

    /// Fails with `RecordNotFound` if no member has the record's score
    pub fn remove(&mut self, record: &Record) -> Result<()> {
        match self.histogram.get_mut(record.score) {
            Some(count) if *count > 0 => {
                *count -= 1;
                self.len -= 1;
                Ok(())
            }
            _ => Err(Error::RecordNotFound(record.id)),
        }
    }

    /// Move one member from the record's score to `score`
    pub fn change_score(&mut self, record: &Record, score: Score) -> Result<()> {
        if score >= self.scale() {
            return Err(Error::InvalidInput("score out of range"));
        }
        self.remove(record)?;
        self.histogram[score] += 1;
        self.len += 1;
        Ok(())
    }

    /// Absorb all members of `other` in O(scale)
    pub fn merge(&mut self, other: Bucket) {
        debug_assert_eq!(self.scale(), other.scale());

        self.len += other.len;
        for (mine, theirs) in self.histogram.iter_mut().zip(other.histogram.iter()) {
            *mine += *theirs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, score: Score) -> Record {
        Record::new(id, 1, score)
    }

    #[test]
    fn test_add_remove() {
        let mut bucket = Bucket::new(10);
        bucket.add(&record(1, 5)).unwrap();
        bucket.add(&record(2, 5)).unwrap();
        bucket.add(&record(3, 9)).unwrap();

        assert_eq!(bucket.len(), 3);
        assert_eq!(bucket.score_count(5), 2);
        assert_eq!(bucket.score_count(9), 1);
        assert_eq!(bucket.score_count(100), 0);
        assert_eq!(
            bucket.add(&record(4, 10)),
            Err(Error::InvalidInput("score out of range"))
        );

        bucket.remove(&record(2, 5)).unwrap();
        assert_eq!(bucket.score_count(5), 1);
        assert_eq!(bucket.remove(&record(3, 4)), Err(Error::RecordNotFound(3)));
        assert_eq!(bucket.remove(&record(3, 40)), Err(Error::RecordNotFound(3)));
        assert_eq!(bucket.len(), 2);
        assert_eq!(bucket.scores().collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn test_change_score() {
        let mut bucket = Bucket::new(4);
        bucket.add(&record(7, 0)).unwrap();

        bucket.change_score(&record(7, 0), 3).unwrap();
        assert_eq!(bucket.histogram(), &[0, 0, 0, 1]);
        assert_eq!(bucket.len(), 1);
        assert_eq!(
            bucket.change_score(&record(7, 0), 1),
            Err(Error::RecordNotFound(7))
        );
        assert_eq!(
            bucket.change_score(&record(7, 3), 4),
            Err(Error::InvalidInput("score out of range"))
        );
        assert_eq!(bucket.histogram(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_merge() {
        let mut small = Bucket::new(3);
        small.add(&record(1, 0)).unwrap();

        let mut large = Bucket::new(3);
        for (id, score) in [(2, 1), (3, 1), (4, 2)] {
            large.add(&record(id, score)).unwrap();
        }

        small.merge(large);
        assert_eq!(small.len(), 4);
        assert_eq!(small.histogram(), &[1, 2, 1]);
    }
}
