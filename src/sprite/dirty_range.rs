/// A contiguous `[first, last]` interval of hardware table entries waiting to be transferred.
///
/// Ranges from independent sources are combined with `merge`, which is commutative and
/// associative and has `DirtyRange::EMPTY` as its identity, so the order in which subsystems
/// report their changes doesn't matter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRange {
    first: usize,
    last: usize,
}

impl DirtyRange {
    /// Nothing to transfer.
    pub const EMPTY: DirtyRange = DirtyRange {
        first: usize::MAX,
        last: 0,
    };

    pub fn new(first: usize, last: usize) -> DirtyRange {
        assert!(first <= last, "Invalid dirty range: {} - {}", first, last);
        return DirtyRange { first, last };
    }

    pub fn single(index: usize) -> DirtyRange {
        return DirtyRange::new(index, index);
    }

    pub fn is_empty(&self) -> bool {
        return self.first > self.last;
    }

    /// `(first, last)` if anything is pending.
    pub fn bounds(&self) -> Option<(usize, usize)> {
        if self.is_empty() {
            return None;
        }
        return Some((self.first, self.last));
    }

    /// Number of entries covered.
    pub fn len(&self) -> usize {
        match self.bounds() {
            Some((first, last)) => last - first + 1,
            None => 0,
        }
    }

    /// Smallest range covering both.
    pub fn merge(self, other: DirtyRange) -> DirtyRange {
        // EMPTY is (MAX, 0), so plain min/max already treats it as the identity
        return DirtyRange {
            first: self.first.min(other.first),
            last: self.last.max(other.last),
        };
    }

    pub fn merge_in(&mut self, other: DirtyRange) {
        *self = self.merge(other);
    }

    pub fn include(&mut self, index: usize) {
        self.merge_in(DirtyRange::single(index));
    }

    /// Returns the pending range and leaves `EMPTY` behind.
    pub fn take(&mut self) -> DirtyRange {
        return core::mem::replace(self, DirtyRange::EMPTY);
    }

    /// Maps a range of one table onto a table with `multiplier` entries per source entry.
    pub fn rescale(self, multiplier: usize) -> DirtyRange {
        match self.bounds() {
            Some((first, last)) => DirtyRange::new(first * multiplier, (last + 1) * multiplier - 1),
            None => DirtyRange::EMPTY,
        }
    }
}

impl Default for DirtyRange {
    fn default() -> DirtyRange {
        return DirtyRange::EMPTY;
    }
}
