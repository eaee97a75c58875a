//! Dense coverage bit vector
//!
//! Bit `i` set means source position `i` has been translated. Coverage values
//! key the buckets of a cardinality container, so equality, hashing and
//! ordering must be cheap.

use std::fmt;

const WORD_BITS: usize = 64;

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coverage {
    len: usize,
    words: Vec<u64>,
}

impl Coverage {
    /// Empty coverage for a sentence of `len` positions
    pub fn new(len: usize) -> Self {
        Coverage {
            len,
            words: vec![0; len.div_ceil(WORD_BITS)],
        }
    }

    /// Coverage with every position set
    pub fn full(len: usize) -> Self {
        let mut coverage = Coverage::new(len);
        coverage.set_range(0, len);
        coverage
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn test(&self, pos: usize) -> bool {
        debug_assert!(pos < self.len);
        self.words[pos / WORD_BITS] & (1u64 << (pos % WORD_BITS)) != 0
    }

    pub fn set(&mut self, pos: usize) {
        debug_assert!(pos < self.len);
        self.words[pos / WORD_BITS] |= 1u64 << (pos % WORD_BITS);
    }

    pub fn set_range(&mut self, begin: usize, end: usize) {
        for pos in begin..end {
            self.set(pos);
        }
    }

    /// Number of covered positions
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.count() == self.len
    }

    /// True when none of `[begin, end)` is covered
    pub fn is_range_free(&self, begin: usize, end: usize) -> bool {
        (begin..end).all(|pos| !self.test(pos))
    }

    /// Copy of this coverage with `[begin, end)` added
    pub fn with_range(&self, begin: usize, end: usize) -> Self {
        let mut coverage = self.clone();
        coverage.set_range(begin, end);
        coverage
    }

    /// True when every position covered here is also covered in `other`
    pub fn is_subset_of(&self, other: &Coverage) -> bool {
        self.len == other.len
            && self
                .words
                .iter()
                .zip(&other.words)
                .all(|(mine, theirs)| mine & !theirs == 0)
    }

    pub fn first_uncovered(&self) -> Option<usize> {
        (0..self.len).find(|&pos| !self.test(pos))
    }

    pub fn last_covered(&self) -> Option<usize> {
        (0..self.len).rev().find(|&pos| self.test(pos))
    }

    /// Maximal uncovered runs as `(start, length)` pairs, left to right
    pub fn uncovered_runs(&self) -> Vec<(usize, usize)> {
        let mut runs = Vec::new();
        let mut start = 0;
        let mut length = 0;
        for pos in 0..self.len {
            if !self.test(pos) {
                if length == 0 {
                    start = pos;
                }
                length += 1;
            } else if length > 0 {
                runs.push((start, length));
                length = 0;
            }
        }
        if length > 0 {
            runs.push((start, length));
        }
        runs
    }
}

impl fmt::Display for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pos in 0..self.len {
            f.write_str(if self.test(pos) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for Coverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coverage({})", self)
    }
}
