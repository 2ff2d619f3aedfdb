//! Train/test partitioning
//!
//! Shuffles with a uniform Fisher–Yates permutation and cuts at
//! `floor(len * ratio)`.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::DEFAULT_SPLIT_RATIO;
use crate::errors::{PipelineError, Result};

/// Disjoint training and held-out subsets
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    pub train: Vec<T>,
    pub test: Vec<T>,
}

impl<T> Partition<T> {
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }
}

/// Random splitter with a fixed training ratio
#[derive(Debug, Clone, Copy)]
pub struct Partitioner {
    ratio: f64,
}

impl Default for Partitioner {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_SPLIT_RATIO,
        }
    }
}

impl Partitioner {
    /// `ratio` is the training share and must lie in `(0, 1]`.
    pub fn new(ratio: f64) -> Result<Self> {
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "split ratio {} must lie in (0, 1]",
                ratio
            )));
        }
        Ok(Self { ratio })
    }

    /// Index of the first test element after shuffling
    pub fn boundary(&self, len: usize) -> usize {
        ((len as f64 * self.ratio).floor() as usize).min(len)
    }

    /// Shuffle `items` with `rng` and split them.
    pub fn split<T, R: Rng + ?Sized>(&self, mut items: Vec<T>, rng: &mut R) -> Partition<T> {
        items.shuffle(rng);
        let test = items.split_off(self.boundary(items.len()));
        Partition { train: items, test }
    }

    /// Split with a reproducible generator when `seed` is given, OS entropy otherwise.
    pub fn split_seeded<T>(&self, items: Vec<T>, seed: Option<u64>) -> Partition<T> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.split(items, &mut rng)
    }
}
