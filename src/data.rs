use crate::{Error, Result};
use rand::prelude::SliceRandom;
use rand::Rng;

/// Row counts of a train/validation partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitSizes {
    pub train: usize,
    pub valid: usize,
}

/// Generates a uniform random permutation of `0..n`
pub fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(rng);
    indices
}

/// Computes the sizes of a contiguous train/validation split
///
/// # Arguments
/// * `total` - Number of rows in the dataset
/// * `ratio` - One in every `ratio` rows goes to validation
///
/// # Returns
/// `valid = floor(total / ratio)` and `train = total - valid`
pub fn split_sizes(total: usize, ratio: usize) -> Result<SplitSizes> {
    if ratio <= 1 {
        return Err(Error::InvalidArgument(format!(
            "split ratio must be greater than 1, got {}",
            ratio
        )));
    }

    let valid = total / ratio;
    if valid == 0 && total > 0 {
        return Err(Error::InvalidArgument(format!(
            "split ratio {} leaves no validation rows out of {}",
            ratio, total
        )));
    }

    Ok(SplitSizes {
        train: total - valid,
        valid,
    })
}
