use crate::{Error, Result, Tensor};

/// Observed per-column value range, used for min-max feature rescaling.
/// A range computed on one dataset can be applied to another so both
/// share the same mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRange {
    /// Column minimums
    pub min: Vec<f32>,
    /// Column maximums
    pub max: Vec<f32>,
}

impl FeatureRange {
    /// Collects column minimums and maximums from a feature matrix
    pub fn from_tensor(features: &Tensor) -> Self {
        let (min, max): (Vec<f32>, Vec<f32>) = features.column_min_max().into_iter().unzip();
        Self { min, max }
    }

    pub fn width(&self) -> usize {
        self.min.len()
    }

    /// Maps each column's `[min, max]` affinely onto `[lower, upper]`.
    /// Constant columns map to `lower`. Values outside the stored range
    /// land outside `[lower, upper]`.
    ///
    /// Internally uses f64 so column endpoints map exactly onto the bounds.
    pub fn apply(&self, features: &mut Tensor, lower: f32, upper: f32) -> Result<()> {
        validate_bounds(lower, upper)?;
        if features.rows() == 0 {
            return Ok(());
        }
        if features.cols() != self.width() {
            return Err(Error::InvalidArgument(format!(
                "feature range has {} columns, features have {}",
                self.width(),
                features.cols()
            )));
        }

        let (lower, upper) = (lower as f64, upper as f64);
        for row in 0..features.rows() {
            for (col, value) in features.row_mut(row).iter_mut().enumerate() {
                let (min, max) = (self.min[col] as f64, self.max[col] as f64);
                *value = if max > min {
                    ((*value as f64 - min) / (max - min) * (upper - lower) + lower) as f32
                } else {
                    lower as f32
                };
            }
        }
        Ok(())
    }
}

fn validate_bounds(lower: f32, upper: f32) -> Result<()> {
    if !lower.is_finite() || !upper.is_finite() || lower >= upper {
        return Err(Error::InvalidArgument(format!(
            "rescale bounds must be finite with lower < upper, got [{}, {}]",
            lower, upper
        )));
    }
    Ok(())
}

/// Rescales every feature column of `features` into `[lower, upper]`
/// and returns the range that was used
pub fn rescale_features(features: &mut Tensor, lower: f32, upper: f32) -> Result<FeatureRange> {
    validate_bounds(lower, upper)?;
    let range = FeatureRange::from_tensor(features);
    range.apply(features, lower, upper)?;
    Ok(range)
}
