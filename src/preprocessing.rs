use crate::{Error, Result, Tensor};

/// Labels remapped to contiguous class indices
#[derive(Debug, Clone, PartialEq)]
pub struct StandardLabels {
    /// Class index `0..C-1` per example
    pub labels: Vec<f32>,
    /// Raw label value of each class index, ascending
    pub classes: Vec<f32>,
}

impl StandardLabels {
    pub fn num_classes(&self) -> usize {
        self.classes.len()
    }
}

/// Maps each distinct raw label to a class index in `0..C-1`.
/// Classes are numbered in ascending order of their raw values.
pub fn convert_to_standard_labels(raw: &[f32]) -> StandardLabels {
    // Adding +0.0 folds -0.0 into 0.0 so both land in one class
    let mut classes: Vec<f32> = raw.iter().map(|&label| label + 0.0).collect();
    classes.sort_by(|a, b| a.total_cmp(b));
    classes.dedup_by(|a, b| a.total_cmp(b).is_eq());

    let labels = raw
        .iter()
        .map(|&label| {
            let label = label + 0.0;
            // Every raw label is in `classes`, so the search always hits
            let idx = classes
                .binary_search_by(|probe| probe.total_cmp(&label))
                .unwrap_or_else(|i| i);
            idx as f32
        })
        .collect();

    StandardLabels { labels, classes }
}

/// Creates one-hot encoded targets with optional label smoothing
///
/// # Arguments
/// * `targets` - Vector of class indices
/// * `num_classes` - Number of columns in the result
/// * `smoothing` - Label smoothing factor (0 = no smoothing)
pub fn create_one_hot(targets: &[f32], num_classes: usize, smoothing: f32) -> Tensor {
    let smooth_value = if num_classes > 1 {
        smoothing / (num_classes - 1) as f32
    } else {
        0.0
    };
    let hot_value = if num_classes > 1 { 1.0 - smoothing } else { 1.0 };

    let mut one_hot = Vec::with_capacity(targets.len() * num_classes);
    for &target in targets {
        for j in 0..num_classes {
            one_hot.push(if j == target as usize {
                hot_value
            } else {
                smooth_value
            });
        }
    }
    Tensor::new_with_shape(one_hot, (targets.len(), num_classes))
}

/// Builds the N x C posterior probability matrix from standardized labels.
///
/// Fails with `State` on unlabeled data or on labels that are not class
/// indices in `0..num_classes`.
pub fn label_to_posterior_prob(labels: &[f32], num_classes: usize) -> Result<Tensor> {
    label_to_smoothed_prob(labels, num_classes, 0.0)
}

/// Same as [`label_to_posterior_prob`], spreading `smoothing` of the mass
/// evenly over the other classes
pub fn label_to_smoothed_prob(
    labels: &[f32],
    num_classes: usize,
    smoothing: f32,
) -> Result<Tensor> {
    if labels.is_empty() {
        return Err(Error::State(
            "posterior probabilities require labeled data".to_string(),
        ));
    }
    if !(0.0..1.0).contains(&smoothing) {
        return Err(Error::InvalidArgument(format!(
            "label smoothing must be in [0, 1), got {}",
            smoothing
        )));
    }
    if let Some(bad) = labels
        .iter()
        .find(|&&l| l < 0.0 || l.fract() != 0.0 || l as usize >= num_classes)
    {
        return Err(Error::State(format!(
            "label {} is not a standardized class index in 0..{}",
            bad, num_classes
        )));
    }

    Ok(create_one_hot(labels, num_classes, smoothing))
}
