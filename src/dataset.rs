use crate::data::{shuffled_indices, split_sizes};
use crate::normalization::rescale_features;
use crate::parsing::{read_data_file, Encoding, DEFAULT_SNIFF_LINES};
use crate::preprocessing::{convert_to_standard_labels, label_to_smoothed_prob};
use crate::{Error, FeatureRange, Result, Tensor};
use rand::{thread_rng, Rng};
use std::fmt;
use std::path::Path;

/// Options controlling how a data file is read
#[derive(Debug, Clone)]
pub struct ReadConfig {
    /// Target `(lower, upper)` range for per-column rescaling, if any
    pub rescale: Option<(f32, f32)>,
    /// Whether dense files carry a leading label column
    pub dense_labeled: bool,
    /// Number of records inspected when deciding dense vs. sparse
    pub sniff_lines: usize,
    /// Label smoothing applied to the posterior probabilities
    pub label_smoothing: f32,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            rescale: None,
            dense_labeled: true,
            sniff_lines: DEFAULT_SNIFF_LINES,
            label_smoothing: 0.0,
        }
    }
}

impl ReadConfig {
    /// Default configuration, rescaling into `[0, 1]` when `rescale` is set
    pub fn with_rescale(rescale: bool) -> Self {
        Self {
            rescale: rescale.then_some((0.0, 1.0)),
            ..Self::default()
        }
    }
}

/// Shape overview of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub encoding: Option<Encoding>,
    pub size: usize,
    pub input_dimension: usize,
    pub output_dimension: usize,
    pub labeled: bool,
    pub classes: Vec<f32>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "+--------------------+------------+")?;
        if let Some(encoding) = self.encoding {
            writeln!(f, "| Encoding           | {:>10} |", format!("{:?}", encoding))?;
        }
        writeln!(f, "| Number of examples | {:>10} |", self.size)?;
        writeln!(f, "| Input dimension    | {:>10} |", self.input_dimension)?;
        writeln!(f, "| Output dimension   | {:>10} |", self.output_dimension)?;
        writeln!(f, "| Labeled            | {:>10} |", self.labeled)?;
        write!(f, "+--------------------+------------+")?;
        if self.labeled {
            write!(f, "\nClasses: {:?}", self.classes)?;
        }
        Ok(())
    }
}

/// Features, labels and posterior probabilities of one set of examples.
///
/// `labels` is N x 1 and `probabilities` is N x C; both are 0 x 0 when the
/// data is unlabeled.
#[derive(Debug, Clone)]
pub struct DataSet {
    features: Tensor,
    labels: Tensor,
    probabilities: Tensor,
    classes: Vec<f32>,
    encoding: Option<Encoding>,
}

impl Default for DataSet {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSet {
    /// Creates an empty, unlabeled dataset
    pub fn new() -> Self {
        Self {
            features: Tensor::empty(),
            labels: Tensor::empty(),
            probabilities: Tensor::empty(),
            classes: Vec::new(),
            encoding: None,
        }
    }

    /// Reads a dataset from `path`, optionally rescaling features into `[0, 1]`
    pub fn from_file(path: impl AsRef<Path>, rescale: bool) -> Result<Self> {
        let mut dataset = Self::new();
        dataset.read(path, rescale)?;
        Ok(dataset)
    }

    /// Builds a dataset from in-memory features and optional raw labels,
    /// standardizing labels and deriving one-hot probabilities
    pub fn from_tensors(features: Tensor, raw_labels: Option<Vec<f32>>) -> Result<Self> {
        Self::assemble(features, raw_labels, 0.0, None)
    }

    /// Replaces the contents of this dataset with the contents of `path`
    pub fn read(&mut self, path: impl AsRef<Path>, rescale: bool) -> Result<()> {
        self.read_with_config(path, &ReadConfig::with_rescale(rescale))
    }

    /// Reads `path` with explicit options. On failure `self` is unchanged.
    pub fn read_with_config(
        &mut self,
        path: impl AsRef<Path>,
        config: &ReadConfig,
    ) -> Result<()> {
        let path = path.as_ref();
        let (layout, parsed) = read_data_file(path, config.sniff_lines, config.dense_labeled)?;

        let mut features = parsed.features;
        if let Some((lower, upper)) = config.rescale {
            rescale_features(&mut features, lower, upper)?;
        }

        *self = Self::assemble(
            features,
            parsed.labels,
            config.label_smoothing,
            Some(layout.encoding),
        )?;

        tracing::info!(
            "Read {} examples of dimension {} from {}",
            self.size(),
            self.input_dimension(),
            path.display()
        );
        Ok(())
    }

    fn assemble(
        features: Tensor,
        raw_labels: Option<Vec<f32>>,
        smoothing: f32,
        encoding: Option<Encoding>,
    ) -> Result<Self> {
        let raw_labels = match raw_labels {
            Some(labels) if !labels.is_empty() || features.rows() > 0 => labels,
            _ => {
                return Ok(Self {
                    features,
                    encoding,
                    ..Self::new()
                })
            }
        };

        if raw_labels.len() != features.rows() {
            return Err(Error::InvalidArgument(format!(
                "{} labels for {} feature rows",
                raw_labels.len(),
                features.rows()
            )));
        }

        let standard = convert_to_standard_labels(&raw_labels);
        let probabilities =
            label_to_smoothed_prob(&standard.labels, standard.num_classes(), smoothing)?;
        let n = standard.labels.len();

        Ok(Self {
            features,
            labels: Tensor::new_with_shape(standard.labels, (n, 1)),
            probabilities,
            classes: standard.classes,
            encoding,
        })
    }

    /// Number of examples (N)
    pub fn size(&self) -> usize {
        self.features.rows()
    }

    /// Feature dimensionality (D)
    pub fn input_dimension(&self) -> usize {
        self.features.cols()
    }

    /// Width of the probability matrix (C), 0 when unlabeled
    pub fn output_dimension(&self) -> usize {
        self.probabilities.cols()
    }

    pub fn class_number(&self) -> usize {
        self.classes.len()
    }

    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }

    /// Raw label value of each class index
    pub fn classes(&self) -> &[f32] {
        &self.classes
    }

    /// Encoding of the file this dataset was read from
    pub fn encoding(&self) -> Option<Encoding> {
        self.encoding
    }

    fn check_range(&self, offset: usize, n: usize) -> Result<()> {
        match offset.checked_add(n) {
            Some(end) if end <= self.size() => Ok(()),
            _ => Err(Error::OutOfRange {
                offset,
                len: n,
                size: self.size(),
            }),
        }
    }

    fn check_labeled(&self) -> Result<()> {
        if self.is_labeled() {
            Ok(())
        } else {
            Err(Error::State("dataset is unlabeled".to_string()))
        }
    }

    pub fn get_x(&self) -> Tensor {
        self.features.clone()
    }

    /// Copies `n` feature rows starting at `offset`
    pub fn get_x_range(&self, offset: usize, n: usize) -> Result<Tensor> {
        self.check_range(offset, n)?;
        Ok(self.features.slice_rows(offset, n))
    }

    pub fn get_y(&self) -> Tensor {
        self.labels.clone()
    }

    pub fn get_y_range(&self, offset: usize, n: usize) -> Result<Tensor> {
        self.check_labeled()?;
        self.check_range(offset, n)?;
        Ok(self.labels.slice_rows(offset, n))
    }

    pub fn get_prob(&self) -> Tensor {
        self.probabilities.clone()
    }

    pub fn get_prob_range(&self, offset: usize, n: usize) -> Result<Tensor> {
        self.check_labeled()?;
        self.check_range(offset, n)?;
        Ok(self.probabilities.slice_rows(offset, n))
    }

    /// Per-column range of the current features, for rescaling other data
    /// the same way
    pub fn feature_range(&self) -> FeatureRange {
        FeatureRange::from_tensor(&self.features)
    }

    /// Rescales features in place into `[lower, upper]`
    pub fn rescale_feature(&mut self, lower: f32, upper: f32) -> Result<FeatureRange> {
        rescale_features(&mut self.features, lower, upper)
    }

    /// Randomly reorders examples, keeping features, labels and
    /// probabilities aligned
    pub fn shuffle_feature(&mut self) {
        self.shuffle_feature_with(&mut thread_rng());
    }

    pub fn shuffle_feature_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let order = shuffled_indices(self.size(), rng);
        self.features = self.features.permute_rows(&order);
        if self.is_labeled() {
            self.labels = self.labels.permute_rows(&order);
            self.probabilities = self.probabilities.permute_rows(&order);
        }
    }

    fn slice(&self, offset: usize, n: usize) -> Self {
        let (labels, probabilities) = if self.is_labeled() {
            (
                self.labels.slice_rows(offset, n),
                self.probabilities.slice_rows(offset, n),
            )
        } else {
            (Tensor::empty(), Tensor::empty())
        };

        Self {
            features: self.features.slice_rows(offset, n),
            labels,
            probabilities,
            classes: self.classes.clone(),
            encoding: self.encoding,
        }
    }

    /// Splits into `(train, valid)`. The first `floor(size / ratio)` rows
    /// form the validation set and the remainder the training set, in the
    /// current row order; call [`DataSet::shuffle_feature`] first for a
    /// random partition.
    pub fn split_into_train_and_valid_set(&self, ratio: usize) -> Result<(DataSet, DataSet)> {
        let sizes = split_sizes(self.size(), ratio)?;

        let valid = self.slice(0, sizes.valid);
        let train = self.slice(sizes.valid, sizes.train);

        tracing::debug!(
            "Dataset split: {} training, {} validation",
            train.size(),
            valid.size()
        );

        Ok((train, valid))
    }

    pub fn summary(&self) -> Summary {
        Summary {
            encoding: self.encoding,
            size: self.size(),
            input_dimension: self.input_dimension(),
            output_dimension: self.output_dimension(),
            labeled: self.is_labeled(),
            classes: self.classes.clone(),
        }
    }

    /// Logs the dataset summary at info level
    pub fn show_summary(&self) {
        tracing::info!("\n{}", self.summary());
    }
}
