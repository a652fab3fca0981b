pub mod args;
pub mod data;
pub mod dataset;
pub mod error;
pub mod normalization;
pub mod parsing;
pub mod preprocessing;
pub mod tensor;
pub mod test_utils;

pub use args::{parse_arguments, SummaryArgs};
pub use data::{shuffled_indices, split_sizes, SplitSizes};
pub use dataset::{DataSet, ReadConfig, Summary};
pub use error::{Error, Result};
pub use normalization::{rescale_features, FeatureRange};
pub use parsing::{
    find_dimension, find_max_dimension, get_line_number, is_file_sparse, is_sparse, parse_lines,
    parse_vector_str, read_data_file, sniff, Encoding, FileLayout, ParsedData,
    DEFAULT_SNIFF_LINES,
};
pub use preprocessing::{
    convert_to_standard_labels, create_one_hot, label_to_posterior_prob, label_to_smoothed_prob,
    StandardLabels,
};
pub use tensor::Tensor;
