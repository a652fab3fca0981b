use clap::{error::ErrorKind, Parser};
use std::path::PathBuf;

/// Command line arguments for inspecting and splitting a data file
#[derive(Parser, Debug)]
#[command(about = "Load a dense or sparse data file and summarize it")]
struct Args {
    /// Path to the data file (dense or libsvm-style sparse)
    #[arg(long, value_parser = validate_file)]
    data: PathBuf,

    /// Rescale every feature column into [lower, upper]
    #[arg(long)]
    rescale: bool,

    /// Lower rescale bound
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    lower: f32,

    /// Upper rescale bound
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    upper: f32,

    /// Dense file has no leading label column
    #[arg(long)]
    unlabeled: bool,

    /// Put one in every N examples into a validation set
    #[arg(long)]
    valid_ratio: Option<usize>,

    /// Shuffle examples before splitting
    #[arg(long)]
    shuffle: bool,

    /// Seed for the shuffle, random when omitted
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Debug)]
pub struct SummaryArgs {
    pub data: String,
    pub rescale: Option<(f32, f32)>,
    pub dense_labeled: bool,
    pub valid_ratio: Option<usize>,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

/// Validates that a path points to an existing file
fn validate_file(path: &str) -> Result<PathBuf, clap::Error> {
    let path = PathBuf::from(path);
    if !path.exists() {
        return Err(clap::Error::raw(
            ErrorKind::InvalidValue,
            format!("File not found: {}", path.display()),
        ));
    }
    if !path.is_file() {
        return Err(clap::Error::raw(
            ErrorKind::InvalidValue,
            format!("Not a file: {}", path.display()),
        ));
    }
    Ok(path)
}

fn into_summary_args(args: Args) -> SummaryArgs {
    SummaryArgs {
        data: args.data.to_string_lossy().to_string(),
        rescale: args.rescale.then_some((args.lower, args.upper)),
        dense_labeled: !args.unlabeled,
        valid_ratio: args.valid_ratio,
        shuffle: args.shuffle,
        seed: args.seed,
    }
}

/// Parses and validates command line arguments
pub fn parse_arguments() -> Result<SummaryArgs, clap::Error> {
    let args = Args::try_parse()?;
    Ok(into_summary_args(args))
}
