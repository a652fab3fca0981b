use mldataset::{parse_arguments, DataSet, ReadConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mldataset=info".parse().expect("valid directive")),
        )
        .init();

    let start = Instant::now();

    let args = match parse_arguments() {
        Ok(args) => args,
        Err(e) => e.exit(),
    };

    let config = ReadConfig {
        rescale: args.rescale,
        dense_labeled: args.dense_labeled,
        ..ReadConfig::default()
    };

    let mut dataset = DataSet::new();
    if let Err(e) = dataset.read_with_config(&args.data, &config) {
        tracing::error!("Failed to read {}: {}", args.data, e);
        std::process::exit(1);
    }
    dataset.show_summary();

    if args.shuffle {
        match args.seed {
            Some(seed) => dataset.shuffle_feature_with(&mut StdRng::seed_from_u64(seed)),
            None => dataset.shuffle_feature(),
        }
    }

    if let Some(ratio) = args.valid_ratio {
        match dataset.split_into_train_and_valid_set(ratio) {
            Ok((train, valid)) => {
                tracing::info!("=== Training set ===");
                train.show_summary();
                tracing::info!("=== Validation set ===");
                valid.show_summary();
            }
            Err(e) => {
                tracing::error!("Failed to split dataset: {}", e);
                std::process::exit(1);
            }
        }
    }

    tracing::info!("Total runtime: {:.2?}", start.elapsed());
}
