//! `init-index <num_hyperplanes> <bucket_size>`: populate the store from the
//! generated dataset and (re)build the index from scratch.
use brp::store::{DatasetRecord, Store};
use brp::BrpModel;
use clap::Parser;
use std::path::PathBuf;

/// Populate the index's store from a dataset file and build the hyperplane
/// bucket assignment from scratch.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of hyperplanes to draw.
    num_hyperplanes: usize,

    /// Spacing between adjacent parallel hyperplanes.
    bucket_size: f64,

    /// Seed for the hyperplane RNG. 0 means OS-seeded.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value = "datasets/rand_dataset.json")]
    dataset_file: PathBuf,

    #[arg(long, default_value = ".databases/.index.sqlite3")]
    db_file: PathBuf,

    /// Where to write the inspection-only hyperplane export.
    #[arg(long, default_value = "datasets/hyperplanes.json")]
    hyperplanes_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let store = Store::open(&args.db_file, true)?;

    tracing::info!(dataset_file = %args.dataset_file.display(), "populating index");
    println!("Populating index from {}...", args.dataset_file.display());
    let raw = std::fs::read_to_string(&args.dataset_file)?;
    let records: Vec<DatasetRecord> = serde_json::from_str(&raw)?;
    store.populate(&records)?;

    println!(
        "Initializing model with {} hyperplanes and a bucket size of {}...",
        args.num_hyperplanes, args.bucket_size
    );
    let mut model = BrpModel::new(args.num_hyperplanes, args.bucket_size).seed(args.seed);
    let report = model.load(&store, true)?;
    if let Some(report) = report {
        tracing::info!(?report, "build complete");
    }

    let vectors: Vec<Vec<f64>> = store
        .fetch_all_hyperplanes()?
        .into_iter()
        .map(|h| h.vector)
        .collect();
    if let Some(parent) = args.hyperplanes_file.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&args.hyperplanes_file, serde_json::to_string(&vectors)?)?;
    tracing::info!(path = %args.hyperplanes_file.display(), "hyperplanes exported");

    Ok(())
}
