//! `generate-dataset <size> <dims>`: write a synthetic Gaussian-clustered
//! dataset to `datasets/rand_dataset.json`.
use brp::datagen;
use clap::Parser;
use std::path::PathBuf;

/// Generate a synthetic Gaussian-clustered dataset.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Number of records to generate.
    size: usize,

    /// Embedding dimensionality.
    dims: usize,

    /// Seed for the cluster/point RNG. 0 means OS-seeded.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, default_value = "datasets")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    println!("Generating dataset...");
    let records = datagen::generate(args.size, args.dims, args.seed);

    std::fs::create_dir_all(&args.output_dir)?;
    let out_file = args.output_dir.join("rand_dataset.json");
    let json = serde_json::to_string(&records)?;
    std::fs::write(&out_file, json)?;
    tracing::info!(path = %out_file.display(), size = records.len(), "dataset written");
    Ok(())
}
