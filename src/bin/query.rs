//! `query <bucket_size> <k> <identifier>`: look up an existing Data item by
//! identifier and print its approximate nearest neighbors.
use brp::store::Store;
use brp::{BrpModel, Error};
use clap::Parser;
use std::path::PathBuf;

/// Find the approximate nearest neighbors of an already-indexed identifier.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Spacing between adjacent parallel hyperplanes; must match the value
    /// the index was built with.
    bucket_size: f64,

    /// Number of neighbors to return.
    k: usize,

    /// Identifier of the Data item to query against.
    identifier: String,

    #[arg(long, default_value = ".databases/.index.sqlite3")]
    db_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let store = Store::open(&args.db_file, false)?;
    let mut model = BrpModel::new(0, args.bucket_size);
    model.load(&store, false)?;

    let result = match model.knn_for_identifier(&store, &args.identifier, args.k) {
        Ok(result) => result,
        Err(Error::NotFound) => {
            println!("No data found with identifier \"{}\".", args.identifier);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    for (dist, raw) in &result {
        println!("{:>12.6}  {}", dist, raw);
    }
    println!("Total: {}", result.len());
    Ok(())
}
