//! Runs a batch described by a JSON run config and writes the report.
//!
//! ```text
//! cargo run --example monthly_report -- run.json
//! ```

use kma_weather::{Kma, KmaError, RunConfig};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), KmaError> {
    env_logger::init();
    configure_polars_display();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("run.json"));
    let config = RunConfig::from_json_file(&path)?;

    let report = Kma::run(&config).await?;
    println!("{}", report.frame.head(Some(12)));
    println!("Saved to {:?}", config.output);

    if !report.failed.is_empty() {
        println!("Failed stations:");
        for failure in &report.failed {
            println!("  {failure}");
        }
    }
    if !report.empty.is_empty() {
        println!("Stations without data: {}", report.empty.join(", "));
    }
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    env::set_var("POLARS_FMT_MAX_ROWS", "24");
}
