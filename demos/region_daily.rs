//! Daily regional means for the Gyeonggi and Sejong stations in 2022.
//!
//! ```text
//! KMA_AUTH_KEY=... cargo run --example region_daily
//! ```

use chrono::NaiveDate;
use kma_weather::{gyeonggi_sejong_regions, write_csv, DateRange, Kma, KmaConfig, KmaError, Period};
use std::env;
use std::path::Path;

#[tokio::main]
async fn main() -> Result<(), KmaError> {
    env_logger::init();

    let Ok(auth_key) = env::var("KMA_AUTH_KEY") else {
        eprintln!("Set KMA_AUTH_KEY to an API hub credential");
        return Ok(());
    };
    let kma = Kma::new(KmaConfig::builder().auth_key(auth_key).build())?;

    let regions = gyeonggi_sejong_regions();
    let stations: Vec<String> = regions.keys().cloned().collect();
    let range = DateRange::new(
        NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
    )?;

    let mut report = kma
        .aggregate()
        .stations(&stations)
        .range(range)
        .period(Period::Day)
        .regions(&regions)
        .call()
        .await?;

    println!("{}", report.frame.head(Some(10)));
    write_csv(&mut report.frame, Path::new("region_daily.csv"))?;
    if !report.failed.is_empty() {
        println!("Failed stations: {:?}", report.failed_stations());
    }
    Ok(())
}
