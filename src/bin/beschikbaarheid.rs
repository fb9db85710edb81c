//! Dataset availability report.
//!
//! Prints the per-source availability grid and the years covered by all
//! four sources. With `--fetch <source> <year>` also runs one live
//! multi-level fetch for Utrecht to sanity-check connectivity.
//!
//! Usage: beschikbaarheid [start_year end_year] [--fetch <source> <year>]

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use wijkdata::types::{CodeName, GeographicCodes};
use wijkdata::{DataSource, DatasetRegistry, HttpOdataClient, SourceClient};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let registry = DatasetRegistry::standard();

    let (start_year, end_year) = match args.as_slice() {
        [start, end, ..] if !start.starts_with("--") && !end.starts_with("--") => (
            start.parse().context("invalid start year")?,
            end.parse().context("invalid end year")?,
        ),
        _ => (2012, 2024),
    };

    let matrix = registry.availability_matrix(start_year, end_year);
    print!("{:<14}", "source");
    for year in &matrix.years {
        print!(" {year}");
    }
    println!();
    for (source, flags) in &matrix.sources {
        print!("{:<14}", source.to_string());
        for flag in flags {
            print!(" {:>4}", if *flag { "x" } else { "-" });
        }
        println!();
    }
    println!("common years: {:?}", registry.common_available_years());

    if let Some(pos) = args.iter().position(|a| a == "--fetch") {
        let source = args
            .get(pos + 1)
            .and_then(|name| DataSource::from_name(name))
            .context("--fetch needs a source name (demographics|health|safety|livability)")?;
        let year: i32 = args
            .get(pos + 2)
            .context("--fetch needs a year")?
            .parse()
            .context("invalid fetch year")?;

        let fetcher = Arc::new(HttpOdataClient::new()?);
        let Some(client) = SourceClient::new(&registry, source, year, fetcher) else {
            bail!("{source} has no dataset for {year}");
        };
        let period = registry
            .period_code(source, year)
            .expect("year resolved above");

        let codes = GeographicCodes {
            municipality: CodeName {
                code: "GM0344".into(),
                name: "Utrecht".into(),
            },
            district: Some(CodeName {
                code: "WK034400".into(),
                name: "Binnenstad".into(),
            }),
            neighborhood: None,
        };

        let response = client.fetch_multi_level(&codes, &period).await;
        println!(
            "{source} {year}: national={} municipality={} district={}",
            response.national.is_some(),
            response.municipality.is_some(),
            response.district.is_some()
        );
    }

    Ok(())
}
