use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use bus_timetable::config::{CrawlConfig, DEFAULT_OUTPUT_DIR};
use bus_timetable::crawler::{CrawlReport, Crawler};
use bus_timetable::extract::day_types;
use bus_timetable::its::{
    DEFAULT_DETAIL_URL, DEFAULT_LISTING_URL, ItsClient, ItsConfig, MockPageSource, PageSource,
};
use bus_timetable::output::ScheduleWriter;

/// Crawl bus timetables and write one JSON schedule per route.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Only crawl this route number, e.g. "34-1"
    #[arg(short, long)]
    route: Option<String>,

    /// Output directory; schedules go to <output>/schedules
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    output: PathBuf,

    /// Listing page URL
    #[arg(long, env = "ITS_LISTING_URL", default_value = DEFAULT_LISTING_URL)]
    listing_url: String,

    /// Timetable page URL
    #[arg(long, env = "ITS_DETAIL_URL", default_value = DEFAULT_DETAIL_URL)]
    detail_url: String,

    /// Timetable pages fetched at once
    #[arg(long, default_value_t = 4)]
    concurrency: usize,

    /// Pause after each request, in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Read saved pages from this directory instead of the live site
    #[arg(long)]
    fixtures: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = CrawlConfig::new(&cli.output)
        .with_route_filter(cli.route.clone())
        .with_concurrency(cli.concurrency);
    let writer = ScheduleWriter::new(&config.output_dir);

    let report = match &cli.fixtures {
        Some(dir) => {
            let source = MockPageSource::from_dir(dir)?;
            info!(dir = %dir.display(), pages = source.detail_count(), "using saved pages");
            crawl(source, config, &writer).await?
        }
        None => {
            let its = ItsConfig::new()
                .with_listing_url(&cli.listing_url)
                .with_detail_url(&cli.detail_url)
                .with_max_concurrent(cli.concurrency)
                .with_request_delay(Duration::from_millis(cli.delay_ms));
            crawl(ItsClient::new(its)?, config, &writer).await?
        }
    };

    for (identifier, reason) in &report.failed {
        error!(route = %identifier, reason = %reason, "timetable page not fetched");
    }

    println!(
        "Saved {} route(s) to {} ({} of {} timetable pages fetched)",
        report.routes.len(),
        writer.dir().display(),
        report.fetched,
        report.identifiers,
    );
    for route in report.routes.values() {
        let days: Vec<&str> = day_types(route).iter().map(|d| d.as_str()).collect();
        println!("  {:<8} {} [{}]", route.route_name(), route.description(), days.join(", "));
    }

    Ok(())
}

async fn crawl<S: PageSource>(
    source: S,
    config: CrawlConfig,
    writer: &ScheduleWriter,
) -> Result<CrawlReport, Box<dyn std::error::Error>> {
    Ok(Crawler::new(source, config).crawl_and_save(writer).await?)
}
