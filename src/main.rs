use lanyrd_archiver::{ConferenceScraper, CrawlConfig, ScrapingContext};
use log::{LevelFilter, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let crawl_config = CrawlConfig::new()?;
    info!(
        "archiving {}{} into {}",
        crawl_config.archive_base_url, crawl_config.start_path, crawl_config.output_dir
    );

    let scraper = ConferenceScraper::new(ScrapingContext::new(crawl_config)?);
    let summary = scraper.run().await;

    info!(
        "done: {} years, {} month pages, {} written, {} already archived, {} discarded",
        summary.years_crawled,
        summary.month_pages_crawled,
        summary.events_written,
        summary.events_already_archived,
        summary.events_discarded
    );
    Ok(())
}
