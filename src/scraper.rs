use std::{
    collections::VecDeque,
    ops::{Add, AddAssign},
    sync::{LazyLock, Mutex, PoisonError},
};

use futures::future::join_all;
use log::{debug, error, info};
use scraper::{Html, Selector};

use crate::{
    event_scraper::EventOutcome, scraping_context::ScrapingContext, year_scraper::YearScraper,
};

static YEAR_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.primary p a").expect("valid selector"));

/// Tally of what a crawl (or any part of one) did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub years_crawled: usize,
    pub month_pages_crawled: usize,
    pub events_written: usize,
    pub events_already_archived: usize,
    pub events_discarded: usize,
}

impl CrawlSummary {
    pub fn record_event(&mut self, outcome: EventOutcome) {
        match outcome {
            EventOutcome::Written => self.events_written += 1,
            EventOutcome::AlreadyArchived => self.events_already_archived += 1,
            EventOutcome::Discarded => self.events_discarded += 1,
        }
    }
}

impl Add for CrawlSummary {
    type Output = CrawlSummary;

    fn add(self, other: CrawlSummary) -> Self {
        Self {
            years_crawled: self.years_crawled + other.years_crawled,
            month_pages_crawled: self.month_pages_crawled + other.month_pages_crawled,
            events_written: self.events_written + other.events_written,
            events_already_archived: self.events_already_archived + other.events_already_archived,
            events_discarded: self.events_discarded + other.events_discarded,
        }
    }
}

impl AddAssign for CrawlSummary {
    fn add_assign(&mut self, other: CrawlSummary) {
        *self = *self + other;
    }
}

/// Crawls every in-scope year of the conference archive.
pub struct ConferenceScraper {
    pub context: ScrapingContext,
}

impl ConferenceScraper {
    pub fn new(context: ScrapingContext) -> Self {
        Self { context }
    }

    pub async fn run(&self) -> CrawlSummary {
        let config = &self.context.crawl_config;
        let Some(html) = self.context.redirect_resolver.resolve(&config.start_path).await else {
            error!("conference index unavailable: {}", config.start_path);
            return CrawlSummary::default();
        };

        let year_urls = self.select_year_urls(parse_year_links(&html));
        info!(
            "{} years queued, {} at a time",
            year_urls.len(),
            config.concurrency
        );

        let queue = Mutex::new(VecDeque::from(year_urls));
        let workers = (0..config.concurrency).map(|worker_id| self.year_worker(worker_id, &queue));
        join_all(workers)
            .await
            .into_iter()
            .fold(CrawlSummary::default(), |total, summary| total + summary)
    }

    /// Drops the leading `year_skip` links and anything outside the year range.
    pub fn select_year_urls(&self, hrefs: Vec<String>) -> Vec<String> {
        let config = &self.context.crawl_config;
        hrefs
            .into_iter()
            .skip(config.year_skip)
            .filter(|href| {
                match self.context.archive_url_year_extractor.extract_year(href) {
                    Ok(year) if config.is_year_in_scope(year) => true,
                    Ok(year) => {
                        debug!("year {} out of range: {}", year, href);
                        false
                    }
                    Err(e) => {
                        debug!("not a year listing: {}", e);
                        false
                    }
                }
            })
            .map(|href| self.context.redirect_resolver.archive_path(&href))
            .collect()
    }

    // Pops one year at a time and crawls it fully before taking the next.
    async fn year_worker(&self, worker_id: usize, queue: &Mutex<VecDeque<String>>) -> CrawlSummary {
        let mut summary = CrawlSummary::default();
        loop {
            let next = queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            let Some(year_url) = next else {
                break;
            };
            debug!("worker {} takes {}", worker_id, year_url);
            summary += YearScraper::new(year_url).scrape(&self.context).await;
        }
        info!("worker {} done", worker_id);
        summary
    }
}

/// Year listing links of the conference index, in document order.
pub fn parse_year_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&YEAR_LINK_SELECTOR)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .collect()
}
