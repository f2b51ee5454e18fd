pub mod config;
mod missing_start_error;
mod ratelimit;
mod requests;
mod text_manipulators;

pub mod document_writer;
pub mod event;
pub mod redirect_resolver;
pub mod scraping_context;

mod event_scraper;
mod month_scraper;
mod scraper;
mod year_scraper;

#[cfg(test)]
mod test_support;

pub use config::{CrawlConfig, LoadFromEnv};
pub use document_writer::{DocumentWriter, WriteOutcome};
pub use event::Event;
pub use event_scraper::{EventOutcome, EventScraper, enrich_event};
pub use missing_start_error::MissingStartError;
pub use month_scraper::{MonthPage, MonthScraper, parse_month_page};
pub use redirect_resolver::{ArchiveMirror, Probe, RedirectResolver};
pub use requests::RequestClient;
pub use self::scraper::{ConferenceScraper, CrawlSummary, parse_year_links};
pub use scraping_context::ScrapingContext;
pub use year_scraper::{YearScraper, parse_month_links};
