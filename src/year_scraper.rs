use std::sync::LazyLock;

use log::{info, warn};
use scraper::{Html, Selector};

use crate::{month_scraper::MonthScraper, scraper::CrawlSummary, scraping_context::ScrapingContext};

static MONTH_LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.month-summaries a").expect("valid selector"));

#[derive(Debug)]
pub struct YearScraper {
    pub url: String,
}

impl YearScraper {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    pub async fn scrape(&self, ctx: &ScrapingContext) -> CrawlSummary {
        let mut summary = CrawlSummary::default();
        info!("year {}", self.url);

        let Some(html) = ctx.redirect_resolver.resolve(&self.url).await else {
            warn!("year page unavailable, treating as empty: {}", self.url);
            return summary;
        };
        summary.years_crawled += 1;

        for month_url in parse_month_links(&html) {
            summary += MonthScraper::new(month_url).scrape(ctx).await;
        }
        summary
    }
}

/// Month listing links of a year page, in document order.
pub fn parse_month_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    document
        .select(&MONTH_LINK_SELECTOR)
        .filter_map(|link| link.value().attr("href"))
        .map(str::to_string)
        .collect()
}
