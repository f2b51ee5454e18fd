use std::{collections::HashSet, sync::LazyLock};

use log::{info, warn};
use scraper::{ElementRef, Html, Selector};

use crate::{
    event::Event,
    event_scraper::EventScraper,
    scraper::CrawlSummary,
    scraping_context::ScrapingContext,
    text_manipulators::{extract_text, page_number},
};

static CONFERENCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("li.conference").expect("valid selector"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h4 a").expect("valid selector"));
static LOCATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.location").expect("valid selector"));
static START_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("abbr.dtstart").expect("valid selector"));
static END_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("abbr.dtend").expect("valid selector"));
static PAGINATION_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.pagination ol li a").expect("valid selector"));

/// What one page of a month listing holds.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct MonthPage {
    pub events: Vec<Event>,
    pub next_page: Option<String>,
}

#[derive(Debug)]
pub struct MonthScraper {
    pub url: String,
}

impl MonthScraper {
    pub fn new(url: String) -> Self {
        Self { url }
    }

    /// Crawls every page of the month, extracting events in page order.
    pub async fn scrape(&self, ctx: &ScrapingContext) -> CrawlSummary {
        let mut summary = CrawlSummary::default();
        let mut visited = HashSet::new();
        let mut next_url = Some(ctx.redirect_resolver.archive_path(&self.url));

        while let Some(url) = next_url.take() {
            if !visited.insert(url.clone()) {
                warn!("pagination loops back to {}, stopping", url);
                break;
            }
            info!("month {}", url);
            let Some(html) = ctx.redirect_resolver.resolve(&url).await else {
                break;
            };
            summary.month_pages_crawled += 1;

            let month_page = parse_month_page(&html, page_number(&url));
            for event in month_page.events {
                let outcome = EventScraper::new(event).scrape(ctx).await;
                summary.record_event(outcome);
            }

            next_url = month_page
                .next_page
                .map(|href| ctx.redirect_resolver.archive_path(&href));
        }

        summary
    }
}

pub fn parse_month_page(html: &str, current_page: u32) -> MonthPage {
    let document = Html::parse_document(html);

    let events = document
        .select(&CONFERENCE_SELECTOR)
        .map(parse_event_summary)
        .collect();

    // The last representable page has no successor.
    let next_page = current_page.checked_add(1).and_then(|next| {
        let next_label = next.to_string();
        document
            .select(&PAGINATION_SELECTOR)
            .find(|link| extract_text(*link).trim() == next_label)
            .and_then(|link| link.value().attr("href"))
            .map(str::to_string)
    });

    MonthPage { events, next_page }
}

fn parse_event_summary(item: ElementRef) -> Event {
    let title_link = item.select(&TITLE_SELECTOR).next();
    Event {
        title: title_link.map(extract_text).unwrap_or_default(),
        url: title_link
            .and_then(|link| link.value().attr("href"))
            .filter(|href| !href.trim().is_empty())
            .map(str::to_string),
        location: item
            .select(&LOCATION_SELECTOR)
            .next()
            .map(extract_text)
            .unwrap_or_default(),
        start: date_attr(item, &START_SELECTOR),
        end: date_attr(item, &END_SELECTOR),
        ..Event::default()
    }
}

fn date_attr(item: ElementRef, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .and_then(|abbr| abbr.value().attr("title"))
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .map(str::to_string)
}
