use std::sync::LazyLock;

use log::{debug, error};
use scraper::{Html, Selector};

use crate::{
    document_writer::WriteOutcome,
    event::Event,
    scraping_context::ScrapingContext,
    text_manipulators::{extract_text, original_site_url},
};

static TAG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.tags li a").expect("valid selector"));
static WEBSITE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.website").expect("valid selector"));
static TWITTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.twitter").expect("valid selector"));
static HASHTAG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a.hashtag").expect("valid selector"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Written,
    AlreadyArchived,
    Discarded,
}

#[derive(Debug)]
pub struct EventScraper {
    pub event: Event,
}

impl EventScraper {
    pub fn new(event: Event) -> Self {
        Self { event }
    }

    pub async fn scrape(self, ctx: &ScrapingContext) -> EventOutcome {
        let mut event = self.event;
        event.tags.clear();

        // Checked before any request so that re-runs are free.
        match ctx.document_writer.is_archived(&event).await {
            Ok(true) => {
                debug!("skipping {:?}, already archived", event.title);
                return EventOutcome::AlreadyArchived;
            }
            Ok(false) => {}
            Err(e) => {
                error!("discarding {:?}: {:#}", event.title, e);
                return EventOutcome::Discarded;
            }
        }

        let html = match event.url.as_deref() {
            Some(url) => ctx.redirect_resolver.resolve(url).await,
            None => None,
        };
        match html {
            Some(html) => enrich_event(&mut event, &html),
            // The event page itself was never archived.
            None => event.url = None,
        }
        event.clean();

        match ctx.document_writer.write(&event).await {
            Ok(WriteOutcome::Written(_)) => EventOutcome::Written,
            Ok(WriteOutcome::AlreadyArchived(_)) => EventOutcome::AlreadyArchived,
            Err(e) => {
                error!("discarding {:?}: {:#}", event.title, e);
                EventOutcome::Discarded
            }
        }
    }
}

/// Fills in tags, website and social handles from an archived event page.
pub fn enrich_event(event: &mut Event, html: &str) {
    let document = Html::parse_document(html);

    event.tags = document.select(&TAG_SELECTOR).map(extract_text).collect();
    event.url = document
        .select(&WEBSITE_SELECTOR)
        .next()
        .and_then(|node| node.value().attr("href"))
        .and_then(original_site_url);
    event.twitter = joined_text(&document, &TWITTER_SELECTOR);
    event.hashtag = joined_text(&document, &HASHTAG_SELECTOR);
}

/// Text of every match, concatenated in document order. `None` when empty.
fn joined_text(document: &Html, selector: &Selector) -> Option<String> {
    let text: String = document.select(selector).map(extract_text).collect();
    (!text.is_empty()).then_some(text)
}
