use std::num::NonZeroU32;

use anyhow::Context;
use nonzero_ext::nonzero;
use regex::Regex;
use serde::{Deserialize, de::DeserializeOwned};

pub const DEFAULT_ARCHIVE_BASE_URL: &str = "https://web.archive.org";
pub const DEFAULT_START_PATH: &str = "/web/20161112004018/http://lanyrd.com/conferences/";
pub const DEFAULT_OUTPUT_DIR: &str = "confs";
// The first links on the conferences page are the newest years, which the
// archive only holds placeholder pages for.
pub const DEFAULT_YEAR_SKIP: usize = 8;
pub const DEFAULT_YEAR_CEILING: u16 = 2017;
pub const DEFAULT_CONCURRENCY: usize = 3;
pub const DEFAULT_MAX_REDIRECTS: usize = 20;
pub const DEFAULT_REQ_PER_SEC: NonZeroU32 = nonzero!(5u32);

pub type Year = u16;

/// The env vars that can override the crawl defaults. All optional.
#[derive(Debug, Default, Deserialize)]
pub struct CrawlEnv {
    archive_base_url: Option<String>,
    start_path: Option<String>,
    output_dir: Option<String>,
    year_skip: Option<usize>,
    year_floor: Option<Year>,
    year_ceiling: Option<Year>,
    concurrency: Option<usize>,
    max_redirects: Option<usize>,
    requests_per_second: Option<u32>,
}

/// Everything the crawl needs to know up front.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub archive_base_url: String,
    pub start_path: String,
    pub output_dir: String,
    pub year_skip: usize,
    pub year_floor: Option<Year>,
    pub year_ceiling: Year,
    pub concurrency: usize,
    pub max_redirects: usize,
    pub requests_per_second: NonZeroU32,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            archive_base_url: DEFAULT_ARCHIVE_BASE_URL.to_string(),
            start_path: DEFAULT_START_PATH.to_string(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            year_skip: DEFAULT_YEAR_SKIP,
            year_floor: None,
            year_ceiling: DEFAULT_YEAR_CEILING,
            concurrency: DEFAULT_CONCURRENCY,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            requests_per_second: DEFAULT_REQ_PER_SEC,
        }
    }
}

impl CrawlConfig {
    pub fn new() -> anyhow::Result<Self> {
        let crawl_env = CrawlEnv::load_from_env()?;
        Self::from_env(crawl_env)
    }

    pub fn from_env(crawl_env: CrawlEnv) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let concurrency = crawl_env.concurrency.unwrap_or(defaults.concurrency);
        if concurrency == 0 {
            anyhow::bail!("CONCURRENCY must be at least 1");
        }
        let requests_per_second = match crawl_env.requests_per_second {
            Some(rps) => NonZeroU32::new(rps).context("REQUESTS_PER_SECOND must be at least 1")?,
            None => defaults.requests_per_second,
        };

        Ok(Self {
            archive_base_url: crawl_env
                .archive_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.archive_base_url),
            start_path: crawl_env.start_path.unwrap_or(defaults.start_path),
            output_dir: crawl_env.output_dir.unwrap_or(defaults.output_dir),
            year_skip: crawl_env.year_skip.unwrap_or(defaults.year_skip),
            year_floor: crawl_env.year_floor.or(defaults.year_floor),
            year_ceiling: crawl_env.year_ceiling.unwrap_or(defaults.year_ceiling),
            concurrency,
            max_redirects: crawl_env.max_redirects.unwrap_or(defaults.max_redirects),
            requests_per_second,
        })
    }

    pub fn is_year_in_scope(&self, year: Year) -> bool {
        year <= self.year_ceiling && self.year_floor.is_none_or(|floor| year >= floor)
    }
}

pub struct ArchiveUrlYearExtractor {
    // Regex that can be used to extract the year from an archived lanyrd listing url.
    year_extraction_regex: Regex,
}

impl ArchiveUrlYearExtractor {
    pub fn new() -> anyhow::Result<Self> {
        let year_extraction_regex = Regex::new(r"lanyrd\.com(?::\d+)?/(\d{4})/")?;
        Ok(Self {
            year_extraction_regex,
        })
    }

    pub fn extract_year(&self, archive_url: &str) -> anyhow::Result<Year> {
        let Some(caps) = self.year_extraction_regex.captures(archive_url) else {
            return Err(anyhow::anyhow!(
                "couldn't find year in provided url: {}",
                archive_url
            ));
        };
        let Some(match_) = caps.get(1) else {
            return Err(anyhow::anyhow!(
                "couldn't find year in provided url: {}",
                archive_url
            ));
        };
        let year = match_.as_str().parse::<Year>()?;
        Ok(year)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
