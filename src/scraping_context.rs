use std::sync::Arc;

use crate::{
    config::{ArchiveUrlYearExtractor, CrawlConfig},
    document_writer::DocumentWriter,
    redirect_resolver::{ArchiveMirror, RedirectResolver},
    requests::RequestClient,
};

pub struct ScrapingContext {
    pub crawl_config: CrawlConfig,
    pub archive_url_year_extractor: ArchiveUrlYearExtractor,
    pub redirect_resolver: RedirectResolver,
    pub document_writer: DocumentWriter,
}

impl ScrapingContext {
    pub fn new(crawl_config: CrawlConfig) -> anyhow::Result<Self> {
        let request_client = RequestClient::new(&crawl_config)?;
        Self::with_mirror(crawl_config, Arc::new(request_client))
    }

    pub fn with_mirror(
        crawl_config: CrawlConfig,
        mirror: Arc<dyn ArchiveMirror>,
    ) -> anyhow::Result<Self> {
        let archive_url_year_extractor = ArchiveUrlYearExtractor::new()?;
        let redirect_resolver = RedirectResolver::new(
            mirror,
            crawl_config.archive_base_url.clone(),
            crawl_config.max_redirects,
        );
        let document_writer = DocumentWriter::new(&crawl_config.output_dir);
        Ok(ScrapingContext {
            crawl_config,
            archive_url_year_extractor,
            redirect_resolver,
            document_writer,
        })
    }
}
