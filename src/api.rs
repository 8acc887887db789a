use std::path::Path;

use crate::config::SourceConfig;
use crate::error::{KodikError, Result};
use crate::feed::Feed;
use crate::interpret::{first_record, results, translate_failure, usable_records};
use crate::record::VideoFactory;
use crate::request::{check_title, redacted, search_url, SearchQuery};
use crate::storage::TokenCache;
use crate::transport::{Response, Transport};

/// Kodik search client. Owns its source, transport, token cache and video factory.
pub struct KodikApi<T, C, F> {
    source: SourceConfig,
    transport: T,
    cache: C,
    factory: F,
}

impl<T, C, F> KodikApi<T, C, F>
where
    T: Transport,
    C: TokenCache,
    F: VideoFactory,
{
    pub fn new(source: SourceConfig, transport: T, cache: C, factory: F) -> Self {
        Self { source, transport, cache, factory }
    }

    pub fn source(&self) -> &SourceConfig { &self.source }
    pub fn cache(&self) -> &C { &self.cache }

    /// Probe the API with the configured token.
    ///
    /// With `use_cache`, a token already validated for this origin is accepted
    /// without a request. A successful probe is remembered in the cache.
    pub async fn access_checking(&self, use_cache: bool) -> Result<bool> {
        let token = self.source.token.as_str();
        let origin = self.source.origin.as_str();

        if use_cache && self.cache.has_api_token(token, origin).await.map_err(KodikError::Cache)? {
            tracing::debug!(origin, "token already validated");
            return Ok(true);
        }

        self.fetch(SearchQuery::Probe).await?;

        self.cache.add_api_token(token, origin).await.map_err(KodikError::Cache)?;
        tracing::info!(origin, "token validated");
        Ok(true)
    }

    /// Search by title; returns every usable hit, in API order.
    pub async fn get_videos(&self, title: &str) -> Result<Vec<F::Video>> {
        check_title(title)?;
        let response = self.fetch(SearchQuery::Title(title)).await?;
        let records = usable_records(results(&response.body)?)?;
        tracing::debug!(title, found = records.len(), "search finished");
        Ok(records.into_iter().map(|r| self.factory.create(r)).collect())
    }

    /// Look up one material by its Kodik id.
    pub async fn get_video(&self, id: &str) -> Result<F::Video> {
        if id.is_empty() {
            return Err(KodikError::InvalidArgument("material id is missing".to_string()));
        }
        let response = self.fetch(SearchQuery::Id(id)).await?;
        let record = first_record(results(&response.body)?)?;
        Ok(self.factory.create(record))
    }

    /// Feed dumps are not downloaded yet: nothing is fetched or written and
    /// `on_progress` is never called.
    pub async fn download_feed(
        &self,
        feed: &Feed,
        destination: &Path,
        _on_progress: Option<&mut (dyn FnMut(u64) + Send)>,
    ) -> Result<()> {
        tracing::debug!(feed = %feed.name, destination = %destination.display(), "feed download is not supported, skipping");
        Ok(())
    }

    async fn fetch(&self, query: SearchQuery<'_>) -> Result<Response> {
        let url = search_url(&self.source, query)?;
        self.transport.send_get(&url).await.map_err(|failure| {
            tracing::debug!(url = %redacted(&url), %failure, "request failed");
            translate_failure(failure)
        })
    }
}
