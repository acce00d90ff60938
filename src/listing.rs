use crate::cache::{CacheKey, DayCache};
use crate::client::CodaClient;
use crate::error::Result;
use crate::projection::{OutputFormat, Projector, Record};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw listing calls (allows mocking in tests)
#[async_trait]
pub trait CodaApi: Send + Sync {
    /// Every doc visible to the caller
    async fn docs(&self) -> Result<Vec<Record>>;

    /// Every page of one doc
    async fn pages(&self, doc_id: &str) -> Result<Vec<Record>>;
}

#[async_trait]
impl CodaApi for CodaClient {
    async fn docs(&self) -> Result<Vec<Record>> {
        self.list_docs().await
    }

    async fn pages(&self, doc_id: &str) -> Result<Vec<Record>> {
        self.list_pages(doc_id).await
    }
}

/// The JSON object printed for a listing action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub items: Vec<Value>,
}

/// Projected docs and pages listings, memoized in the day cache
pub struct Listings<'a> {
    api: &'a dyn CodaApi,
    cache: &'a DayCache,
    projector: &'a Projector,
}

impl<'a> Listings<'a> {
    pub fn new(api: &'a dyn CodaApi, cache: &'a DayCache, projector: &'a Projector) -> Self {
        Self {
            api,
            cache,
            projector,
        }
    }

    pub async fn docs(&self, format: OutputFormat) -> Result<Listing> {
        let key = cache_key("list_docs", format);
        self.cache
            .get_or_fetch(&key, || async {
                let records = self.api.docs().await?;
                let items = self.projector.project_all(&records, format)?;
                Ok(Listing { items })
            })
            .await
    }

    /// Pages of every given doc, concatenated in argument order
    pub async fn pages(&self, doc_ids: &[String], format: OutputFormat) -> Result<Listing> {
        let key = doc_ids
            .iter()
            .fold(cache_key("list_pages", format), |key, id| key.arg(id.as_str()));

        self.cache
            .get_or_fetch(&key, || async {
                let mut items = Vec::new();
                for doc_id in doc_ids {
                    let records = self.api.pages(doc_id).await?;
                    items.extend(self.projector.project_all(&records, format)?);
                }
                Ok(Listing { items })
            })
            .await
    }
}

/// Launcher and plain results of the same call are cached separately
fn cache_key(function: &str, format: OutputFormat) -> CacheKey {
    match format {
        OutputFormat::Plain => CacheKey::new(function),
        OutputFormat::Launcher => CacheKey::new(format!("alfred_{function}")),
    }
}
