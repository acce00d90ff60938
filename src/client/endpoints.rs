// Coda API endpoint functions.
// Typed wrappers over the paginated listing calls.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{CodaError, Result};
use crate::projection::Record;

use super::CodaClient;

/// A table within a doc
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Table {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl CodaClient {
    /// List every doc visible to the token
    pub async fn list_docs(&self) -> Result<Vec<Record>> {
        self.get_all(self.docs_url(), &[("query", "")]).await
    }

    /// List every page of a doc
    pub async fn list_pages(&self, doc_id: &str) -> Result<Vec<Record>> {
        let url = format!("{}/{}/pages/", self.docs_url(), doc_id);
        self.get_all(&url, &[("limit", "1000")]).await
    }

    pub async fn list_tables(&self, doc_id: &str) -> Result<Vec<Table>> {
        let url = format!("{}/{}/tables/", self.docs_url(), doc_id);
        self.get_all(&url, &[])
            .await?
            .into_iter()
            .map(|record| {
                serde_json::from_value(Value::Object(record))
                    .map_err(|e| CodaError::Payload(format!("malformed table in {url}: {e}")))
            })
            .collect()
    }

    /// Column names of a table, in API order
    pub async fn list_columns(&self, doc_id: &str, table_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/{}/tables/{}/columns/", self.docs_url(), doc_id, table_id);
        self.get_all(&url, &[])
            .await?
            .into_iter()
            .map(|column| match column.get("name") {
                Some(Value::String(name)) => Ok(name.clone()),
                _ => Err(CodaError::Payload(format!("column without a name in {url}"))),
            })
            .collect()
    }

    /// Cell values of every row, in the order the API lists them
    pub async fn list_rows(&self, doc_id: &str, table_id: &str) -> Result<Vec<Vec<Value>>> {
        let url = format!("{}/{}/tables/{}/rows/", self.docs_url(), doc_id, table_id);
        self.get_all(&url, &[])
            .await?
            .into_iter()
            .map(|mut row| match row.remove("values") {
                Some(Value::Object(values)) => Ok(values.into_iter().map(|(_, v)| v).collect()),
                _ => Err(CodaError::Payload(format!("row without values in {url}"))),
            })
            .collect()
    }
}
