//! Saved page documents and where they are kept.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use turbo_backend::BackendClient;

use crate::config::BackendConfig;
use crate::error::BuilderError;
use crate::ids::{PageId, WidgetId};
use crate::model::Page;

/// Document format written by this build.
pub const DOCUMENT_VERSION: u32 = 1;

/// A page as persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDocument {
    pub version: u32,
    pub page: Page,
    pub saved_at: DateTime<Utc>,
}

impl PageDocument {
    /// Snapshot `page` now.
    pub fn new(page: &Page) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            page: page.clone(),
            saved_at: Utc::now(),
        }
    }

    pub fn to_json(&self) -> Result<String, BuilderError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Decode a stored document, refusing newer formats and broken trees,
    /// and reseed the page's id allocator.
    pub fn from_value(value: Value) -> Result<Self, BuilderError> {
        let found = value
            .get("version")
            .and_then(Value::as_u64)
            .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));
        if found > DOCUMENT_VERSION {
            return Err(BuilderError::UnsupportedVersion {
                found,
                supported: DOCUMENT_VERSION,
            });
        }
        let mut doc: PageDocument = serde_json::from_value(value)?;
        doc.page.validate()?;
        doc.page.reseed_ids();
        Ok(doc)
    }
}

/// Storage for page documents.
pub trait PageRepository: Send + Sync {
    fn save(&self, document: &PageDocument) -> Result<(), BuilderError>;

    /// `Ok(None)` when no document has this id.
    fn load(&self, page_id: &PageId) -> Result<Option<PageDocument>, BuilderError>;
}

/// Documents kept in process memory, serialized as they would be stored.
#[derive(Debug, Default)]
pub struct MemoryPageRepository {
    documents: Mutex<HashMap<String, String>>,
}

impl MemoryPageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        match self.documents.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PageRepository for MemoryPageRepository {
    fn save(&self, document: &PageDocument) -> Result<(), BuilderError> {
        let json = document.to_json()?;
        self.lock().insert(document.page.id.to_string(), json);
        Ok(())
    }

    fn load(&self, page_id: &PageId) -> Result<Option<PageDocument>, BuilderError> {
        let stored = self.lock().get(page_id.as_str()).cloned();
        stored.map(|json| PageDocument::from_json(&json)).transpose()
    }
}

/// One row of the pages table.
#[derive(Debug, Serialize, Deserialize)]
struct PageRow {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    store_id: Option<String>,
    document: Value,
    updated_at: DateTime<Utc>,
}

/// Documents stored in a backend table, one row per page.
#[derive(Debug, Clone)]
pub struct BackendPageRepository {
    client: BackendClient,
    table: String,
    store_id: Option<String>,
}

impl BackendPageRepository {
    pub fn new(client: BackendClient, table: impl Into<String>) -> Self {
        Self {
            client,
            table: table.into(),
            store_id: None,
        }
    }

    /// Repository as described by the backend config.
    pub fn from_config(client: BackendClient, config: &BackendConfig) -> Self {
        Self {
            client,
            table: config.pages_table.clone(),
            store_id: config.store_id.clone(),
        }
    }

    /// Scope reads and writes to one tenant.
    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }
}

impl PageRepository for BackendPageRepository {
    fn save(&self, document: &PageDocument) -> Result<(), BuilderError> {
        let row = PageRow {
            id: document.page.id.to_string(),
            store_id: self.store_id.clone(),
            document: serde_json::to_value(document)?,
            updated_at: document.saved_at,
        };
        self.client
            .table(self.table.as_str())
            .upsert(&row, "id")
            .execute()?;
        Ok(())
    }

    fn load(&self, page_id: &PageId) -> Result<Option<PageDocument>, BuilderError> {
        let mut query = self
            .client
            .table(self.table.as_str())
            .select("document")
            .eq("id", page_id.as_str());
        if let Some(store_id) = &self.store_id {
            query = query.eq("store_id", store_id);
        }
        let row: Option<Value> = query.fetch_one()?;
        match row.and_then(|mut r| r.get_mut("document").map(Value::take)) {
            Some(document) => PageDocument::from_value(document).map(Some),
            None => Ok(None),
        }
    }
}

/// Uploads images for widgets into object storage.
#[derive(Debug, Clone)]
pub struct ImageUploader {
    client: BackendClient,
    bucket: String,
    prefix: Option<String>,
}

impl ImageUploader {
    pub fn new(client: BackendClient, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: None,
        }
    }

    /// Uploader as described by the backend config; objects go under the
    /// store id when there is one.
    pub fn from_config(client: BackendClient, config: &BackendConfig) -> Self {
        Self {
            client,
            bucket: config.images_bucket.clone(),
            prefix: config.store_id.clone(),
        }
    }

    /// Object path for an image of `widget_id` on `page_id`.
    pub fn object_path(&self, page_id: &PageId, widget_id: &WidgetId, file_name: &str) -> String {
        let file = file_name.rsplit('/').next().unwrap_or(file_name);
        let path = format!("{}/{}-{}", page_id, widget_id, file);
        match &self.prefix {
            Some(prefix) => format!("{}/{}", prefix, path),
            None => path,
        }
    }

    /// Upload and return the public URL.
    pub fn upload(
        &self,
        page_id: &PageId,
        widget_id: &WidgetId,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BuilderError> {
        if !content_type.starts_with("image/") {
            return Err(BuilderError::invalid(
                "content_type",
                format!("expected an image, got {}", content_type),
            ));
        }
        let path = self.object_path(page_id, widget_id, file_name);
        Ok(self
            .client
            .storage()
            .upload(&self.bucket, &path, bytes, content_type)?)
    }
}
