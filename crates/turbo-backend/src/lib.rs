//! Request/response client for the managed backend.
//!
//! The storefront builder treats the backend as an opaque collaborator. This
//! crate gives it three entry points, all going through one [`Transport`]:
//!
//! - **Tables**: filtered select/insert/upsert/update/delete
//! - **Storage**: object upload returning a public URL
//! - **Functions**: named serverless functions with a JSON body
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use turbo_backend::{BackendClient, Function, MockTransport};
//!
//! let client = BackendClient::new("https://acme.backend.dev", "anon-key", Arc::new(MockTransport::new()));
//!
//! let pages: Vec<serde_json::Value> = client
//!     .table("landing_pages")
//!     .select("*")
//!     .eq("store_id", "store-1")
//!     .limit(10)
//!     .fetch()?;
//!
//! let url = client.storage().upload("images", "logo.png", bytes, "image/png")?;
//!
//! let trends = client
//!     .functions()
//!     .invoke(Function::MarketplaceTrends, &serde_json::json!({"days": 7}))?;
//! ```

mod error;
mod functions;
mod request;
mod response;
mod storage;
mod tables;
mod transport;

use std::sync::Arc;

pub use error::BackendError;
pub use functions::{Function, FunctionsClient};
pub use request::{Method, Request};
pub use response::Response;
pub use storage::StorageClient;
pub use tables::{Order, Query, TableClient};
pub use transport::{MockTransport, Transport};

/// Client bound to one backend project.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    api_key: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the project at `base_url`.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            transport,
        }
    }

    /// Project base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Access a database table.
    pub fn table(&self, name: impl Into<String>) -> TableClient<'_> {
        TableClient::new(self, name.into())
    }

    /// Access object storage.
    pub fn storage(&self) -> StorageClient<'_> {
        StorageClient::new(self)
    }

    /// Access serverless functions.
    pub fn functions(&self) -> FunctionsClient<'_> {
        FunctionsClient::new(self)
    }

    /// Start a request against `path`, with project credentials attached.
    pub(crate) fn request(&self, method: Method, path: &str) -> Request {
        Request::new(method, format!("{}{}", self.base_url, path))
            .header("apikey", self.api_key.clone())
            .bearer_auth(&self.api_key)
    }

    pub(crate) fn send(&self, request: &Request) -> Result<Response, BackendError> {
        self.transport.send(request)
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        BackendClient, BackendError, Function, Method, MockTransport, Order, Request, Response,
        Transport,
    };
}
