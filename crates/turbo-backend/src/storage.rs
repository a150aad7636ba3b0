//! Object storage (`/storage/v1/object`).

use crate::{BackendClient, BackendError, Method};

/// Uploads files and resolves their public URLs.
pub struct StorageClient<'a> {
    client: &'a BackendClient,
}

impl<'a> StorageClient<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Upload `bytes` to `bucket/path`, overwriting any existing object,
    /// and return its public URL.
    pub fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: impl Into<Vec<u8>>,
        content_type: &str,
    ) -> Result<String, BackendError> {
        let path = normalize_path(path)?;
        if bucket.is_empty() {
            return Err(BackendError::InvalidRequest("empty bucket name".to_string()));
        }

        let request = self
            .client
            .request(Method::Post, &format!("/storage/v1/object/{}/{}", bucket, path))
            .header("Content-Type", content_type)
            .header("x-upsert", "true")
            .body(bytes);
        self.client.send(&request)?.error_for_status()?;

        Ok(self.public_url(bucket, &path))
    }

    /// Public URL of an object.
    pub fn public_url(&self, bucket: &str, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.client.base_url(),
            bucket,
            path.trim_start_matches('/')
        )
    }
}

fn normalize_path(path: &str) -> Result<String, BackendError> {
    let trimmed = path.trim().trim_start_matches('/');
    if trimmed.is_empty() || trimmed.split('/').any(|seg| seg.is_empty() || seg == "..") {
        return Err(BackendError::InvalidRequest(format!(
            "invalid object path: {:?}",
            path
        )));
    }
    Ok(trimmed.replace(' ', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MockTransport, Response};
    use std::collections::HashMap;
    use std::sync::Arc;

    #[test]
    fn test_upload_returns_public_url() {
        let mock = Arc::new(MockTransport::new());
        mock.push_response(Response::new(200, HashMap::new(), b"{}".to_vec()));
        let client = BackendClient::new("https://acme.dev", "anon", mock.clone());

        let url = client
            .storage()
            .upload("images", "/stores/s1/hero banner.png", vec![1, 2, 3], "image/png")
            .unwrap();

        assert_eq!(
            url,
            "https://acme.dev/storage/v1/object/public/images/stores/s1/hero-banner.png"
        );
        let sent = mock.last_request().unwrap();
        assert_eq!(
            sent.url,
            "https://acme.dev/storage/v1/object/images/stores/s1/hero-banner.png"
        );
        assert_eq!(sent.body.as_deref(), Some(&[1u8, 2, 3][..]));
        assert_eq!(sent.header_value("content-type"), Some("image/png"));
    }

    #[test]
    fn test_upload_rejects_traversal() {
        let mock = Arc::new(MockTransport::new());
        let client = BackendClient::new("https://acme.dev", "anon", mock.clone());

        let err = client
            .storage()
            .upload("images", "../secrets.txt", vec![0], "text/plain")
            .unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest(_)));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_upload_failure_propagates() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(413, serde_json::json!({"error": "Payload too large"}));
        let client = BackendClient::new("https://acme.dev", "anon", mock);

        let err = client
            .storage()
            .upload("images", "big.png", vec![0; 16], "image/png")
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 413: Payload too large");
    }
}
