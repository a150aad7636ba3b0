//! Filtered table access (`/rest/v1/{table}`).

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{BackendClient, BackendError, Method, Request, Response};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "asc",
            Order::Desc => "desc",
        }
    }
}

/// Entry point for one table.
pub struct TableClient<'a> {
    client: &'a BackendClient,
    table: String,
}

impl<'a> TableClient<'a> {
    pub(crate) fn new(client: &'a BackendClient, table: String) -> Self {
        Self { client, table }
    }

    /// Select `columns` (`"*"` for all).
    pub fn select(self, columns: &str) -> Query<'a> {
        let request = self.base(Method::Get).query("select", columns);
        Query::new(self.client, self.table, request)
    }

    /// Insert one row (or an array of rows) and return the stored representation.
    pub fn insert<T: Serialize + ?Sized>(self, rows: &T) -> Query<'a> {
        let request = self
            .base(Method::Post)
            .header("Prefer", "return=representation")
            .json(rows);
        Query::from_result(self.client, self.table, request)
    }

    /// Insert or merge on the `on_conflict` column.
    pub fn upsert<T: Serialize + ?Sized>(self, rows: &T, on_conflict: &str) -> Query<'a> {
        let request = self
            .base(Method::Post)
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .query("on_conflict", on_conflict)
            .json(rows);
        Query::from_result(self.client, self.table, request)
    }

    /// Patch the rows matched by the filters added afterwards.
    pub fn update<T: Serialize + ?Sized>(self, patch: &T) -> Query<'a> {
        let request = self
            .base(Method::Patch)
            .header("Prefer", "return=representation")
            .json(patch);
        Query::from_result(self.client, self.table, request)
    }

    /// Delete the rows matched by the filters added afterwards.
    pub fn delete(self) -> Query<'a> {
        let request = self.base(Method::Delete);
        Query::new(self.client, self.table, request)
    }

    fn base(&self, method: Method) -> Request {
        self.client
            .request(method, &format!("/rest/v1/{}", self.table))
    }
}

/// A table request being assembled.
pub struct Query<'a> {
    client: &'a BackendClient,
    table: String,
    request: Result<Request, BackendError>,
    filtered: bool,
}

impl<'a> Query<'a> {
    fn new(client: &'a BackendClient, table: String, request: Request) -> Self {
        Self::from_result(client, table, Ok(request))
    }

    fn from_result(
        client: &'a BackendClient,
        table: String,
        request: Result<Request, BackendError>,
    ) -> Self {
        Self {
            client,
            table,
            request,
            filtered: false,
        }
    }

    fn filter(mut self, column: &str, op: &str, value: &str) -> Self {
        self.filtered = true;
        self.request = self
            .request
            .map(|r| r.query(column, format!("{}.{}", op, value)));
        self
    }

    /// `column = value`
    pub fn eq(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "eq", value.as_ref())
    }

    /// `column <> value`
    pub fn neq(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "neq", value.as_ref())
    }

    /// `column > value`
    pub fn gt(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "gt", value.as_ref())
    }

    /// `column < value`
    pub fn lt(self, column: &str, value: impl AsRef<str>) -> Self {
        self.filter(column, "lt", value.as_ref())
    }

    /// Case-insensitive pattern match, `*` is the wildcard.
    pub fn ilike(self, column: &str, pattern: impl AsRef<str>) -> Self {
        self.filter(column, "ilike", pattern.as_ref())
    }

    /// `column IN (values...)`
    pub fn is_in(self, column: &str, values: &[&str]) -> Self {
        let list = format!("({})", values.join(","));
        self.filter(column, "in", &list)
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, order: Order) -> Self {
        self.request = self
            .request
            .map(|r| r.query("order", format!("{}.{}", column, order.as_str())));
        self
    }

    /// Limit the number of rows returned.
    pub fn limit(mut self, count: usize) -> Self {
        self.request = self.request.map(|r| r.query("limit", count.to_string()));
        self
    }

    /// The request that would be sent.
    pub fn request(&self) -> Result<&Request, &BackendError> {
        self.request.as_ref()
    }

    /// Send the request.
    pub fn execute(self) -> Result<Response, BackendError> {
        validate_table_name(&self.table)?;
        let request = self.request?;
        if matches!(request.method, Method::Patch | Method::Delete) && !self.filtered {
            return Err(BackendError::InvalidRequest(format!(
                "refusing to {} every row of {}",
                request.method.as_str(),
                self.table
            )));
        }
        self.client.send(&request)?.error_for_status()
    }

    /// Send the request and decode the returned rows.
    pub fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, BackendError> {
        let response = self.execute()?;
        if response.body.is_empty() {
            return Ok(Vec::new());
        }
        response.json()
    }

    /// Send the request and decode the first returned row, if any.
    pub fn fetch_one<T: DeserializeOwned>(self) -> Result<Option<T>, BackendError> {
        Ok(self.limit(1).fetch::<T>()?.into_iter().next())
    }
}

fn validate_table_name(table: &str) -> Result<(), BackendError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(BackendError::InvalidRequest(format!(
            "invalid table name: {:?}",
            table
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn client_with(mock: &Arc<MockTransport>) -> BackendClient {
        BackendClient::new("https://acme.dev", "anon", mock.clone())
    }

    #[test]
    fn test_select_builds_filters() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, json!([{"id": "o1"}, {"id": "o2"}]));
        let client = client_with(&mock);

        let rows: Vec<serde_json::Value> = client
            .table("orders")
            .select("id,total")
            .eq("store_id", "s1")
            .is_in("status", &["paid", "shipped"])
            .order("created_at", Order::Desc)
            .limit(20)
            .fetch()
            .unwrap();

        assert_eq!(rows.len(), 2);
        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, Method::Get);
        assert_eq!(
            sent.full_url(),
            "https://acme.dev/rest/v1/orders?select=id,total&store_id=eq.s1\
             &status=in.(paid,shipped)&order=created_at.desc&limit=20"
        );
    }

    #[test]
    fn test_fetch_one_empty() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(200, json!([]));
        let client = client_with(&mock);

        let row: Option<serde_json::Value> = client
            .table("products")
            .select("*")
            .eq("id", "missing")
            .fetch_one()
            .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_upsert_sets_prefer_header() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(201, json!([{"id": "p1"}]));
        let client = client_with(&mock);

        client
            .table("landing_pages")
            .upsert(&json!({"id": "p1"}), "id")
            .execute()
            .unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.method, Method::Post);
        assert!(sent
            .header_value("prefer")
            .unwrap()
            .contains("merge-duplicates"));
        assert_eq!(sent.json_body().unwrap()["id"], "p1");
    }

    #[test]
    fn test_unfiltered_delete_is_refused() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let err = client.table("expenses").delete().execute().unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest(_)));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn test_invalid_table_name() {
        let mock = Arc::new(MockTransport::new());
        let client = client_with(&mock);

        let err = client.table("orders; drop").select("*").execute().unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest(_)));
    }

    #[test]
    fn test_http_error_is_surfaced() {
        let mock = Arc::new(MockTransport::new());
        mock.push_json(401, json!({"message": "JWT expired"}));
        let client = client_with(&mock);

        let err = client
            .table("variants")
            .update(&json!({"stock": 3}))
            .eq("id", "v1")
            .execute()
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 401: JWT expired");
    }
}
