//! Serverless functions (`/functions/v1/{name}`).

use serde::Serialize;
use std::fmt;

use crate::response::error_message;
use crate::{BackendClient, BackendError, Method};

/// The serverless functions the storefront relies on.
///
/// Their logic lives on the backend; from here each one is a single JSON
/// request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    OptimizeLanding,
    CloneBrand,
    VisualSearch,
    CalculateRiskScores,
    TestEmailProvider,
    FulfillmentEngine,
    MarketplaceTrends,
}

impl Function {
    /// Every known function.
    pub const ALL: [Function; 7] = [
        Function::OptimizeLanding,
        Function::CloneBrand,
        Function::VisualSearch,
        Function::CalculateRiskScores,
        Function::TestEmailProvider,
        Function::FulfillmentEngine,
        Function::MarketplaceTrends,
    ];

    /// Deployed function name.
    pub fn name(&self) -> &'static str {
        match self {
            Function::OptimizeLanding => "optimize-landing",
            Function::CloneBrand => "clone-brand",
            Function::VisualSearch => "visual-search",
            Function::CalculateRiskScores => "calculate-risk-scores",
            Function::TestEmailProvider => "test-email-provider",
            Function::FulfillmentEngine => "fulfillment-engine",
            Function::MarketplaceTrends => "marketplace-trends",
        }
    }

    /// Look up a function by its deployed name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Invokes serverless functions.
pub struct FunctionsClient<'a> {
    client: &'a BackendClient,
}

impl<'a> FunctionsClient<'a> {
    pub(crate) fn new(client: &'a BackendClient) -> Self {
        Self { client }
    }

    /// Invoke `function` with a JSON body.
    ///
    /// A non-2xx status, or a 2xx body carrying a non-null `error` field, is
    /// reported as [`BackendError::FunctionError`].
    pub fn invoke<B: Serialize + ?Sized>(
        &self,
        function: Function,
        body: &B,
    ) -> Result<serde_json::Value, BackendError> {
        let request = self
            .client
            .request(Method::Post, &format!("/functions/v1/{}", function.name()))
            .json(body)?;
        let response = self.client.send(&request)?;

        let value: serde_json::Value = if response.body.is_empty() {
            serde_json::Value::Null
        } else if response.is_success() {
            response.json()?
        } else {
            response.json().unwrap_or(serde_json::Value::Null)
        };

        if !response.is_success() {
            return Err(BackendError::FunctionError {
                function: function.name().to_string(),
                message: error_message(&value)
                    .unwrap_or_else(|| format!("HTTP {}", response.status)),
            });
        }
        if let Some(message) = error_message_only_error(&value) {
            return Err(BackendError::FunctionError {
                function: function.name().to_string(),
                message,
            });
        }
        Ok(value)
    }
}

/// Successful responses may legitimately contain a `message` field; only an
/// `error` field marks a failure.
fn error_message_only_error(value: &serde_json::Value) -> Option<String> {
    match value.get("error") {
        None | Some(serde_json::Value::Null) => None,
        Some(_) => error_message(value),
    }
}
