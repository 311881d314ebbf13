// src/postgrest_client.rs
use crate::errors::ApiError;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("Cannot reach PostgREST: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("PostgREST returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("Unexpected PostgREST response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<PostgrestError> for ApiError {
    fn from(err: PostgrestError) -> Self {
        match err {
            PostgrestError::Status { status, message } if status.is_client_error() => {
                ApiError::Validation(message)
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Raw outcome of an RPC call, relayed verbatim by the pass-through routes.
#[derive(Debug)]
pub struct RpcResponse {
    pub status: StatusCode,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: Client,
    base_url: String,
}

impl PostgrestClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Absolute upstream URL for a path that already starts with `/`.
    pub fn url(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// POST a JSON body to `/rpc/{function}` and return status plus decoded body.
    pub async fn rpc(&self, function: &str, params: &Value) -> Result<RpcResponse, PostgrestError> {
        debug!("PostgREST rpc call: {}", function);

        let response = self
            .client
            .post(self.url(&format!("/rpc/{}", function)))
            .json(params)
            .send()
            .await
            .map_err(|e| {
                error!("PostgREST rpc {} failed: {}", function, e);
                e
            })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok(RpcResponse { status, body })
    }

    /// Like [`rpc`](Self::rpc) but requires success and decodes a row set.
    pub async fn rpc_rows<T: DeserializeOwned>(
        &self,
        function: &str,
        params: &Value,
    ) -> Result<Vec<T>, PostgrestError> {
        let response = self.rpc(function, params).await?;
        if !response.status.is_success() {
            return Err(PostgrestError::Status {
                status: response.status,
                message: error_message(&response.body, response.status),
            });
        }

        match response.body {
            Value::Null => Ok(Vec::new()),
            rows @ Value::Array(_) => Ok(serde_json::from_value(rows)?),
            single => Ok(vec![serde_json::from_value(single)?]),
        }
    }

    /// Calls a function that returns a scalar, e.g. `delete_lesson -> boolean`.
    pub async fn rpc_value(&self, function: &str, params: &Value) -> Result<Value, PostgrestError> {
        let response = self.rpc(function, params).await?;
        if !response.status.is_success() {
            return Err(PostgrestError::Status {
                status: response.status,
                message: error_message(&response.body, response.status),
            });
        }
        Ok(response.body)
    }
}

/// PostgREST error bodies look like `{"code", "message", "details", "hint"}`.
pub fn error_message(body: &Value, status: StatusCode) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("PostgREST request failed")
                .to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = PostgrestClient::new("http://127.0.0.1:3001/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:3001");
        assert_eq!(client.url("/rpc/verify_login"), "http://127.0.0.1:3001/rpc/verify_login");
    }

    #[test]
    fn test_error_message_extraction() {
        let body = json!({"code": "P0001", "message": "Email already registered"});
        assert_eq!(error_message(&body, StatusCode::BAD_REQUEST), "Email already registered");
        assert_eq!(error_message(&Value::Null, StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn test_status_errors_map_to_api_errors() {
        let client_side: ApiError = PostgrestError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "bad".into(),
        }
        .into();
        assert!(matches!(client_side, ApiError::Validation(ref m) if m == "bad"));

        let server_side: ApiError = PostgrestError::Status {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "down".into(),
        }
        .into();
        assert!(matches!(server_side, ApiError::Upstream(_)));
    }
}
