//! Client for the remote record store.
//!
//! Every operation is a single blocking `POST {base_url}/{operation}/{collection_id}` with a
//! flat JSON body. Failures never escape as panics: a body carrying `ErrorCode` becomes
//! [`StoreError::Remote`], anything that goes wrong on the wire or while decoding becomes
//! [`StoreError::Transport`].

use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

use crate::config::StoreConfig;

/// One record as returned by the store: a mapping of named fields.
pub type Record = Map<String, Value>;

/// Remote operation; also the first path segment of the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Post,
    Update,
    Delete,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Get => "get",
            Operation::Post => "post",
            Operation::Update => "update",
            Operation::Delete => "delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreError {
    /// The store answered with `{ "ErrorCode": .., "message": .. }`.
    Remote { code: Value, message: String },
    /// Network failure, undecodable body, or a response of the wrong shape.
    Transport(String),
}

impl StoreError {
    pub fn message(&self) -> &str {
        match self {
            StoreError::Remote { message, .. } => message,
            StoreError::Transport(message) => message,
        }
    }

    /// Legacy degraded result: a one-element sequence holding the error message.
    pub fn degraded_records(&self) -> Vec<Value> {
        vec![Value::String(self.message().to_string())]
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Remote { code, message } => {
                write!(f, "record store error {}: {}", code, message)
            }
            StoreError::Transport(message) => write!(f, "record store unreachable: {}", message),
        }
    }
}

impl std::error::Error for StoreError {}

/// Options for [`RecordStoreClient::fetch`].
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub offset: Option<usize>,
    pub limit: Option<usize>,
    pub auth_token: Option<String>,
    /// Overrides the query values configured on the store side.
    pub query: Record,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_query(mut self, query: Record) -> Self {
        self.query = query;
        self
    }
}

impl From<&StoreConfig> for FetchOptions {
    fn from(config: &StoreConfig) -> Self {
        let mut opts = FetchOptions::new()
            .with_offset(config.offset)
            .with_limit(config.limit);
        if let Some(token) = &config.auth_token {
            opts = opts.with_auth_token(token.clone());
        }
        opts
    }
}

fn fetch_body(opts: &FetchOptions) -> Record {
    let mut body = opts.query.clone();
    if let Some(offset) = opts.offset {
        body.insert("offset".into(), offset.into());
    }
    if let Some(limit) = opts.limit {
        body.insert("limit".into(), limit.into());
    }
    if let Some(token) = &opts.auth_token {
        body.insert("authentication".into(), token.as_str().into());
    }
    body
}

fn insert_body(record: &Record, auth_token: Option<&str>, insert_at_end: Option<bool>) -> Record {
    let mut body = record.clone();
    if let Some(token) = auth_token {
        body.insert("authentication".into(), token.into());
    }
    if let Some(at_end) = insert_at_end {
        body.insert("insertAtEnd".into(), at_end.into());
    }
    body
}

fn update_body(new_values: &Record, auth_token: Option<&str>, query: Option<&Record>) -> Record {
    let mut body = Record::new();
    body.insert("updateValues".into(), Value::Object(new_values.clone()));
    if let Some(query) = query {
        body.extend(query.clone());
    }
    if let Some(token) = auth_token {
        body.insert("authentication".into(), token.into());
    }
    body
}

fn delete_body(auth_token: Option<&str>, query: Option<&Record>) -> Record {
    let mut body = query.cloned().unwrap_or_default();
    if let Some(token) = auth_token {
        body.insert("authentication".into(), token.into());
    }
    body
}

/// Split a decoded response into success payload or a remote error.
fn check_error_code(response: Value) -> Result<Value, StoreError> {
    if let Some(code) = response.get("ErrorCode") {
        let message = match response.get("message") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };
        return Err(StoreError::Remote {
            code: code.clone(),
            message,
        });
    }
    Ok(response)
}

fn into_records(response: Value) -> Result<Vec<Record>, StoreError> {
    match response {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(record) => Ok(record),
                other => Err(StoreError::Transport(format!(
                    "expected record object, got {}",
                    other
                ))),
            })
            .collect(),
        other => Err(StoreError::Transport(format!(
            "expected an array of records, got {}",
            other
        ))),
    }
}

fn into_status_message(response: Value) -> Result<String, StoreError> {
    match response.get("message") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Ok(other.to_string()),
        None => Err(StoreError::Transport(format!(
            "response has no status message: {}",
            response
        ))),
    }
}

/// Blocking HTTP client for one record store endpoint.
#[derive(Clone)]
pub struct RecordStoreClient {
    agent: ureq::Agent,
    base_url: String,
}

impl RecordStoreClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, None)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = ureq::AgentBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self {
            agent: builder.build(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        let timeout = (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs));
        Self::with_timeout(config.base_url.clone(), timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn endpoint(&self, operation: Operation, collection_id: &str) -> String {
        format!("{}/{}/{}", self.base_url, operation.as_str(), collection_id)
    }

    /// Fetch records from a collection.
    pub fn fetch(&self, collection_id: &str, opts: &FetchOptions) -> Result<Vec<Record>, StoreError> {
        let response = self.call(Operation::Get, collection_id, fetch_body(opts))?;
        into_records(response).inspect_err(|e| tracing::error!(collection = collection_id, "{}", e))
    }

    /// Insert a record. Returns the store's status message.
    pub fn insert(
        &self,
        collection_id: &str,
        record: &Record,
        auth_token: Option<&str>,
        insert_at_end: Option<bool>,
    ) -> Result<String, StoreError> {
        let body = insert_body(record, auth_token, insert_at_end);
        let response = self.call(Operation::Post, collection_id, body)?;
        into_status_message(response)
    }

    /// Update every record matched by the (optionally overridden) query.
    pub fn update(
        &self,
        collection_id: &str,
        new_values: &Record,
        auth_token: Option<&str>,
        query: Option<&Record>,
    ) -> Result<String, StoreError> {
        let body = update_body(new_values, auth_token, query);
        let response = self.call(Operation::Update, collection_id, body)?;
        into_status_message(response)
    }

    /// Delete every record matched by the (optionally overridden) query.
    pub fn delete(
        &self,
        collection_id: &str,
        auth_token: Option<&str>,
        query: Option<&Record>,
    ) -> Result<String, StoreError> {
        let body = delete_body(auth_token, query);
        let response = self.call(Operation::Delete, collection_id, body)?;
        into_status_message(response)
    }

    fn call(
        &self,
        operation: Operation,
        collection_id: &str,
        body: Record,
    ) -> Result<Value, StoreError> {
        let url = self.endpoint(operation, collection_id);
        tracing::debug!(%url, fields = body.len(), "record store request");

        let response = match self.agent.post(&url).send_json(Value::Object(body)) {
            Ok(response) => response,
            // Error bodies still decide the outcome.
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(e)) => {
                tracing::error!(%url, "record store transport failure: {}", e);
                return Err(StoreError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let decoded: Value = response.into_json().map_err(|e| {
            tracing::error!(%url, status, "could not decode record store response: {}", e);
            StoreError::Transport(format!("invalid response (HTTP {}): {}", status, e))
        })?;

        check_error_code(decoded).inspect_err(|e| {
            tracing::warn!(%url, "{}", e);
        })
    }
}
