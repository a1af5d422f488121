//! Request descriptions
//!
//! An [`ApiRequest`] is a plain description of a call, not a live
//! `reqwest` builder, so the same request can be decorated and dispatched a
//! second time after a token refresh.

use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use super::errors::ApiError;

/// One part of a multipart form.
#[derive(Debug, Clone)]
pub enum MultipartPart {
    /// Plain text field
    Text { name: String, value: String },
    /// File field
    File { name: String, file_name: Option<String>, bytes: Vec<u8>, mime: Option<String> },
}

/// Rebuildable multipart form.
///
/// `reqwest::multipart::Form` is consumed by a send, so the parts are kept
/// here and a fresh form is produced for each dispatch.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    parts: Vec<MultipartPart>,
}

impl MultipartPayload {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text { name: name.into(), value: value.into() });
        self
    }

    /// Add a file field
    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime: Option<&str>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: Some(file_name.into()),
            bytes: bytes.into(),
            mime: mime.map(str::to_string),
        });
        self
    }

    #[must_use]
    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    /// Produce a fresh form for one dispatch.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if a part carries an invalid mime type.
    pub fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                MultipartPart::Text { name, value } => form.text(name.clone(), value.clone()),
                MultipartPart::File { name, file_name, bytes, mime } => {
                    let mut file = Part::bytes(bytes.clone());
                    if let Some(file_name) = file_name {
                        file = file.file_name(file_name.clone());
                    }
                    if let Some(mime) = mime {
                        file = file.mime_str(mime).map_err(|e| {
                            ApiError::Config(format!("invalid mime type {mime:?}: {e}"))
                        })?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

/// Body of an [`ApiRequest`]
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Multipart(MultipartPayload),
    Binary { bytes: Vec<u8>, content_type: Option<String> },
}

impl RequestBody {
    /// Bodies whose content type is chosen by the transport
    #[must_use]
    pub const fn is_transport_typed(&self) -> bool {
        matches!(self, Self::Multipart(_) | Self::Binary { .. })
    }
}

/// Description of one API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the base URL, or an absolute `http(s)` URL
    pub path: String,
    pub query: Vec<(String, String)>,
    /// Extra headers; applied before the authorization and tenant headers
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Append a header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Use `body` serialized as JSON.
    ///
    /// # Errors
    /// Returns `ApiError::Config` if `body` cannot be serialized.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Config(format!("failed to serialize request body: {e}")))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    #[must_use]
    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.body = RequestBody::Multipart(payload);
        self
    }

    #[must_use]
    pub fn binary(mut self, bytes: impl Into<Vec<u8>>, content_type: Option<&str>) -> Self {
        self.body =
            RequestBody::Binary { bytes: bytes.into(), content_type: content_type.map(str::to_string) };
        self
    }
}

/// A request together with its retry marker.
///
/// Created once per call. The marker is set before the single
/// refresh-and-retry cycle, so a second 401 for the same call propagates.
#[derive(Debug, Clone)]
pub struct TrackedRequest {
    pub request: ApiRequest,
    pub already_retried: bool,
}

impl TrackedRequest {
    #[must_use]
    pub const fn new(request: ApiRequest) -> Self {
        Self { request, already_retried: false }
    }

    /// Whether a 401 for this request may still trigger a refresh
    #[must_use]
    pub const fn may_retry(&self) -> bool {
        !self.already_retried
    }

    pub fn mark_retried(&mut self) {
        self.already_retried = true;
    }
}
