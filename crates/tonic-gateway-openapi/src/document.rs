//! OpenAPI v2 document model — the subset needed to resolve operations.
//!
//! Documents are produced by a schema compiler (one `*.swagger.json` per
//! proto package) and are only read for three things: the `tags` list that
//! encodes `package.service`, the `operationId` that encodes
//! `service_method`, and the declared parameter table. Everything else in
//! the document is ignored.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// HTTP methods an OpenAPI v2 path item may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// `GET` — request payload travels as a query string, never a body.
    Get,
    /// `PUT`
    Put,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
    /// `OPTIONS`
    Options,
    /// `HEAD`
    Head,
    /// `TRACE`
    Trace,
}

impl HttpMethod {
    /// Parse a path-item key. Non-method keys (`parameters`, `$ref`, vendor
    /// extensions) return `None` and are skipped by the document loader.
    pub(crate) fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "put" => Some(Self::Put),
            "post" => Some(Self::Post),
            "patch" => Some(Self::Patch),
            "delete" => Some(Self::Delete),
            "options" => Some(Self::Options),
            "head" => Some(Self::Head),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// Upper-case wire name, e.g. `"GET"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
            Self::Head => "HEAD",
            Self::Trace => "TRACE",
        }
    }

    /// Whether this is a `GET` operation (no request body allowed).
    #[must_use]
    pub fn is_get(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a declared parameter is carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    /// Substituted into a `{name}` placeholder in the path template.
    Path,
    /// Appended to the query string (repeated key for multi-values).
    Query,
    /// Sent as an HTTP request header.
    Header,
    /// Folded into the `cookie` request header.
    Cookie,
    /// OpenAPI v2 body parameter — the whole payload already travels as the
    /// body, so these are ignored by classification.
    Body,
    /// Any other location (`formData`, vendor values). Ignored.
    #[serde(other)]
    Other,
}

/// A declared operation parameter.
///
/// Used purely as a classification table by the request planner; never
/// mutated after load.
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    /// Parameter name, matched against decoded request payload fields.
    pub name: String,
    /// Wire location.
    #[serde(rename = "in")]
    pub location: ParamLocation,
    /// Whether the document marks the parameter required.
    #[serde(default)]
    pub required: bool,
}

/// One resolvable HTTP operation from a loaded document.
///
/// Immutable once loaded; resolution hands out references for the duration
/// of a single call.
#[derive(Debug, Clone)]
pub struct Operation {
    /// URL path template with `{name}` placeholders.
    pub path_template: String,
    /// The document file that declared this operation, for per-service
    /// gateway routing.
    pub file_path: PathBuf,
    /// Declared HTTP method.
    pub http_method: HttpMethod,
    /// `{service}_{method}` identifier.
    pub operation_id: String,
    /// Declared parameter table.
    pub parameters: Vec<Parameter>,
}

/// A loaded OpenAPI v2 document: its file path, tags, and operations.
#[derive(Debug)]
pub struct OpenApiDocument {
    file_path: PathBuf,
    tags: Vec<String>,
    operations: Vec<Operation>,
}

#[derive(Deserialize)]
struct RawDocument {
    #[serde(default)]
    tags: Vec<RawTag>,
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, serde_json::Value>>,
}

#[derive(Deserialize)]
struct RawTag {
    name: String,
}

#[derive(Deserialize)]
struct RawOperation {
    #[serde(rename = "operationId")]
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

impl OpenApiDocument {
    /// Parse document text, keeping only what resolution needs.
    ///
    /// Path-item keys that are not HTTP methods (`parameters`, `$ref`) are
    /// skipped, as are operations without an `operationId` — they can never
    /// be resolved from a call path.
    pub(crate) fn from_json(file_path: PathBuf, text: &str) -> Result<Self> {
        let raw: RawDocument = serde_json::from_str(text).map_err(|source| Error::Json {
            path: file_path.clone(),
            source,
        })?;

        let mut operations = Vec::new();
        for (template, item) in raw.paths {
            for (key, value) in item {
                let Some(http_method) = HttpMethod::from_key(&key) else {
                    continue;
                };
                let op: RawOperation =
                    serde_json::from_value(value).map_err(|source| Error::Json {
                        path: file_path.clone(),
                        source,
                    })?;
                let Some(operation_id) = op.operation_id else {
                    tracing::debug!(
                        file = %file_path.display(),
                        path = %template,
                        method = %http_method,
                        "skipping operation without operationId",
                    );
                    continue;
                };
                operations.push(Operation {
                    path_template: template.clone(),
                    file_path: file_path.clone(),
                    http_method,
                    operation_id,
                    parameters: op.parameters,
                });
            }
        }

        Ok(Self {
            file_path,
            tags: raw.tags.into_iter().map(|t| t.name).collect(),
            operations,
        })
    }

    /// The document file this was loaded from.
    #[must_use]
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Document-level tags, each encoding a `package.service` pair.
    #[must_use]
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// All resolvable operations, ordered by path template then method.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Whether this document declares the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
