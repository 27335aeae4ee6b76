//! HTTP request planning for a resolved operation.
//!
//! Classifies the decoded RPC request against the operation's declared
//! parameter table, substitutes path-template placeholders, accumulates the
//! query string, and decides the body: everything except `GET` carries the
//! whole payload unfiltered, `GET` carries the query string instead.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::{HttpMethod, Operation, ParamLocation, Parameter};
use crate::error::{Error, Result};

/// An explicitly supplied parameter value.
///
/// The wire location may be forced per entry; otherwise the operation's
/// declared table decides, and an undeclared name defaults to the query
/// string.
#[derive(Debug, Clone)]
pub struct ExplicitParam {
    /// Parameter name.
    pub name: String,
    /// Parameter value.
    pub value: Value,
    /// Forced wire location, overriding the declared table.
    pub location: Option<ParamLocation>,
}

/// Where parameter values come from.
#[derive(Debug, Clone, Copy)]
pub enum RequestParams<'a> {
    /// An explicit parameter list.
    Explicit(&'a [ExplicitParam]),
    /// Lookup by declared-parameter name in a decoded message object.
    Fields(&'a serde_json::Map<String, Value>),
    /// A single bare value, bound to the first required (else first)
    /// declared parameter.
    Scalar(&'a Value),
    /// No parameter source; nothing is classified.
    Empty,
}

impl<'a> RequestParams<'a> {
    /// Derive the natural parameter source from a decoded payload:
    /// an object is looked up field-by-field, `null` supplies nothing, and
    /// any other value is treated as a bare scalar.
    #[must_use]
    pub fn from_payload(payload: &'a Value) -> Self {
        match payload {
            Value::Object(map) => Self::Fields(map),
            Value::Null => Self::Empty,
            other => Self::Scalar(other),
        }
    }
}

/// The assembled HTTP request shape for one call.
#[derive(Debug, Clone)]
pub struct HttpRequestPlan {
    /// Declared HTTP method.
    pub method: HttpMethod,
    /// Path with every placeholder substituted and percent-encoded.
    pub path: String,
    /// Ordered query pairs, multi-valued parameters repeated.
    pub query: Vec<(String, String)>,
    /// The encoded query string (no leading `?`).
    pub query_string: String,
    /// `path` plus `?query_string` when any query parameter was set.
    pub url: String,
    /// Declared header parameters.
    pub headers: BTreeMap<String, String>,
    /// Declared cookie parameters.
    pub cookies: BTreeMap<String, String>,
    /// The entire payload for non-GET methods; `None` for GET.
    pub body: Option<Value>,
}

/// Build the HTTP request plan for `operation`.
///
/// # Errors
///
/// [`Error::NoParameterForOperation`] when a bare scalar is supplied but
/// the operation declares no parameters, and
/// [`Error::MissingPathParameter`] when a `{placeholder}` in the path
/// template receives no value.
pub fn build_request(
    operation: &Operation,
    params: RequestParams<'_>,
    payload: &Value,
) -> Result<HttpRequestPlan> {
    let mut acc = Accumulator::default();

    match params {
        RequestParams::Explicit(entries) => {
            for entry in entries {
                let location = entry
                    .location
                    .or_else(|| declared(operation, &entry.name).map(|p| p.location))
                    .unwrap_or(ParamLocation::Query);
                acc.set(&entry.name, &entry.value, location);
            }
        }
        RequestParams::Fields(fields) => {
            for param in &operation.parameters {
                // Absent and null fields are simply not sent.
                match fields.get(&param.name) {
                    Some(value) if !value.is_null() => {
                        acc.set(&param.name, value, param.location);
                    }
                    _ => {}
                }
            }
        }
        RequestParams::Scalar(value) => {
            let param = first_operation_param(operation).ok_or_else(|| {
                Error::NoParameterForOperation {
                    operation_id: operation.operation_id.clone(),
                }
            })?;
            acc.set(&param.name, value, param.location);
        }
        RequestParams::Empty => {}
    }

    let path = substitute_template(&operation.path_template, &acc.path_params)?;
    let query_string = encode_query(&acc.query);
    let url = if query_string.is_empty() {
        path.clone()
    } else {
        format!("{path}?{query_string}")
    };
    let body = if operation.http_method.is_get() {
        None
    } else {
        Some(payload.clone())
    };

    Ok(HttpRequestPlan {
        method: operation.http_method,
        path,
        query: acc.query,
        query_string,
        url,
        headers: acc.headers,
        cookies: acc.cookies,
        body,
    })
}

#[derive(Default)]
struct Accumulator {
    path_params: BTreeMap<String, String>,
    query: Vec<(String, String)>,
    headers: BTreeMap<String, String>,
    cookies: BTreeMap<String, String>,
}

impl Accumulator {
    fn set(&mut self, name: &str, value: &Value, location: ParamLocation) {
        match location {
            ParamLocation::Path => {
                self.path_params.insert(name.to_string(), coerce(value));
            }
            ParamLocation::Query => match value {
                Value::Array(items) => {
                    for item in items {
                        self.query.push((name.to_string(), coerce(item)));
                    }
                }
                other => self.query.push((name.to_string(), coerce(other))),
            },
            ParamLocation::Header => {
                self.headers.insert(name.to_string(), coerce(value));
            }
            ParamLocation::Cookie => {
                self.cookies.insert(name.to_string(), coerce(value));
            }
            // The whole payload already travels as the body.
            ParamLocation::Body | ParamLocation::Other => {}
        }
    }
}

fn declared<'a>(operation: &'a Operation, name: &str) -> Option<&'a Parameter> {
    operation.parameters.iter().find(|p| p.name == name)
}

/// The parameter a bare scalar binds to: first required, else first.
fn first_operation_param(operation: &Operation) -> Option<&Parameter> {
    operation
        .parameters
        .iter()
        .find(|p| p.required)
        .or_else(|| operation.parameters.first())
}

/// String-coerce a JSON value for use in a URL or header.
fn coerce(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(_) | Value::Bool(_) | Value::Null => value.to_string(),
        // Compact JSON for structured values; rare, but better than Debug.
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Substitute every `{name}` placeholder, percent-encoding the values.
///
/// A `{` without a closing `}` is copied verbatim, matching how the
/// template language treats unterminated placeholders.
fn substitute_template(template: &str, values: &BTreeMap<String, String>) -> Result<String> {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let end = start + end;
        result.push_str(&rest[..start]);
        let name = &rest[start + 1..end];
        let value = values.get(name).ok_or_else(|| Error::MissingPathParameter {
            name: name.to_string(),
            template: template.to_string(),
        })?;
        result.push_str(&percent_encode(value));
        rest = &rest[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}

fn encode_query(pairs: &[(String, String)]) -> String {
    let mut out = String::new();
    for (name, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(&percent_encode(name));
        out.push('=');
        out.push_str(&percent_encode(value));
    }
    out
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                result.push_str(&format!("%{byte:02X}"));
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;

    use super::*;

    fn param(name: &str, location: ParamLocation, required: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            required,
        }
    }

    fn operation(
        template: &str,
        method: HttpMethod,
        parameters: Vec<Parameter>,
    ) -> Operation {
        Operation {
            path_template: template.to_string(),
            file_path: PathBuf::from("test.swagger.json"),
            http_method: method,
            operation_id: "Svc_Method".to_string(),
            parameters,
        }
    }

    fn build(op: &Operation, payload: Value) -> HttpRequestPlan {
        build_request(op, RequestParams::from_payload(&payload), &payload).unwrap()
    }

    #[test]
    fn substitutes_path_parameter() {
        let op = operation(
            "/v1/items/{id}",
            HttpMethod::Get,
            vec![param("id", ParamLocation::Path, true)],
        );
        let plan = build(&op, json!({"id": "42"}));
        assert_eq!(plan.path, "/v1/items/42");
        assert_eq!(plan.url, "/v1/items/42");
    }

    #[test]
    fn path_values_are_percent_encoded() {
        let op = operation(
            "/v1/items/{id}",
            HttpMethod::Get,
            vec![param("id", ParamLocation::Path, true)],
        );
        let plan = build(&op, json!({"id": "a b/c"}));
        assert_eq!(plan.path, "/v1/items/a%20b%2Fc");
    }

    #[test]
    fn missing_path_placeholder_fails_fast() {
        let op = operation(
            "/v1/items/{id}",
            HttpMethod::Get,
            vec![param("id", ParamLocation::Path, true)],
        );
        let err =
            build_request(&op, RequestParams::from_payload(&json!({})), &json!({})).unwrap_err();
        assert!(matches!(err, Error::MissingPathParameter { ref name, .. } if name == "id"));
    }

    #[test]
    fn multi_valued_query_repeats_the_key() {
        let op = operation(
            "/v1/search",
            HttpMethod::Get,
            vec![param("tag", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!({"tag": ["x", "y"]}));
        assert_eq!(
            plan.query,
            vec![
                ("tag".to_string(), "x".to_string()),
                ("tag".to_string(), "y".to_string()),
            ]
        );
        assert_eq!(plan.query_string, "tag=x&tag=y");
        assert_eq!(plan.url, "/v1/search?tag=x&tag=y");
    }

    #[test]
    fn get_has_no_body() {
        let op = operation(
            "/v1/search",
            HttpMethod::Get,
            vec![param("q", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!({"q": "rust"}));
        assert_eq!(plan.body, None);
        assert_eq!(plan.url, "/v1/search?q=rust");
    }

    #[test]
    fn non_get_carries_the_whole_payload() {
        let op = operation("/sayhello", HttpMethod::Post, vec![]);
        let payload = json!({"name": "Li Ming"});
        let plan = build(&op, payload.clone());
        assert_eq!(plan.body, Some(payload));
        assert_eq!(plan.url, "/sayhello");
    }

    #[test]
    fn header_and_cookie_parameters_are_collected() {
        let op = operation(
            "/v1/items",
            HttpMethod::Post,
            vec![
                param("x-tenant", ParamLocation::Header, false),
                param("session", ParamLocation::Cookie, false),
            ],
        );
        let plan = build(&op, json!({"x-tenant": "acme", "session": "s1"}));
        assert_eq!(plan.headers.get("x-tenant").unwrap(), "acme");
        assert_eq!(plan.cookies.get("session").unwrap(), "s1");
        assert!(plan.query.is_empty());
    }

    #[test]
    fn undeclared_payload_fields_are_not_classified() {
        let op = operation(
            "/v1/items",
            HttpMethod::Post,
            vec![param("q", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!({"q": "a", "extra": "b"}));
        assert_eq!(plan.query, vec![("q".to_string(), "a".to_string())]);
    }

    #[test]
    fn null_fields_are_treated_as_absent() {
        let op = operation(
            "/v1/items",
            HttpMethod::Post,
            vec![param("q", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!({"q": null}));
        assert!(plan.query.is_empty());
    }

    #[test]
    fn scalar_binds_to_first_required_parameter() {
        let op = operation(
            "/v1/items/{id}",
            HttpMethod::Get,
            vec![
                param("tag", ParamLocation::Query, false),
                param("id", ParamLocation::Path, true),
            ],
        );
        let plan = build(&op, json!("42"));
        assert_eq!(plan.path, "/v1/items/42");
        assert!(plan.query.is_empty());
    }

    #[test]
    fn scalar_falls_back_to_first_parameter() {
        let op = operation(
            "/v1/search",
            HttpMethod::Get,
            vec![param("q", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!("rust"));
        assert_eq!(plan.query_string, "q=rust");
    }

    #[test]
    fn scalar_without_declared_parameters_is_an_error() {
        let op = operation("/v1/ping", HttpMethod::Get, vec![]);
        let payload = json!("x");
        let err =
            build_request(&op, RequestParams::from_payload(&payload), &payload).unwrap_err();
        assert!(matches!(err, Error::NoParameterForOperation { .. }));
    }

    #[test]
    fn explicit_params_default_to_query_when_undeclared() {
        let op = operation("/v1/items", HttpMethod::Get, vec![]);
        let entries = [ExplicitParam {
            name: "page".to_string(),
            value: json!(2),
            location: None,
        }];
        let plan =
            build_request(&op, RequestParams::Explicit(&entries), &Value::Null).unwrap();
        assert_eq!(plan.query_string, "page=2");
    }

    #[test]
    fn explicit_location_overrides_the_declared_table() {
        let op = operation(
            "/v1/items",
            HttpMethod::Get,
            vec![param("token", ParamLocation::Query, false)],
        );
        let entries = [ExplicitParam {
            name: "token".to_string(),
            value: json!("t"),
            location: Some(ParamLocation::Header),
        }];
        let plan =
            build_request(&op, RequestParams::Explicit(&entries), &Value::Null).unwrap();
        assert!(plan.query.is_empty());
        assert_eq!(plan.headers.get("token").unwrap(), "t");
    }

    #[test]
    fn numbers_and_bools_coerce_to_strings() {
        let op = operation(
            "/v1/items/{id}",
            HttpMethod::Get,
            vec![
                param("id", ParamLocation::Path, true),
                param("all", ParamLocation::Query, false),
            ],
        );
        let plan = build(&op, json!({"id": 42, "all": true}));
        assert_eq!(plan.path, "/v1/items/42");
        assert_eq!(plan.query_string, "all=true");
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let op = operation(
            "/v1/search",
            HttpMethod::Get,
            vec![param("q", ParamLocation::Query, false)],
        );
        let plan = build(&op, json!({"q": "a&b=c"}));
        assert_eq!(plan.query_string, "q=a%26b%3Dc");
    }

    #[test]
    fn unterminated_placeholder_is_copied_verbatim() {
        let op = operation("/v1/{broken", HttpMethod::Get, vec![]);
        let plan = build(&op, json!({}));
        assert_eq!(plan.path, "/v1/{broken");
    }

    #[test]
    fn null_payload_supplies_no_parameters() {
        let op = operation("/v1/ping", HttpMethod::Post, vec![]);
        let plan = build(&op, Value::Null);
        assert!(plan.query.is_empty());
        assert_eq!(plan.body, Some(Value::Null));
    }
}
