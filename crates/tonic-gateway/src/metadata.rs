//! RPC metadata ↔ HTTP header conversion.
//!
//! Metadata rides HTTP on a reserved prefix: every outbound entry becomes a
//! `grpc-metadata-<key>` request header, and every inbound header carrying
//! that prefix becomes a metadata entry again. Trailer-equivalent metadata
//! arrives as a flat name/value sequence of raw trailers and uses the
//! `Grpc-Trailer-` prefix instead.
//!
//! Conversion never fails a call: entries whose key or value cannot cross
//! the header boundary (binary `-bin` metadata, non-ASCII values, invalid
//! names) are silently skipped.

use std::collections::BTreeMap;

use http::header::{HeaderMap, HeaderName, HeaderValue, TE};
use tonic::metadata::{Ascii, KeyAndValueRef, MetadataKey, MetadataMap, MetadataValue};

/// Reserved header prefix carrying metadata over HTTP.
pub const METADATA_PREFIX: &str = "grpc-metadata-";

/// Reserved raw-trailer prefix carrying trailer metadata. Matched
/// case-sensitively: raw trailer names preserve their wire spelling.
pub const TRAILER_PREFIX: &str = "Grpc-Trailer-";

/// Convert RPC metadata to outbound HTTP headers.
///
/// Every ASCII metadata entry is emitted as `grpc-metadata-<key>`
/// (multi-valued entries append repeated headers), plus the fixed
/// `te: trailers` header that asks the server to deliver trailers at all.
/// Binary (`-bin`) entries are skipped.
#[must_use]
pub fn to_headers(metadata: &MetadataMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TE, HeaderValue::from_static("trailers"));

    for entry in metadata.iter() {
        let KeyAndValueRef::Ascii(key, value) = entry else {
            continue;
        };
        let Ok(name) = format!("{METADATA_PREFIX}{key}").parse::<HeaderName>() else {
            continue;
        };
        let Ok(text) = value.to_str() else {
            continue;
        };
        let Ok(header_value) = HeaderValue::from_str(text) else {
            continue;
        };
        headers.append(name, header_value);
    }

    headers
}

/// Extract RPC metadata from inbound HTTP headers.
///
/// Headers whose name starts with `grpc-metadata-` (header names are
/// case-insensitive and arrive lower-cased) are stripped of the prefix and
/// appended; every other header is ignored. Round-trips [`to_headers`]
/// modulo the injected `te` header.
#[must_use]
pub fn from_headers(headers: &HeaderMap) -> MetadataMap {
    let mut metadata = MetadataMap::new();
    for (name, value) in headers {
        let Some(key) = name.as_str().strip_prefix(METADATA_PREFIX) else {
            continue;
        };
        append_entry(&mut metadata, key, value.to_str().unwrap_or_default());
    }
    metadata
}

/// Extract trailer metadata from a raw trailer sequence.
///
/// Raw trailers arrive as an alternating flat name/value list. Names are
/// paired with their values — a duplicate name keeps only the last
/// occurrence, and a dangling odd element is dropped — then a
/// `Grpc-Trailer-` prefix is stripped where present. Names without the
/// prefix are kept whole.
#[must_use]
pub fn from_trailers(raw: &[String]) -> MetadataMap {
    let mut record: BTreeMap<&str, &str> = BTreeMap::new();
    for pair in raw.chunks_exact(2) {
        record.insert(pair[0].as_str(), pair[1].as_str());
    }

    let mut metadata = MetadataMap::new();
    for (name, value) in record {
        let key = name.strip_prefix(TRAILER_PREFIX).unwrap_or(name);
        append_entry(&mut metadata, &key.to_ascii_lowercase(), value);
    }
    metadata
}

fn append_entry(metadata: &mut MetadataMap, key: &str, value: &str) {
    let Ok(key) = key.parse::<MetadataKey<Ascii>>() else {
        return;
    };
    let Ok(value) = value.parse::<MetadataValue<Ascii>>() else {
        return;
    };
    metadata.append(key, value);
}
