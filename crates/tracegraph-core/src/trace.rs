//! Trace records describing a service request and its upstream calls.
//!
//! A [`TraceRecord`] is one call in the tree. Its upstream calls arrive either
//! as a JSON array or as a JSON object keyed by upstream address; both forms
//! are captured by [`UpstreamCalls`] and walked through the same
//! [`Upstreams`] iterator.
//!
//! # Example
//!
//! ```
//! use tracegraph_core::trace::TraceRecord;
//!
//! let record: TraceRecord = serde_json::from_str(
//!     r#"{"name": "web", "upstream_calls": {"http://api:9090": {"name": "api"}}}"#,
//! ).unwrap();
//!
//! let upstream = record.upstreams().next().unwrap();
//! assert_eq!(upstream.address(), Some("http://api:9090"));
//! assert_eq!(upstream.record().name(), "api");
//! ```

use std::{fmt, slice};

use indexmap::{IndexMap, map};
use serde::{
    Deserialize, Deserializer, Serialize,
    de::{MapAccess, SeqAccess, Visitor},
};
use serde_json::{Number, Value};

/// One call in a service request trace.
///
/// Only `name` is required; every other field may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    name: String,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    uri: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_addresses: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    duration: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    body: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    upstream_calls: Option<UpstreamCalls>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    code: Option<ResponseCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    response_code: Option<ResponseCode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl TraceRecord {
    /// Creates a leaf record with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            uri: None,
            ip_addresses: None,
            start_time: None,
            end_time: None,
            duration: None,
            body: None,
            upstream_calls: None,
            code: None,
            response_code: None,
            error: None,
        }
    }

    /// Sets the protocol label, such as `HTTP` or `gRPC`.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the request target.
    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    /// Sets the addresses the service answered from.
    pub fn with_ip_addresses(mut self, ip_addresses: Vec<String>) -> Self {
        self.ip_addresses = Some(ip_addresses);
        self
    }

    /// Sets the start and end timestamps of the call.
    pub fn with_times(mut self, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        self.start_time = Some(start_time.into());
        self.end_time = Some(end_time.into());
        self
    }

    /// Sets the pre-formatted elapsed time label.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Sets the description payload.
    pub fn with_body(mut self, body: impl Into<Value>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the response code.
    pub fn with_response_code(mut self, code: impl Into<ResponseCode>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets the error message reported by the service.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Sets the upstream calls.
    pub fn with_upstream_calls(mut self, upstream_calls: UpstreamCalls) -> Self {
        self.upstream_calls = Some(upstream_calls);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    pub fn ip_addresses(&self) -> Option<&[String]> {
        self.ip_addresses.as_deref()
    }

    pub fn start_time(&self) -> Option<&str> {
        self.start_time.as_deref()
    }

    pub fn end_time(&self) -> Option<&str> {
        self.end_time.as_deref()
    }

    pub fn duration(&self) -> Option<&str> {
        self.duration.as_deref()
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Returns the response code, preferring `code` over `response_code`
    /// when a record carries both.
    pub fn response_code(&self) -> Option<&ResponseCode> {
        self.code.as_ref().or(self.response_code.as_ref())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn upstream_calls(&self) -> Option<&UpstreamCalls> {
        self.upstream_calls.as_ref()
    }

    /// Returns the upstream calls in traversal order.
    ///
    /// An absent `upstream_calls` field and an empty one both yield nothing.
    pub fn upstreams(&self) -> Upstreams<'_> {
        match &self.upstream_calls {
            Some(calls) => calls.iter(),
            None => Upstreams::Empty,
        }
    }

    /// Returns `true` when the record has no upstream calls.
    pub fn is_leaf(&self) -> bool {
        self.upstream_calls
            .as_ref()
            .is_none_or(UpstreamCalls::is_empty)
    }

    /// Returns `true` when the call failed.
    ///
    /// A call failed when it carries a non-empty error message or a response
    /// code of 400 or above. A missing response code is not a failure.
    pub fn is_error(&self) -> bool {
        let has_error_message = self.error.as_deref().is_some_and(|e| !e.is_empty());
        let has_error_code = self.response_code().is_some_and(ResponseCode::is_error);
        has_error_message || has_error_code
    }

    /// Counts this record and all of its descendants.
    pub fn records_count(&self) -> usize {
        1 + self
            .upstreams()
            .map(|upstream| upstream.record().records_count())
            .sum::<usize>()
    }

    /// Counts the failed calls in this record's subtree.
    pub fn errors_count(&self) -> usize {
        usize::from(self.is_error())
            + self
                .upstreams()
                .map(|upstream| upstream.record().errors_count())
                .sum::<usize>()
    }

    /// Returns the number of levels in this record's subtree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .upstreams()
            .map(|upstream| upstream.record().depth())
            .max()
            .unwrap_or(0)
    }
}

/// The upstream calls of a [`TraceRecord`].
///
/// The mapping form keys every upstream by the address it was called on and
/// keeps the document's key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum UpstreamCalls {
    Sequence(Vec<TraceRecord>),
    Mapping(IndexMap<String, TraceRecord>),
}

impl UpstreamCalls {
    pub fn len(&self) -> usize {
        match self {
            UpstreamCalls::Sequence(records) => records.len(),
            UpstreamCalls::Mapping(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates the calls in document order.
    pub fn iter(&self) -> Upstreams<'_> {
        match self {
            UpstreamCalls::Sequence(records) => Upstreams::Sequence(records.iter()),
            UpstreamCalls::Mapping(records) => Upstreams::Mapping(records.iter()),
        }
    }
}

// Decodes by container kind; errors from a nested record pass through unchanged.
impl<'de> Deserialize<'de> for UpstreamCalls {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UpstreamCallsVisitor)
    }
}

struct UpstreamCallsVisitor;

impl<'de> Visitor<'de> for UpstreamCallsVisitor {
    type Value = UpstreamCalls;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an array of trace records or an object mapping addresses to trace records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut records = Vec::new();
        while let Some(record) = seq.next_element::<TraceRecord>()? {
            records.push(record);
        }
        Ok(UpstreamCalls::Sequence(records))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut records = IndexMap::new();
        while let Some((address, record)) = map.next_entry::<String, TraceRecord>()? {
            records.insert(address, record);
        }
        Ok(UpstreamCalls::Mapping(records))
    }
}

impl From<Vec<TraceRecord>> for UpstreamCalls {
    fn from(records: Vec<TraceRecord>) -> Self {
        UpstreamCalls::Sequence(records)
    }
}

impl From<IndexMap<String, TraceRecord>> for UpstreamCalls {
    fn from(records: IndexMap<String, TraceRecord>) -> Self {
        UpstreamCalls::Mapping(records)
    }
}

/// A single upstream call paired with the address it was called on, if known.
#[derive(Debug, Clone, Copy)]
pub struct Upstream<'a> {
    address: Option<&'a str>,
    record: &'a TraceRecord,
}

impl<'a> Upstream<'a> {
    /// The address key of the mapping form; `None` for the sequence form.
    pub fn address(&self) -> Option<&'a str> {
        self.address
    }

    pub fn record(&self) -> &'a TraceRecord {
        self.record
    }
}

/// Iterator over the upstream calls of a record, normalized across both forms.
#[derive(Debug, Clone)]
pub enum Upstreams<'a> {
    Sequence(slice::Iter<'a, TraceRecord>),
    Mapping(map::Iter<'a, String, TraceRecord>),
    Empty,
}

impl<'a> Iterator for Upstreams<'a> {
    type Item = Upstream<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Upstreams::Sequence(records) => records.next().map(|record| Upstream {
                address: None,
                record,
            }),
            Upstreams::Mapping(records) => records.next().map(|(address, record)| Upstream {
                address: Some(address.as_str()),
                record,
            }),
            Upstreams::Empty => None,
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Upstreams::Sequence(records) => records.size_hint(),
            Upstreams::Mapping(records) => records.size_hint(),
            Upstreams::Empty => (0, Some(0)),
        }
    }
}

impl ExactSizeIterator for Upstreams<'_> {}

/// Response code of a call, as a number or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseCode {
    Numeric(Number),
    Text(String),
}

impl ResponseCode {
    /// Returns the numeric status, parsing textual codes when possible.
    pub fn status(&self) -> Option<i64> {
        match self {
            ResponseCode::Numeric(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|f| f as i64)),
            ResponseCode::Text(text) => text.trim().parse().ok(),
        }
    }

    /// Returns `true` for statuses of 400 and above.
    pub fn is_error(&self) -> bool {
        self.status().is_some_and(|status| status >= 400)
    }
}

impl From<i64> for ResponseCode {
    fn from(code: i64) -> Self {
        ResponseCode::Numeric(code.into())
    }
}

impl From<i32> for ResponseCode {
    fn from(code: i32) -> Self {
        ResponseCode::Numeric(code.into())
    }
}

impl From<&str> for ResponseCode {
    fn from(code: &str) -> Self {
        ResponseCode::Text(code.to_string())
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseCode::Numeric(number) => write!(f, "{number}"),
            ResponseCode::Text(text) => f.write_str(text),
        }
    }
}
