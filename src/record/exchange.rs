//! Raw capture of one exchange

use bytes::Bytes;
use hyper::{HeaderMap, Method, Uri};

use crate::multimap::OrderedMultimap;

/// Everything observed during one request/response pair.
///
/// Built by the middleware once the wrapped service has produced its whole
/// response; immutable from then on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeRecord {
    /// HTTP method
    pub method: String,
    /// Request path, without the query string
    pub path: String,
    /// Query parameters in arrival order
    pub request_params: OrderedMultimap,
    /// Request headers under canonical names
    pub request_headers: OrderedMultimap,
    /// Bytes the wrapped service read from the request body
    pub request_body: Bytes,

    /// Response status code
    pub status: u16,
    /// Response headers under canonical names
    pub response_headers: OrderedMultimap,
    /// First chunk the wrapped service wrote to the response body
    pub response_body: Bytes,
}

impl ExchangeRecord {
    /// Start a record from the request line and headers
    pub(crate) fn from_request(method: &Method, uri: &Uri, headers: &HeaderMap) -> Self {
        Self {
            method: method.to_string(),
            path: uri.path().to_string(),
            request_params: OrderedMultimap::from_query(uri.query().unwrap_or_default()),
            request_headers: OrderedMultimap::from_headers(headers),
            ..Self::default()
        }
    }
}
