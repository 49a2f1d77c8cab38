//! Per-exchange assertion surface

use std::fmt;

use serde_json::Value;

use crate::codec::Codec;
use crate::document::Data;
use crate::multimap::{canonical_header_name, OrderedMultimap};
use crate::path;
use crate::record::ExchangeRecord;

use super::case::{mismatch, Comparator, TestCase};
use super::Reporter;

/// Which half of the exchange an assertion looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// The inbound request
    Request,
    /// The outbound response
    Response,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Request => f.write_str("request"),
            Direction::Response => f.write_str("response"),
        }
    }
}

/// Checks recorded values against expectations and keeps every checked case
/// as annotated [`Data`] for the document.
///
/// Every case is documented whether or not it passes.
pub struct Validator<'a> {
    record: &'a ExchangeRecord,
    reporter: &'a dyn Reporter,
    request_codec: Codec,
    response_codec: Codec,

    request_params: Vec<Data>,
    request_headers: Vec<Data>,
    request_fields: Vec<Data>,
    response_headers: Vec<Data>,
    response_fields: Vec<Data>,
}

/// Data declared by assertions, grouped by category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    /// Query parameters
    pub request_params: Vec<Data>,
    /// Request headers
    pub request_headers: Vec<Data>,
    /// Request body fields
    pub request_fields: Vec<Data>,
    /// Response headers
    pub response_headers: Vec<Data>,
    /// Response body fields
    pub response_fields: Vec<Data>,
}

impl<'a> Validator<'a> {
    /// Create a validator over `record` decoding both bodies as JSON
    pub fn new(record: &'a ExchangeRecord, reporter: &'a dyn Reporter) -> Self {
        Self {
            record,
            reporter,
            request_codec: Codec::json(),
            response_codec: Codec::json(),
            request_params: Vec::new(),
            request_headers: Vec::new(),
            request_fields: Vec::new(),
            response_headers: Vec::new(),
            response_fields: Vec::new(),
        }
    }

    /// Decode bodies with the given codecs instead of JSON
    #[must_use]
    pub fn with_codecs(mut self, request: Codec, response: Codec) -> Self {
        self.request_codec = request;
        self.response_codec = response;
        self
    }

    /// The exchange under validation
    #[must_use]
    pub fn record(&self) -> &ExchangeRecord {
        self.record
    }

    /// Assert the response status code
    pub fn response_status_code(&mut self, expected: u16) {
        let result = Comparator::Equal.compare(
            &Value::from(expected),
            &Value::from(self.record.status),
            "response status code",
        );
        if let Err(message) = result {
            self.reporter.fatal(&message);
        }
    }

    /// Assert query parameters. A missing parameter reads as an empty string.
    pub fn request_params(&mut self, cases: &[TestCase]) {
        let record = self.record;
        let params = &record.request_params;
        for case in cases {
            self.request_params.push(Data::declared(case));
            let actual = Value::from(params.get(&case.target).unwrap_or_default());
            self.check(case, &actual);
        }
    }

    /// Assert request headers by their first value
    pub fn request_headers(&mut self, cases: &[TestCase]) {
        let record = self.record;
        let headers = &record.request_headers;
        for case in cases {
            let name = self.check_header(Direction::Request, headers, case);
            self.request_headers
                .push(Data::new(name, case.expected.clone(), &case.description));
        }
    }

    /// Assert response headers by their first value
    pub fn response_headers(&mut self, cases: &[TestCase]) {
        let record = self.record;
        let headers = &record.response_headers;
        for case in cases {
            let name = self.check_header(Direction::Response, headers, case);
            self.response_headers
                .push(Data::new(name, case.expected.clone(), &case.description));
        }
    }

    /// Decode the request body and assert fields by path.
    ///
    /// Returns the decoded body, or `None` if it could not be decoded.
    pub fn request_body(&mut self, cases: &[TestCase]) -> Option<Value> {
        self.validate_body(Direction::Request, cases)
    }

    /// Decode the response body and assert fields by path.
    ///
    /// Returns the decoded body, or `None` if it could not be decoded.
    pub fn response_body(&mut self, cases: &[TestCase]) -> Option<Value> {
        self.validate_body(Direction::Response, cases)
    }

    /// Consume the validator, returning everything the assertions declared
    #[must_use]
    pub fn into_annotations(self) -> Annotations {
        Annotations {
            request_params: self.request_params,
            request_headers: self.request_headers,
            request_fields: self.request_fields,
            response_headers: self.response_headers,
            response_fields: self.response_fields,
        }
    }

    fn validate_body(&mut self, direction: Direction, cases: &[TestCase]) -> Option<Value> {
        let record = self.record;
        let (codec, body) = match direction {
            Direction::Request => (&self.request_codec, &record.request_body),
            Direction::Response => (&self.response_codec, &record.response_body),
        };

        let decoded = match codec.decode(body) {
            Ok(value) => value,
            Err(e) => {
                self.reporter
                    .fatal(&format!("failed to unmarshal {direction} body: {e}"));
                return None;
            }
        };

        let mut produced = Vec::with_capacity(cases.len());
        for case in cases {
            produced.push(Data::declared(case));
            match path::extract(&decoded, &case.target) {
                Some(actual) => self.check(case, actual),
                None => self.reporter.fatal(&mismatch(
                    &case.description,
                    &format!("<not found at {}>", case.target),
                    &case.expected,
                )),
            }
        }

        match direction {
            Direction::Request => self.request_fields.extend(produced),
            Direction::Response => self.response_fields.extend(produced),
        }
        Some(decoded)
    }

    /// Check one header case and return the name it is documented under:
    /// the name that matched, or the canonical name if nothing did.
    fn check_header(
        &self,
        direction: Direction,
        headers: &OrderedMultimap,
        case: &TestCase,
    ) -> String {
        let canonical = canonical_header_name(&case.target);
        let found = match headers.get(&canonical) {
            Some(actual) => Some((canonical.clone(), actual)),
            None => headers
                .get(&case.target)
                .map(|actual| (case.target.clone(), actual)),
        };

        match found {
            Some((name, actual)) => {
                self.check(case, &Value::from(actual));
                name
            }
            None => {
                self.reporter
                    .fatal(&format!("{direction} header {:?} is not found", case.target));
                canonical
            }
        }
    }

    fn check(&self, case: &TestCase, actual: &Value) {
        if let Err(message) = case
            .comparator
            .compare(&case.expected, actual, &case.description)
        {
            self.reporter.fatal(&message);
        }
    }
}
