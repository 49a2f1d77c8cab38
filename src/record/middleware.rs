//! The recording service

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::future::BoxFuture;
use hyper::body::Body;
use hyper::service::Service;
use hyper::{Request, Response};
use tracing::debug;

use crate::codec::{BinaryMessage, Codec};
use crate::document::{exclude_data, merge_data, Data, Document, Entry};
use crate::multimap::OrderedMultimap;
use crate::validate::{Annotations, PanicReporter, Reporter, Validator};

use super::{BoxError, ExchangeRecord, RecordedBody, TeeBody};

/// Validation callback run once per exchange
pub type ValidateFn = Arc<dyn Fn(&mut Validator<'_>) + Send + Sync>;

/// Per-endpoint recording options
#[derive(Clone)]
pub struct RecordOptions {
    description: String,
    exclude_headers: Vec<String>,
    validate: Option<ValidateFn>,
    request_codec: Codec,
    response_codec: Codec,
    reporter: Arc<dyn Reporter>,
}

impl Default for RecordOptions {
    fn default() -> Self {
        Self {
            description: String::new(),
            exclude_headers: Vec::new(),
            validate: None,
            request_codec: Codec::json(),
            response_codec: Codec::json(),
            reporter: Arc::new(PanicReporter),
        }
    }
}

impl RecordOptions {
    /// Options with no description, no exclusions and no validation
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Describe the endpoint
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Exclude headers from this endpoint's entries only
    #[must_use]
    pub fn exclude_headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_headers.extend(headers.into_iter().map(Into::into));
        self
    }

    /// Validate and annotate every exchange with `validate`
    #[must_use]
    pub fn with_validate<F>(mut self, validate: F) -> Self
    where
        F: Fn(&mut Validator<'_>) + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    /// Request bodies are binary messages of type `M`
    #[must_use]
    pub fn binary_request<M: BinaryMessage + 'static>(mut self) -> Self {
        self.request_codec = Codec::binary::<M>();
        self
    }

    /// Response bodies are binary messages of type `M`
    #[must_use]
    pub fn binary_response<M: BinaryMessage + 'static>(mut self) -> Self {
        self.response_codec = Codec::binary::<M>();
        self
    }

    /// Report assertion failures to `reporter` instead of panicking
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    fn validate(&self, record: &ExchangeRecord) -> Annotations {
        let mut validator = Validator::new(record, self.reporter.as_ref())
            .with_codecs(self.request_codec.clone(), self.response_codec.clone());

        if let Some(validate) = &self.validate {
            validate(&mut validator);
        }

        validator.into_annotations()
    }

    /// Merge declared and observed values into the entry for `record`
    fn build_entry(
        &self,
        record: &ExchangeRecord,
        annotations: Annotations,
        document: &Document,
    ) -> Entry {
        let excluded: Vec<&str> = self
            .exclude_headers
            .iter()
            .chain(document.excluded_headers())
            .map(String::as_str)
            .collect();

        let mut entry = Entry {
            description: self.description.clone(),
            method: record.method.clone(),
            path: record.path.clone(),

            request_params: merge_data(
                annotations.request_params,
                Data::raw(&record.request_params),
            ),
            request_headers: exclude_data(
                merge_data(annotations.request_headers, Data::raw(&record.request_headers)),
                &excluded,
            ),
            request_fields: annotations.request_fields,
            request_example: self.request_codec.display(&record.request_body),

            response_status_code: record.status,
            response_headers: exclude_data(
                merge_data(
                    annotations.response_headers,
                    Data::raw(&record.response_headers),
                ),
                &excluded,
            ),
            response_fields: annotations.response_fields,
            response_example: self.response_codec.display(&record.response_body),
        };
        entry.format();
        entry
    }
}

impl fmt::Debug for RecordOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordOptions")
            .field("description", &self.description)
            .field("exclude_headers", &self.exclude_headers)
            .field("validate", &self.validate.is_some())
            .field("request_codec", &self.request_codec)
            .field("response_codec", &self.response_codec)
            .finish_non_exhaustive()
    }
}

/// Service that records every exchange with the wrapped service into a
/// [`Document`].
///
/// The wrapped service sees the request unchanged apart from its body type,
/// and the client receives exactly the status, headers and body frames the
/// wrapped service produced.
#[derive(Clone)]
pub struct Record<S> {
    inner: S,
    document: Arc<Document>,
    options: Arc<RecordOptions>,
}

/// Wrap `inner` so its exchanges are recorded into `document`.
///
/// The request body is only captured as far as `inner` reads it. Only the
/// first data frame of the response is documented, though every frame is
/// forwarded.
pub fn record<S>(inner: S, document: Arc<Document>, options: RecordOptions) -> Record<S> {
    Record {
        inner,
        document,
        options: Arc::new(options),
    }
}

impl<S> Record<S> {
    /// The document entries are appended to
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }
}

impl<S, B, ResB> Service<Request<B>> for Record<S>
where
    S: Service<Request<TeeBody<B>>, Response = Response<ResB>> + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    B: Body<Data = Bytes> + 'static,
    ResB: Body<Data = Bytes> + Send + 'static,
    ResB::Error: Into<BoxError> + Send,
{
    type Response = Response<RecordedBody>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn call(&self, request: Request<B>) -> Self::Future {
        let mut record =
            ExchangeRecord::from_request(request.method(), request.uri(), request.headers());

        let (parts, body) = request.into_parts();
        let (body, captured) = TeeBody::new(body);
        let pending = self.inner.call(Request::from_parts(parts, body));

        let document = Arc::clone(&self.document);
        let options = Arc::clone(&self.options);

        Box::pin(async move {
            let (parts, body) = pending.await?.into_parts();
            let body = RecordedBody::drain(body).await;

            record.request_body = captured.bytes();
            record.status = parts.status.as_u16();
            record.response_headers = OrderedMultimap::from_headers(&parts.headers);
            record.response_body = body.first_data();

            let annotations = options.validate(&record);
            let entry = options.build_entry(&record, annotations, &document);
            document.append(entry);

            debug!(
                "Recorded {} {} -> {} (request {} bytes, response {} bytes)",
                record.method,
                record.path,
                record.status,
                record.request_body.len(),
                record.response_body.len()
            );

            Ok(Response::from_parts(parts, body))
        })
    }
}
