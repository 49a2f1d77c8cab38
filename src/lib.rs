//! httpdoc - API documentation generated from HTTP handler tests
//!
//! Wrap a handler under test with [`record`]. Every exchange is captured,
//! optionally validated against the test's expectations, and appended to a
//! [`Document`]. Once the tests have run, [`Document::generate`] renders the
//! collected entries into Markdown.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::cargo)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::field_reassign_with_default,
    clippy::multiple_crate_versions
)]

pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod multimap;
pub mod path;
pub mod record;
pub mod validate;

pub use codec::{BinaryMessage, Codec, CodecError};
pub use config::Config;
pub use document::{Data, Document, Entry};
pub use error::{HttpDocError, Result};
pub use record::{record, ExchangeRecord, Record, RecordOptions, RecordedBody, TeeBody};
pub use validate::{CollectingReporter, Comparator, PanicReporter, Reporter, TestCase, Validator};
