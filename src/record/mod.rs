//! Recording middleware
//!
//! [`record`] wraps a hyper service. Every exchange that flows through it is
//! captured, optionally validated by the test, and appended to a
//! [`Document`](crate::Document) as an [`Entry`](crate::Entry).

mod body;
mod exchange;
mod middleware;
mod tee;

pub use body::RecordedBody;
pub use exchange::ExchangeRecord;
pub use middleware::{record, Record, RecordOptions, ValidateFn};
pub use tee::{CaptureHandle, TeeBody};

/// Boxed error type used by recorded bodies
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
