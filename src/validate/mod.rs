//! Assertions over a recorded exchange
//!
//! A [`Validator`] is handed to the test's validation callback once the
//! wrapped handler has returned. Each assertion compares recorded values with
//! the expectations in a list of [`TestCase`]s and keeps the cases as
//! documentation. Failures go to an injected [`Reporter`].

mod case;
mod reporter;
mod validator;

pub use case::{CompareFn, Comparator, TestCase};
pub use reporter::{CollectingReporter, PanicReporter, Reporter};
pub use validator::{Annotations, Direction, Validator};
