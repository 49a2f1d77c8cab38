//! Test cases for validation

use serde_json::Value;

/// Custom comparison: receives `(expected, actual, description)` and returns
/// the failure message on mismatch
pub type CompareFn = fn(&Value, &Value, &str) -> Result<(), String>;

/// How a case compares its expected value with the recorded one
#[derive(Debug, Clone, Copy, Default)]
pub enum Comparator {
    /// Deep structural equality, no numeric or string coercion
    #[default]
    Equal,
    /// Caller-supplied predicate
    Custom(CompareFn),
}

impl Comparator {
    /// Compare `expected` with `actual`
    ///
    /// # Errors
    ///
    /// Returns the failure message when the values do not match
    pub fn compare(
        &self,
        expected: &Value,
        actual: &Value,
        description: &str,
    ) -> Result<(), String> {
        match self {
            Comparator::Equal if expected == actual => Ok(()),
            Comparator::Equal => Err(mismatch(description, &actual.to_string(), expected)),
            Comparator::Custom(compare) => compare(expected, actual, description),
        }
    }
}

/// Diff-style failure message shared by every assertion
pub(crate) fn mismatch(description: &str, actual: &str, expected: &Value) -> String {
    format!("{description}: value mismatch\n  got:  {actual}\n  want: {expected}")
}

/// One expectation: the value at `target` should equal `expected`.
///
/// `target` is a parameter or header name, or a path expression for body
/// fields (see [`crate::path`]). `description` ends up in the generated
/// document.
///
/// ```
/// use httpdoc::TestCase;
///
/// let cases = [
///     TestCase::new("token", "12345", "Request token"),
///     TestCase::new("pretty", "true", "Pretty print response message"),
/// ];
/// assert_eq!(cases[0].target, "token");
/// ```
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Name or path expression to look up
    pub target: String,
    /// Expected value
    pub expected: Value,
    /// Documentation for the value
    pub description: String,
    /// Comparison to apply
    pub comparator: Comparator,
}

impl TestCase {
    /// Create a case compared by structural equality
    pub fn new(
        target: impl Into<String>,
        expected: impl Into<Value>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            expected: expected.into(),
            description: description.into(),
            comparator: Comparator::Equal,
        }
    }

    /// Use a custom comparison for this case
    #[must_use]
    pub fn with_comparator(mut self, compare: CompareFn) -> Self {
        self.comparator = Comparator::Custom(compare);
        self
    }
}
