//! Retry-delay extraction from provider error messages.
//!
//! Rate-limit messages end with a hint such as
//! `"Please try again in 20s."`; this module turns that hint into
//! milliseconds.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static RETRY_HINT: OnceLock<Regex> = OnceLock::new();

fn retry_hint() -> &'static Regex {
    RETRY_HINT.get_or_init(|| {
        Regex::new(r"Please try again in (\d+)([a-zA-Z]+)\.").expect("retry hint pattern is valid")
    })
}

/// Extracts the suggested retry delay, in milliseconds, from a message.
///
/// Recognized units are `ms`, `s`, `m` and `h`.
///
/// # Errors
///
/// Returns [`RetryDelayErrorKind::PatternNotFound`] when the message carries no
/// hint, [`RetryDelayErrorKind::UnknownUnit`] for any other unit, and
/// [`RetryDelayErrorKind::InvalidNumber`] when the value overflows.
///
/// # Example
///
/// ```
/// use groq_client::retry::retry_delay_ms;
///
/// let ms = retry_delay_ms("Rate limit reached. Please try again in 2m.").unwrap();
/// assert_eq!(ms, 120_000);
/// ```
pub fn retry_delay_ms(message: &str) -> Result<u64, RetryDelayError> {
    let captures = retry_hint()
        .captures(message)
        .ok_or_else(RetryDelayError::pattern_not_found)?;

    let value_text = &captures[1];
    let unit = &captures[2];

    let value: u64 = value_text
        .parse()
        .map_err(|_| RetryDelayError::invalid_number(value_text))?;

    let factor: u64 = match unit {
        "ms" => 1,
        "s" => 1_000,
        "m" => 60 * 1_000,
        "h" => 60 * 60 * 1_000,
        other => return Err(RetryDelayError::unknown_unit(other)),
    };

    value
        .checked_mul(factor)
        .ok_or_else(|| RetryDelayError::invalid_number(value_text))
}

/// Errors from [`retry_delay_ms`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryDelayError {
    /// The specific error that occurred
    pub kind: RetryDelayErrorKind,
}

/// Specific retry-delay parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDelayErrorKind {
    /// The message has no "Please try again in ..." hint
    PatternNotFound,
    /// The hint uses a unit other than ms, s, m or h
    UnknownUnit {
        /// The unit token found
        unit: String,
    },
    /// The numeric value does not fit in milliseconds
    InvalidNumber {
        /// The digits found
        value: String,
    },
}

impl RetryDelayError {
    /// Creates a new RetryDelayError with the given kind.
    #[must_use]
    pub fn new(kind: RetryDelayErrorKind) -> Self {
        Self { kind }
    }

    /// Creates a pattern not found error.
    #[must_use]
    pub fn pattern_not_found() -> Self {
        Self::new(RetryDelayErrorKind::PatternNotFound)
    }

    /// Creates an unknown unit error.
    #[must_use]
    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        Self::new(RetryDelayErrorKind::UnknownUnit { unit: unit.into() })
    }

    /// Creates an invalid number error.
    #[must_use]
    pub fn invalid_number(value: impl Into<String>) -> Self {
        Self::new(RetryDelayErrorKind::InvalidNumber {
            value: value.into(),
        })
    }

    /// Returns true if the message carried no retry hint.
    #[must_use]
    pub fn is_pattern_not_found(&self) -> bool {
        matches!(self.kind, RetryDelayErrorKind::PatternNotFound)
    }

    /// Returns true if the hint used an unrecognized unit.
    #[must_use]
    pub fn is_unknown_unit(&self) -> bool {
        matches!(self.kind, RetryDelayErrorKind::UnknownUnit { .. })
    }
}

impl fmt::Display for RetryDelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            RetryDelayErrorKind::PatternNotFound => write!(f, "retry time not found in message"),
            RetryDelayErrorKind::UnknownUnit { unit } => {
                write!(f, "unknown time unit '{}'; expected ms, s, m or h", unit)
            }
            RetryDelayErrorKind::InvalidNumber { value } => {
                write!(f, "retry value '{}' is out of range", value)
            }
        }
    }
}

impl std::error::Error for RetryDelayError {}
