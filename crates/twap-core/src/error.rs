//! Error types for twap-core.

use std::fmt;

use thiserror::Error;

/// Static schedule parameter violations.
///
/// Raised only while validating a schedule. Never retryable without
/// changing the schedule itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum ScheduleError {
    #[error("sell token and buy token are the same")]
    InvalidSameToken,

    #[error("sell token or buy token is the zero address")]
    InvalidToken,

    #[error("part sell amount must be greater than zero")]
    InvalidPartSellAmount,

    #[error("minimum part limit must be greater than zero")]
    InvalidMinPartLimit,

    #[error("start time must be below 2^32 - 1")]
    InvalidStartTime,

    #[error("number of parts must be in [2, 2^32 - 1)")]
    InvalidNumParts,

    #[error("frequency must be in (0, 365 days]")]
    InvalidFrequency,

    #[error("span must not exceed frequency")]
    InvalidSpan,
}

/// Why no order is valid at the queried instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotValidReason {
    /// The query precedes the schedule start.
    BeforeStart,
    /// The query falls between the end of the active span and the end of the slice.
    OutsideSpan,
}

impl fmt::Display for NotValidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeStart => write!(f, "before start"),
            Self::OutsideSpan => write!(f, "outside span"),
        }
    }
}

/// Query outcomes for a conditional order.
///
/// Every variant is a pure answer to a point-in-time question. Whether to
/// ask again belongs to the caller; [`TwapError::is_terminal`] tells it
/// whether asking again can ever succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TwapError {
    #[error("schedule invalid: {0}")]
    ScheduleInvalid(#[from] ScheduleError),

    /// `retry_at` is the next instant an order becomes valid, if any slice remains.
    #[error("order not valid: {reason}")]
    TemporalInvalid {
        reason: NotValidReason,
        retry_at: Option<u64>,
    },

    #[error("schedule expired")]
    TemporalExpired,

    #[error("conditional order not authorized by wallet")]
    AuthorizationMissing,

    #[error("conditional order cancelled by wallet")]
    AuthorizationRevoked,

    #[error("malformed payload: {0}")]
    MalformedPayload(String),
}

impl TwapError {
    /// Whether no later query with the same payload can succeed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        match self {
            Self::ScheduleInvalid(_)
            | Self::TemporalExpired
            | Self::AuthorizationRevoked
            | Self::MalformedPayload(_) => true,
            Self::TemporalInvalid { retry_at, .. } => retry_at.is_none(),
            Self::AuthorizationMissing => false,
        }
    }

    /// Inverse of [`TwapError::is_terminal`].
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !self.is_terminal()
    }
}

/// Result type alias for twap-core operations.
pub type Result<T> = std::result::Result<T, TwapError>;
