//! TWAP schedule definition, encoding and validation.
//!
//! A schedule travels in two shapes:
//! - [`TwapData`]: the signed wire payload, nine ABI words exactly as decoded.
//! - [`TwapSchedule`]: the validated schedule. Time fields are narrowed to
//!   32 bits and the frequency is non-zero, so slice arithmetic on it cannot
//!   overflow or divide by zero.
//!
//! The only way to obtain a [`TwapSchedule`] is [`TwapData::validate`].

use std::num::NonZeroU32;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolValue;

use crate::error::{Result, ScheduleError, TwapError};
use crate::slice;

/// Encoded schedule length: nine 32-byte words.
///
/// Callers use this to tell a schedule payload apart from other signature
/// payload shapes.
pub const TWAP_ORDER_BYTES_LENGTH: usize = 9 * 32;

/// Longest accepted slice frequency (365 days, in seconds).
pub const MAX_FREQUENCY: u32 = 365 * 24 * 60 * 60;

sol! {
    /// Wire layout of a TWAP schedule.
    ///
    /// Field order is part of the signed payload. Do not reorder.
    #[derive(Debug, PartialEq, Eq)]
    struct TwapData {
        address sellToken;
        address buyToken;
        address receiver;
        uint256 partSellAmount;
        uint256 minPartLimit;
        uint256 t0;
        uint256 n;
        uint256 t;
        uint256 span;
    }
}

impl TwapData {
    /// Build a schedule by splitting totals evenly across `n` parts.
    ///
    /// Integer division drops the remainders: at most `n - 1` units of each
    /// total are never traded. Compare `total_sell` with
    /// [`TwapSchedule::total_sell_amount`] to see the shortfall.
    ///
    /// # Errors
    /// Returns `ScheduleError::InvalidNumParts` if `n` is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn from_totals(
        sell_token: Address,
        buy_token: Address,
        receiver: Address,
        total_sell: U256,
        total_min_buy: U256,
        t0: u32,
        n: u32,
        t: u32,
        span: u32,
    ) -> std::result::Result<Self, ScheduleError> {
        if n == 0 {
            return Err(ScheduleError::InvalidNumParts);
        }
        let parts = U256::from(n);

        Ok(Self {
            sellToken: sell_token,
            buyToken: buy_token,
            receiver,
            partSellAmount: total_sell / parts,
            minPartLimit: total_min_buy / parts,
            t0: U256::from(t0),
            n: parts,
            t: U256::from(t),
            span: U256::from(span),
        })
    }

    /// Decode a schedule payload.
    ///
    /// # Errors
    /// Returns `TwapError::MalformedPayload` if the payload is not exactly
    /// [`TWAP_ORDER_BYTES_LENGTH`] bytes or an address word carries dirty
    /// upper bytes.
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        if payload.len() != TWAP_ORDER_BYTES_LENGTH {
            return Err(TwapError::MalformedPayload(format!(
                "expected {TWAP_ORDER_BYTES_LENGTH} bytes, got {}",
                payload.len()
            )));
        }

        <Self as SolValue>::abi_decode(payload, true)
            .map_err(|e| TwapError::MalformedPayload(e.to_string()))
    }

    /// Canonical payload bytes (the signed message).
    pub fn to_payload(&self) -> Bytes {
        Bytes::from(self.abi_encode())
    }

    /// Check every static invariant and narrow the schedule.
    ///
    /// Invariants are checked in declaration order; the first violation is
    /// reported. A schedule that passes satisfies all of them at once, so the
    /// order only decides which error wins when several are violated.
    ///
    /// # Errors
    /// Returns the first violated [`ScheduleError`].
    pub fn validate(&self) -> std::result::Result<TwapSchedule, ScheduleError> {
        if self.sellToken == self.buyToken {
            return Err(ScheduleError::InvalidSameToken);
        }
        if self.sellToken.is_zero() || self.buyToken.is_zero() {
            return Err(ScheduleError::InvalidToken);
        }
        if self.partSellAmount.is_zero() {
            return Err(ScheduleError::InvalidPartSellAmount);
        }
        if self.minPartLimit.is_zero() {
            return Err(ScheduleError::InvalidMinPartLimit);
        }

        let t0 = narrow(self.t0)
            .filter(|t0| *t0 < u32::MAX)
            .ok_or(ScheduleError::InvalidStartTime)?;
        let n = narrow(self.n)
            .filter(|n| (2..u32::MAX).contains(n))
            .ok_or(ScheduleError::InvalidNumParts)?;
        let t = narrow(self.t)
            .filter(|t| *t <= MAX_FREQUENCY)
            .and_then(NonZeroU32::new)
            .ok_or(ScheduleError::InvalidFrequency)?;
        let span = narrow(self.span)
            .filter(|span| *span <= t.get())
            .ok_or(ScheduleError::InvalidSpan)?;

        Ok(TwapSchedule {
            sell_token: self.sellToken,
            buy_token: self.buyToken,
            receiver: self.receiver,
            part_sell_amount: self.partSellAmount,
            min_part_limit: self.minPartLimit,
            t0,
            n,
            t,
            span,
        })
    }
}

fn narrow(word: U256) -> Option<u32> {
    u32::try_from(word).ok()
}

/// A validated TWAP schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TwapSchedule {
    sell_token: Address,
    buy_token: Address,
    receiver: Address,
    part_sell_amount: U256,
    min_part_limit: U256,
    t0: u32,
    n: u32,
    t: NonZeroU32,
    span: u32,
}

impl TwapSchedule {
    #[must_use]
    pub fn sell_token(&self) -> Address {
        self.sell_token
    }

    #[must_use]
    pub fn buy_token(&self) -> Address {
        self.buy_token
    }

    /// Proceeds destination. `Address::ZERO` means the authorizing wallet.
    #[must_use]
    pub fn receiver(&self) -> Address {
        self.receiver
    }

    #[must_use]
    pub fn part_sell_amount(&self) -> U256 {
        self.part_sell_amount
    }

    #[must_use]
    pub fn min_part_limit(&self) -> U256 {
        self.min_part_limit
    }

    /// Schedule start (unix seconds).
    #[must_use]
    pub fn start_time(&self) -> u32 {
        self.t0
    }

    #[must_use]
    pub fn num_parts(&self) -> u32 {
        self.n
    }

    /// Slice duration in seconds.
    #[must_use]
    pub fn frequency(&self) -> NonZeroU32 {
        self.t
    }

    /// Valid sub-window per slice in seconds; 0 means the whole slice.
    #[must_use]
    pub fn span(&self) -> u32 {
        self.span
    }

    /// First instant after the final slice: `t0 + n * t`.
    #[must_use]
    pub fn end_time(&self) -> u64 {
        u64::from(self.t0) + u64::from(self.n) * u64::from(self.t.get())
    }

    /// Total sold across all parts, `None` if it exceeds 256 bits.
    #[must_use]
    pub fn total_sell_amount(&self) -> Option<U256> {
        self.part_sell_amount.checked_mul(U256::from(self.n))
    }

    /// Total minimum bought across all parts, `None` if it exceeds 256 bits.
    #[must_use]
    pub fn total_min_buy_amount(&self) -> Option<U256> {
        self.min_part_limit.checked_mul(U256::from(self.n))
    }

    /// End of validity for the order active at `current_time`.
    ///
    /// # Errors
    /// See [`slice::calculate_valid_to`].
    pub fn valid_to(&self, current_time: u64) -> Result<u32> {
        slice::calculate_valid_to(current_time, self.t0, self.n, self.t, self.span)
    }

    /// Back to the wire shape.
    #[must_use]
    pub fn to_data(&self) -> TwapData {
        TwapData {
            sellToken: self.sell_token,
            buyToken: self.buy_token,
            receiver: self.receiver,
            partSellAmount: self.part_sell_amount,
            minPartLimit: self.min_part_limit,
            t0: U256::from(self.t0),
            n: U256::from(self.n),
            t: U256::from(self.t.get()),
            span: U256::from(self.span),
        }
    }

    #[must_use]
    pub fn to_payload(&self) -> Bytes {
        self.to_data().to_payload()
    }
}

impl From<TwapSchedule> for TwapData {
    fn from(schedule: TwapSchedule) -> Self {
        schedule.to_data()
    }
}

impl TryFrom<TwapData> for TwapSchedule {
    type Error = ScheduleError;

    fn try_from(data: TwapData) -> std::result::Result<Self, Self::Error> {
        data.validate()
    }
}
