//! Time slicing for TWAP schedules.
//!
//! A schedule of `n` parts starting at `t0` with frequency `t` covers the
//! half-open slices `[t0 + k*t, t0 + (k+1)*t)` for `k` in `[0, n)`. With a
//! non-zero `span` only the first `span` seconds of each slice are valid.
//!
//! # Overflow
//! All arithmetic happens in `u64` on `u32` inputs. The largest intermediate
//! value is `start + part_count * frequency <= (2^32 - 1) + (2^32 - 1)^2
//! = 2^64 - 2^32`, so no operation here can overflow for any `u32` input,
//! whether or not the schedule was validated. Frequency is non-zero by type.

use std::num::NonZeroU32;

use crate::error::{NotValidReason, Result, TwapError};
use crate::schedule::TwapSchedule;

/// Compute the last second (inclusive) of validity for the order active at
/// `current_time`.
///
/// Preconditions (guaranteed for a [`TwapSchedule`]): `span <= frequency`.
/// With `span > frequency` the result is still overflow-free but may reach
/// into the following slice.
///
/// # Errors
/// - `TemporalInvalid(BeforeStart)` if `current_time < start_time`
/// - `TemporalExpired` if `current_time >= start_time + part_count * frequency`,
///   or if `current_time` is beyond what a 32-bit `validTo` can express
/// - `TemporalInvalid(OutsideSpan)` if `current_time` falls after the active
///   span but before the next slice
pub fn calculate_valid_to(
    current_time: u64,
    start_time: u32,
    part_count: u32,
    frequency: NonZeroU32,
    span: u32,
) -> Result<u32> {
    let start = u64::from(start_time);
    let frequency = u64::from(frequency.get());
    let end = start + u64::from(part_count) * frequency;

    if current_time < start {
        return Err(TwapError::TemporalInvalid {
            reason: NotValidReason::BeforeStart,
            retry_at: (start < end).then_some(start),
        });
    }
    if current_time >= end || current_time > u64::from(u32::MAX) {
        return Err(TwapError::TemporalExpired);
    }

    let part = (current_time - start) / frequency;
    let slice_start = start + part * frequency;

    let valid_to = if span == 0 {
        slice_start + frequency - 1
    } else {
        slice_start + u64::from(span) - 1
    };

    if current_time > valid_to {
        let next_start = slice_start + frequency;
        return Err(TwapError::TemporalInvalid {
            reason: NotValidReason::OutsideSpan,
            retry_at: (next_start < end && next_start <= u64::from(u32::MAX))
                .then_some(next_start),
        });
    }

    // current_time <= u32::MAX here, so clamping keeps valid_to >= current_time.
    Ok(u32::try_from(valid_to).unwrap_or(u32::MAX))
}

/// Boundaries of one slice. All bounds are unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SliceWindow {
    /// Slice index in `[0, n)`.
    pub index: u32,
    /// First second of the slice.
    pub start: u64,
    /// Last second (inclusive) an order for this slice is valid.
    pub valid_until: u64,
    /// First second of the next slice.
    pub end: u64,
}

impl SliceWindow {
    /// Whether an order for this slice is valid at `time`.
    pub fn contains(&self, time: u64) -> bool {
        (self.start..=self.valid_until).contains(&time)
    }
}

/// Index of the slice containing `current_time`, `None` outside the schedule.
///
/// Floor division anchored at `t0`: the index is non-decreasing in time and
/// steps by exactly one at each multiple of the frequency.
pub fn part_index(schedule: &TwapSchedule, current_time: u64) -> Option<u32> {
    let start = u64::from(schedule.start_time());
    if current_time < start || current_time >= schedule.end_time() {
        return None;
    }
    let part = (current_time - start) / u64::from(schedule.frequency().get());
    // part < n <= u32::MAX
    u32::try_from(part).ok()
}

/// Boundaries of slice `index`, `None` if `index >= n`.
pub fn slice_window(schedule: &TwapSchedule, index: u32) -> Option<SliceWindow> {
    if index >= schedule.num_parts() {
        return None;
    }
    let frequency = u64::from(schedule.frequency().get());
    let start = u64::from(schedule.start_time()) + u64::from(index) * frequency;
    let end = start + frequency;
    let valid_until = match schedule.span() {
        0 => end - 1,
        span => start + u64::from(span) - 1,
    };

    Some(SliceWindow {
        index,
        start,
        valid_until,
        end,
    })
}

/// Earliest instant at or after `current_time` at which an order is valid.
///
/// `None` once no slice remains.
pub fn next_valid_at(schedule: &TwapSchedule, current_time: u64) -> Option<u64> {
    match schedule.valid_to(current_time) {
        Ok(_) => Some(current_time),
        Err(TwapError::TemporalInvalid { retry_at, .. }) => retry_at,
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{TwapData, MAX_FREQUENCY};
    use alloy::primitives::{Address, U256};
    use proptest::prelude::*;

    fn nz(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).unwrap()
    }

    fn schedule(t0: u32, n: u32, t: u32, span: u32) -> TwapSchedule {
        TwapData {
            sellToken: Address::repeat_byte(0x11),
            buyToken: Address::repeat_byte(0x22),
            receiver: Address::ZERO,
            partSellAmount: U256::from(100u32),
            minPartLimit: U256::from(1u32),
            t0: U256::from(t0),
            n: U256::from(n),
            t: U256::from(t),
            span: U256::from(span),
        }
        .validate()
        .unwrap()
    }

    // Scenario A: whole-slice validity
    #[test]
    fn test_full_slice_boundaries() {
        let valid_to = |now| calculate_valid_to(now, 1000, 10, nz(86_400), 0);

        assert_eq!(valid_to(1000), Ok(87_399));
        assert_eq!(valid_to(87_399), Ok(87_399));
        assert_eq!(valid_to(87_400), Ok(173_799));
    }

    // Scenario B: span restricts each slice
    #[test]
    fn test_span_boundaries() {
        let valid_to = |now| calculate_valid_to(now, 1000, 10, nz(86_400), 3600);

        assert_eq!(valid_to(1000), Ok(4599));
        assert_eq!(valid_to(4599), Ok(4599));
        assert_eq!(
            valid_to(4600),
            Err(TwapError::TemporalInvalid {
                reason: NotValidReason::OutsideSpan,
                retry_at: Some(87_400),
            })
        );
        assert_eq!(valid_to(87_400), Ok(87_400 + 3600 - 1));
    }

    // Scenario C: exactly at the end
    #[test]
    fn test_expired_at_end() {
        let end = 1000 + 10 * 86_400;
        assert_eq!(
            calculate_valid_to(end, 1000, 10, nz(86_400), 0),
            Err(TwapError::TemporalExpired)
        );
        assert_eq!(
            calculate_valid_to(end - 1, 1000, 10, nz(86_400), 0),
            Ok(u32::try_from(end - 1).unwrap())
        );
    }

    // Scenario D: one second early
    #[test]
    fn test_before_start() {
        assert_eq!(
            calculate_valid_to(999, 1000, 10, nz(86_400), 0),
            Err(TwapError::TemporalInvalid {
                reason: NotValidReason::BeforeStart,
                retry_at: Some(1000),
            })
        );
    }

    #[test]
    fn test_outside_span_of_last_slice_has_no_retry() {
        // Last slice starts at 1000 + 9 * 86400
        let last_start = 1000 + 9 * 86_400;
        assert_eq!(
            calculate_valid_to(last_start + 3600, 1000, 10, nz(86_400), 3600),
            Err(TwapError::TemporalInvalid {
                reason: NotValidReason::OutsideSpan,
                retry_at: None,
            })
        );
    }

    #[test]
    fn test_span_equal_to_frequency_is_whole_slice() {
        for now in [1000, 50_000, 87_399] {
            assert_eq!(
                calculate_valid_to(now, 1000, 10, nz(86_400), 86_400),
                calculate_valid_to(now, 1000, 10, nz(86_400), 0)
            );
        }
    }

    #[test]
    fn test_span_of_one_second() {
        assert_eq!(calculate_valid_to(1000, 1000, 3, nz(60), 1), Ok(1000));
        assert!(calculate_valid_to(1001, 1000, 3, nz(60), 1).is_err());
        assert_eq!(calculate_valid_to(1060, 1000, 3, nz(60), 1), Ok(1060));
    }

    #[test]
    fn test_frequency_of_one_second() {
        for now in 500..510u64 {
            assert_eq!(calculate_valid_to(now, 500, 10, nz(1), 0), Ok(now as u32));
        }
        assert_eq!(
            calculate_valid_to(510, 500, 10, nz(1), 0),
            Err(TwapError::TemporalExpired)
        );
    }

    #[test]
    fn test_extreme_inputs_do_not_overflow() {
        // Largest possible u32 values everywhere: the u64 accumulator holds.
        let max = u32::MAX;
        let near_end = u64::from(max);
        assert!(calculate_valid_to(near_end, max - 1, max, nz(max), 0).is_ok());
        assert!(calculate_valid_to(u64::MAX, max, max, nz(max), max).is_err());
        assert!(calculate_valid_to(0, max, max, nz(max), max).is_err());

        // Largest validated schedule
        let s = schedule(max - 1, max - 1, MAX_FREQUENCY, MAX_FREQUENCY);
        assert_eq!(s.valid_to(u64::from(max - 1)), Ok(max));
        assert_eq!(
            s.end_time(),
            u64::from(max - 1) + u64::from(max - 1) * u64::from(MAX_FREQUENCY)
        );
    }

    #[test]
    fn test_valid_to_clamped_to_u32() {
        // Slice 0 ends far beyond 2^32: validTo is clamped, still >= now.
        let s = schedule(u32::MAX - 10, 2, MAX_FREQUENCY, 0);
        assert_eq!(s.valid_to(u64::from(u32::MAX - 10)), Ok(u32::MAX));
        assert_eq!(s.valid_to(u64::from(u32::MAX)), Ok(u32::MAX));
    }

    #[test]
    fn test_beyond_u32_time_is_expired() {
        let s = schedule(u32::MAX - 10, 2, MAX_FREQUENCY, 0);
        assert_eq!(
            s.valid_to(u64::from(u32::MAX) + 1),
            Err(TwapError::TemporalExpired)
        );
    }

    #[test]
    fn test_part_index() {
        let s = schedule(1000, 10, 86_400, 0);
        assert_eq!(part_index(&s, 999), None);
        assert_eq!(part_index(&s, 1000), Some(0));
        assert_eq!(part_index(&s, 87_399), Some(0));
        assert_eq!(part_index(&s, 87_400), Some(1));
        assert_eq!(part_index(&s, s.end_time() - 1), Some(9));
        assert_eq!(part_index(&s, s.end_time()), None);
    }

    #[test]
    fn test_slice_window() {
        let s = schedule(1000, 10, 86_400, 3600);
        let w = slice_window(&s, 1).unwrap();
        assert_eq!(
            w,
            SliceWindow {
                index: 1,
                start: 87_400,
                valid_until: 91_000 - 1,
                end: 173_800,
            }
        );
        assert!(w.contains(87_400));
        assert!(w.contains(90_999));
        assert!(!w.contains(91_000));
        assert!(slice_window(&s, 10).is_none());
    }

    #[test]
    fn test_next_valid_at() {
        let s = schedule(1000, 10, 86_400, 3600);
        assert_eq!(next_valid_at(&s, 0), Some(1000));
        assert_eq!(next_valid_at(&s, 2000), Some(2000));
        assert_eq!(next_valid_at(&s, 4600), Some(87_400));
        assert_eq!(next_valid_at(&s, s.end_time()), None);
    }

    fn schedule_and_time() -> impl Strategy<Value = (TwapSchedule, u64)> {
        (0u32..2_000_000_000, 2u32..1000, 1u32..=MAX_FREQUENCY, any::<u32>())
            .prop_map(|(t0, n, t, span)| schedule(t0, n, t, span % (t + 1)))
            .prop_flat_map(|s| {
                let start = u64::from(s.start_time());
                (Just(s), start..s.end_time())
            })
    }

    proptest! {
        #[test]
        fn prop_valid_to_stays_inside_slice((s, now) in schedule_and_time()) {
            let part = part_index(&s, now).unwrap();
            let window = slice_window(&s, part).unwrap();

            match s.valid_to(now) {
                Ok(valid_to) => {
                    let valid_to = u64::from(valid_to);
                    prop_assert!(valid_to >= now);
                    prop_assert!(valid_to < window.end);
                    prop_assert_eq!(valid_to, window.valid_until.min(u64::from(u32::MAX)));
                }
                Err(TwapError::TemporalInvalid { reason, .. }) => {
                    prop_assert_eq!(reason, NotValidReason::OutsideSpan);
                    prop_assert!(s.span() != 0);
                    prop_assert!(now > window.valid_until);
                }
                Err(TwapError::TemporalExpired) => {
                    prop_assert!(now > u64::from(u32::MAX));
                }
                Err(other) => prop_assert!(false, "unexpected error {other}"),
            }
        }

        #[test]
        fn prop_part_index_monotonic((s, now) in schedule_and_time()) {
            let frequency = u64::from(s.frequency().get());
            let part = part_index(&s, now).unwrap();
            let next = now + 1;
            if next < s.end_time() {
                let next_part = part_index(&s, next).unwrap();
                let crosses = (next - u64::from(s.start_time())) % frequency == 0;
                prop_assert_eq!(next_part, if crosses { part + 1 } else { part });
            }
        }
    }
}
