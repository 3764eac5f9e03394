// src/scheduler/ticker.rs
use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;

/// The first wall-clock boundary strictly after `now` that is a whole
/// multiple of `period` since the Unix epoch. For a 5 minute period this is
/// the next minute divisible by 5, at second zero.
pub fn next_tick_after(now: DateTime<Utc>, period: Duration) -> DateTime<Utc> {
    let period_ms = (period.as_millis() as i64).max(1);
    let now_ms = now.timestamp_millis();
    let next_ms = (now_ms.div_euclid(period_ms) + 1) * period_ms;

    Utc.timestamp_millis_opt(next_ms)
        .single()
        .unwrap_or(now + chrono::Duration::milliseconds(period_ms))
}

/// How long to sleep from `now` until `tick`.
pub fn until(tick: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (tick - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MINUTES: Duration = Duration::from_secs(300);

    fn at(h: u32, m: u32, s: u32, ms: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, h, m, s).unwrap() + chrono::Duration::milliseconds(ms as i64)
    }

    #[test]
    fn aligns_to_minutes_divisible_by_five() {
        assert_eq!(next_tick_after(at(10, 3, 27, 0), FIVE_MINUTES), at(10, 5, 0, 0));
        assert_eq!(next_tick_after(at(10, 0, 0, 1), FIVE_MINUTES), at(10, 5, 0, 0));
        assert_eq!(next_tick_after(at(10, 59, 59, 999), FIVE_MINUTES), at(11, 0, 0, 0));
    }

    #[test]
    fn boundary_itself_schedules_the_following_one() {
        assert_eq!(next_tick_after(at(10, 5, 0, 0), FIVE_MINUTES), at(10, 10, 0, 0));
    }

    #[test]
    fn other_periods_align_too() {
        let quarter = Duration::from_secs(15 * 60);
        assert_eq!(next_tick_after(at(8, 16, 0, 0), quarter), at(8, 30, 0, 0));
    }

    #[test]
    fn until_never_goes_negative() {
        assert_eq!(until(at(10, 0, 0, 0), at(10, 0, 1, 0)), Duration::ZERO);
        assert_eq!(until(at(10, 5, 0, 0), at(10, 3, 30, 0)), Duration::from_secs(90));
    }
}
