use std::time::Duration;
use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Fixed-period schedule. The first cycle is due immediately; missed
/// periods are skipped rather than run back to back.
#[derive(Debug, Clone)]
pub struct Schedule {
    interval: Duration,
    next: Instant,
}

impl Schedule {
    pub fn new(interval: Duration, start: Instant) -> Self {
        Self { interval, next: start }
    }

    pub fn due(&self) -> Instant {
        self.next
    }

    pub fn advance(&mut self, now: Instant) {
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
    }

    pub fn due_at_utc(&self, now: Instant, now_utc: DateTime<Utc>) -> DateTime<Utc> {
        let remaining = self.next.saturating_duration_since(now);
        now_utc + chrono::Duration::from_std(remaining).unwrap_or_else(|_| chrono::Duration::zero())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_first_cycle_is_immediate() {
        let start = Instant::now();
        let schedule = Schedule::new(HOUR, start);
        assert_eq!(schedule.due(), start);
    }

    #[test]
    fn test_advance_keeps_the_period() {
        let start = Instant::now();
        let mut schedule = Schedule::new(HOUR, start);
        // the cycle took a minute
        schedule.advance(start + Duration::from_secs(60));
        assert_eq!(schedule.due(), start + HOUR);
    }

    #[test]
    fn test_advance_skips_missed_periods() {
        let start = Instant::now();
        let mut schedule = Schedule::new(HOUR, start);
        let late = start + HOUR * 3 + Duration::from_secs(1);
        schedule.advance(late);
        assert_eq!(schedule.due(), late + HOUR);
    }

    #[test]
    fn test_due_at_utc() {
        let start = Instant::now();
        let mut schedule = Schedule::new(HOUR, start);
        schedule.advance(start);
        let now_utc = DateTime::parse_from_rfc3339("2026-10-18T17:00:00+00:00")
            .expect("invalid datetime string")
            .with_timezone(&Utc);
        let expected = DateTime::parse_from_rfc3339("2026-10-18T18:00:00+00:00")
            .expect("invalid datetime string")
            .with_timezone(&Utc);
        assert_eq!(schedule.due_at_utc(start, now_utc), expected);
    }
}
