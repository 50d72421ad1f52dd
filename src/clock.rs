use chrono::{DateTime, Utc};

/// Source of "now" for alerts that arrive without their own timestamp.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// ISO-8601 UTC without offset, microsecond precision.
    fn iso_timestamp(&self) -> String {
        self.now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_fixed_clock_iso_timestamp() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 10, 15, 30).unwrap());
        assert_eq!(clock.iso_timestamp(), "2024-05-01T10:15:30.000000");
    }

    #[test]
    fn test_system_clock_is_utc_now() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
