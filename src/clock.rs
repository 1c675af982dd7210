//! What "today" means for a store

use chrono::{FixedOffset, NaiveDate, Offset, Utc};

pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock at a fixed UTC offset (stores run on KST by default)
#[derive(Debug, Clone, Copy)]
pub struct OffsetClock {
    offset: FixedOffset,
}

impl OffsetClock {
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }
}

impl Clock for OffsetClock {
    fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset).date_naive()
    }
}

/// Always returns the same day
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(FixedClock(day).today(), day);
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        let clock = OffsetClock::new(99);
        assert_eq!(clock.offset.local_minus_utc(), 0);
    }
}
