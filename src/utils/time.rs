//! Timestamp bucketing helpers for activity statistics

use chrono::{DateTime, Timelike, Utc};

/// Map a unix timestamp to its 5-minute slot label, e.g. 14:03 -> "14:00"
pub fn time_slot(timestamp: u64) -> String {
    let dt = datetime_from(timestamp);
    let minutes = (dt.minute() / 5) * 5;
    format!("{:02}:{:02}", dt.hour(), minutes)
}

/// Map a unix timestamp to its UTC date label, e.g. "2025-06-18"
pub fn date_from_timestamp(timestamp: u64) -> String {
    datetime_from(timestamp).format("%Y-%m-%d").to_string()
}

fn datetime_from(timestamp: u64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(timestamp as i64, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_fall_into_five_minute_slots() {
        // 2025-06-18 14:03:27 UTC
        let ts = 1750255407;
        assert_eq!(time_slot(ts), "14:00");
        assert_eq!(date_from_timestamp(ts), "2025-06-18");

        // 14:05:00 starts the next slot
        assert_eq!(time_slot(ts + 93), "14:05");
    }
}
