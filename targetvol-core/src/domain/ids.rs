use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order ID, assigned by the execution layer at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rebalance cycle identifier: the ISO date (`YYYY-MM-DD`) of the most recent
/// rebalance. ISO strings order lexicographically the same as the dates they
/// name, so `WeekId`'s derived `Ord` distinguishes current-cycle orders from
/// stale ones with a plain string comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WeekId(pub String);

impl WeekId {
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WeekId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn week_id_orders_like_dates() {
        let early = WeekId::from_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let late = WeekId::from_date(NaiveDate::from_ymd_opt(2024, 1, 9).unwrap());
        assert!(early < late);
        assert_eq!(early.as_str(), "2024-01-02");
    }

    #[test]
    fn week_id_orders_across_year_boundary() {
        let dec = WeekId::from_date(NaiveDate::from_ymd_opt(2023, 12, 26).unwrap());
        let jan = WeekId::from_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert!(dec < jan);
    }
}
