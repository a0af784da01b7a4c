use chrono::{Datelike, Month, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inclusive date window. Either end may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// A range with no bounds, matching every date.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Fills missing ends with the bounds of the month containing `today`.
    pub fn or_month_of(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let (first, last) = month_bounds(today.year(), today.month());
        (self.start.unwrap_or(first), self.end.unwrap_or(last))
    }
}

/// First and last day of a calendar month.
///
/// `month` is clamped to 1..=12.
pub fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let month = month.clamp(1, 12);
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// English name of a month number, e.g. `2` gives "February".
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bounds() {
        assert_eq!(month_bounds(2024, 2), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(month_bounds(2023, 2), (date(2023, 2, 1), date(2023, 2, 28)));
        assert_eq!(month_bounds(2024, 12), (date(2024, 12, 1), date(2024, 12, 31)));
        assert_eq!(month_bounds(2024, 4), (date(2024, 4, 1), date(2024, 4, 30)));
    }

    #[test]
    fn test_or_month_of_fills_each_end_independently() {
        let today = date(2024, 6, 15);
        assert_eq!(
            DateRange::unbounded().or_month_of(today),
            (date(2024, 6, 1), date(2024, 6, 30))
        );
        assert_eq!(
            DateRange::new(Some(date(2024, 1, 1)), None).or_month_of(today),
            (date(2024, 1, 1), date(2024, 6, 30))
        );
        assert_eq!(
            DateRange::new(None, Some(date(2024, 6, 10))).or_month_of(today),
            (date(2024, 6, 1), date(2024, 6, 10))
        );
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(13), "Unknown");
    }
}
