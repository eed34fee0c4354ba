//! Due dates for schedule periods

use chrono::{Months, NaiveDate};

/// Due date of `period`, that many calendar months after `start`.
///
/// Day-of-month is clamped to the end of shorter months (Jan 31 -> Feb 29 in
/// a leap year). Returns `None` past chrono's supported date range.
pub fn due_date(start: NaiveDate, period: u32) -> Option<NaiveDate> {
    start.checked_add_months(Months::new(period))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_monthly_due_dates() {
        let start = ymd(2024, 1, 15);
        let dates: Vec<_> = (1..=3).map(|period| due_date(start, period)).collect();
        assert_eq!(dates, vec![Some(ymd(2024, 2, 15)), Some(ymd(2024, 3, 15)), Some(ymd(2024, 4, 15))]);
    }

    #[test]
    fn test_end_of_month_clamping() {
        assert_eq!(due_date(ymd(2024, 1, 31), 1), Some(ymd(2024, 2, 29)));
        assert_eq!(due_date(ymd(2023, 1, 31), 1), Some(ymd(2023, 2, 28)));
        // Each period is measured from the start, not the previous due date
        assert_eq!(due_date(ymd(2024, 1, 31), 2), Some(ymd(2024, 3, 31)));
    }
}
