use super::calendar_date::CalendarDate;

/// Weekdays in `[0, n)` when day 0 is a Monday.
fn weekdays_before(n: i64) -> i64 {
    (n / 7) * 5 + (n % 7).min(5)
}

/// Number of Monday–Friday days in the closed interval `[start, end]`.
///
/// Holidays are not excluded. An inverted interval counts as zero.
pub fn count_business_days(start: CalendarDate, end: CalendarDate) -> u32 {
    if end < start {
        return 0;
    }

    let offset = i64::from(start.weekday().num_days_from_monday());
    let span = start.days_until(end) + 1;

    (weekdays_before(offset + span) - weekdays_before(offset)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Day-by-day walk the closed form is checked against.
    fn count_business_days_iter(start: CalendarDate, end: CalendarDate) -> u32 {
        let mut count = 0;
        let mut day = Some(start);
        while let Some(d) = day.filter(|d| *d <= end) {
            if !d.is_weekend() {
                count += 1;
            }
            day = d.succ();
        }
        count
    }

    fn date(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn monday_to_friday() {
        assert_eq!(count_business_days(date("2024-05-06"), date("2024-05-10")), 5);
    }

    #[test]
    fn weekend_only() {
        assert_eq!(count_business_days(date("2024-05-11"), date("2024-05-12")), 0);
    }

    #[test]
    fn friday_to_monday() {
        assert_eq!(count_business_days(date("2024-05-10"), date("2024-05-13")), 2);
    }

    #[test]
    fn inverted_interval_is_zero() {
        assert_eq!(count_business_days(date("2024-05-10"), date("2024-05-06")), 0);
        assert_eq!(count_business_days_iter(date("2024-05-10"), date("2024-05-06")), 0);
    }

    #[test]
    fn across_month_and_leap_day() {
        // Thu 2024-02-29 .. Tue 2024-03-05
        assert_eq!(count_business_days(date("2024-02-29"), date("2024-03-05")), 4);
    }

    #[test]
    fn whole_year() {
        assert_eq!(count_business_days(date("2024-01-01"), date("2024-12-31")), 262);
        assert_eq!(count_business_days(date("2023-01-01"), date("2023-12-31")), 260);
    }

    fn any_date() -> impl Strategy<Value = CalendarDate> {
        // 1990-01-01 plus up to ~80 years
        (0u64..29_000).prop_map(|n| date("1990-01-01").add_days(n).unwrap())
    }

    proptest! {
        #[test]
        fn single_day_counts_weekdays_only(d in any_date()) {
            let expected = if d.is_weekend() { 0 } else { 1 };
            prop_assert_eq!(count_business_days(d, d), expected);
        }

        #[test]
        fn inverted_is_always_zero(a in any_date(), gap in 1u64..2_000) {
            let later = a.add_days(gap).unwrap();
            prop_assert_eq!(count_business_days(later, a), 0);
        }

        #[test]
        fn full_week_is_five(d in any_date()) {
            let monday = d.add_days(u64::from(7 - d.weekday().num_days_from_monday()) % 7).unwrap();
            prop_assert_eq!(count_business_days(monday, monday.add_days(6).unwrap()), 5);
        }

        #[test]
        fn additive_at_split_point(a in any_date(), x in 0u64..400, y in 0u64..400) {
            let b = a.add_days(x).unwrap();
            let c = b.add_days(y).unwrap();
            let split = count_business_days(a, b) + count_business_days(b.succ().unwrap(), c);
            prop_assert_eq!(count_business_days(a, c), split);
        }

        #[test]
        fn closed_form_matches_walk(a in any_date(), len in 0u64..800) {
            let b = a.add_days(len).unwrap();
            prop_assert_eq!(count_business_days(a, b), count_business_days_iter(a, b));
        }
    }
}
