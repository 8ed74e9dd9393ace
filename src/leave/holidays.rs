use std::collections::BTreeSet;

use super::calendar_date::CalendarDate;

/// Every day of `year` covered by at least one of `ranges`, sorted and without
/// duplicates. Ranges are clipped to the year; inverted ranges contribute
/// nothing.
pub fn disabled_days<I>(ranges: I, year: i32) -> Vec<CalendarDate>
where
    I: IntoIterator<Item = (CalendarDate, CalendarDate)>,
{
    let (Some(first), Some(last)) = (
        CalendarDate::from_ymd(year, 1, 1),
        CalendarDate::from_ymd(year, 12, 31),
    ) else {
        return Vec::new();
    };

    let mut days = BTreeSet::new();
    for (start, end) in ranges {
        let mut day = Some(start.max(first));
        let end = end.min(last);
        while let Some(d) = day.filter(|d| *d <= end) {
            days.insert(d);
            day = d.succ();
        }
    }
    days.into_iter().collect()
}
