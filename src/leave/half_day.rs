use serde::{Deserialize, Serialize, Serializer};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use super::business_days::count_business_days;
use super::calendar_date::CalendarDate;

/// How the first day of a leave period is taken.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StartMarker {
    #[default]
    FullDay,
    HalfMorning,
    HalfAfternoon,
}

/// How the last day of a leave period is taken.
///
/// There is no `HalfAfternoon` here: a continuous leave cannot end in the
/// middle of the afternoon.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    AsRefStr,
    Display,
    EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EndMarker {
    #[default]
    FullDay,
    HalfMorning,
}

impl StartMarker {
    pub fn is_half(self) -> bool {
        self != StartMarker::FullDay
    }
}

impl EndMarker {
    pub fn is_half(self) -> bool {
        self != EndMarker::FullDay
    }
}

/// A leave length in half-day steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayCount {
    halves: u32,
}

impl DayCount {
    pub const ZERO: DayCount = DayCount { halves: 0 };
    pub const HALF: DayCount = DayCount { halves: 1 };

    pub fn whole(days: u32) -> Self {
        DayCount {
            halves: days.saturating_mul(2),
        }
    }

    pub fn from_halves(halves: u32) -> Self {
        DayCount { halves }
    }

    pub fn is_zero(self) -> bool {
        self.halves == 0
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.halves) / 2.0
    }
}

impl Serialize for DayCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_f64())
    }
}

impl std::fmt::Display for DayCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.halves % 2 == 0 {
            write!(f, "{}", self.halves / 2)
        } else {
            write!(f, "{}.5", self.halves / 2)
        }
    }
}

/// Applies the boundary markers to a raw business-day count.
///
/// Each half-day boundary takes off 0.5. An interval with at least one
/// business day never drops below half a day; an interval with none stays at
/// zero whatever the markers say.
pub fn adjust(raw: u32, start: StartMarker, end: EndMarker) -> DayCount {
    if raw == 0 {
        return DayCount::ZERO;
    }

    let mut halves = raw.saturating_mul(2);
    if start.is_half() {
        halves -= 1;
    }
    if end.is_half() {
        halves -= 1;
    }

    DayCount::from_halves(halves.max(1))
}

/// Business days in `[start, end]` after half-day adjustment.
pub fn leave_days(
    start: CalendarDate,
    end: CalendarDate,
    start_marker: StartMarker,
    end_marker: EndMarker,
) -> DayCount {
    adjust(count_business_days(start, end), start_marker, end_marker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn date(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn week_with_half_morning_start() {
        let days = leave_days(
            date("2024-05-06"),
            date("2024-05-10"),
            StartMarker::HalfMorning,
            EndMarker::FullDay,
        );
        assert_eq!(days, DayCount::from_halves(9));
        assert_eq!(days.as_f64(), 4.5);
        assert_eq!(days.to_string(), "4.5");
    }

    #[test]
    fn both_halves_on_one_day_floor_at_half() {
        assert_eq!(
            adjust(1, StartMarker::HalfAfternoon, EndMarker::HalfMorning),
            DayCount::HALF
        );
        assert_eq!(
            adjust(1, StartMarker::HalfMorning, EndMarker::FullDay),
            DayCount::HALF
        );
    }

    #[test]
    fn both_halves_over_two_days() {
        assert_eq!(
            adjust(2, StartMarker::HalfAfternoon, EndMarker::HalfMorning),
            DayCount::whole(1)
        );
    }

    #[test]
    fn no_business_days_ignores_markers() {
        for start in [
            StartMarker::FullDay,
            StartMarker::HalfMorning,
            StartMarker::HalfAfternoon,
        ] {
            for end in [EndMarker::FullDay, EndMarker::HalfMorning] {
                assert_eq!(adjust(0, start, end), DayCount::ZERO);
            }
        }
        let weekend = leave_days(
            date("2024-05-11"),
            date("2024-05-12"),
            StartMarker::HalfMorning,
            EndMarker::HalfMorning,
        );
        assert!(weekend.is_zero());
    }

    #[test]
    fn full_days_are_untouched() {
        assert_eq!(
            adjust(7, StartMarker::FullDay, EndMarker::FullDay),
            DayCount::whole(7)
        );
    }

    #[test]
    fn markers_use_snake_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&StartMarker::HalfAfternoon).unwrap(),
            "\"half_afternoon\""
        );
        assert_eq!(EndMarker::HalfMorning.as_ref(), "half_morning");
        assert_eq!(
            StartMarker::from_str("half_morning").unwrap(),
            StartMarker::HalfMorning
        );
    }

    #[test]
    fn end_marker_rejects_half_afternoon() {
        assert!(serde_json::from_str::<EndMarker>("\"half_afternoon\"").is_err());
        assert!(EndMarker::from_str("half_afternoon").is_err());
    }

    #[test]
    fn day_count_serializes_as_number() {
        assert_eq!(serde_json::to_string(&DayCount::from_halves(9)).unwrap(), "4.5");
        assert_eq!(serde_json::to_string(&DayCount::whole(3)).unwrap(), "3.0");
    }
}
