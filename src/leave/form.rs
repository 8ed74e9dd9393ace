use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::business_days::count_business_days;
use super::calendar_date::CalendarDate;
use super::half_day::{DayCount, EndMarker, StartMarker, adjust};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    #[default]
    SingleDay,
    MultipleDays,
}

/// One user edit on a leave form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    SetKind(RequestKind),
    SetStart(CalendarDate),
    SetEnd(CalendarDate),
    SetStartMarker(StartMarker),
    SetEndMarker(EndMarker),
}

/// Snapshot of a leave form. Every transition goes through [`LeaveForm::apply`],
/// which keeps `start <= end` and recomputes `days`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveForm {
    pub kind: RequestKind,
    pub start: CalendarDate,
    pub end: CalendarDate,
    pub start_marker: StartMarker,
    pub end_marker: EndMarker,
    pub raw_days: u32,
    pub days: DayCount,
}

impl LeaveForm {
    /// A fresh single-day, full-day form on `start`.
    pub fn new(start: CalendarDate) -> Self {
        let raw_days = count_business_days(start, start);
        LeaveForm {
            kind: RequestKind::SingleDay,
            start,
            end: start,
            start_marker: StartMarker::FullDay,
            end_marker: EndMarker::FullDay,
            raw_days,
            days: adjust(raw_days, StartMarker::FullDay, EndMarker::FullDay),
        }
    }

    /// Replays submitted field values as if a user had typed them in order.
    pub fn from_fields(
        kind: RequestKind,
        start: CalendarDate,
        end: CalendarDate,
        start_marker: StartMarker,
        end_marker: EndMarker,
    ) -> Self {
        [
            FormAction::SetKind(kind),
            FormAction::SetEnd(end),
            FormAction::SetStartMarker(start_marker),
            FormAction::SetEndMarker(end_marker),
        ]
        .into_iter()
        .fold(LeaveForm::new(start), LeaveForm::apply)
    }

    pub fn apply(self, action: FormAction) -> Self {
        let mut next = self;

        match action {
            FormAction::SetKind(kind) => {
                next.kind = kind;
                if kind == RequestKind::SingleDay {
                    next.end = next.start;
                    next.end_marker = EndMarker::FullDay;
                    if self.kind == RequestKind::MultipleDays {
                        next.start_marker = StartMarker::FullDay;
                    }
                }
            }
            FormAction::SetStart(date) => {
                next.start = date;
                if next.kind == RequestKind::SingleDay || next.end < date {
                    next.end = date;
                }
            }
            FormAction::SetEnd(date) => {
                // single-day forms follow the start date
                if next.kind == RequestKind::MultipleDays {
                    next.end = date.max(next.start);
                }
            }
            FormAction::SetStartMarker(marker) => next.start_marker = marker,
            FormAction::SetEndMarker(marker) => {
                if next.kind == RequestKind::MultipleDays {
                    next.end_marker = marker;
                }
            }
        }

        next.raw_days = count_business_days(next.start, next.end);
        next.days = adjust(next.raw_days, next.start_marker, next.end_marker);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(s: &str) -> CalendarDate {
        CalendarDate::parse(s).unwrap()
    }

    #[test]
    fn new_form_counts_its_single_day() {
        assert_eq!(LeaveForm::new(date("2024-05-06")).days, DayCount::whole(1));
        assert_eq!(LeaveForm::new(date("2024-05-11")).days, DayCount::ZERO);
    }

    #[test]
    fn multi_day_week_with_half_start() {
        let form = LeaveForm::new(date("2024-05-06"))
            .apply(FormAction::SetKind(RequestKind::MultipleDays))
            .apply(FormAction::SetEnd(date("2024-05-10")))
            .apply(FormAction::SetStartMarker(StartMarker::HalfMorning));
        assert_eq!(form.raw_days, 5);
        assert_eq!(form.days, DayCount::from_halves(9));
    }

    #[test]
    fn switching_to_single_day_syncs_and_resets() {
        let form = LeaveForm::new(date("2024-05-06"))
            .apply(FormAction::SetKind(RequestKind::MultipleDays))
            .apply(FormAction::SetEnd(date("2024-05-09")))
            .apply(FormAction::SetStartMarker(StartMarker::HalfAfternoon))
            .apply(FormAction::SetEndMarker(EndMarker::HalfMorning))
            .apply(FormAction::SetKind(RequestKind::SingleDay));
        assert_eq!(form.end, form.start);
        assert_eq!(form.start_marker, StartMarker::FullDay);
        assert_eq!(form.end_marker, EndMarker::FullDay);
        assert_eq!(form.days, DayCount::whole(1));
    }

    #[test]
    fn single_day_keeps_half_start_marker() {
        let form = LeaveForm::new(date("2024-05-06"))
            .apply(FormAction::SetStartMarker(StartMarker::HalfMorning))
            .apply(FormAction::SetKind(RequestKind::SingleDay))
            .apply(FormAction::SetEndMarker(EndMarker::HalfMorning));
        assert_eq!(form.start_marker, StartMarker::HalfMorning);
        assert_eq!(form.end_marker, EndMarker::FullDay);
        assert_eq!(form.days, DayCount::HALF);
    }

    #[test]
    fn start_past_end_drags_end_along() {
        let form = LeaveForm::new(date("2024-05-06"))
            .apply(FormAction::SetKind(RequestKind::MultipleDays))
            .apply(FormAction::SetEnd(date("2024-05-08")))
            .apply(FormAction::SetStart(date("2024-05-14")));
        assert_eq!(form.start, date("2024-05-14"));
        assert_eq!(form.end, date("2024-05-14"));
    }

    #[test]
    fn end_before_start_is_clamped() {
        let form = LeaveForm::new(date("2024-05-08"))
            .apply(FormAction::SetKind(RequestKind::MultipleDays))
            .apply(FormAction::SetEnd(date("2024-05-01")));
        assert_eq!(form.end, date("2024-05-08"));
    }

    #[test]
    fn from_fields_matches_manual_edits() {
        let form = LeaveForm::from_fields(
            RequestKind::MultipleDays,
            date("2024-05-06"),
            date("2024-05-10"),
            StartMarker::HalfMorning,
            EndMarker::FullDay,
        );
        assert_eq!(form.days.as_f64(), 4.5);

        let single = LeaveForm::from_fields(
            RequestKind::SingleDay,
            date("2024-05-06"),
            date("2024-05-10"),
            StartMarker::FullDay,
            EndMarker::HalfMorning,
        );
        assert_eq!(single.end, date("2024-05-06"));
        assert_eq!(single.days, DayCount::whole(1));
    }

    fn any_action() -> impl Strategy<Value = FormAction> {
        let base = date("2024-01-01");
        prop_oneof![
            prop_oneof![Just(RequestKind::SingleDay), Just(RequestKind::MultipleDays)]
                .prop_map(FormAction::SetKind),
            (0u64..120).prop_map(move |n| FormAction::SetStart(base.add_days(n).unwrap())),
            (0u64..120).prop_map(move |n| FormAction::SetEnd(base.add_days(n).unwrap())),
            prop_oneof![
                Just(StartMarker::FullDay),
                Just(StartMarker::HalfMorning),
                Just(StartMarker::HalfAfternoon)
            ]
            .prop_map(FormAction::SetStartMarker),
            prop_oneof![Just(EndMarker::FullDay), Just(EndMarker::HalfMorning)]
                .prop_map(FormAction::SetEndMarker),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_after_any_edits(actions in proptest::collection::vec(any_action(), 0..30)) {
            let form = actions
                .into_iter()
                .fold(LeaveForm::new(date("2024-01-01")), LeaveForm::apply);
            prop_assert!(form.start <= form.end);
            if form.kind == RequestKind::SingleDay {
                prop_assert_eq!(form.start, form.end);
                prop_assert_eq!(form.end_marker, EndMarker::FullDay);
            }
            prop_assert_eq!(form.raw_days, count_business_days(form.start, form.end));
            if form.raw_days == 0 {
                prop_assert!(form.days.is_zero());
            } else {
                prop_assert!(form.days >= DayCount::HALF);
            }
        }
    }
}
