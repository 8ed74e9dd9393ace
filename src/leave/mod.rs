//! Leave day arithmetic: strict calendar dates, the weekday counter, half-day
//! markers and the form reducer that ties them together. Nothing in here does
//! I/O.

pub mod business_days;
pub mod calendar_date;
pub mod form;
pub mod half_day;
pub mod holidays;

pub use business_days::count_business_days;
pub use calendar_date::CalendarDate;
pub use form::{LeaveForm, RequestKind};
pub use half_day::{DayCount, EndMarker, StartMarker, leave_days};
pub use holidays::disabled_days;
