pub mod calendar;
pub mod holiday_period;
pub mod leave_request;
