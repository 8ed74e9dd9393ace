pub mod holiday_period;
pub mod leave_request;
pub mod role;
