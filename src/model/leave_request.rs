use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

use crate::leave::CalendarDate;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveType {
    Vacation,
    MedicalLicense,
    AdministrativeLicense,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, AsRefStr, Display, EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

/// A row of `leave_requests`. Markers, type and status are stored as their
/// snake_case names.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "start_date": "2024-05-06",
    "end_date": "2024-05-10",
    "start_marker": "half_morning",
    "end_marker": "full_day",
    "days": 4.5,
    "leave_type": "vacation",
    "status": "pending",
    "created_at": "2024-05-01T00:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: CalendarDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: CalendarDate,
    pub start_marker: String,
    pub end_marker: String,
    /// Business days after half-day adjustment, as computed at submission
    pub days: f64,
    pub leave_type: String,
    pub status: String,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn stored_names_round_trip() {
        assert_eq!(LeaveType::AdministrativeLicense.as_ref(), "administrative_license");
        assert_eq!(LeaveStatus::from_str("approved").unwrap(), LeaveStatus::Approved);
        let name: &'static str = LeaveStatus::Rejected.into();
        assert_eq!(name, "rejected");
        assert!(LeaveType::from_str("sabbatical").is_err());
    }
}
