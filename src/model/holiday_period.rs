use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::leave::CalendarDate;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "name": "Winter break",
    "start_date": "2024-12-23",
    "end_date": "2025-01-03",
    "year": 2024
}))]
pub struct HolidayPeriod {
    pub id: u64,
    pub name: String,
    #[schema(value_type = String, format = "date")]
    pub start_date: CalendarDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: CalendarDate,
    pub year: i32,
}

impl HolidayPeriod {
    pub fn range(&self) -> (CalendarDate, CalendarDate) {
        (self.start_date, self.end_date)
    }
}
