use crate::api::calendar::{BusinessDaysResponse, LeavePreview, PreviewLeave};
use crate::api::holiday_period::{
    CreateHolidayPeriod, DisabledDaysResponse, HolidayQuery, UpdateHolidayPeriod,
};
use crate::api::leave_request::{BulkLeave, CreateLeave, LeaveFilter, LeaveListResponse};
use crate::leave::{EndMarker, RequestKind, StartMarker};
use crate::model::holiday_period::HolidayPeriod;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Leave API",
        version = "1.0.0",
        description = r#"
## Leave & Holiday Management

Backend for employee vacation requests, medical and administrative licenses,
and institutional holiday periods.

### 🔹 Key Features
- **Business-day preview**
  - Live weekday count for a date range, with half-day start/end markers
- **Leave Management**
  - Apply for leave, bulk licenses, approve/reject requests, list history
- **Holiday Periods**
  - Maintain holiday ranges and expand them into days for date pickers

### 📐 Day counting
- Business days are Monday–Friday, holidays included
- A half-day start or end takes off 0.5 day, never below 0.5 when the range holds a weekday
- The stored day count is always recomputed here; client numbers are advisory

### 🔐 Security
All endpoints expect a **JWT Bearer** access token from the authentication service.
Only **Admin** or **HR** can decide requests and edit holiday periods.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::calendar::business_days,
        crate::api::calendar::preview_leave,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::create_bulk_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,

        crate::api::holiday_period::list_holiday_periods,
        crate::api::holiday_period::list_disabled_days,
        crate::api::holiday_period::get_holiday_period,
        crate::api::holiday_period::create_holiday_period,
        crate::api::holiday_period::update_holiday_period,
        crate::api::holiday_period::delete_holiday_period
    ),
    components(
        schemas(
            BusinessDaysResponse,
            PreviewLeave,
            LeavePreview,
            RequestKind,
            StartMarker,
            EndMarker,
            CreateLeave,
            BulkLeave,
            LeaveFilter,
            LeaveRequest,
            LeaveListResponse,
            LeaveType,
            LeaveStatus,
            HolidayPeriod,
            HolidayQuery,
            CreateHolidayPeriod,
            UpdateHolidayPeriod,
            DisabledDaysResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Calendar", description = "Business-day computation"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Holiday", description = "Holiday period APIs"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
