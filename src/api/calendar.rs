use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::leave::{
    CalendarDate, DayCount, EndMarker, LeaveForm, RequestKind, StartMarker, count_business_days,
    leave_days,
};

#[derive(Deserialize, IntoParams)]
pub struct BusinessDaysQuery {
    /// First day of the interval
    #[param(value_type = String, example = "2024-05-06")]
    pub start: CalendarDate,
    /// Last day of the interval (inclusive)
    #[param(value_type = String, example = "2024-05-10")]
    pub end: CalendarDate,
    #[param(inline)]
    pub start_marker: Option<StartMarker>,
    #[param(inline)]
    pub end_marker: Option<EndMarker>,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "start": "2024-05-06",
    "end": "2024-05-10",
    "raw": 5,
    "days": 4.5
}))]
pub struct BusinessDaysResponse {
    #[schema(value_type = String, format = "date")]
    pub start: CalendarDate,
    #[schema(value_type = String, format = "date")]
    pub end: CalendarDate,
    /// Weekdays in the interval before half-day adjustment
    pub raw: u32,
    #[schema(value_type = f64)]
    pub days: DayCount,
}

/// Live "business days: N" hint for date pickers
#[utoipa::path(
    get,
    path = "/api/v1/calendar/business-days",
    params(BusinessDaysQuery),
    responses(
        (status = 200, description = "Business-day count", body = BusinessDaysResponse),
        (status = 400, description = "Malformed date or marker"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Calendar"
)]
pub async fn business_days(query: web::Query<BusinessDaysQuery>) -> impl Responder {
    let raw = count_business_days(query.start, query.end);
    let days = leave_days(
        query.start,
        query.end,
        query.start_marker.unwrap_or_default(),
        query.end_marker.unwrap_or_default(),
    );

    HttpResponse::Ok().json(BusinessDaysResponse {
        start: query.start,
        end: query.end,
        raw,
        days,
    })
}

#[derive(Deserialize, ToSchema)]
pub struct PreviewLeave {
    #[serde(default)]
    pub kind: RequestKind,
    #[schema(example = "2024-05-06", format = "date", value_type = String)]
    pub start_date: CalendarDate,
    #[schema(example = "2024-05-10", format = "date", value_type = String)]
    pub end_date: CalendarDate,
    #[serde(default)]
    pub start_marker: StartMarker,
    #[serde(default)]
    pub end_marker: EndMarker,
}

#[derive(Serialize, ToSchema)]
pub struct LeavePreview {
    pub kind: RequestKind,
    #[schema(value_type = String, format = "date")]
    pub start_date: CalendarDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: CalendarDate,
    pub start_marker: StartMarker,
    pub end_marker: EndMarker,
    pub raw_days: u32,
    #[schema(value_type = f64)]
    pub days: DayCount,
}

impl From<LeaveForm> for LeavePreview {
    fn from(form: LeaveForm) -> Self {
        LeavePreview {
            kind: form.kind,
            start_date: form.start,
            end_date: form.end,
            start_marker: form.start_marker,
            end_marker: form.end_marker,
            raw_days: form.raw_days,
            days: form.days,
        }
    }
}

/// Normalizes a leave form the way the request form does and returns the
/// day count it would be valued at.
#[utoipa::path(
    post,
    path = "/api/v1/leave/preview",
    request_body = PreviewLeave,
    responses(
        (status = 200, description = "Normalized form", body = LeavePreview),
        (status = 400, description = "Malformed date or marker"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn preview_leave(payload: web::Json<PreviewLeave>) -> impl Responder {
    let form = LeaveForm::from_fields(
        payload.kind,
        payload.start_date,
        payload.end_date,
        payload.start_marker,
        payload.end_marker,
    );

    HttpResponse::Ok().json(LeavePreview::from(form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, http::StatusCode, test};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn counts_week_with_half_morning() {
        let app =
            test::init_service(App::new().route("/bd", web::get().to(business_days))).await;
        let req = test::TestRequest::get()
            .uri("/bd?start=2024-05-06&end=2024-05-10&start_marker=half_morning")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["raw"], 5);
        assert_eq!(body["days"], 4.5);
        assert_eq!(body["start"], "2024-05-06");
    }

    #[actix_web::test]
    async fn weekend_and_inverted_are_zero() {
        let app =
            test::init_service(App::new().route("/bd", web::get().to(business_days))).await;

        let req = test::TestRequest::get()
            .uri("/bd?start=2024-05-11&end=2024-05-12&start_marker=half_morning&end_marker=half_morning")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["raw"], 0);
        assert_eq!(body["days"], 0.0);

        let req = test::TestRequest::get()
            .uri("/bd?start=2024-05-10&end=2024-05-06")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["raw"], 0);
    }

    #[actix_web::test]
    async fn rejects_loose_dates_and_half_afternoon_end() {
        let app =
            test::init_service(App::new().route("/bd", web::get().to(business_days))).await;

        let req = test::TestRequest::get()
            .uri("/bd?start=2024-5-6&end=2024-05-10")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/bd?start=2024-05-06&end=2024-05-10&end_marker=half_afternoon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn preview_normalizes_single_day_forms() {
        let app =
            test::init_service(App::new().route("/preview", web::post().to(preview_leave)))
                .await;
        let req = test::TestRequest::post()
            .uri("/preview")
            .set_json(json!({
                "kind": "single_day",
                "start_date": "2024-05-07",
                "end_date": "2024-05-20",
                "start_marker": "half_afternoon",
                "end_marker": "half_morning"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["end_date"], "2024-05-07");
        assert_eq!(body["end_marker"], "full_day");
        assert_eq!(body["days"], 0.5);
    }

    #[actix_web::test]
    async fn preview_multiple_days() {
        let app =
            test::init_service(App::new().route("/preview", web::post().to(preview_leave)))
                .await;
        let req = test::TestRequest::post()
            .uri("/preview")
            .set_json(json!({
                "kind": "multiple_days",
                "start_date": "2024-05-06",
                "end_date": "2024-05-17",
                "start_marker": "half_afternoon",
                "end_marker": "half_morning"
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["raw_days"], 10);
        assert_eq!(body["days"], 9.0);
    }
}
