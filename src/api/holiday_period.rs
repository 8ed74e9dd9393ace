use crate::auth::auth::AuthUser;
use crate::leave::{CalendarDate, disabled_days};
use crate::model::holiday_period::HolidayPeriod;
use crate::utils::db_utils::{SqlValue, build_update_sql, execute_update};
use crate::utils::holiday_cache::HolidayCache;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateHolidayPeriod {
    #[schema(example = "Winter break")]
    pub name: String,
    #[schema(example = "2024-12-23", format = "date", value_type = String)]
    pub start_date: CalendarDate,
    #[schema(example = "2025-01-03", format = "date", value_type = String)]
    pub end_date: CalendarDate,
    /// Defaults to the year of `start_date`
    #[schema(example = 2024)]
    pub year: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateHolidayPeriod {
    pub name: Option<String>,
    #[schema(example = "2024-12-23", format = "date", value_type = Option<String>)]
    pub start_date: Option<CalendarDate>,
    #[schema(example = "2025-01-03", format = "date", value_type = Option<String>)]
    pub end_date: Option<CalendarDate>,
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct HolidayQuery {
    /// Only periods filed under this year
    #[schema(example = 2024)]
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct DisabledDaysQuery {
    /// Calendar year to expand
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "year": 2025,
    "days": ["2025-01-01", "2025-01-02", "2025-01-03"]
}))]
pub struct DisabledDaysResponse {
    pub year: i32,
    #[schema(value_type = Vec<String>)]
    pub days: Vec<CalendarDate>,
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "message": message }))
}

/// Name must be non-blank and the range must not be inverted.
fn validate_period(name: &str, start: CalendarDate, end: CalendarDate) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("name cannot be empty");
    }
    if start > end {
        return Err("start_date cannot be after end_date");
    }
    Ok(())
}

async fn fetch_periods(
    pool: &MySqlPool,
    year: Option<i32>,
) -> Result<Vec<HolidayPeriod>, sqlx::Error> {
    let mut sql = String::from(
        "SELECT id, name, start_date, end_date, year FROM holiday_periods",
    );
    if year.is_some() {
        sql.push_str(" WHERE year = ?");
    }
    sql.push_str(" ORDER BY start_date");

    let mut query = sqlx::query_as::<_, HolidayPeriod>(&sql);
    if let Some(y) = year {
        query = query.bind(y);
    }
    query.fetch_all(pool).await
}

async fn fetch_period(pool: &MySqlPool, id: u64) -> Result<Option<HolidayPeriod>, sqlx::Error> {
    sqlx::query_as::<_, HolidayPeriod>(
        "SELECT id, name, start_date, end_date, year FROM holiday_periods WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// List holiday periods
#[utoipa::path(
    get,
    path = "/api/v1/holiday-periods",
    params(HolidayQuery),
    responses(
        (status = 200, description = "Holiday periods", body = [HolidayPeriod]),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_holiday_periods(
    pool: web::Data<MySqlPool>,
    cache: web::Data<HolidayCache>,
    query: web::Query<HolidayQuery>,
) -> actix_web::Result<impl Responder> {
    let periods = cache
        .get_or_load(query.year, || fetch_periods(pool.get_ref(), query.year))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, year = ?query.year, "Failed to fetch holiday periods");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(periods.as_ref()))
}

/// Days of a year covered by a holiday period, for disabling date-picker cells
#[utoipa::path(
    get,
    path = "/api/v1/holiday-periods/disabled-days",
    params(DisabledDaysQuery),
    responses(
        (status = 200, description = "Covered days", body = DisabledDaysResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn list_disabled_days(
    pool: web::Data<MySqlPool>,
    cache: web::Data<HolidayCache>,
    query: web::Query<DisabledDaysQuery>,
) -> actix_web::Result<impl Responder> {
    // periods filed under the previous year can spill into this one
    let periods = cache
        .get_or_load(None, || fetch_periods(pool.get_ref(), None))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch holiday periods");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let days = disabled_days(periods.iter().map(HolidayPeriod::range), query.year);

    Ok(HttpResponse::Ok().json(DisabledDaysResponse {
        year: query.year,
        days,
    }))
}

/// Get one holiday period
#[utoipa::path(
    get,
    path = "/api/v1/holiday-periods/{id}",
    params(
        ("id" = u64, Path, description = "Holiday period id")
    ),
    responses(
        (status = 200, description = "Holiday period found", body = HolidayPeriod),
        (status = 404, description = "Holiday period not found"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn get_holiday_period(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let period = fetch_period(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, id, "Failed to fetch holiday period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match period {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Holiday period not found"
        }))),
    }
}

/// Create a holiday period (HR/Admin)
#[utoipa::path(
    post,
    path = "/api/v1/holiday-periods",
    request_body = CreateHolidayPeriod,
    responses(
        (status = 200, description = "Holiday period created", body = HolidayPeriod),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
#[instrument(name = "holiday_create", skip_all, fields(user = %auth.username))]
pub async fn create_holiday_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<HolidayCache>,
    payload: web::Json<CreateHolidayPeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if let Err(message) = validate_period(&payload.name, payload.start_date, payload.end_date) {
        return Ok(bad_request(message));
    }

    let year = payload.year.unwrap_or_else(|| payload.start_date.year());
    let name = payload.name.trim().to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO holiday_periods (name, start_date, end_date, year)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(&name)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(year)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create holiday period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    cache.invalidate();
    info!(id = result.last_insert_id(), %name, "Holiday period created");

    Ok(HttpResponse::Ok().json(HolidayPeriod {
        id: result.last_insert_id(),
        name,
        start_date: payload.start_date,
        end_date: payload.end_date,
        year,
    }))
}

/// Update a holiday period (HR/Admin). Omitted fields keep their value.
#[utoipa::path(
    put,
    path = "/api/v1/holiday-periods/{id}",
    params(
        ("id" = u64, Path, description = "Holiday period id")
    ),
    request_body = UpdateHolidayPeriod,
    responses(
        (status = 200, description = "Holiday period updated", body = HolidayPeriod),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Holiday period not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
#[instrument(name = "holiday_update", skip_all, fields(user = %auth.username))]
pub async fn update_holiday_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<HolidayCache>,
    path: web::Path<u64>,
    payload: web::Json<UpdateHolidayPeriod>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let id = path.into_inner();
    let payload = payload.into_inner();

    let Some(current) = fetch_period(pool.get_ref(), id).await.map_err(|e| {
        tracing::error!(error = %e, id, "Failed to fetch holiday period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?
    else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Holiday period not found"
        })));
    };

    let merged = HolidayPeriod {
        id,
        name: payload
            .name
            .as_deref()
            .map(|n| n.trim().to_string())
            .unwrap_or(current.name),
        start_date: payload.start_date.unwrap_or(current.start_date),
        end_date: payload.end_date.unwrap_or(current.end_date),
        year: payload.year.unwrap_or(current.year),
    };

    if let Err(message) = validate_period(&merged.name, merged.start_date, merged.end_date) {
        return Ok(bad_request(message));
    }

    let mut columns = Vec::new();
    if payload.name.is_some() {
        columns.push(("name", SqlValue::String(merged.name.clone())));
    }
    if payload.start_date.is_some() {
        columns.push(("start_date", SqlValue::Date(merged.start_date)));
    }
    if payload.end_date.is_some() {
        columns.push(("end_date", SqlValue::Date(merged.end_date)));
    }
    if payload.year.is_some() {
        columns.push(("year", SqlValue::I64(i64::from(merged.year))));
    }

    let Some(update) = build_update_sql("holiday_periods", columns, "id", id) else {
        return Ok(bad_request("No fields provided for update"));
    };

    execute_update(pool.get_ref(), update).await.map_err(|e| {
        tracing::error!(error = %e, id, "Failed to update holiday period");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    cache.invalidate();
    info!(id, "Holiday period updated");

    Ok(HttpResponse::Ok().json(merged))
}

/// Delete a holiday period (HR/Admin)
#[utoipa::path(
    delete,
    path = "/api/v1/holiday-periods/{id}",
    params(
        ("id" = u64, Path, description = "Holiday period id")
    ),
    responses(
        (status = 200, description = "Holiday period deleted", body = Object, example = json!({
            "message": "Holiday period deleted"
        })),
        (status = 404, description = "Holiday period not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Holiday"
)]
pub async fn delete_holiday_period(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    cache: web::Data<HolidayCache>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM holiday_periods WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, id, "Failed to delete holiday period");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Holiday period not found"
        })));
    }

    cache.invalidate();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Holiday period deleted"
    })))
}
