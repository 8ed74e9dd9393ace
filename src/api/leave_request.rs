use crate::auth::auth::AuthUser;
use crate::leave::{CalendarDate, EndMarker, LeaveForm, RequestKind, StartMarker};
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, mysql::MySqlDatabaseError};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
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
    #[schema(example = "vacation")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
}

#[derive(Deserialize, ToSchema)]
pub struct BulkLeave {
    #[schema(example = json!([1000, 1001, 1002]))]
    pub employee_ids: Vec<u64>,
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
    #[schema(example = "administrative_license")]
    pub leave_type: LeaveType,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[param(inline)]
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    #[param(inline)]
    /// Filter by leave type
    pub leave_type: Option<LeaveType>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 3)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(&'static str),
}

/// Values a submitted interval the same way the request form does.
///
/// Unlike the form, an inverted interval is an error here rather than
/// something to auto-correct, and a request must cover a business day.
fn value_request(
    kind: RequestKind,
    start: CalendarDate,
    end: CalendarDate,
    start_marker: StartMarker,
    end_marker: EndMarker,
) -> Result<LeaveForm, &'static str> {
    if start > end {
        return Err("start_date cannot be after end_date");
    }
    if kind == RequestKind::SingleDay && start != end {
        return Err("single-day requests must start and end on the same date");
    }

    let form = LeaveForm::from_fields(kind, start, end, start_marker, end_marker);
    if form.days.is_zero() {
        return Err("Leave period contains no business days");
    }
    Ok(form)
}

/// `(page, per_page, offset)` for a 1-based page, or `None` when the page is
/// too far out to address.
fn page_window(page: Option<u64>, per_page: Option<u64>) -> Option<(u32, u32, u64)> {
    let per_page = per_page.unwrap_or(10).clamp(1, 100);
    let page = page.unwrap_or(1).max(1);
    let offset = (page - 1).checked_mul(per_page)?;

    Some((u32::try_from(page).ok()?, u32::try_from(per_page).ok()?, offset))
}

fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({ "message": message }))
}

// FOR UPDATE takes next-key locks on the employee's rows, so a concurrent
// filing for the same employee waits for this transaction or deadlocks out.
const OVERLAP_SQL: &str = r#"
    SELECT id
    FROM leave_requests
    WHERE employee_id = ?
    AND status IN ('pending', 'approved')
    AND start_date <= ?
    AND end_date >= ?
    FOR UPDATE
"#;

/// True when the employee already has a pending or approved request touching
/// `[start, end]`. Must run inside a transaction to hold the locks.
async fn has_overlap<'e, E>(
    executor: E,
    employee_id: u64,
    start: CalendarDate,
    end: CalendarDate,
) -> Result<bool, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let rows = sqlx::query_scalar::<_, u64>(OVERLAP_SQL)
        .bind(employee_id)
        .bind(end)
        .bind(start)
        .fetch_all(executor)
        .await?;

    Ok(!rows.is_empty())
}

/// Deadlock or lock wait timeout: another filing for the same employee won.
fn is_lock_conflict(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.try_downcast_ref::<MySqlDatabaseError>())
        .is_some_and(|db| matches!(db.number(), 1205 | 1213))
}

enum Filing {
    Created(Vec<u64>),
    /// Employees that already hold a live request in the period
    Overlaps(Vec<u64>),
}

/// Files `form` for every employee in one transaction. Nothing is written
/// unless every employee is free for the whole period.
async fn file_requests(
    pool: &MySqlPool,
    employee_ids: &[u64],
    form: &LeaveForm,
    leave_type: LeaveType,
) -> Result<Filing, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let mut conflicts = Vec::new();
    for &employee_id in employee_ids {
        if has_overlap(&mut *tx, employee_id, form.start, form.end).await? {
            conflicts.push(employee_id);
        }
    }
    if !conflicts.is_empty() {
        tx.rollback().await?;
        return Ok(Filing::Overlaps(conflicts));
    }

    let mut ids = Vec::with_capacity(employee_ids.len());
    for &employee_id in employee_ids {
        ids.push(insert_leave(&mut *tx, employee_id, form, leave_type).await?);
    }
    tx.commit().await?;

    Ok(Filing::Created(ids))
}

/// Same as `file_requests`, with losing a lock race reported as an overlap.
async fn file_requests_or_conflict(
    pool: &MySqlPool,
    employee_ids: &[u64],
    form: &LeaveForm,
    leave_type: LeaveType,
) -> Result<Filing, sqlx::Error> {
    match file_requests(pool, employee_ids, form, leave_type).await {
        Err(e) if is_lock_conflict(&e) => {
            tracing::debug!(error = %e, "Concurrent leave filing lost the lock race");
            Ok(Filing::Overlaps(employee_ids.to_vec()))
        }
        other => other,
    }
}

async fn insert_leave<'e, E>(
    executor: E,
    employee_id: u64,
    form: &LeaveForm,
    leave_type: LeaveType,
) -> Result<u64, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = MySql>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, start_marker, end_marker, days, leave_type)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(form.start)
    .bind(form.end)
    .bind(form.start_marker.as_ref())
    .bind(form.end_marker.as_ref())
    .bind(form.days.as_f64())
    .bind(leave_type.as_ref())
    .execute(executor)
    .await?;

    Ok(result.last_insert_id())
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/v1/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "id": 42,
            "status": "pending",
            "days": 4.5
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Overlaps an existing request")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "leave_create", skip_all, fields(user = %auth.username))]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.require_employee()?;

    // 1️⃣ value the request; the client's own count is never trusted
    let form = match value_request(
        payload.kind,
        payload.start_date,
        payload.end_date,
        payload.start_marker,
        payload.end_marker,
    ) {
        Ok(form) => form,
        Err(message) => return Ok(bad_request(message)),
    };

    // 2️⃣ insert unless it overlaps a live request
    let filing = file_requests_or_conflict(pool.get_ref(), &[employee_id], &form, payload.leave_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to create leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let id = match filing {
        Filing::Created(ids) => ids.first().copied().unwrap_or_default(),
        Filing::Overlaps(_) => {
            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                "message": "Leave period overlaps an existing request"
            })));
        }
    };

    info!(id, employee_id, days = %form.days, "Leave request submitted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "id": id,
        "status": LeaveStatus::Pending,
        "days": form.days
    })))
}

/* =========================
Bulk license (HR/Admin)
========================= */
/// Files the same leave for several employees at once. All or nothing.
#[utoipa::path(
    post,
    path = "/api/v1/leave/bulk",
    request_body = BulkLeave,
    responses(
        (status = 200, description = "Requests created", body = Object, example = json!({
            "message": "Leave requests submitted",
            "ids": [42, 43],
            "days": 5.0
        })),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Some employees already have leave in the period", body = Object, example = json!({
            "message": "Leave period overlaps existing requests",
            "employee_ids": [1001]
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
#[instrument(name = "leave_bulk", skip_all, fields(user = %auth.username))]
pub async fn create_bulk_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<BulkLeave>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut employee_ids = payload.employee_ids.clone();
    employee_ids.sort_unstable();
    employee_ids.dedup();
    if employee_ids.is_empty() {
        return Ok(bad_request("employee_ids cannot be empty"));
    }

    let form = match value_request(
        payload.kind,
        payload.start_date,
        payload.end_date,
        payload.start_marker,
        payload.end_marker,
    ) {
        Ok(form) => form,
        Err(message) => return Ok(bad_request(message)),
    };

    let filing = file_requests_or_conflict(pool.get_ref(), &employee_ids, &form, payload.leave_type)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Bulk leave insert failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let ids = match filing {
        Filing::Created(ids) => ids,
        Filing::Overlaps(conflicts) => {
            return Ok(HttpResponse::Conflict().json(serde_json::json!({
                "message": "Leave period overlaps existing requests",
                "employee_ids": conflicts
            })));
        }
    };

    info!(count = ids.len(), days = %form.days, "Bulk leave submitted");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave requests submitted",
        "ids": ids,
        "days": form.days
    })))
}

async fn decide_leave(
    pool: &MySqlPool,
    leave_id: u64,
    status: LeaveStatus,
) -> actix_web::Result<HttpResponse> {
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(status.as_ref())
    .bind(leave_id)
    .execute(pool)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, %status, "Leave decision failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    info!(leave_id, %status, "Leave decided");

    let message = match status {
        LeaveStatus::Approved => "Leave approved",
        LeaveStatus::Rejected => "Leave rejected",
        LeaveStatus::Pending => "Leave reopened",
    };
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": message })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    decide_leave(pool.get_ref(), path.into_inner(), LeaveStatus::Approved).await
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/v1/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;
    decide_leave(pool.get_ref(), path.into_inner(), LeaveStatus::Rejected).await
}

const LEAVE_COLUMNS: &str =
    "id, employee_id, start_date, end_date, start_marker, end_marker, days, leave_type, status, created_at";

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/v1/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    // -------------------------
    // Pagination
    // -------------------------
    let Some((page, per_page, offset)) = page_window(query.page, query.per_page) else {
        return Ok(bad_request("page is out of range"));
    };

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status.into()));
    }

    if let Some(leave_type) = query.leave_type {
        where_sql.push_str(" AND leave_type = ?");
        args.push(FilterValue::Str(leave_type.into()));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {}
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        LEAVE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}
