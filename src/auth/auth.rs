use crate::auth::jwt::verify_access_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, actix_web::Error> {
    // Already resolved by auth_middleware on protected scopes
    if let Some(user) = req.extensions().get::<AuthUser>() {
        return Ok(user.clone());
    }

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("Missing token"))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("Config missing"))?;

    let claims = verify_access_token(token, &config.jwt_secret)
        .map_err(|_| ErrorUnauthorized("Invalid token"))?;

    let role = Role::from_id(claims.role).ok_or_else(|| ErrorUnauthorized("Invalid role"))?;

    Ok(AuthUser {
        username: claims.sub,
        role,
        employee_id: claims.employee_id,
    })
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

impl AuthUser {
    pub fn require_hr_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Hr) {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden("HR/Admin only"))
        }
    }

    /// Employee id of the caller, or 403 for accounts without one.
    pub fn require_employee(&self) -> actix_web::Result<u64> {
        self.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::test_tokens::issue;
    use crate::models::TokenType;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};

    async fn whoami(user: AuthUser) -> HttpResponse {
        HttpResponse::Ok().body(format!("{}:{:?}", user.username, user.role))
    }

    async fn hr_only(user: AuthUser) -> actix_web::Result<HttpResponse> {
        user.require_hr_or_admin()?;
        Ok(HttpResponse::Ok().finish())
    }

    #[actix_web::test]
    async fn extracts_user_from_bearer_token() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests("s3cret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let token = issue(2, None, TokenType::Access, "s3cret");
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "jdoe:Hr");
    }

    #[actix_web::test]
    async fn missing_or_bad_token_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests("s3cret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get().uri("/me").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let token = issue(2, None, TokenType::Access, "wrong");
        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[std::prelude::v1::test]
    fn reuses_user_resolved_by_middleware() {
        let req = test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(AuthUser {
            username: "hr.admin".to_string(),
            role: Role::Hr,
            employee_id: None,
        });

        // no header and no config: only the extension can satisfy this
        let user = authenticate(&req).unwrap();
        assert_eq!(user.username, "hr.admin");
        assert!(user.require_hr_or_admin().is_ok());
        assert!(user.require_employee().is_err());
    }

    #[actix_web::test]
    async fn unknown_role_ids_are_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests("s3cret")))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        for role in [0, 4, 5] {
            let token = issue(role, None, TokenType::Access, "s3cret");
            let req = test::TestRequest::get()
                .uri("/me")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "role {role}");
        }
    }

    #[actix_web::test]
    async fn employees_cannot_use_hr_routes() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(Config::for_tests("s3cret")))
                .route("/hr", web::get().to(hr_only)),
        )
        .await;

        let token = issue(3, Some(1000), TokenType::Access, "s3cret");
        let req = test::TestRequest::get()
            .uri("/hr")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
