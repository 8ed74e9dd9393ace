use crate::{
    api::{calendar, holiday_period, leave_request},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

fn build_limiter(requests_per_min: u32) -> Option<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = 60_000 / u64::from(requests_per_min.max(1));
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms.max(1))
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()?;
    Some(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let Some(protected_limiter) = build_limiter(config.rate_protected_per_min) else {
        // unreachable with a non-zero period and burst
        tracing::error!("Invalid rate limit configuration");
        return;
    };

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/calendar").service(
                    web::resource("/business-days")
                        .route(web::get().to(calendar::business_days)),
                ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/preview
                    .service(
                        web::resource("/preview").route(web::post().to(calendar::preview_leave)),
                    )
                    // /leave/bulk
                    .service(
                        web::resource("/bulk")
                            .route(web::post().to(leave_request::create_bulk_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::scope("/holiday-periods")
                    // /holiday-periods
                    .service(
                        web::resource("")
                            .route(web::get().to(holiday_period::list_holiday_periods))
                            .route(web::post().to(holiday_period::create_holiday_period)),
                    )
                    // /holiday-periods/disabled-days
                    .service(
                        web::resource("/disabled-days")
                            .route(web::get().to(holiday_period::list_disabled_days)),
                    )
                    // /holiday-periods/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(holiday_period::get_holiday_period))
                            .route(web::put().to(holiday_period::update_holiday_period))
                            .route(web::delete().to(holiday_period::delete_holiday_period)),
                    ),
            ),
    );
}
