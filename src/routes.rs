use actix_cors::Cors;
use actix_web::{error::JsonPayloadError, get, web, HttpRequest, HttpResponse, Responder};
use tracing::debug;

use crate::error::AuthError;
use crate::user_handlers::{dashboard, login, update_profile};
use crate::venue_handlers::list_venues;

/// Simple health check
#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

/// Any origin, method and header; the demo frontend is served separately.
pub fn cors() -> Cors {
    Cors::permissive()
}

// Malformed JSON bodies get the same error envelope as every other failure.
fn json_error(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    debug!(path = %req.path(), "rejecting request body: {err}");
    AuthError::BadRequest("Invalid request body.").into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(health).service(
        web::scope("/api/v1")
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .service(login)
            .service(dashboard)
            .service(update_profile)
            .service(list_venues),
    );
}
