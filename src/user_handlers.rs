use actix_web::{post, web, HttpRequest, HttpResponse};
use tracing::info;

use crate::error::AuthError;
use crate::models::{
    ApiResponse, Claims, LoginData, LoginRequest, UpdateProfileRequest, UserData, UserView,
    STATUS_OK, STATUS_SUCCESS,
};
use crate::state::AppState;

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    data: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    let claims = state.verifier.verify(&data.username, &data.password).await?;
    let token = state.tokens.issue(&claims)?;
    info!(username = %claims.username, "user logged in");

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        STATUS_OK,
        "User logged in successfully.",
        LoginData {
            user: UserView {
                username: claims.username,
                email: None,
            },
            token,
        },
    )))
}

/// Token present, correctly signed and unexpired. Store state is checked
/// separately by the session guard.
fn authenticate(req: &HttpRequest, state: &AppState) -> Result<Claims, AuthError> {
    let token = state
        .extractor
        .extract(req)?
        .ok_or(AuthError::TokenMissing)?;
    state.tokens.validate(&token)
}

#[post("/dashboard")]
pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AuthError> {
    let claims = authenticate(&req, &state)?;
    let user = state.guard.authorize(&claims).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(STATUS_OK, "Dashboard", UserData { user })))
}

// The form is optional so a request without a session is a 401, not a 400.
#[post("/update-profile")]
pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    form: Option<web::Form<UpdateProfileRequest>>,
) -> Result<HttpResponse, AuthError> {
    let claims = authenticate(&req, &state)?;
    let Some(form) = form else {
        state.guard.authorize(&claims).await?;
        return Err(AuthError::BadRequest("Missing email."));
    };
    let view = state.guard.update_email(&claims, &form.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        STATUS_SUCCESS,
        "Profile updated successfully.",
        view,
    )))
}
