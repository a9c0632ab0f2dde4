use crate::{
    auth::{
        Authenticator, CurrentUser, LoginRequest, RegisterRequest, RegisterResponse, Registrar,
        SecurityContext, TokenResponse,
    },
    error::AppError,
};
use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;

/// Login user
///
/// Authenticates a username/password pair and returns a bearer token whose
/// subject is the username. Bad credentials come back as 401 without
/// revealing whether the username exists.
#[post("/login")]
pub async fn login(
    authenticator: web::Data<Authenticator>,
    login_data: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<impl Responder, AppError> {
    // Validate input
    login_data.validate()?;

    let ctx = SecurityContext::from_request(&req);
    let token = authenticator
        .authenticate(&login_data.username, &login_data.password, &ctx)
        .await?;

    Ok(HttpResponse::Ok().json(TokenResponse {
        token,
        username: login_data.username.clone(),
    }))
}

/// Register a new user
///
/// Creates a new credential record with a hashed password and the requested
/// role. The account can log in immediately afterwards; no token is issued
/// here.
#[post("/register")]
pub async fn register(
    registrar: web::Data<Registrar>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    registrar
        .register(
            &register_data.username,
            &register_data.password,
            &register_data.role,
        )
        .await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        status: "Registered".to_string(),
        username: register_data.username.clone(),
        role: register_data.role.clone(),
    }))
}

/// Verify token
///
/// Reachable only with an authenticated identity attached; the `CurrentUser`
/// extractor turns anything else into a 401.
#[get("/check-auth")]
pub async fn check_auth(_user: CurrentUser) -> impl Responder {
    HttpResponse::Ok().body("Authenticated")
}
