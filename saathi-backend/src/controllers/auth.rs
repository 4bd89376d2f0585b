use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::db::tables::users::verify_password;
use crate::models::{Session, User};
use crate::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    email: String,
    password: String,
    name: Option<String>,
    phone: Option<String>,
}

#[derive(Deserialize)]
pub struct SigninRequest {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    token: String,
}

#[derive(Serialize)]
pub struct LogoutResponse {
    success: bool,
}

#[derive(Serialize)]
pub struct ValidateResponse {
    valid: bool,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    name: Option<String>,
    phone: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/signup", web::post().to(signup))
            .route("/signin", web::post().to(signin))
            .route("/logout", web::post().to(logout))
            .route("/validate", web::get().to(validate))
            .route("/profile", web::get().to(get_profile))
            .route("/profile", web::put().to(update_profile)),
    );
}

/// Validate session token from request
fn validate_session_from_request(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Session, HttpResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    let token = match token {
        Some(t) => t,
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No authorization token provided"
            })));
        }
    };

    match state.db.validate_session(&token) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))),
        Err(e) => {
            log::error!("Session validation error: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

fn user_payload(user: &User) -> serde_json::Value {
    serde_json::json!({
        "id": user.id,
        "email": user.email,
        "name": user.name,
        "phone": user.phone,
    })
}

async fn signup(state: web::Data<AppState>, body: web::Json<SignupRequest>) -> impl Responder {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Email and password are required"
        }));
    }

    match state.db.get_user_by_email(&email) {
        Ok(Some(_)) => {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "User already exists with this email"
            }));
        }
        Ok(None) => {}
        Err(e) => {
            log::error!("Signup lookup error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    }

    let user = match state.db.create_user(
        &email,
        &body.password,
        body.name.as_deref(),
        body.phone.as_deref(),
    ) {
        Ok(user) => user,
        Err(e) => {
            log::error!("Failed to create user: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    match state.db.create_session_for_user(user.id) {
        Ok(session) => HttpResponse::Created().json(serde_json::json!({
            "message": "User created successfully",
            "user": user_payload(&user),
            "token": session.token,
        })),
        Err(e) => {
            log::error!("Failed to create session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

async fn signin(state: web::Data<AppState>, body: web::Json<SigninRequest>) -> impl Responder {
    let email = body.email.trim().to_lowercase();

    if email.is_empty() || body.password.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Email and password are required"
        }));
    }

    let user = match state.db.get_user_by_email(&email) {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Invalid email or password"
            }));
        }
        Err(e) => {
            log::error!("Signin lookup error: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    if !verify_password(&user, &body.password) {
        return HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid email or password"
        }));
    }

    match state.db.create_session_for_user(user.id) {
        Ok(session) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Login successful",
            "user": user_payload(&user),
            "token": session.token,
        })),
        Err(e) => {
            log::error!("Failed to create session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

async fn logout(state: web::Data<AppState>, body: web::Json<LogoutRequest>) -> impl Responder {
    match state.db.delete_session(&body.token) {
        Ok(_) => HttpResponse::Ok().json(LogoutResponse { success: true }),
        Err(e) => {
            log::error!("Failed to delete session: {}", e);
            HttpResponse::InternalServerError().json(LogoutResponse { success: false })
        }
    }
}

async fn validate(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    match validate_session_from_request(&state, &req) {
        Ok(_) => HttpResponse::Ok().json(ValidateResponse { valid: true }),
        Err(_) => HttpResponse::Ok().json(ValidateResponse { valid: false }),
    }
}

async fn get_profile(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.get_user_by_id(session.user_id) {
        Ok(Some(user)) => HttpResponse::Ok().json(serde_json::json!({ "user": user })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "User not found"
        })),
        Err(e) => {
            log::error!("Failed to load profile: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

async fn update_profile(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<UpdateProfileRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state
        .db
        .update_user_profile(session.user_id, body.name.as_deref(), body.phone.as_deref())
    {
        Ok(Some(user)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Profile updated successfully",
            "user": user_payload(&user),
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "User not found"
        })),
        Err(e) => {
            log::error!("Failed to update profile: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}
