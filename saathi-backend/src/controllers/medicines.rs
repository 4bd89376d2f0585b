use actix_web::{web, HttpRequest, HttpResponse, Responder};
use reminder_types::is_valid_hhmm;

use crate::db::tables::medicines::{CreateMedicineRequest, UpdateMedicineRequest};
use crate::models::Session;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/medicines")
            .route("", web::get().to(list_medicines))
            .route("", web::post().to(create_medicine))
            .route("/{id}", web::put().to(update_medicine))
            .route("/{id}", web::delete().to(delete_medicine))
            .route("/{id}/toggle", web::patch().to(toggle_medicine)),
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

async fn list_medicines(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.list_medicines(session.user_id) {
        Ok(medicines) => HttpResponse::Ok().json(serde_json::json!({ "medicines": medicines })),
        Err(e) => {
            log::error!("Failed to list medicines: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn create_medicine(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateMedicineRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if body.name.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Name, time, and days array are required"
        }));
    }
    if !is_valid_hhmm(&body.time) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Time must be in 24-hour HH:MM format"
        }));
    }

    match state.db.create_medicine(session.user_id, &body.into_inner()) {
        Ok(medicine) => HttpResponse::Created().json(serde_json::json!({
            "message": "Medicine reminder added successfully",
            "medicine": medicine,
        })),
        Err(e) => {
            log::error!("Failed to create medicine: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn update_medicine(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateMedicineRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if let Some(ref time) = body.time {
        if !is_valid_hhmm(time) {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Time must be in 24-hour HH:MM format"
            }));
        }
    }

    let medicine_id = path.into_inner();

    match state
        .db
        .update_medicine(session.user_id, medicine_id, &body.into_inner())
    {
        Ok(Some(medicine)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Medicine reminder updated successfully",
            "medicine": medicine,
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Medicine reminder not found"
        })),
        Err(e) => {
            log::error!("Failed to update medicine: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn delete_medicine(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let medicine_id = path.into_inner();

    match state.db.delete_medicine(session.user_id, medicine_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Medicine reminder deleted successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Medicine reminder not found"
        })),
        Err(e) => {
            log::error!("Failed to delete medicine: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn toggle_medicine(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let medicine_id = path.into_inner();

    match state.db.toggle_medicine(session.user_id, medicine_id) {
        Ok(Some(is_active)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Medicine reminder status updated successfully",
            "is_active": is_active,
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Medicine reminder not found"
        })),
        Err(e) => {
            log::error!("Failed to toggle medicine: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
