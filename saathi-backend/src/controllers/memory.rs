use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{Duration, Local};
use reminder_types::{is_valid_hhmm, ReminderKind};

use crate::db::tables::memory_aids::{CreateMemoryAidRequest, UpdateMemoryAidRequest};
use crate::models::Session;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/memory")
            .route("", web::get().to(list_memory_aids))
            .route("", web::post().to(create_memory_aid))
            .route("/today", web::get().to(todays_reminders))
            .route("/upcoming", web::get().to(upcoming_reminders))
            .route("/{id}", web::put().to(update_memory_aid))
            .route("/{id}", web::delete().to(delete_memory_aid)),
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

async fn list_memory_aids(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.list_memory_aids(session.user_id) {
        Ok(aids) => HttpResponse::Ok().json(serde_json::json!({ "memoryAids": aids })),
        Err(e) => {
            log::error!("Failed to list memory aids: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn create_memory_aid(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateMemoryAidRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if body.title.trim().is_empty() || body.date.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Title, date, and type are required"
        }));
    }
    if !ReminderKind::MEMORY_AID_TYPES.contains(&body.kind.as_str()) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Type must be one of: birthday, anniversary, spiritual, other"
        }));
    }
    if let Some(ref time) = body.time {
        if !is_valid_hhmm(time) {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Time must be in 24-hour HH:MM format"
            }));
        }
    }

    match state.db.create_memory_aid(session.user_id, &body.into_inner()) {
        Ok(aid) => HttpResponse::Created().json(serde_json::json!({
            "message": "Memory aid added successfully",
            "memoryAid": aid,
        })),
        Err(e) => {
            log::error!("Failed to create memory aid: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn update_memory_aid(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateMemoryAidRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if let Some(ref kind) = body.kind {
        if !ReminderKind::MEMORY_AID_TYPES.contains(&kind.as_str()) {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Type must be one of: birthday, anniversary, spiritual, other"
            }));
        }
    }
    if let Some(ref time) = body.time {
        if !is_valid_hhmm(time) {
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": "Time must be in 24-hour HH:MM format"
            }));
        }
    }

    let aid_id = path.into_inner();

    match state
        .db
        .update_memory_aid(session.user_id, aid_id, &body.into_inner())
    {
        Ok(Some(aid)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Memory aid updated successfully",
            "memoryAid": aid,
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Memory aid not found"
        })),
        Err(e) => {
            log::error!("Failed to update memory aid: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn delete_memory_aid(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let aid_id = path.into_inner();

    match state.db.delete_memory_aid(session.user_id, aid_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Memory aid deleted successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Memory aid not found"
        })),
        Err(e) => {
            log::error!("Failed to delete memory aid: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn todays_reminders(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let today = Local::now().format("%Y-%m-%d").to_string();

    match state.db.list_memory_aids_for_date(session.user_id, &today) {
        Ok(aids) => HttpResponse::Ok().json(serde_json::json!({ "todaysReminders": aids })),
        Err(e) => {
            log::error!("Failed to list today's reminders: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn upcoming_reminders(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let now = Local::now();
    let today = now.format("%Y-%m-%d").to_string();
    let next_week = (now + Duration::days(7)).format("%Y-%m-%d").to_string();

    match state
        .db
        .list_memory_aids_between(session.user_id, &today, &next_week)
    {
        Ok(aids) => HttpResponse::Ok().json(serde_json::json!({ "upcomingReminders": aids })),
        Err(e) => {
            log::error!("Failed to list upcoming reminders: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
