use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::db::tables::emergency::{CreateContactRequest, UpdateContactRequest};
use crate::models::Session;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/emergency")
            .route("", web::get().to(list_contacts))
            .route("", web::post().to(create_contact))
            .route("/primary", web::get().to(get_primary))
            .route("/{id}", web::put().to(update_contact))
            .route("/{id}", web::delete().to(delete_contact))
            .route("/{id}/primary", web::patch().to(set_primary)),
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

async fn list_contacts(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.list_contacts(session.user_id) {
        Ok(contacts) => HttpResponse::Ok().json(serde_json::json!({ "contacts": contacts })),
        Err(e) => {
            log::error!("Failed to list emergency contacts: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn create_contact(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateContactRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if body.name.trim().is_empty()
        || body.phone.trim().is_empty()
        || body.relationship.trim().is_empty()
    {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Name, phone, and relationship are required"
        }));
    }

    match state.db.create_contact(session.user_id, &body.into_inner()) {
        Ok(contact) => HttpResponse::Created().json(serde_json::json!({
            "message": "Emergency contact added successfully",
            "contact": contact,
        })),
        Err(e) => {
            log::error!("Failed to create emergency contact: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn update_contact(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<UpdateContactRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let contact_id = path.into_inner();

    match state
        .db
        .update_contact(session.user_id, contact_id, &body.into_inner())
    {
        Ok(Some(contact)) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Emergency contact updated successfully",
            "contact": contact,
        })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Emergency contact not found"
        })),
        Err(e) => {
            log::error!("Failed to update emergency contact: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn delete_contact(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let contact_id = path.into_inner();

    match state.db.delete_contact(session.user_id, contact_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Emergency contact deleted successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Emergency contact not found"
        })),
        Err(e) => {
            log::error!("Failed to delete emergency contact: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn set_primary(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let contact_id = path.into_inner();

    match state.db.set_primary_contact(session.user_id, contact_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Primary contact updated successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Emergency contact not found"
        })),
        Err(e) => {
            log::error!("Failed to set primary contact: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn get_primary(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.get_primary_contact(session.user_id) {
        Ok(Some(contact)) => HttpResponse::Ok().json(serde_json::json!({ "contact": contact })),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "No primary contact found"
        })),
        Err(e) => {
            log::error!("Failed to get primary contact: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
