use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::db::tables::mood::CreateMoodEntryRequest;
use crate::models::Session;
use crate::AppState;

#[derive(Deserialize)]
struct StatsQuery {
    period: Option<i64>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/mood")
            .route("", web::get().to(list_entries))
            .route("", web::post().to(create_entry))
            .route("/stats", web::get().to(mood_stats))
            .route("/interests", web::get().to(top_interests))
            .route("/{id}", web::delete().to(delete_entry)),
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

async fn list_entries(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.list_mood_entries(session.user_id) {
        Ok(entries) => HttpResponse::Ok().json(serde_json::json!({ "moodEntries": entries })),
        Err(e) => {
            log::error!("Failed to list mood entries: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn create_entry(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateMoodEntryRequest>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    if body.mood.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Mood is required"
        }));
    }

    match state.db.create_mood_entry(session.user_id, &body.into_inner()) {
        Ok(entry) => HttpResponse::Created().json(serde_json::json!({
            "message": "Mood entry added successfully",
            "moodEntry": entry,
        })),
        Err(e) => {
            log::error!("Failed to create mood entry: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn mood_stats(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<StatsQuery>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let period = query.period.unwrap_or(7).max(1);

    match state.db.mood_stats(session.user_id, period) {
        Ok(stats) => {
            let total_entries: i64 = stats.iter().map(|s| s.count).sum();
            HttpResponse::Ok().json(serde_json::json!({
                "stats": stats,
                "totalEntries": total_entries,
                "period": period,
            }))
        }
        Err(e) => {
            log::error!("Failed to compute mood stats: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn top_interests(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    match state.db.top_interests(session.user_id) {
        Ok(interests) => {
            let interests: Vec<serde_json::Value> = interests
                .into_iter()
                .map(|(interest, count)| serde_json::json!({ "interest": interest, "count": count }))
                .collect();
            HttpResponse::Ok().json(serde_json::json!({ "interests": interests }))
        }
        Err(e) => {
            log::error!("Failed to tally interests: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

async fn delete_entry(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let session = match validate_session_from_request(&state, &req) {
        Ok(session) => session,
        Err(resp) => return resp,
    };

    let entry_id = path.into_inner();

    match state.db.delete_mood_entry(session.user_id, entry_id) {
        Ok(true) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Mood entry deleted successfully"
        })),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "Mood entry not found"
        })),
        Err(e) => {
            log::error!("Failed to delete mood entry: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}
