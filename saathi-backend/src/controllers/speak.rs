//! `/speak` — proxies text to the Murf speech provider and returns an audio URL.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use reminder_types::SpeakRequest;

use crate::http::shared_client;
use crate::AppState;

const MURF_GENERATE_URL: &str = "https://api.murf.ai/v1/speech/generate";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/speak", web::post().to(speak));
}

async fn speak(state: web::Data<AppState>, body: web::Json<SpeakRequest>) -> impl Responder {
    if body.text.trim().is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "text is required"
        }));
    }

    let api_key = match &state.config.murf_api_key {
        Some(key) => key.clone(),
        None => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "MURF_API_KEY missing on server"
            }));
        }
    };

    // A bare locale like "en" is not a Murf voice id; fall back to the default.
    let voice_id = match body.voice_id.as_deref() {
        Some(v) if v.contains('-') => v.to_string(),
        _ => state.config.murf_voice_id.clone(),
    };

    let payload = serde_json::json!({
        "text": body.text,
        "voiceId": voice_id,
        "format": "mp3",
        "modelVersion": "GEN2",
        "sampleRate": 44100,
        "encodeAsBase64": false,
    });

    let response = match shared_client()
        .post(MURF_GENERATE_URL)
        .header("api-key", api_key)
        .json(&payload)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            log::error!("Murf request failed: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }));
        }
    };

    let status = response.status();
    let data: serde_json::Value = match response.json().await {
        Ok(d) => d,
        Err(e) => {
            log::error!("Failed to parse Murf response: {}", e);
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Invalid response from speech provider"
            }));
        }
    };

    if !status.is_success() {
        log::warn!("Murf returned {}: {}", status, data);
        let status =
            StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let error = data
            .get("errorMessage")
            .or_else(|| data.get("message"))
            .and_then(|v| v.as_str())
            .unwrap_or("Murf API error")
            .to_string();
        return HttpResponse::build(status).json(serde_json::json!({
            "error": error,
            "details": data,
        }));
    }

    let audio_url = data
        .get("audioFile")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .or_else(|| {
            data.get("encodedAudio")
                .and_then(|v| v.as_str())
                .map(|encoded| format!("data:audio/mpeg;base64,{}", encoded))
        });

    match audio_url {
        Some(url) => HttpResponse::Ok().json(serde_json::json!({ "audioUrl": url })),
        None => HttpResponse::InternalServerError().json(serde_json::json!({
            "error": "audioUrl not found in Murf response",
            "details": data,
        })),
    }
}
