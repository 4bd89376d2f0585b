//! REST client for the Saathi backend — the reminder store and the `/speak`
//! speech proxy, both behind the owner's bearer token.

use reminder_types::{
    MedicineReminder, MedicinesResponse, MemoryAid, MemoryAidsResponse, ReminderDefinition,
    SpeakRequest, SpeakResponse,
};

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// The owner's full matching set: medicines first, then memory aids,
    /// each in store order.
    pub async fn fetch_definitions(&self) -> Result<Vec<ReminderDefinition>, String> {
        let medicines = self.fetch_medicines().await?;
        let memory_aids = self.fetch_memory_aids().await?;

        let mut definitions: Vec<ReminderDefinition> =
            medicines.iter().map(MedicineReminder::to_definition).collect();
        definitions.extend(memory_aids.iter().filter_map(MemoryAid::to_definition));

        Ok(definitions)
    }

    async fn fetch_medicines(&self) -> Result<Vec<MedicineReminder>, String> {
        let response = self
            .client
            .get(format!("{}/api/medicines", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch medicines: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Medicines fetch returned {}", response.status()));
        }

        let body: MedicinesResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse medicines response: {}", e))?;
        Ok(body.medicines)
    }

    async fn fetch_memory_aids(&self) -> Result<Vec<MemoryAid>, String> {
        let response = self
            .client
            .get(format!("{}/api/memory", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch memory aids: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("Memory aids fetch returned {}", response.status()));
        }

        let body: MemoryAidsResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse memory aids response: {}", e))?;
        Ok(body.memory_aids)
    }

    /// Ask the backend to synthesize `text`; returns the audio URL.
    pub async fn speak(&self, text: &str, voice_id: Option<&str>) -> Result<String, String> {
        let request = SpeakRequest {
            text: text.to_string(),
            voice_id: voice_id.map(|v| v.to_string()),
        };

        let response = self
            .client
            .post(format!("{}/speak", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Speak request failed: {}", e))?;

        if !response.status().is_success() {
            return Err(format!("/speak returned {}", response.status()));
        }

        let body: SpeakResponse = response
            .json()
            .await
            .map_err(|e| format!("Failed to parse /speak response: {}", e))?;
        Ok(body.audio_url)
    }
}
