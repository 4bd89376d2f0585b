use std::env;

#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub murf_api_key: Option<String>,
    pub murf_voice_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        let murf_api_key = env::var("MURF_API_KEY").ok();
        if murf_api_key.is_none() {
            log::warn!("MURF_API_KEY is not set. /speak will return 500.");
        }

        Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("PORT must be a valid number"),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "./.db/saathi.db".to_string()),
            murf_api_key,
            murf_voice_id: env::var("MURF_VOICE_ID").unwrap_or_else(|_| "en-IN-arohi".to_string()),
        }
    }
}
