//! Speech delivery.
//!
//! An ordered list of delivery strategies is tried in sequence until one
//! succeeds: the backend's Murf proxy played through a local audio player,
//! then an on-device synthesizer, then a visible text alert. The last
//! strategy never fails, so a due reminder is never silently lost even when
//! no synthesis path works.

use async_trait::async_trait;
use tokio::process::Command;

use crate::api::ApiClient;

pub type DeliveryResult = Result<(), String>;

/// The "speak and report failure" contract the poller depends on.
#[async_trait]
pub trait SpeechDelivery: Send + Sync {
    async fn speak(&self, text: &str, voice_id: Option<&str>) -> DeliveryResult;
}

/// One way of getting a message heard (or at least seen).
#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn deliver(&self, text: &str, voice_id: Option<&str>) -> DeliveryResult;
}

/// Folds over its strategies in order until one succeeds.
pub struct Speaker {
    strategies: Vec<Box<dyn DeliveryStrategy>>,
}

impl Speaker {
    pub fn new(strategies: Vec<Box<dyn DeliveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// The default chain: remote TTS, on-device synthesizer, text alert.
    pub fn with_default_chain(api: ApiClient, player_cmd: &str, synth_cmd: &str) -> Self {
        Self::new(vec![
            Box::new(RemoteTts::new(api, player_cmd)),
            Box::new(LocalSynth::new(synth_cmd)),
            Box::new(TextAlert),
        ])
    }
}

#[async_trait]
impl SpeechDelivery for Speaker {
    async fn speak(&self, text: &str, voice_id: Option<&str>) -> DeliveryResult {
        for strategy in &self.strategies {
            match strategy.deliver(text, voice_id).await {
                Ok(()) => {
                    log::debug!("[REMINDER] Delivered via {}", strategy.name());
                    return Ok(());
                }
                Err(e) => {
                    log::warn!("[REMINDER] {} delivery failed: {}", strategy.name(), e);
                }
            }
        }
        Err("All delivery strategies exhausted".to_string())
    }
}

/// Primary path: the backend `/speak` proxy returns an audio URL, which is
/// handed to a local player command (mpg123 and ffplay both stream URLs).
pub struct RemoteTts {
    api: ApiClient,
    player_cmd: String,
}

impl RemoteTts {
    pub fn new(api: ApiClient, player_cmd: &str) -> Self {
        Self {
            api,
            player_cmd: player_cmd.to_string(),
        }
    }
}

#[async_trait]
impl DeliveryStrategy for RemoteTts {
    fn name(&self) -> &'static str {
        "remote-tts"
    }

    async fn deliver(&self, text: &str, voice_id: Option<&str>) -> DeliveryResult {
        let audio_url = self.api.speak(text, voice_id).await?;
        run_command(&self.player_cmd, &audio_url).await
    }
}

/// On-device fallback synthesizer (espeak-ng by default). The synthesizer
/// picks its own voice; Murf voice ids mean nothing to it.
pub struct LocalSynth {
    synth_cmd: String,
}

impl LocalSynth {
    pub fn new(synth_cmd: &str) -> Self {
        Self {
            synth_cmd: synth_cmd.to_string(),
        }
    }
}

#[async_trait]
impl DeliveryStrategy for LocalSynth {
    fn name(&self) -> &'static str {
        "local-synth"
    }

    async fn deliver(&self, text: &str, _voice_id: Option<&str>) -> DeliveryResult {
        run_command(&self.synth_cmd, text).await
    }
}

/// Last resort: surface the message text where it cannot be missed.
pub struct TextAlert;

#[async_trait]
impl DeliveryStrategy for TextAlert {
    fn name(&self) -> &'static str {
        "text-alert"
    }

    async fn deliver(&self, text: &str, _voice_id: Option<&str>) -> DeliveryResult {
        log::error!("[REMINDER] VOICE MESSAGE (audio unavailable): \"{}\"", text);
        Ok(())
    }
}

/// Run a configured command line with one extra trailing argument.
async fn run_command(cmd_line: &str, final_arg: &str) -> DeliveryResult {
    let mut parts = cmd_line.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| "Empty command configured".to_string())?;

    let status = Command::new(program)
        .args(parts)
        .arg(final_arg)
        .status()
        .await
        .map_err(|e| format!("Failed to run {}: {}", program, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", program, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedStrategy {
        name: &'static str,
        succeed: bool,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl DeliveryStrategy for ScriptedStrategy {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn deliver(&self, _text: &str, _voice_id: Option<&str>) -> DeliveryResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                Ok(())
            } else {
                Err("scripted failure".to_string())
            }
        }
    }

    fn strategy(name: &'static str, succeed: bool) -> (Box<dyn DeliveryStrategy>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(ScriptedStrategy {
                name,
                succeed,
                calls: calls.clone(),
            }),
            calls,
        )
    }

    #[tokio::test]
    async fn first_success_stops_the_fold() {
        let (first, first_calls) = strategy("first", true);
        let (second, second_calls) = strategy("second", true);
        let speaker = Speaker::new(vec![first, second]);

        assert!(speaker.speak("hello", None).await.is_ok());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failures_fall_through_in_order() {
        let (first, first_calls) = strategy("first", false);
        let (second, second_calls) = strategy("second", false);
        let (third, third_calls) = strategy("third", true);
        let speaker = Speaker::new(vec![first, second, third]);

        assert!(speaker.speak("hello", None).await.is_ok());
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 1);
        assert_eq!(third_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhausted_chain_reports_failure() {
        let (only, _) = strategy("only", false);
        let speaker = Speaker::new(vec![only]);
        assert!(speaker.speak("hello", None).await.is_err());
    }

    #[tokio::test]
    async fn text_alert_always_succeeds() {
        assert!(TextAlert.deliver("hello", None).await.is_ok());
    }
}
