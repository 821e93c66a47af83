use log::debug;
use reqwest::{
    blocking::Client,
    header::ACCEPT,
};
use serde::Serialize;

use super::SpeechSynthesizer;
use crate::core::{
    config::TtsConfig,
    http::{
        http_client,
        send_with_retry,
    },
    KotoError,
};

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
}

/// ElevenLabs text-to-speech over its REST API, returning MP3 bytes.
pub struct ElevenLabsSynthesizer {
    client: Client,
    api_key: String,
    voice_id: String,
    model_id: String,
    base_url: String,
}

impl ElevenLabsSynthesizer {
    pub fn new(config: &TtsConfig) -> Result<Self, KotoError> {
        if config.api_key.trim().is_empty() {
            return Err(KotoError::Synthesis(
                "No ElevenLabs API key configured (set ELEVENLABS_API_KEY or tts.api_key)"
                    .to_string(),
            ));
        }

        Ok(Self {
            client: http_client()?,
            api_key: config.api_key.clone(),
            voice_id: config.voice_id.clone(),
            model_id: config.model_id.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

impl SpeechSynthesizer for ElevenLabsSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, KotoError> {
        let url = self.endpoint();
        let body = SpeechRequest { text, model_id: &self.model_id };

        let resp = send_with_retry(|| {
            self.client
                .post(&url)
                .header("xi-api-key", &self.api_key)
                .header(ACCEPT, "audio/mpeg")
                .json(&body)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().unwrap_or_default();
            return Err(KotoError::Synthesis(format!("HTTP {} from {}: {}", status, url, detail)));
        }

        let bytes = resp.bytes()?;
        debug!("Synthesized {} bytes for {:?}", bytes.len(), text);
        Ok(bytes.to_vec())
    }
}
