use std::path::{
    Path,
    PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use super::KotoError;
use crate::{
    dictionary::DictType,
    persistence::{
        get_data_file_path,
        load_json,
    },
};

pub const CONFIG_FILE: &str = "config.json";
pub const API_KEY_ENV: &str = "ELEVENLABS_API_KEY";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tts: TtsConfig,
    pub anki: AnkiConfig,
    pub results_dir: PathBuf,
    pub dictionary: DictType,
    pub audio_failure: AudioFailurePolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tts: TtsConfig::default(),
            anki: AnkiConfig::default(),
            results_dir: PathBuf::from("results"),
            dictionary: DictType::default(),
            audio_failure: AudioFailurePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub api_key: String,
    pub voice_id: String,
    pub model_id: String,
    pub base_url: String,
    /// Upper bound on simultaneous synthesis requests.
    pub concurrency: usize,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            voice_id: "fUjY9K2nAIwlALOwSiwc".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            base_url: "https://api.elevenlabs.io".to_string(),
            concurrency: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnkiConfig {
    /// Forward note type id; the reverse note type uses `note_type_id + 1`.
    pub note_type_id: u64,
    pub model_name: String,
    pub deck_name: String,
    pub connect_url: String,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            note_type_id: 1607392319,
            model_name: "Japanese-75658".to_string(),
            deck_name: "Japanese Vocabulary".to_string(),
            connect_url: "http://localhost:8765/".to_string(),
        }
    }
}

impl AnkiConfig {
    /// Id of the reverse note type. Both ids end up as SQLite integers, so
    /// they must fit in an `i64`.
    pub fn reverse_note_type_id(&self) -> Result<u64, KotoError> {
        self.note_type_id
            .checked_add(1)
            .filter(|id| *id <= i64::MAX as u64)
            .ok_or_else(|| {
                KotoError::Custom(format!(
                    "anki.note_type_id {} is out of range (must be below {})",
                    self.note_type_id,
                    i64::MAX
                ))
            })
    }
}

/// What to do when speech synthesis fails for one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFailurePolicy {
    /// Log the failure and continue with no audio for that word.
    #[default]
    Isolate,
    Abort,
}

impl Config {
    /// Loads `path` (or the per-user `config.json`) and applies environment
    /// overrides. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, KotoError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => get_data_file_path(CONFIG_FILE),
        };

        let mut config: Config = load_json(&path)?;
        config.apply_env(std::env::var(API_KEY_ENV).ok());
        config.anki.reverse_note_type_id()?;
        Ok(config)
    }

    fn apply_env(&mut self, api_key: Option<String>) {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.tts.api_key = key;
        }
    }

    pub fn api_key_set(&self) -> bool {
        !self.tts.api_key.trim().is_empty()
    }


    /// The effective configuration with the API key replaced by `api_key_set`.
    pub fn to_masked_json(&self) -> Result<serde_json::Value, KotoError> {
        let mut value = serde_json::to_value(self)?;
        if let Some(tts) = value.get_mut("tts").and_then(|tts| tts.as_object_mut()) {
            tts.remove("api_key");
            tts.insert("api_key_set".to_string(), self.api_key_set().into());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{ "tts": { "voice_id": "abc" }, "audio_failure": "abort" }"#)
                .unwrap();

        assert_eq!(config.tts.voice_id, "abc");
        assert_eq!(config.tts.model_id, "eleven_multilingual_v2");
        assert_eq!(config.anki.note_type_id, 1607392319);
        assert_eq!(config.audio_failure, AudioFailurePolicy::Abort);
        assert_eq!(config.dictionary, DictType::Unidic);
    }

    #[test]
    fn test_env_key_overrides_file() {
        let mut config = Config::default();
        assert!(!config.api_key_set());

        config.apply_env(Some("secret".to_string()));
        assert_eq!(config.tts.api_key, "secret");
        assert!(config.api_key_set());

        config.apply_env(Some("  ".to_string()));
        assert_eq!(config.tts.api_key, "secret");
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "anki": { "deck_name": "N5" }, "dictionary": "ipadic" }"#)
            .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.anki.deck_name, "N5");
        assert_eq!(config.dictionary, DictType::Ipadic);
        assert_eq!(config.anki.reverse_note_type_id().unwrap(), 1607392320);
    }

    #[test]
    fn test_note_type_id_out_of_range_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, format!(r#"{{ "anki": {{ "note_type_id": {} }} }}"#, u64::MAX)).unwrap();

        assert!(matches!(Config::load(Some(&path)), Err(KotoError::Custom(_))));

        let anki = AnkiConfig { note_type_id: i64::MAX as u64, ..Default::default() };
        assert!(anki.reverse_note_type_id().is_err());
    }

    #[test]
    fn test_masked_json_hides_key() {
        let mut config = Config::default();
        config.tts.api_key = "secret".to_string();

        let value = config.to_masked_json().unwrap();
        assert!(value["tts"].get("api_key").is_none());
        assert_eq!(value["tts"]["api_key_set"], true);
        assert_eq!(value["audio_failure"], "isolate");
        assert!(!value.to_string().contains("secret"));
    }
}
