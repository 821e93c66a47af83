use std::path::PathBuf;

use serde::{
    Deserialize,
    Serialize,
};

use crate::anki::types::Direction;

/// Which card directions an entry asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GenerationMode {
    #[default]
    #[serde(rename = "both")]
    Both,
    /// Japanese on the front only.
    #[serde(rename = "jp_en")]
    Forward,
    /// Translation on the front only.
    #[serde(rename = "en_jp")]
    Reverse,
}

impl GenerationMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "both" => Some(Self::Both),
            "jp_en" => Some(Self::Forward),
            "en_jp" => Some(Self::Reverse),
            _ => None,
        }
    }

    pub fn allows(&self, direction: Direction) -> bool {
        match (self, direction) {
            (GenerationMode::Both, _) => true,
            (GenerationMode::Forward, Direction::Forward) => true,
            (GenerationMode::Reverse, Direction::Reverse) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanjiForm {
    pub surface: String,
    /// Pre-annotated reading such as `郵便[ゆうびん]局[きょく]`; empty when the
    /// caller left alignment to us.
    pub furigana: String,
}

/// One validated input row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabularyEntry {
    pub reading: String,
    pub kanji: Option<KanjiForm>,
    pub translation: String,
    pub sentence_reading: String,
    pub sentence_translation: String,
    /// `data:image/...;base64,...`
    pub sentence_image: Option<String>,
    /// `None` disables audio for this entry.
    pub audio_count: Option<u32>,
    pub generation_mode: GenerationMode,
}

impl VocabularyEntry {
    pub fn new(reading: &str, translation: &str) -> Self {
        Self {
            reading: reading.to_string(),
            kanji: None,
            translation: translation.to_string(),
            sentence_reading: String::new(),
            sentence_translation: String::new(),
            sentence_image: None,
            audio_count: None,
            generation_mode: GenerationMode::Both,
        }
    }

    pub fn kanji_surface(&self) -> Option<&str> {
        self.kanji.as_ref().map(|k| k.surface.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedWord {
    #[serde(rename = "kanji")]
    pub kanji_surface: Option<String>,
    #[serde(rename = "reading_hiragana")]
    pub hiragana_reading: String,
    #[serde(rename = "reading_furigana")]
    pub furigana_reading: String,
    pub translation: String,
    pub audio_paths: Vec<PathBuf>,
    #[serde(rename = "sentence_kana")]
    pub sentence_reading: String,
    #[serde(rename = "sentence_english")]
    pub sentence_translation: String,
    pub sentence_image: Option<String>,
    pub sentence_audio_paths: Vec<PathBuf>,
    pub generation_mode: GenerationMode,
}

impl NormalizedWord {
    pub fn has_kanji(&self) -> bool {
        self.kanji_surface.as_deref().is_some_and(|k| !k.trim().is_empty())
    }

    /// Kanji surface, or the reading for kana-only words.
    pub fn headword(&self) -> &str {
        match &self.kanji_surface {
            Some(kanji) if !kanji.trim().is_empty() => kanji,
            _ => &self.hiragana_reading,
        }
    }
}
