use std::{
    fs,
    path::Path,
};

use serde::{
    Deserialize,
    Serialize,
};
use serde_json::Value;

use super::{
    models::{
        GenerationMode,
        KanjiForm,
        VocabularyEntry,
    },
    KotoError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputFile {
    #[serde(default)]
    pub vocabulary: Vec<RawEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawKanji {
    #[serde(default)]
    pub kanji: String,
    #[serde(default)]
    pub furigana: String,
}

/// An input row exactly as submitted, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEntry {
    #[serde(default)]
    pub reading: String,
    #[serde(default)]
    pub kanji: Option<RawKanji>,
    #[serde(default)]
    pub translation: String,
    #[serde(default)]
    pub sentence_kana: Option<String>,
    #[serde(default)]
    pub sentence_english: Option<String>,
    #[serde(default)]
    pub sentence_image: Option<String>,
    #[serde(default)]
    pub audio_count: Option<Value>,
    #[serde(default)]
    pub generation_mode: Option<String>,
}

impl RawEntry {
    fn is_blank(&self) -> bool {
        self.reading.trim().is_empty()
            && self.kanji.as_ref().map_or(true, |k| k.kanji.trim().is_empty())
            && self.translation.trim().is_empty()
    }
}

pub fn read_input_file(path: &Path) -> Result<InputFile, KotoError> {
    let json = fs::read_to_string(path).map_err(|e| {
        KotoError::Custom(format!("Failed to read input file {}: {}", path.display(), e))
    })?;
    Ok(serde_json::from_str(&json)?)
}

/// Validates the whole batch before any work starts. Blank rows are dropped;
/// indexes in errors are 1-based positions in the submitted list.
pub fn validate_input(raw: &[RawEntry]) -> Result<Vec<VocabularyEntry>, KotoError> {
    let mut entries = Vec::with_capacity(raw.len());

    for (i, entry) in raw.iter().enumerate() {
        let index = i + 1;
        let audio_count = parse_audio_count(entry.audio_count.as_ref())
            .map_err(|reason| KotoError::InvalidInput { index, reason })?;

        let generation_mode = match entry.generation_mode.as_deref() {
            None | Some("") => GenerationMode::Both,
            Some(mode) => GenerationMode::parse(mode).ok_or_else(|| KotoError::InvalidInput {
                index,
                reason: format!(
                    "'generation_mode' must be one of \"both\", \"jp_en\" or \"en_jp\", got {:?}",
                    mode
                ),
            })?,
        };

        if entry.is_blank() {
            continue;
        }

        let kanji = entry
            .kanji
            .as_ref()
            .filter(|k| !k.kanji.trim().is_empty())
            .map(|k| KanjiForm { surface: k.kanji.trim().to_string(), furigana: k.furigana.clone() });

        entries.push(VocabularyEntry {
            reading: entry.reading.clone(),
            kanji,
            translation: entry.translation.clone(),
            sentence_reading: entry.sentence_kana.clone().unwrap_or_default(),
            sentence_translation: entry.sentence_english.clone().unwrap_or_default(),
            sentence_image: entry.sentence_image.clone().filter(|s| !s.trim().is_empty()),
            audio_count,
            generation_mode,
        });
    }

    if entries.is_empty() {
        return Err(KotoError::EmptyVocabulary);
    }

    Ok(entries)
}

/// `null` disables audio; integers (or integer strings) must be at least 1.
fn parse_audio_count(value: Option<&Value>) -> Result<Option<u32>, String> {
    let count = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };

    match count {
        Some(n) if n >= 1 => u32::try_from(n)
            .map(Some)
            .map_err(|_| format!("'audio_count' {} is too large", n)),
        Some(_) => Err("'audio_count' must be a positive integer (or null)".to_string()),
        None => Err("'audio_count' must be a valid integer (or null)".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<RawEntry> {
        serde_json::from_str::<InputFile>(json).unwrap().vocabulary
    }

    #[test]
    fn test_minimal_entry_defaults() {
        let raw = parse(r#"{ "vocabulary": [ { "reading": "ねこ", "translation": "cat" } ] }"#);
        let entries = validate_input(&raw).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].audio_count, None);
        assert_eq!(entries[0].generation_mode, GenerationMode::Both);
        assert_eq!(entries[0].kanji, None);
        assert_eq!(entries[0].sentence_image, None);
    }

    #[test]
    fn test_audio_count_forms() {
        let raw = parse(
            r#"{ "vocabulary": [
                { "reading": "ねこ", "translation": "cat", "audio_count": 2 },
                { "reading": "いぬ", "translation": "dog", "audio_count": "3" },
                { "reading": "とり", "translation": "bird", "audio_count": null }
            ] }"#,
        );
        let counts: Vec<_> = validate_input(&raw).unwrap().iter().map(|e| e.audio_count).collect();
        assert_eq!(counts, vec![Some(2), Some(3), None]);
    }

    #[test]
    fn test_bad_audio_count_aborts_batch() {
        for bad in ["0", "-1", "1.5", "\"many\"", "true"] {
            let raw = parse(&format!(
                r#"{{ "vocabulary": [
                    {{ "reading": "ねこ", "translation": "cat" }},
                    {{ "reading": "いぬ", "translation": "dog", "audio_count": {} }}
                ] }}"#,
                bad
            ));
            match validate_input(&raw) {
                Err(KotoError::InvalidInput { index, .. }) => assert_eq!(index, 2),
                other => panic!("expected InvalidInput for {}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_unknown_generation_mode_rejected() {
        let raw = parse(
            r#"{ "vocabulary": [ { "reading": "ねこ", "translation": "cat", "generation_mode": "sideways" } ] }"#,
        );
        assert!(matches!(validate_input(&raw), Err(KotoError::InvalidInput { index: 1, .. })));
    }

    #[test]
    fn test_blank_rows_dropped_and_blank_kanji_ignored() {
        let raw = parse(
            r#"{ "vocabulary": [
                { "reading": "", "translation": "", "kanji": { "kanji": " ", "furigana": "" } },
                { "reading": "ねこ", "translation": "cat", "kanji": { "kanji": "", "furigana": "" } },
                { "reading": "ゆうびんきょく", "translation": "post office",
                  "kanji": { "kanji": "郵便局", "furigana": "郵便[ゆうびん]局[きょく]" },
                  "generation_mode": "en_jp" }
            ] }"#,
        );
        let entries = validate_input(&raw).unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].kanji, None);
        assert_eq!(entries[1].kanji_surface(), Some("郵便局"));
        assert_eq!(entries[1].generation_mode, GenerationMode::Reverse);
    }

    #[test]
    fn test_empty_vocabulary() {
        assert!(matches!(validate_input(&[]), Err(KotoError::EmptyVocabulary)));

        let raw = parse(r#"{ "vocabulary": [ { "reading": " ", "translation": "" } ] }"#);
        assert!(matches!(validate_input(&raw), Err(KotoError::EmptyVocabulary)));
    }
}
