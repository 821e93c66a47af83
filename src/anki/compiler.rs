use log::warn;
use serde::Serialize;

use super::{
    media::{
        decode_image_data_url,
        image_tag,
        sound_tag,
        AudioAsset,
        ImageAsset,
        MediaAsset,
    },
    types::{
        Direction,
        Field,
        FIELD_NAMES,
    },
};
use crate::core::models::NormalizedWord;

/// Stands in for the translation on reverse cards. Anki treats a truly empty
/// field differently from a blank one.
pub const REVERSE_TRANSLATION_PLACEHOLDER: &str = "  ";

const SENTENCE_IMAGE_KIND: &str = "sentence";

/// One note record for one direction of one word. Notes built from the same
/// word share no identity; each owns its own field values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledNote {
    pub direction: Direction,
    pub fields: Vec<String>,
    pub assets: Vec<MediaAsset>,
}

impl CompiledNote {
    pub fn field(&self, field: Field) -> &str {
        &self.fields[field.index()]
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields[field.index()] = value.into();
    }
}

/// Values computed once per word and shared by both directions.
struct WordMedia {
    audio_field: String,
    sentence_audio_field: String,
    image: Option<ImageAsset>,
    assets: Vec<MediaAsset>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CardCompiler;

impl CardCompiler {
    pub fn new() -> Self {
        Self
    }

    /// Builds zero, one or two notes for `word`.
    ///
    /// Forward needs a non-blank headword, reverse a non-blank translation;
    /// both are further filtered by the word's generation mode.
    pub fn compile(&self, word: &NormalizedWord) -> Vec<CompiledNote> {
        let media = collect_media(word);

        Direction::ALL
            .into_iter()
            .filter(|direction| is_eligible(word, *direction))
            .map(|direction| CompiledNote {
                direction,
                fields: build_fields(word, &media, direction),
                assets: media.assets.clone(),
            })
            .collect()
    }
}

fn is_eligible(word: &NormalizedWord, direction: Direction) -> bool {
    if !word.generation_mode.allows(direction) {
        return false;
    }

    match direction {
        Direction::Forward => !word.headword().trim().is_empty(),
        Direction::Reverse => !word.translation.trim().is_empty(),
    }
}

fn collect_media(word: &NormalizedWord) -> WordMedia {
    let mut assets = Vec::new();

    let mut audio_field = String::new();
    for path in &word.audio_paths {
        let asset = AudioAsset::from_path(path);
        audio_field.push_str(&sound_tag(&asset.filename));
        assets.push(MediaAsset::Audio(asset));
    }

    let mut sentence_audio_field = String::new();
    for path in &word.sentence_audio_paths {
        let asset = AudioAsset::from_path(path);
        sentence_audio_field.push_str(&sound_tag(&asset.filename));
        assets.push(MediaAsset::Audio(asset));
    }

    let image = word.sentence_image.as_deref().and_then(|data_url| {
        match decode_image_data_url(data_url, SENTENCE_IMAGE_KIND) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Skipping sentence image for {}: {}", word.headword(), e);
                None
            }
        }
    });
    if let Some(image) = &image {
        assets.push(MediaAsset::Image(image.clone()));
    }

    WordMedia { audio_field, sentence_audio_field, image, assets }
}

fn build_fields(word: &NormalizedWord, media: &WordMedia, direction: Direction) -> Vec<String> {
    let mut fields = vec![String::new(); FIELD_NAMES.len()];
    let mut set = |field: Field, value: String| fields[field.index()] = value;

    let has_kanji = word.has_kanji();
    let headword = word.headword().to_string();

    match direction {
        Direction::Forward => {
            set(Field::VocabularyKanji, headword.clone());
            set(
                Field::VocabularyKana,
                if has_kanji { word.hiragana_reading.clone() } else { String::new() },
            );
            set(Field::VocabularyEnglish, word.translation.clone());
        }
        Direction::Reverse => {
            set(Field::VocabularyKanji, word.translation.clone());
            set(Field::VocabularyKana, word.hiragana_reading.clone());
            set(Field::VocabularyEnglish, REVERSE_TRANSLATION_PLACEHOLDER.to_string());
        }
    }

    set(Field::VocabularyFurigana, word.hiragana_reading.clone());
    set(Field::VocabularyAudio, media.audio_field.clone());
    set(Field::Expression, headword);
    set(Field::Reading, reading_field(word, has_kanji));
    set(Field::SentenceKana, word.sentence_reading.clone());
    set(Field::SentenceAudio, media.sentence_audio_field.clone());

    let image = media.image.as_ref().map(|image| image_tag(&image.filename));
    let sentence_english = match (&image, word.sentence_translation.is_empty()) {
        (Some(tag), true) => tag.clone(),
        (Some(tag), false) => format!("{}<br><br>{}", word.sentence_translation, tag),
        (None, _) => word.sentence_translation.clone(),
    };
    set(Field::SentenceEnglish, sentence_english);
    set(Field::SentenceImage, image.unwrap_or_default());

    fields
}

/// Annotated reading (kanji words only) and the example sentence, one per line.
fn reading_field(word: &NormalizedWord, has_kanji: bool) -> String {
    let furigana = if has_kanji { word.furigana_reading.as_str() } else { "" };

    [furigana, word.sentence_reading.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("<br>")
}
