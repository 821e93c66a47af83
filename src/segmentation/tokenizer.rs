use vibrato::Tokenizer;
use wana_kana::{
    ConvertJapanese,
    IsJapaneseStr,
};

use super::{
    token_models::VibratoToken,
    Segmenter,
    Transliterator,
};
use crate::{
    core::KotoError,
    dictionary::{
        token_dictionary::{
            ensure_dictionary,
            load_dictionary,
        },
        DictType,
    },
};

/// Segmenter and transliterator backed by a vibrato morphological analyzer.
pub struct VibratoTools {
    tokenizer: Tokenizer,
    dict_type: DictType,
}

impl VibratoTools {
    pub fn new(tokenizer: Tokenizer, dict_type: DictType) -> Self {
        Self { tokenizer, dict_type }
    }

    pub fn load(
        dict_type: DictType,
        progress_callback: Option<Box<dyn Fn(String) + Send>>,
    ) -> Result<Self, KotoError> {
        let tokenizer = init_vibrato(&dict_type, progress_callback)?;
        Ok(Self::new(tokenizer, dict_type))
    }

    fn tokens(&self, text: &str) -> Vec<VibratoToken> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        worker.token_iter().map(VibratoToken::from).collect()
    }
}

impl Segmenter for VibratoTools {
    fn segment(&self, text: &str) -> Vec<String> {
        self.tokens(text).into_iter().map(|token| token.surface).collect()
    }
}

impl Transliterator for VibratoTools {
    fn to_hiragana(&self, text: &str) -> String {
        self.tokens(text)
            .iter()
            .map(|token| {
                let surface = token.surface.as_str();
                if surface.is_kana() {
                    kana_to_hiragana(surface)
                } else if !surface.is_japanese() {
                    // Latin letters, digits and symbols pass through untouched
                    surface.to_string()
                } else {
                    match token.reading(&self.dict_type) {
                        Some(reading) => kana_to_hiragana(reading),
                        None => surface.to_string(),
                    }
                }
            })
            .collect()
    }
}

const LONG_VOWEL_MARK: char = 'ー';

/// Katakana to hiragana that keeps the long vowel mark. wana_kana spells an
/// inner `ー` out as the preceding vowel (ケーキ becomes けえき), so each run
/// between marks is converted on its own.
pub fn kana_to_hiragana(text: &str) -> String {
    text.split(LONG_VOWEL_MARK)
        .map(|part| part.to_hiragana())
        .collect::<Vec<_>>()
        .join(&LONG_VOWEL_MARK.to_string())
}

pub fn init_vibrato(
    dict_type: &DictType,
    progress_callback: Option<Box<dyn Fn(String) + Send>>,
) -> Result<Tokenizer, KotoError> {
    let dict_path = ensure_dictionary(dict_type, progress_callback)?;
    let dict = load_dictionary(&dict_path)?;
    Ok(Tokenizer::new(dict))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_vowel_mark_is_kept() {
        assert_eq!(kana_to_hiragana("ケーキ"), "けーき");
        assert_eq!(kana_to_hiragana("ケーキや"), "けーきや");
        assert_eq!(kana_to_hiragana("スーパー"), "すーぱー");
        assert_eq!(kana_to_hiragana("ー"), "ー");
    }

    #[test]
    fn test_plain_kana_converts() {
        assert_eq!(kana_to_hiragana("カタカナ"), "かたかな");
        assert_eq!(kana_to_hiragana("ねこ"), "ねこ");
        assert_eq!(kana_to_hiragana(""), "");
    }
}
