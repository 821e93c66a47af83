use super::{
    script::is_pure_katakana,
    Transliterator,
};

/// Produces the canonical reading used for alignment, audio naming and the
/// kana fields of a card.
pub struct ReadingNormalizer<'a> {
    transliterator: &'a dyn Transliterator,
}

impl<'a> ReadingNormalizer<'a> {
    pub fn new(transliterator: &'a dyn Transliterator) -> Self {
        Self { transliterator }
    }

    /// Loanwords written purely in katakana keep their script; anything else
    /// is reduced to hiragana.
    pub fn normalize(&self, original_reading: &str) -> String {
        if is_pure_katakana(original_reading) {
            return original_reading.to_string();
        }

        self.transliterator.to_hiragana(original_reading)
    }
}
