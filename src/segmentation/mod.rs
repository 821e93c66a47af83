pub mod furigana;

pub mod reading;

pub mod script;

pub mod token_models;

pub mod tokenizer;

/// Splits a word into ordered surface tokens.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// Renders kanji, katakana or mixed text as hiragana.
pub trait Transliterator {
    fn to_hiragana(&self, text: &str) -> String;
}

impl<T: Segmenter + ?Sized> Segmenter for &T {
    fn segment(&self, text: &str) -> Vec<String> {
        (**self).segment(text)
    }
}

impl<T: Transliterator + ?Sized> Transliterator for &T {
    fn to_hiragana(&self, text: &str) -> String {
        (**self).to_hiragana(text)
    }
}
