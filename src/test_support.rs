//! Deterministic stand-ins for the tokenizer, transliterator and speech
//! backends used by unit tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{
            AtomicUsize,
            Ordering,
        },
        Mutex,
    },
};

use crate::{
    audio::SpeechSynthesizer,
    core::KotoError,
    segmentation::{
        Segmenter,
        Transliterator,
    },
};

/// Returns the configured split for known words and the whole text as a
/// single token otherwise.
#[derive(Default)]
pub struct StubSegmenter {
    splits: HashMap<String, Vec<String>>,
}

impl StubSegmenter {
    pub fn with(mut self, word: &str, tokens: &[&str]) -> Self {
        self.splits.insert(word.to_string(), tokens.iter().map(|t| t.to_string()).collect());
        self
    }
}

impl Segmenter for StubSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.splits.get(text).cloned().unwrap_or_else(|| vec![text.to_string()])
    }
}

/// Looks up configured readings and otherwise shifts katakana to hiragana.
#[derive(Default)]
pub struct StubTransliterator {
    readings: HashMap<String, String>,
}

impl StubTransliterator {
    pub fn with(mut self, text: &str, hiragana: &str) -> Self {
        self.readings.insert(text.to_string(), hiragana.to_string());
        self
    }
}

impl Transliterator for StubTransliterator {
    fn to_hiragana(&self, text: &str) -> String {
        if let Some(reading) = self.readings.get(text) {
            return reading.clone();
        }

        text.chars()
            .map(|c| match c {
                '\u{30A1}'..='\u{30F6}' => char::from_u32(c as u32 - 0x60).unwrap_or(c),
                _ => c,
            })
            .collect()
    }
}

/// Records every request. Fails for texts listed in `failing`, and for every
/// call once `succeed_first` calls have been made.
#[derive(Default)]
pub struct StubSynthesizer {
    pub calls: AtomicUsize,
    pub texts: Mutex<Vec<String>>,
    failing: Vec<String>,
    succeed_first: Option<usize>,
}

impl StubSynthesizer {
    pub fn failing_on(text: &str) -> Self {
        Self { failing: vec![text.to_string()], ..Default::default() }
    }

    pub fn failing_after(calls: usize) -> Self {
        Self { succeed_first: Some(calls), ..Default::default() }
    }
}

impl SpeechSynthesizer for StubSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, KotoError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        if self.failing.iter().any(|f| f == text) || self.succeed_first.is_some_and(|n| call >= n) {
            return Err(KotoError::Synthesis(format!("stub refused to speak {}", text)));
        }

        Ok(format!("mp3:{}", text).into_bytes())
    }
}
