use std::{
    path::{
        Path,
        PathBuf,
    },
    time::Instant,
};

use log::{
    info,
    warn,
};
use serde::Serialize;

use super::{
    config::AudioFailurePolicy,
    models::{
        NormalizedWord,
        VocabularyEntry,
    },
    KotoError,
};
use crate::{
    anki::{
        compiler::{
            CardCompiler,
            CompiledNote,
        },
        deck::{
            Deck,
            DeckAssembler,
        },
    },
    audio::{
        naming::{
            base_name,
            sentence_base_name,
        },
        AudioGenerator,
    },
    segmentation::{
        furigana::FuriganaAligner,
        reading::ReadingNormalizer,
        Segmenter,
        Transliterator,
    },
};

/// A normalized word together with the notes compiled from it.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledWord {
    #[serde(flatten)]
    pub word: NormalizedWord,
    #[serde(rename = "anki_notes")]
    pub notes: Vec<CompiledNote>,
}

pub struct VocabularyProcessor<'a> {
    normalizer: ReadingNormalizer<'a>,
    aligner: FuriganaAligner<'a>,
    audio: Option<&'a AudioGenerator<'a>>,
    audio_failure: AudioFailurePolicy,
    compiler: CardCompiler,
}

impl<'a> VocabularyProcessor<'a> {
    pub fn new(segmenter: &'a dyn Segmenter, transliterator: &'a dyn Transliterator) -> Self {
        Self {
            normalizer: ReadingNormalizer::new(transliterator),
            aligner: FuriganaAligner::new(segmenter, transliterator),
            audio: None,
            audio_failure: AudioFailurePolicy::default(),
            compiler: CardCompiler::new(),
        }
    }

    /// Without a generator every word is processed as if it requested no audio.
    pub fn with_audio(mut self, audio: &'a AudioGenerator<'a>, policy: AudioFailurePolicy) -> Self {
        self.audio = Some(audio);
        self.audio_failure = policy;
        self
    }

    /// Derives the canonical and annotated readings for `entry`. Audio paths
    /// are left empty.
    pub fn normalize(&self, entry: &VocabularyEntry) -> NormalizedWord {
        let hiragana_reading = self.normalizer.normalize(&entry.reading);

        let furigana_reading = match &entry.kanji {
            Some(kanji) if !kanji.furigana.trim().is_empty() => kanji.furigana.clone(),
            Some(kanji) => self.aligner.align(&kanji.surface, &hiragana_reading).annotated,
            None => hiragana_reading.clone(),
        };
        let furigana_reading = if furigana_reading.is_empty() {
            hiragana_reading.clone()
        } else {
            furigana_reading
        };

        NormalizedWord {
            kanji_surface: entry.kanji_surface().map(str::to_string),
            hiragana_reading,
            furigana_reading,
            translation: entry.translation.clone(),
            audio_paths: Vec::new(),
            sentence_reading: entry.sentence_reading.clone(),
            sentence_translation: entry.sentence_translation.clone(),
            sentence_image: entry.sentence_image.clone(),
            sentence_audio_paths: Vec::new(),
            generation_mode: entry.generation_mode,
        }
    }

    pub fn process_word(&self, entry: &VocabularyEntry, audio_dir: &Path) -> Result<CompiledWord, KotoError> {
        let mut word = self.normalize(entry);

        self.attach_audio(entry, &mut word, audio_dir)?;

        let notes = self.compiler.compile(&word);
        if notes.is_empty() {
            warn!("{} produced no notes", word.headword());
        }

        Ok(CompiledWord { word, notes })
    }

    /// Word audio and sentence audio fail independently; under the isolate
    /// policy a failed sentence leaves the word's own audio in place.
    fn attach_audio(
        &self,
        entry: &VocabularyEntry,
        word: &mut NormalizedWord,
        audio_dir: &Path,
    ) -> Result<(), KotoError> {
        let (Some(generator), Some(count)) = (self.audio, entry.audio_count) else {
            return Ok(());
        };

        let base = base_name(entry.kanji_surface(), &entry.reading, &word.hiragana_reading);
        let result = generator.generate_variants(&word.hiragana_reading, &base, audio_dir, count);
        word.audio_paths = self.settle_audio(result, "Word", word.headword())?;

        if !word.sentence_reading.trim().is_empty() {
            let result = generator.generate_variants(
                &word.sentence_reading,
                &sentence_base_name(&base),
                audio_dir,
                count,
            );
            word.sentence_audio_paths = self.settle_audio(result, "Sentence", word.headword())?;
        }

        Ok(())
    }

    fn settle_audio(
        &self,
        result: Result<Vec<PathBuf>, KotoError>,
        kind: &str,
        headword: &str,
    ) -> Result<Vec<PathBuf>, KotoError> {
        match result {
            Ok(paths) => Ok(paths),
            Err(e) if self.audio_failure == AudioFailurePolicy::Isolate => {
                warn!("{} audio failed for {}, continuing without it: {}", kind, headword, e);
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Processes `entries` in order; output order mirrors input order.
    pub fn process_vocabulary(
        &self,
        entries: &[VocabularyEntry],
        audio_dir: &Path,
    ) -> Result<Vec<CompiledWord>, KotoError> {
        let start = Instant::now();
        let mut words = Vec::with_capacity(entries.len());

        for (i, entry) in entries.iter().enumerate() {
            info!("Processing word {}/{}: {}", i + 1, entries.len(), entry.reading);
            words.push(self.process_word(entry, audio_dir)?);
        }

        info!("Processed {} words in {:.2?}", words.len(), start.elapsed());
        Ok(words)
    }
}

pub fn build_deck(
    words: &[CompiledWord],
    assembler: &DeckAssembler,
    media_dir: &Path,
) -> Result<Deck, KotoError> {
    let notes = words.iter().flat_map(|w| w.notes.iter().cloned()).collect();
    assembler.assemble(notes, media_dir)
}
