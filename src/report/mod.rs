use std::{
    fs::{
        self,
        File,
    },
    io::{
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
};

use log::info;
use serde::Serialize;

use crate::{
    core::{
        input::RawEntry,
        pipeline::CompiledWord,
        KotoError,
    },
    persistence::save_json,
};

pub const DATA_FILE: &str = "vocabulary_data.json";
pub const SUMMARY_FILE: &str = "summary.txt";
pub const CSV_FILE: &str = "vocabulary.csv";

const CSV_AUDIO_COLUMNS: usize = 3;

/// One timestamped run directory and its media sub-directories.
#[derive(Debug, Clone)]
pub struct ResultsDirectory {
    pub root: PathBuf,
    pub audio_dir: PathBuf,
    pub media_dir: PathBuf,
}

pub fn create_results_directory(base: &Path) -> Result<ResultsDirectory, KotoError> {
    let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
    let root = base.join(timestamp);
    fs::create_dir_all(&root)?;

    info!("Results directory: {}", root.display());
    Ok(ResultsDirectory { audio_dir: root.join("Audio"), media_dir: root.join("Media"), root })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub total_words: usize,
    pub words_with_kanji: usize,
    pub words_without_kanji: usize,
    pub total_audio_files: usize,
    pub total_notes: usize,
}

impl Metadata {
    pub fn from_words(words: &[CompiledWord]) -> Self {
        let with_kanji = words.iter().filter(|w| w.word.has_kanji()).count();
        Self {
            total_words: words.len(),
            words_with_kanji: with_kanji,
            words_without_kanji: words.len() - with_kanji,
            total_audio_files: words.iter().map(|w| w.word.audio_paths.len()).sum(),
            total_notes: words.iter().map(|w| w.notes.len()).sum(),
        }
    }
}

#[derive(Serialize)]
struct VocabularyData<'a> {
    input_vocabulary: &'a [RawEntry],
    generated_items: &'a [CompiledWord],
    metadata: Metadata,
}

pub fn save_data_json(
    results_dir: &Path,
    input: &[RawEntry],
    words: &[CompiledWord],
) -> Result<PathBuf, KotoError> {
    let path = results_dir.join(DATA_FILE);
    let data = VocabularyData {
        input_vocabulary: input,
        generated_items: words,
        metadata: Metadata::from_words(words),
    };
    save_json(&data, &path)?;
    Ok(path)
}

pub fn save_summary(results_dir: &Path, words: &[CompiledWord]) -> Result<PathBuf, KotoError> {
    let path = results_dir.join(SUMMARY_FILE);
    let metadata = Metadata::from_words(words);
    let rule = "=".repeat(60);

    let mut writer = BufWriter::new(File::create(&path)?);
    writeln!(writer, "{}", rule)?;
    writeln!(writer, "VOCABULARY DECK SUMMARY")?;
    writeln!(writer, "{}\n", rule)?;
    writeln!(writer, "Generated on: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(writer, "Total words processed: {}", metadata.total_words)?;
    writeln!(writer, "Words with kanji: {}", metadata.words_with_kanji)?;
    writeln!(writer, "Words without kanji: {}", metadata.words_without_kanji)?;
    writeln!(writer, "Total audio files generated: {}", metadata.total_audio_files)?;
    writeln!(writer, "Total notes: {}", metadata.total_notes)?;
    writeln!(writer, "\n{}", rule)?;
    writeln!(writer, "VOCABULARY ITEMS")?;
    writeln!(writer, "{}\n", rule)?;

    for (i, compiled) in words.iter().enumerate() {
        let word = &compiled.word;
        match word.kanji_surface.as_deref().filter(|_| word.has_kanji()) {
            Some(kanji) => writeln!(writer, "{}. {} ({})", i + 1, kanji, word.hiragana_reading)?,
            None => writeln!(writer, "{}. {}", i + 1, word.hiragana_reading)?,
        }
        writeln!(writer, "   Furigana: {}", word.furigana_reading)?;
        writeln!(writer, "   Translation: {}", word.translation)?;
        writeln!(writer, "   Audio files: {} files", word.audio_paths.len())?;
        writeln!(writer, "   Notes: {}\n", compiled.notes.len())?;
    }

    writer.flush()?;
    Ok(path)
}

pub fn save_csv(results_dir: &Path, words: &[CompiledWord]) -> Result<PathBuf, KotoError> {
    let path = results_dir.join(CSV_FILE);
    let mut writer = BufWriter::new(File::create(&path)?);

    writeln!(
        writer,
        "Kanji,Reading (Hiragana),Furigana,Translation,Audio File 1,Audio File 2,Audio File 3"
    )?;

    for compiled in words {
        let word = &compiled.word;
        let mut columns = vec![
            word.kanji_surface.clone().unwrap_or_default(),
            word.hiragana_reading.clone(),
            word.furigana_reading.clone(),
            word.translation.clone(),
        ];
        columns.extend((0..CSV_AUDIO_COLUMNS).map(|i| {
            word.audio_paths
                .get(i)
                .map(|p| p.strip_prefix(results_dir).unwrap_or(p).to_string_lossy().into_owned())
                .unwrap_or_default()
        }));

        let row: Vec<String> = columns.iter().map(|c| quote(c)).collect();
        writeln!(writer, "{}", row.join(","))?;
    }

    writer.flush()?;
    Ok(path)
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
