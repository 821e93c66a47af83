pub mod elevenlabs;

pub mod naming;

use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use log::{
    debug,
    warn,
};
use rayon::{
    iter::{
        IntoParallelIterator,
        ParallelIterator,
    },
    ThreadPool,
    ThreadPoolBuilder,
};

use crate::core::KotoError;

/// Turns text into encoded audio bytes.
pub trait SpeechSynthesizer: Send + Sync {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>, KotoError>;
}

/// Writes numbered audio variants for a word, dispatching synthesis on a
/// bounded worker pool.
pub struct AudioGenerator<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    pool: ThreadPool,
}

impl<'a> AudioGenerator<'a> {
    pub fn new(synthesizer: &'a dyn SpeechSynthesizer, concurrency: usize) -> Result<Self, KotoError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(concurrency.max(1))
            .thread_name(|i| format!("tts-{}", i))
            .build()
            .map_err(|e| KotoError::Custom(format!("Failed to build synthesis pool: {}", e)))?;

        Ok(Self { synthesizer, pool })
    }

    /// Synthesizes `text` `count` times into `{base}_{n}.mp3` inside
    /// `audio_dir`. Paths are returned in variant order. If any variant fails
    /// the ones already written are removed and the first error is returned.
    pub fn generate_variants(
        &self,
        text: &str,
        base: &str,
        audio_dir: &Path,
        count: u32,
    ) -> Result<Vec<PathBuf>, KotoError> {
        fs::create_dir_all(audio_dir)?;

        let results: Vec<Result<PathBuf, KotoError>> = self.pool.install(|| {
            (1..=count)
                .into_par_iter()
                .map(|n| -> Result<PathBuf, KotoError> {
                    let path = audio_dir.join(naming::variant_file_name(base, n));
                    let bytes = self.synthesizer.synthesize(text)?;
                    fs::write(&path, bytes)?;
                    debug!("Wrote audio variant {:?}", path);
                    Ok(path)
                })
                .collect()
        });

        let mut paths = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(path) => paths.push(path),
                Err(e) => {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            None => Ok(paths),
            Some(e) => {
                discard(&paths);
                Err(e)
            }
        }
    }
}

fn discard(paths: &[PathBuf]) {
    for path in paths {
        if let Err(e) = fs::remove_file(path) {
            warn!("Failed to remove partial audio {:?}: {}", path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::test_support::StubSynthesizer;

    #[test]
    fn test_variants_written_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = StubSynthesizer::default();
        let generator = AudioGenerator::new(&synthesizer, 3).unwrap();

        let paths = generator.generate_variants("ねこ", "ねこ", dir.path(), 3).unwrap();

        let names: Vec<_> =
            paths.iter().map(|p| p.file_name().unwrap().to_string_lossy().to_string()).collect();
        assert_eq!(names, vec!["ねこ_1.mp3", "ねこ_2.mp3", "ねこ_3.mp3"]);
        assert_eq!(fs::read(&paths[0]).unwrap(), "mp3:ねこ".as_bytes().to_vec());
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = StubSynthesizer::failing_on("いぬ");
        let generator = AudioGenerator::new(&synthesizer, 1).unwrap();

        let result = generator.generate_variants("いぬ", "いぬ", dir.path(), 2);
        assert!(matches!(result, Err(KotoError::Synthesis(_))));
    }

    #[test]
    fn test_partial_failure_removes_written_variants() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = StubSynthesizer::failing_after(1);
        let generator = AudioGenerator::new(&synthesizer, 1).unwrap();

        let result = generator.generate_variants("ねこ", "ねこ", dir.path(), 3);

        assert!(matches!(result, Err(KotoError::Synthesis(_))));
        assert_eq!(synthesizer.calls.load(Ordering::SeqCst), 3);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_zero_concurrency_still_runs() {
        let dir = tempfile::tempdir().unwrap();
        let synthesizer = StubSynthesizer::default();
        let generator = AudioGenerator::new(&synthesizer, 0).unwrap();

        let paths = generator.generate_variants("とり", "とり", dir.path(), 1).unwrap();
        assert_eq!(paths.len(), 1);
        assert!(paths[0].exists());
    }
}
