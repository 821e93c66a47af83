use std::{
    collections::HashSet,
    fs,
    path::{
        Path,
        PathBuf,
    },
};

use log::{
    debug,
    info,
    warn,
};
use serde::Serialize;

use super::{
    compiler::CompiledNote,
    media::MediaAsset,
    types::{
        Direction,
        NoteModel,
    },
};
use crate::core::{
    config::AnkiConfig,
    KotoError,
};

/// The exportable unit: both note types, every compiled note in input order,
/// and the deduplicated media the notes reference.
#[derive(Debug, Clone, Serialize)]
pub struct Deck {
    pub id: u64,
    pub name: String,
    pub forward_model: NoteModel,
    pub reverse_model: NoteModel,
    pub notes: Vec<CompiledNote>,
    pub media_files: Vec<PathBuf>,
}

impl Deck {
    pub fn model_for(&self, direction: Direction) -> &NoteModel {
        match direction {
            Direction::Forward => &self.forward_model,
            Direction::Reverse => &self.reverse_model,
        }
    }

    pub fn notes_for(&self, direction: Direction) -> impl Iterator<Item = &CompiledNote> {
        self.notes.iter().filter(move |note| note.direction == direction)
    }

    pub fn note_count(&self) -> usize {
        self.notes.len()
    }
}

pub struct DeckAssembler {
    deck_id: u64,
    deck_name: String,
    forward_model: NoteModel,
    reverse_model: NoteModel,
}

impl DeckAssembler {
    pub fn new(config: &AnkiConfig) -> Result<Self, KotoError> {
        let deck_id = chrono::Utc::now().timestamp_millis().max(0) as u64;
        Self::with_deck_id(config, deck_id)
    }

    pub fn with_deck_id(config: &AnkiConfig, deck_id: u64) -> Result<Self, KotoError> {
        Ok(Self {
            deck_id,
            deck_name: config.deck_name.clone(),
            forward_model: NoteModel::new(config.note_type_id, &config.model_name, Direction::Forward),
            reverse_model: NoteModel::new(
                config.reverse_note_type_id()?,
                &config.model_name,
                Direction::Reverse,
            ),
        })
    }

    /// Collects `notes` into a deck, writing each distinct image once into
    /// `media_dir` and registering audio files that exist on disk.
    pub fn assemble(&self, notes: Vec<CompiledNote>, media_dir: &Path) -> Result<Deck, KotoError> {
        if notes.is_empty() {
            return Err(KotoError::EmptyDeck);
        }

        let mut media = MediaCollector::new(media_dir);
        for note in &notes {
            for asset in &note.assets {
                media.register(asset)?;
            }
        }

        info!(
            "Assembled deck with {} forward and {} reverse notes, {} media files",
            notes.iter().filter(|n| n.direction == Direction::Forward).count(),
            notes.iter().filter(|n| n.direction == Direction::Reverse).count(),
            media.files.len()
        );

        Ok(Deck {
            id: self.deck_id,
            name: self.deck_name.clone(),
            forward_model: self.forward_model.clone(),
            reverse_model: self.reverse_model.clone(),
            notes,
            media_files: media.files,
        })
    }
}

struct MediaCollector<'a> {
    media_dir: &'a Path,
    written_images: HashSet<String>,
    seen: HashSet<PathBuf>,
    files: Vec<PathBuf>,
}

impl<'a> MediaCollector<'a> {
    fn new(media_dir: &'a Path) -> Self {
        Self { media_dir, written_images: HashSet::new(), seen: HashSet::new(), files: Vec::new() }
    }

    fn register(&mut self, asset: &MediaAsset) -> Result<(), KotoError> {
        match asset {
            MediaAsset::Audio(audio) => {
                if audio.source_path.exists() {
                    self.push(audio.source_path.clone());
                } else {
                    warn!("Audio file {:?} is missing, leaving it out of the package", audio.source_path);
                }
            }
            MediaAsset::Image(image) => {
                let path = self.media_dir.join(&image.filename);
                if self.written_images.insert(image.filename.clone()) {
                    fs::create_dir_all(self.media_dir)?;
                    fs::write(&path, &image.bytes)?;
                    debug!("Wrote image {:?}", path);
                }
                self.push(path);
            }
        }
        Ok(())
    }

    fn push(&mut self, path: PathBuf) {
        if self.seen.insert(path.clone()) {
            self.files.push(path);
        }
    }
}
