use std::{
    collections::HashSet,
    fs::{
        self,
        File,
    },
    io::Write,
    path::{
        Path,
        PathBuf,
    },
};

use log::{
    info,
    warn,
};
use serde::Serialize;
use zip::{
    write::SimpleFileOptions,
    ZipWriter,
};

use super::{
    deck::Deck,
    types::{
        Direction,
        NoteModel,
    },
};
use crate::core::KotoError;

pub const ARCHIVE_FILE: &str = "vocabulary.zip";
pub const MANIFEST_FILE: &str = "deck.json";
const MANIFEST_FORMAT: u32 = 1;

#[derive(Serialize)]
struct Manifest<'a> {
    format: u32,
    generator: String,
    deck: DeckHeader<'a>,
    models: [&'a NoteModel; 2],
    notes: Vec<ManifestNote<'a>>,
    media: Vec<String>,
}

#[derive(Serialize)]
struct DeckHeader<'a> {
    id: u64,
    name: &'a str,
}

#[derive(Serialize)]
struct ManifestNote<'a> {
    model_id: u64,
    direction: Direction,
    fields: &'a [String],
}

/// Packs `deck` into `{out_dir}/vocabulary.zip`: a `deck.json` manifest plus
/// every media file under `media/`.
pub fn write_archive(deck: &Deck, out_dir: &Path) -> Result<PathBuf, KotoError> {
    fs::create_dir_all(out_dir)?;
    let zip_path = out_dir.join(ARCHIVE_FILE);
    let file = File::create(&zip_path)
        .map_err(|e| KotoError::Custom(format!("Failed to create ZIP file {:?}: {}", zip_path, e)))?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut media_names = Vec::new();
    let mut seen_names = HashSet::new();
    for path in &deck.media_files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !seen_names.insert(name.clone()) {
            warn!("Media file name {} is used twice, keeping the first ({:?} skipped)", name, path);
            continue;
        }

        zip.start_file(format!("media/{}", name), options)?;
        zip.write_all(&fs::read(path)?)?;
        media_names.push(name);
    }

    let manifest = Manifest {
        format: MANIFEST_FORMAT,
        generator: format!("kotodeck v{}", env!("CARGO_PKG_VERSION")),
        deck: DeckHeader { id: deck.id, name: &deck.name },
        models: [&deck.forward_model, &deck.reverse_model],
        notes: deck
            .notes
            .iter()
            .map(|note| ManifestNote {
                model_id: deck.model_for(note.direction).id,
                direction: note.direction,
                fields: &note.fields,
            })
            .collect(),
        media: media_names,
    };

    zip.start_file(MANIFEST_FILE, options)?;
    zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;
    zip.finish()?;

    info!("Wrote {} notes to {:?}", deck.note_count(), zip_path);
    Ok(zip_path)
}
