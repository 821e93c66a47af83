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
    debug,
    info,
    warn,
};
use serde_json::json;
use sha2::{
    Digest,
    Sha256,
};
use sqlx::sqlite::{
    SqliteConnectOptions,
    SqliteJournalMode,
    SqlitePool,
    SqlitePoolOptions,
};
use zip::{
    write::SimpleFileOptions,
    ZipWriter,
};

use super::{
    deck::Deck,
    types::NoteModel,
};
use crate::core::KotoError;

pub const PACKAGE_FILE: &str = "vocabulary.apkg";
const COLLECTION_FILE: &str = "collection.anki2";
const MEDIA_INDEX_FILE: &str = "media";
const FIELD_SEPARATOR: &str = "\x1f";
const COLLECTION_VERSION: i64 = 11;
const DEFAULT_DECK_ID: i64 = 1;
const NOTE_TAGS: &str = " kotodeck ";

const SCHEMA: [&str; 12] = [
    "CREATE TABLE col (
        id integer primary key, crt integer not null, mod integer not null,
        scm integer not null, ver integer not null, dty integer not null,
        usn integer not null, ls integer not null, conf text not null,
        models text not null, decks text not null, dconf text not null,
        tags text not null
    )",
    "CREATE TABLE notes (
        id integer primary key, guid text not null, mid integer not null,
        mod integer not null, usn integer not null, tags text not null,
        flds text not null, sfld integer not null, csum integer not null,
        flags integer not null, data text not null
    )",
    "CREATE TABLE cards (
        id integer primary key, nid integer not null, did integer not null,
        ord integer not null, mod integer not null, usn integer not null,
        type integer not null, queue integer not null, due integer not null,
        ivl integer not null, factor integer not null, reps integer not null,
        lapses integer not null, left integer not null, odue integer not null,
        odid integer not null, flags integer not null, data text not null
    )",
    "CREATE TABLE revlog (
        id integer primary key, cid integer not null, usn integer not null,
        ease integer not null, ivl integer not null, lastIvl integer not null,
        factor integer not null, time integer not null, type integer not null
    )",
    "CREATE TABLE graves (usn integer not null, oid integer not null, type integer not null)",
    "CREATE INDEX ix_notes_usn ON notes (usn)",
    "CREATE INDEX ix_cards_usn ON cards (usn)",
    "CREATE INDEX ix_revlog_usn ON revlog (usn)",
    "CREATE INDEX ix_cards_nid ON cards (nid)",
    "CREATE INDEX ix_cards_sched ON cards (did, queue, due)",
    "CREATE INDEX ix_revlog_cid ON revlog (cid)",
    "CREATE INDEX ix_notes_csum ON notes (csum)",
];

const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

/// Writes `deck` as an Anki package at `{out_dir}/vocabulary.apkg`: a zip
/// holding the `collection.anki2` SQLite database, a `media` index and the
/// media files stored under numeric names.
pub fn write_package(deck: &Deck, out_dir: &Path) -> Result<PathBuf, KotoError> {
    fs::create_dir_all(out_dir)?;
    let db_path = out_dir.join(COLLECTION_FILE);
    if db_path.exists() {
        fs::remove_file(&db_path)?;
    }

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    let result = runtime
        .block_on(write_collection(deck, &db_path))
        .and_then(|()| pack(deck, &db_path, out_dir));

    if let Err(e) = fs::remove_file(&db_path).or_else(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Ok(()),
        _ => Err(e),
    }) {
        warn!("Failed to remove temporary collection {:?}: {}", db_path, e);
    }
    result
}

async fn write_collection(deck: &Deck, db_path: &Path) -> Result<(), KotoError> {
    // Rollback journal keeps the collection in a single file.
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePoolOptions::new().max_connections(1).connect_with(options).await?;

    let result = fill_collection(&pool, deck).await;
    pool.close().await;
    result
}

async fn fill_collection(pool: &SqlitePool, deck: &Deck) -> Result<(), KotoError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    let now = chrono::Utc::now();
    let (now_s, now_ms) = (now.timestamp(), now.timestamp_millis());
    let deck_id = sql_id(deck.id)?;

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO col (id, crt, mod, scm, ver, dty, usn, ls, conf, models, decks, dconf, tags)
         VALUES (1, ?, ?, ?, ?, 0, 0, 0, ?, ?, ?, ?, '{}')",
    )
    .bind(now_s)
    .bind(now_ms)
    .bind(now_ms)
    .bind(COLLECTION_VERSION)
    .bind(collection_conf(deck).to_string())
    .bind(models_json(deck, now_s)?.to_string())
    .bind(decks_json(deck, now_s).to_string())
    .bind(dconf_json().to_string())
    .execute(&mut *tx)
    .await?;

    for (i, note) in deck.notes.iter().enumerate() {
        let note_id = now_ms + i as i64;
        let model = deck.model_for(note.direction);
        let sort_field = note.fields.first().map(String::as_str).unwrap_or_default();

        sqlx::query("INSERT INTO notes VALUES (?, ?, ?, ?, -1, ?, ?, ?, ?, 0, '')")
            .bind(note_id)
            .bind(note_guid(model.id, &note.fields))
            .bind(sql_id(model.id)?)
            .bind(now_s)
            .bind(NOTE_TAGS)
            .bind(note.fields.join(FIELD_SEPARATOR))
            .bind(sort_field)
            .bind(field_checksum(sort_field))
            .execute(&mut *tx)
            .await?;

        // One template per note type, so one new card per note in input order.
        sqlx::query("INSERT INTO cards VALUES (?, ?, ?, 0, ?, -1, 0, 0, ?, 0, 0, 0, 0, 0, 0, 0, 0, '')")
            .bind(note_id)
            .bind(note_id)
            .bind(deck_id)
            .bind(now_s)
            .bind(i as i64 + 1)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    debug!("Wrote {} notes into collection", deck.note_count());
    Ok(())
}

fn pack(deck: &Deck, db_path: &Path, out_dir: &Path) -> Result<PathBuf, KotoError> {
    let package_path = out_dir.join(PACKAGE_FILE);
    let file = File::create(&package_path)
        .map_err(|e| KotoError::Custom(format!("Failed to create package {:?}: {}", package_path, e)))?;

    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(COLLECTION_FILE, options)?;
    zip.write_all(&fs::read(db_path)?)?;

    let mut media_index = serde_json::Map::new();
    let mut seen_names = HashSet::new();
    for path in &deck.media_files {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if !seen_names.insert(name.clone()) {
            warn!("Media file name {} is used twice, keeping the first ({:?} skipped)", name, path);
            continue;
        }

        let slot = media_index.len().to_string();
        zip.start_file(slot.as_str(), options)?;
        zip.write_all(&fs::read(path)?)?;
        media_index.insert(slot, serde_json::Value::String(name));
    }

    zip.start_file(MEDIA_INDEX_FILE, options)?;
    zip.write_all(serde_json::to_string(&media_index)?.as_bytes())?;
    zip.finish()?;

    info!(
        "Wrote Anki package with {} notes and {} media files to {:?}",
        deck.note_count(),
        media_index.len(),
        package_path
    );
    Ok(package_path)
}

fn sql_id(id: u64) -> Result<i64, KotoError> {
    i64::try_from(id).map_err(|_| KotoError::Custom(format!("Id {} does not fit in an SQLite integer", id)))
}

/// Stable across runs for the same note content, so re-importing updates
/// notes instead of duplicating them.
fn note_guid(model_id: u64, fields: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(model_id.to_le_bytes());
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update(FIELD_SEPARATOR.as_bytes());
    }
    hasher.finalize().iter().take(5).map(|b| format!("{:02x}", b)).collect()
}

fn field_checksum(field: &str) -> i64 {
    let digest = Sha256::digest(field.as_bytes());
    i64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

fn collection_conf(deck: &Deck) -> serde_json::Value {
    json!({
        "activeDecks": [DEFAULT_DECK_ID],
        "addToCur": true,
        "collapseTime": 1200,
        "curDeck": deck.id,
        "curModel": deck.forward_model.id.to_string(),
        "dueCounts": true,
        "estTimes": true,
        "newBury": true,
        "newSpread": 0,
        "nextPos": deck.note_count() + 1,
        "sortBackwards": false,
        "sortType": "noteFld",
        "timeLim": 0,
    })
}

fn models_json(deck: &Deck, modified: i64) -> Result<serde_json::Value, KotoError> {
    let mut models = serde_json::Map::new();
    for model in [&deck.forward_model, &deck.reverse_model] {
        sql_id(model.id)?;
        models.insert(model.id.to_string(), model_json(model, deck.id, modified));
    }
    Ok(serde_json::Value::Object(models))
}

fn model_json(model: &NoteModel, deck_id: u64, modified: i64) -> serde_json::Value {
    let fields: Vec<_> = model
        .fields
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "font": "Arial",
                "media": [],
                "rtl": false,
                "size": 20,
                "sticky": false,
            })
        })
        .collect();

    let templates: Vec<_> = model
        .templates
        .iter()
        .enumerate()
        .map(|(ord, template)| {
            json!({
                "name": template.name,
                "ord": ord,
                "qfmt": template.qfmt,
                "afmt": template.afmt,
                "bqfmt": "",
                "bafmt": "",
                "did": null,
            })
        })
        .collect();

    json!({
        "id": model.id,
        "name": model.name,
        "type": 0,
        "mod": modified,
        "usn": -1,
        "did": deck_id,
        "sortf": 0,
        "flds": fields,
        "tmpls": templates,
        "css": model.css,
        "latexPre": LATEX_PRE,
        "latexPost": LATEX_POST,
        "req": [[0, "any", [model.direction.front_field().index()]]],
        "tags": [],
        "vers": [],
    })
}

fn deck_json(id: u64, name: &str, modified: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "desc": "",
        "conf": 1,
        "dyn": 0,
        "collapsed": false,
        "extendNew": 10,
        "extendRev": 50,
        "mod": modified,
        "usn": -1,
        "newToday": [0, 0],
        "revToday": [0, 0],
        "lrnToday": [0, 0],
        "timeToday": [0, 0],
    })
}

fn decks_json(deck: &Deck, modified: i64) -> serde_json::Value {
    let mut decks = serde_json::Map::new();
    decks.insert(DEFAULT_DECK_ID.to_string(), deck_json(DEFAULT_DECK_ID as u64, "Default", modified));
    decks.insert(deck.id.to_string(), deck_json(deck.id, &deck.name, modified));
    serde_json::Value::Object(decks)
}

fn dconf_json() -> serde_json::Value {
    json!({
        "1": {
            "id": 1,
            "name": "Default",
            "mod": 0,
            "usn": 0,
            "autoplay": true,
            "replayq": true,
            "timer": 0,
            "maxTaken": 60,
            "new": {
                "bury": true,
                "delays": [1, 10],
                "initialFactor": 2500,
                "ints": [1, 4, 7],
                "order": 1,
                "perDay": 20,
                "separate": true,
            },
            "rev": {
                "bury": true,
                "ease4": 1.3,
                "fuzz": 0.05,
                "ivlFct": 1,
                "maxIvl": 36500,
                "minSpace": 1,
                "perDay": 100,
            },
            "lapse": {
                "delays": [10],
                "leechAction": 0,
                "leechFails": 8,
                "minInt": 1,
                "mult": 0,
            },
        }
    })
}
