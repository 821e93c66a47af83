use futures::future::join_all;
use log::{
    info,
    warn,
};
use reqwest::Client;
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::json;

use super::{
    deck::Deck,
    types::FIELD_NAMES,
};
use crate::core::{
    config::AnkiConfig,
    KotoError,
};

const API_VERSION: u32 = 6;

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn into_result(self) -> Result<Option<T>, KotoError> {
        match self.error {
            Some(error) => Err(KotoError::AnkiConnect(error)),
            None => Ok(self.result),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNote {
    pub deck_name: String,
    pub model_name: String,
    pub fields: serde_json::Map<String, serde_json::Value>,
    pub tags: Vec<String>,
    pub options: NoteOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOptions {
    pub allow_duplicate: bool,
}

/// Pushes compiled decks into a running Anki through AnkiConnect. Forward and
/// reverse notes share one note type name, which must already exist in the
/// collection.
pub struct AnkiConnectClient {
    client: Client,
    url: String,
    model_name: String,
}

impl AnkiConnectClient {
    pub fn new(config: &AnkiConfig) -> Self {
        Self { client: Client::new(), url: config.connect_url.clone(), model_name: config.model_name.clone() }
    }

    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        action: &str,
        params: Option<serde_json::Value>,
    ) -> Result<ApiResponse<T>, KotoError> {
        let body = request_body(action, params);
        let response: ApiResponse<T> =
            self.client.post(&self.url).json(&body).send().await?.json().await?;
        Ok(response)
    }

    pub async fn get_version(&self) -> Result<u32, KotoError> {
        let response: ApiResponse<u32> = self.make_request("version", None).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    pub async fn create_deck(&self, name: &str) -> Result<u64, KotoError> {
        let response: ApiResponse<u64> =
            self.make_request("createDeck", Some(json!({ "deck": name }))).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    /// Copies a file into Anki's media folder by absolute path.
    pub async fn store_media_file(&self, filename: &str, path: &str) -> Result<String, KotoError> {
        let params = json!({ "filename": filename, "path": path });
        let response: ApiResponse<String> = self.make_request("storeMediaFile", Some(params)).await?;
        Ok(response.into_result()?.unwrap_or_else(|| filename.to_string()))
    }

    pub async fn add_notes(&self, notes: &[NewNote]) -> Result<Vec<Option<u64>>, KotoError> {
        let response: ApiResponse<Vec<Option<u64>>> =
            self.make_request("addNotes", Some(json!({ "notes": notes }))).await?;
        Ok(response.into_result()?.unwrap_or_default())
    }

    pub fn build_notes(&self, deck: &Deck) -> Vec<NewNote> {
        deck.notes
            .iter()
            .map(|note| NewNote {
                deck_name: deck.name.clone(),
                model_name: self.model_name.clone(),
                fields: FIELD_NAMES
                    .iter()
                    .zip(&note.fields)
                    .map(|(name, value)| (name.to_string(), serde_json::Value::String(value.clone())))
                    .collect(),
                tags: vec!["kotodeck".to_string()],
                options: NoteOptions { allow_duplicate: false },
            })
            .collect()
    }

    /// Uploads media, creates the deck and adds every note. Returns how many
    /// notes Anki accepted.
    pub async fn export(&self, deck: &Deck) -> Result<usize, KotoError> {
        let version = self.get_version().await?;
        info!("AnkiConnect is online. Version: {}", version);

        let uploads = deck.media_files.iter().filter_map(|path| {
            let filename = path.file_name()?.to_string_lossy().into_owned();
            let absolute = path.canonicalize().unwrap_or_else(|_| path.clone());
            Some(async move {
                let result =
                    self.store_media_file(&filename, &absolute.to_string_lossy()).await;
                (filename, result)
            })
        });
        for (filename, result) in join_all(uploads).await {
            if let Err(e) = result {
                warn!("Failed to upload {} to Anki: {}", filename, e);
            }
        }

        self.create_deck(&deck.name).await?;

        let results = self.add_notes(&self.build_notes(deck)).await?;
        let added = results.iter().filter(|id| id.is_some()).count();
        if added < deck.note_count() {
            warn!("Anki rejected {} of {} notes", deck.note_count() - added, deck.note_count());
        }
        Ok(added)
    }
}

fn request_body(action: &str, params: Option<serde_json::Value>) -> serde_json::Value {
    let mut body = serde_json::Map::new();
    body.insert("action".to_string(), serde_json::Value::String(action.to_string()));
    body.insert("version".to_string(), serde_json::Value::Number(API_VERSION.into()));

    if let Some(params) = params {
        body.insert("params".to_string(), params);
    }

    serde_json::Value::Object(body)
}
