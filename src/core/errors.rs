use thiserror::Error;

#[derive(Error, Debug)]
pub enum KotoError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Vibrato error: {0}")]
    Vibrato(Box<vibrato::errors::VibratoError>),

    #[error("Zip error: {0}")]
    Zip(Box<zip::result::ZipError>),

    #[error("Database error: {0}")]
    Sqlx(Box<sqlx::Error>),

    #[error("Invalid input for word {index}: {reason}")]
    InvalidInput { index: usize, reason: String },

    #[error("No vocabulary items found in input")]
    EmptyVocabulary,

    #[error("No notes were added to the deck, refusing to export an empty package")]
    EmptyDeck,

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    #[error("KotoError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for KotoError {
    fn from(error: std::io::Error) -> Self {
        KotoError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for KotoError {
    fn from(error: reqwest::Error) -> Self {
        KotoError::Reqwest(Box::new(error))
    }
}

impl From<vibrato::errors::VibratoError> for KotoError {
    fn from(error: vibrato::errors::VibratoError) -> Self {
        KotoError::Vibrato(Box::new(error))
    }
}

impl From<zip::result::ZipError> for KotoError {
    fn from(error: zip::result::ZipError) -> Self {
        KotoError::Zip(Box::new(error))
    }
}

impl From<sqlx::Error> for KotoError {
    fn from(error: sqlx::Error) -> Self {
        KotoError::Sqlx(Box::new(error))
    }
}
