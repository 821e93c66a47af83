pub mod config;
pub mod errors;
pub mod http;
pub mod input;
pub mod models;
pub mod pipeline;


pub use config::Config;
pub use errors::KotoError;
pub use models::{
    GenerationMode,
    NormalizedWord,
    VocabularyEntry,
};
