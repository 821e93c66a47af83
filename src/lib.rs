pub mod anki;
pub mod audio;
pub mod core;
pub mod dictionary;
pub mod persistence;
pub mod report;
pub mod segmentation;

#[cfg(test)]
mod test_support;

pub use self::core::{
    Config,
    KotoError,
};
pub use dictionary::DictType;
