pub mod token_dictionary;

use serde::{
    Deserialize,
    Serialize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictType {
    #[default]
    Unidic,
    Ipadic,
}

impl DictType {
    fn url(&self) -> &str {
        match self {
            DictType::Unidic => {
                "https://github.com/daac-tools/vibrato/releases/download/v0.5.0/bccwj-suw+unidic-cwj-3_1_1.tar.xz"
            }
            DictType::Ipadic => {
                "https://github.com/daac-tools/vibrato/releases/download/v0.5.0/ipadic-mecab-2_7_0.tar.xz"
            }
        }
    }

    fn folder_name(&self) -> &str {
        match self {
            DictType::Unidic => "bccwj-suw+unidic-cwj-3_1_1",
            DictType::Ipadic => "ipadic-mecab-2_7_0",
        }
    }

    /// Feature column holding the katakana reading.
    pub fn reading_index(&self) -> usize {
        match self {
            DictType::Unidic => 20,
            DictType::Ipadic => 7,
        }
    }

    /// Pronunciation column, used when the reading column is missing.
    pub fn fallback_reading_index(&self) -> Option<usize> {
        match self {
            DictType::Unidic => Some(9),
            DictType::Ipadic => Some(8),
        }
    }
}
