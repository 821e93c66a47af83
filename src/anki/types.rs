use serde::{
    Deserialize,
    Serialize,
};

/// The fixed field order shared by both note types.
pub const FIELD_NAMES: [&str; 18] = [
    "Vocabulary-Kanji",
    "Vocabulary-Furigana",
    "Vocabulary-Kana",
    "Vocabulary-English",
    "Vocabulary-Audio",
    "Vocabulary-Pos",
    "Caution",
    "Expression",
    "Reading",
    "Sentence-Kana",
    "Sentence-English",
    "Sentence-Clozed",
    "Sentence-Audio",
    "Sentence-Image",
    "Notes",
    "Core-Index",
    "Optimized-Voc-Index",
    "Optimized-Sent-Index",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    VocabularyKanji,
    VocabularyFurigana,
    VocabularyKana,
    VocabularyEnglish,
    VocabularyAudio,
    VocabularyPos,
    Caution,
    Expression,
    Reading,
    SentenceKana,
    SentenceEnglish,
    SentenceClozed,
    SentenceAudio,
    SentenceImage,
    Notes,
    CoreIndex,
    OptimizedVocIndex,
    OptimizedSentIndex,
}

impl Field {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        FIELD_NAMES[self.index()]
    }
}

/// Which side of the vocabulary pair is asked on the front of the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Japanese → translation.
    Forward,
    /// Translation → Japanese.
    Reverse,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Forward, Direction::Reverse];

    /// The field shown on the front of the card.
    pub fn front_field(self) -> Field {
        match self {
            Direction::Forward => Field::VocabularyKanji,
            Direction::Reverse => Field::VocabularyEnglish,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardTemplate {
    pub name: String,
    pub qfmt: String,
    pub afmt: String,
}

/// A note type: id, name, field list and presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteModel {
    pub id: u64,
    pub name: String,
    pub direction: Direction,
    pub fields: Vec<String>,
    pub templates: Vec<CardTemplate>,
    pub css: String,
}

const CARD_CSS: &str = r#".card {
    font-family: arial;
    font-size: 25px;
    text-align: center;
    color: White;
    background-color: Black;
}
"#;

const BACK_COMMON: &str = r#"<br><span style="font-size: 14px;"></span><br><span style="font-size: 40px;">{{furigana:Reading}}</span><br><span style="font-size: 25px;">{{Sentence-English}}</span>"#;

impl NoteModel {
    pub fn new(id: u64, name: &str, direction: Direction) -> Self {
        // Only the forward back side ends with a line break.
        let front = direction.front_field().name();
        let (back, tail) = match direction {
            Direction::Forward => (Field::VocabularyEnglish.name(), "<br>"),
            Direction::Reverse => (Field::VocabularyKanji.name(), ""),
        };

        let qfmt = format!(r#"<span style="font-size: 50px;">{{{{{}}}}}</span>"#, front);
        let afmt = format!(
            r#"{{{{FrontSide}}}}<hr id=answer>{{{{Vocabulary-Audio}}}}{{{{#Sentence-Kana}}}}<br>{{{{Sentence-Kana}}}}{{{{/Sentence-Kana}}}}<br><span style="font-size: 30px;">{{{{{}}}}}</span>{}{}"#,
            back, BACK_COMMON, tail
        );

        Self {
            id,
            name: name.to_string(),
            direction,
            fields: FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
            templates: vec![CardTemplate { name: "English Translate".to_string(), qfmt, afmt }],
            css: CARD_CSS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_indexes_follow_schema() {
        assert_eq!(Field::VocabularyKanji.name(), "Vocabulary-Kanji");
        assert_eq!(Field::Reading.name(), "Reading");
        assert_eq!(Field::OptimizedSentIndex.index(), FIELD_NAMES.len() - 1);
    }

    #[test]
    fn test_templates_swap_front() {
        let forward = NoteModel::new(1, "Japanese-75658", Direction::Forward);
        let reverse = NoteModel::new(2, "Japanese-75658", Direction::Reverse);

        assert_eq!(forward.templates[0].qfmt, r#"<span style="font-size: 50px;">{{Vocabulary-Kanji}}</span>"#);
        assert_eq!(reverse.templates[0].qfmt, r#"<span style="font-size: 50px;">{{Vocabulary-English}}</span>"#);
        assert!(forward.templates[0].afmt.starts_with("{{FrontSide}}<hr id=answer>{{Vocabulary-Audio}}"));
        assert!(reverse.templates[0].afmt.contains(r#"<span style="font-size: 30px;">{{Vocabulary-Kanji}}</span>"#));
        assert!(forward.templates[0].afmt.contains("{{furigana:Reading}}"));
        assert_eq!(forward.fields.len(), 18);
    }

    #[test]
    fn test_only_forward_back_ends_with_break() {
        let forward = NoteModel::new(1, "Japanese-75658", Direction::Forward);
        let reverse = NoteModel::new(2, "Japanese-75658", Direction::Reverse);

        assert!(forward.templates[0].afmt.ends_with("{{Sentence-English}}</span><br>"));
        assert!(reverse.templates[0].afmt.ends_with("{{Sentence-English}}</span>"));
    }
}
