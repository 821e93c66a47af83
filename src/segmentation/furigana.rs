use log::warn;

use super::{
    Segmenter,
    Transliterator,
};

/// The tokenizer's segmentation and the supplied reading disagree in length,
/// so the annotated segments after the first mismatch are misaligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentDrift {
    pub word: String,
    pub reading: String,
    /// Sum of the per-token kana lengths.
    pub tokenized_len: usize,
    pub reading_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alignment {
    /// Inline annotation, e.g. `郵便[ゆうびん]局[きょく]`.
    pub annotated: String,
    pub drift: Option<AlignmentDrift>,
}

pub struct FuriganaAligner<'a> {
    segmenter: &'a dyn Segmenter,
    transliterator: &'a dyn Transliterator,
}

impl<'a> FuriganaAligner<'a> {
    pub fn new(segmenter: &'a dyn Segmenter, transliterator: &'a dyn Transliterator) -> Self {
        Self { segmenter, transliterator }
    }

    /// Walks the tokens of `kanji_word`, consuming as many characters of
    /// `hiragana_reading` as each token's own kana rendering has.
    ///
    /// Tokens that are already phonetic are copied verbatim; everything else
    /// becomes `surface[segment]`. A length mismatch does not fail the word,
    /// the best-effort string is returned together with an [`AlignmentDrift`].
    pub fn align(&self, kanji_word: &str, hiragana_reading: &str) -> Alignment {
        let reading: Vec<char> = hiragana_reading.chars().collect();
        let mut cursor = 0;
        let mut annotated = String::new();

        for surface in self.segmenter.segment(kanji_word) {
            let kana = self.transliterator.to_hiragana(&surface);
            let kana_len = kana.chars().count();

            let start = cursor.min(reading.len());
            let end = (cursor + kana_len).min(reading.len());
            let segment: String = reading[start..end].iter().collect();
            cursor += kana_len;

            if surface == kana {
                annotated.push_str(&surface);
            } else {
                annotated.push_str(&format!("{}[{}]", surface, segment));
            }
        }

        let drift = (cursor != reading.len()).then(|| AlignmentDrift {
            word: kanji_word.to_string(),
            reading: hiragana_reading.to_string(),
            tokenized_len: cursor,
            reading_len: reading.len(),
        });

        if let Some(drift) = &drift {
            warn!(
                "Furigana for {} may be misaligned: tokens cover {} kana but the reading {} has {}",
                drift.word, drift.tokenized_len, drift.reading, drift.reading_len
            );
        }

        Alignment { annotated, drift }
    }
}

/// Removes every `[reading]` annotation, leaving the plain surface text.
pub fn strip_annotations(annotated: &str) -> String {
    let mut plain = String::with_capacity(annotated.len());
    let mut depth = 0usize;

    for c in annotated.chars() {
        match c {
            '[' => depth += 1,
            ']' if depth > 0 => depth -= 1,
            _ if depth == 0 => plain.push(c),
            _ => {}
        }
    }

    plain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        StubSegmenter,
        StubTransliterator,
    };

    fn tools() -> (StubSegmenter, StubTransliterator) {
        let segmenter = StubSegmenter::default()
            .with("郵便局", &["郵便", "局"])
            .with("食べ物", &["食べ", "物"])
            .with("お茶", &["お", "茶"])
            .with("今日", &["今日"])
            .with("大人しい", &["大人しい"]);
        let transliterator = StubTransliterator::default()
            .with("郵便", "ゆうびん")
            .with("局", "きょく")
            .with("食べ", "たべ")
            .with("物", "もの")
            .with("茶", "ちゃ")
            .with("今日", "きょう")
            .with("大人しい", "おとなしい");
        (segmenter, transliterator)
    }

    #[test]
    fn test_align_compound_word() {
        let (segmenter, transliterator) = tools();
        let aligner = FuriganaAligner::new(&segmenter, &transliterator);

        let alignment = aligner.align("郵便局", "ゆうびんきょく");
        assert_eq!(alignment.annotated, "郵便[ゆうびん]局[きょく]");
        assert!(alignment.drift.is_none());
    }

    #[test]
    fn test_phonetic_tokens_are_copied_verbatim() {
        let (segmenter, transliterator) = tools();
        let aligner = FuriganaAligner::new(&segmenter, &transliterator);

        let alignment = aligner.align("お茶", "おちゃ");
        assert_eq!(alignment.annotated, "お茶[ちゃ]");
        assert!(alignment.drift.is_none());
    }

    #[test]
    fn test_stripped_annotation_equals_surface() {
        let (segmenter, transliterator) = tools();
        let aligner = FuriganaAligner::new(&segmenter, &transliterator);

        for (word, reading) in [
            ("郵便局", "ゆうびんきょく"),
            ("食べ物", "たべもの"),
            ("お茶", "おちゃ"),
            ("今日", "きょう"),
        ] {
            let alignment = aligner.align(word, reading);
            assert!(alignment.drift.is_none(), "unexpected drift for {}", word);
            assert_eq!(strip_annotations(&alignment.annotated), word);
        }
    }

    #[test]
    fn test_irregular_reading_reports_drift() {
        let (segmenter, transliterator) = tools();
        let aligner = FuriganaAligner::new(&segmenter, &transliterator);

        // Supplied reading is shorter than the tokenizer's rendering
        let alignment = aligner.align("今日", "こんにち");
        assert_eq!(alignment.annotated, "今日[こんに]");
        assert_eq!(
            alignment.drift,
            Some(AlignmentDrift {
                word: "今日".to_string(),
                reading: "こんにち".to_string(),
                tokenized_len: 3,
                reading_len: 4,
            })
        );
    }

    #[test]
    fn test_reading_shorter_than_tokens_does_not_panic() {
        let (segmenter, transliterator) = tools();
        let aligner = FuriganaAligner::new(&segmenter, &transliterator);

        let alignment = aligner.align("郵便局", "ゆう");
        assert_eq!(alignment.annotated, "郵便[ゆう]局[]");
        assert_eq!(alignment.drift.map(|d| d.tokenized_len), Some(7));
    }

    #[test]
    fn test_strip_annotations() {
        assert_eq!(strip_annotations("郵便[ゆうびん]局[きょく]"), "郵便局");
        assert_eq!(strip_annotations("ねこ"), "ねこ");
        assert_eq!(strip_annotations(""), "");
    }
}
