//! Character-range predicates for the Japanese scripts.

const PROLONGED_SOUND_MARK: char = 'ー';
const MIDDLE_DOT: char = '・';

pub fn is_katakana_char(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_hiragana_char(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

pub fn is_kanji_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF     // CJK Unified Ideographs
        | 0x3400..=0x4DBF   // Extension A
        | 0x20000..=0x2A6DF // Extension B
        | 0x2A700..=0x2B73F // Extension C
        | 0x2B740..=0x2B81F // Extension D
        | 0xF900..=0xFAFF   // Compatibility Ideographs
    )
}

/// True if any character falls in the katakana block.
pub fn contains_katakana(text: &str) -> bool {
    text.chars().any(is_katakana_char)
}

pub fn contains_kanji(text: &str) -> bool {
    text.chars().any(is_kanji_char)
}

/// True iff `text` holds nothing but katakana, whitespace, `ー` and `・`, and
/// at least one of those characters is an actual katakana letter.
pub fn is_pure_katakana(text: &str) -> bool {
    if text.is_empty() || contains_kanji(text) || text.chars().any(is_hiragana_char) {
        return false;
    }

    let only_katakana_marks = text.chars().all(|c| {
        is_katakana_char(c) || c.is_whitespace() || c == PROLONGED_SOUND_MARK || c == MIDDLE_DOT
    });

    only_katakana_marks && text.chars().any(is_katakana_letter)
}

fn is_katakana_letter(c: char) -> bool {
    is_katakana_char(c) && c != PROLONGED_SOUND_MARK && c != MIDDLE_DOT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_katakana() {
        assert!(contains_katakana("ケーキ"));
        assert!(contains_katakana("チョコのケーキ"));
        assert!(!contains_katakana("ねこ"));
        assert!(!contains_katakana("猫"));
        assert!(!contains_katakana(""));
    }

    #[test]
    fn test_contains_kanji() {
        assert!(contains_kanji("郵便局"));
        assert!(contains_kanji("食べる"));
        assert!(contains_kanji("\u{20B9F}")); // 𠮟, extension B
        assert!(contains_kanji("\u{F929}")); // compatibility ideograph
        assert!(!contains_kanji("たべる"));
        assert!(!contains_kanji("cake"));
    }

    #[test]
    fn test_pure_katakana() {
        assert!(is_pure_katakana("ケーキ"));
        assert!(is_pure_katakana("コーヒー・ショップ"));
        assert!(is_pure_katakana("アイス クリーム"));

        assert!(!is_pure_katakana(""));
        assert!(!is_pure_katakana("ケーキを"));
        assert!(!is_pure_katakana("ケーキ屋"));
        assert!(!is_pure_katakana("cake"));
        assert!(!is_pure_katakana("ケーキ!"));
    }

    #[test]
    fn test_katakana_punctuation_alone_is_not_katakana_word() {
        assert!(!is_pure_katakana("ー"));
        assert!(!is_pure_katakana("・ ー"));
        assert!(!is_pure_katakana("   "));
        assert!(!is_pure_katakana("\t\n"));
    }
}
