use crate::segmentation::script::contains_katakana;

/// Base filename shared by a word's numbered audio variants:
/// `郵便局(ゆうびんきょく)`, `ケーキ` or `ねこ`.
pub fn base_name(kanji_surface: Option<&str>, original_reading: &str, hiragana_reading: &str) -> String {
    match kanji_surface {
        Some(kanji) => format!("{}({})", kanji, hiragana_reading),
        None if contains_katakana(original_reading) => original_reading.to_string(),
        None => hiragana_reading.to_string(),
    }
}

pub fn variant_file_name(base: &str, n: u32) -> String {
    format!("{}_{}.mp3", sanitize(base), n)
}

pub fn sentence_base_name(base: &str) -> String {
    format!("{}_sentence", base)
}

// Path separators would escape the audio directory
fn sanitize(base: &str) -> String {
    base.chars().map(|c| if matches!(c, '/' | '\\') { '_' } else { c }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(
            base_name(Some("郵便局"), "ゆうびんきょく", "ゆうびんきょく"),
            "郵便局(ゆうびんきょく)"
        );
        assert_eq!(base_name(None, "ケーキ", "けーき"), "ケーキ");
        assert_eq!(base_name(None, "ねこ", "ねこ"), "ねこ");
    }

    #[test]
    fn test_mixed_script_reading_keeps_original() {
        assert_eq!(base_name(None, "チョコのケーキ", "ちょこのけーき"), "チョコのケーキ");
    }

    #[test]
    fn test_variant_file_names() {
        assert_eq!(variant_file_name("ねこ", 1), "ねこ_1.mp3");
        assert_eq!(variant_file_name(&sentence_base_name("ねこ"), 2), "ねこ_sentence_2.mp3");
        assert_eq!(variant_file_name("AC/DC", 1), "AC_DC_1.mp3");
    }
}
