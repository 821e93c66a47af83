// Feature layouts:
// IPADIC: pos1,pos2,pos3,pos4,c_type,c_form,base,reading,pron
// UniDic (bccwj-suw+unidic-cwj): pos1..pos4,c_type,c_form,l_form,lemma,orth,pron,orth_base,pron_base,goshu,...,kana(20)

use crate::dictionary::DictType;

pub struct VibratoToken {
    pub surface: String,
    pub features: String,
}

impl From<vibrato::token::Token<'_, '_>> for VibratoToken {
    fn from(value: vibrato::token::Token) -> Self {
        Self { surface: value.surface().into(), features: value.feature().into() }
    }
}

impl VibratoToken {
    fn feature(&self, idx: usize) -> Option<&str> {
        self.features.split(',').nth(idx).filter(|field| !field.is_empty() && *field != "*")
    }

    /// Katakana reading recorded by the dictionary, if the token is known.
    pub fn reading(&self, dict_type: &DictType) -> Option<&str> {
        self.feature(dict_type.reading_index())
            .or_else(|| dict_type.fallback_reading_index().and_then(|idx| self.feature(idx)))
    }
}
