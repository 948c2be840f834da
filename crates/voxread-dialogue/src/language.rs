//! Static language registry.
//!
//! Input and output locale travel together: a language entry is the only unit
//! of change, so recognition and synthesis can never drift apart.

/// One supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub key: &'static str,
    /// Recognition locale, fixed per listening channel at construction.
    pub input_locale: &'static str,
    /// Synthesis locale.
    pub output_locale: &'static str,
    pub label: &'static str,
    pub short_code: &'static str,
    /// Phrases that switch to this language, matched on normalized utterances.
    pub triggers: &'static [&'static str],
}

pub const LANGUAGES: &[Language] = &[
    Language {
        key: "english",
        input_locale: "en-US",
        output_locale: "en-US",
        label: "English",
        short_code: "EN",
        triggers: &["switch to english", "change to english", "english please", "speak english"],
    },
    Language {
        key: "hindi",
        input_locale: "hi-IN",
        output_locale: "hi-IN",
        label: "Hindi",
        short_code: "HI",
        triggers: &["hindi mein bolo", "change to hindi", "switch to hindi"],
    },
    Language {
        key: "kannada",
        input_locale: "kn-IN",
        output_locale: "kn-IN",
        label: "Kannada",
        short_code: "KN",
        triggers: &["kannadakke badalisu", "change to kannada", "switch to kannada"],
    },
    Language {
        key: "tamil",
        input_locale: "ta-IN",
        output_locale: "ta-IN",
        label: "Tamil",
        short_code: "TA",
        triggers: &["tamilil pesi", "change to tamil", "switch to tamil"],
    },
    Language {
        key: "telugu",
        input_locale: "te-IN",
        output_locale: "te-IN",
        label: "Telugu",
        short_code: "TE",
        triggers: &["telugulo chappu", "change to telugu", "switch to telugu"],
    },
    Language {
        key: "malayalam",
        input_locale: "ml-IN",
        output_locale: "ml-IN",
        label: "Malayalam",
        short_code: "ML",
        triggers: &["malayalatthil paranju", "change to malayalam", "switch to malayalam"],
    },
    Language {
        key: "marathi",
        input_locale: "mr-IN",
        output_locale: "mr-IN",
        label: "Marathi",
        short_code: "MR",
        triggers: &["marathit bola", "change to marathi", "switch to marathi"],
    },
    Language {
        key: "bengali",
        input_locale: "bn-IN",
        output_locale: "bn-IN",
        label: "Bengali",
        short_code: "BN",
        triggers: &["banglay bolo", "change to bengali", "switch to bengali"],
    },
    Language {
        key: "gujarati",
        input_locale: "gu-IN",
        output_locale: "gu-IN",
        label: "Gujarati",
        short_code: "GU",
        triggers: &["gujaratima bolo", "change to gujarati", "switch to gujarati"],
    },
    Language {
        key: "punjabi",
        input_locale: "pa-IN",
        output_locale: "pa-IN",
        label: "Punjabi",
        short_code: "PA",
        triggers: &["punjabi vich bolo", "change to punjabi", "switch to punjabi"],
    },
    Language {
        key: "urdu",
        input_locale: "ur-PK",
        output_locale: "ur-PK",
        label: "Urdu",
        short_code: "UR",
        triggers: &["urdu mein bolo", "change to urdu", "switch to urdu"],
    },
    Language {
        key: "odia",
        input_locale: "or-IN",
        output_locale: "or-IN",
        label: "Odia",
        short_code: "OR",
        triggers: &["odialare kahu", "change to odia", "switch to odia"],
    },
    Language {
        key: "assamese",
        input_locale: "as-IN",
        output_locale: "as-IN",
        label: "Assamese",
        short_code: "AS",
        triggers: &["asamiyat kowa", "change to assamese", "switch to assamese"],
    },
];

pub fn lookup(key: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_known_and_unknown() {
        assert_eq!(lookup("hindi").unwrap().input_locale, "hi-IN");
        assert!(lookup("klingon").is_none());
    }

    #[test]
    fn every_language_has_triggers_and_paired_locales() {
        for lang in LANGUAGES {
            assert!(!lang.triggers.is_empty(), "{} has no triggers", lang.key);
            // Same language tag on both sides of the channel.
            let input_tag = lang.input_locale.split('-').next().unwrap();
            let output_tag = lang.output_locale.split('-').next().unwrap();
            assert_eq!(input_tag, output_tag, "{} locales diverge", lang.key);
        }
    }
}
