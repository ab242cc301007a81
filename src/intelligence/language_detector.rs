/// Chat language detection
///
/// Cheap heuristic: look for common farming words in each supported script.

use serde::{Deserialize, Serialize};

const HINDI_WORDS: &[&str] = &[
    "किसान", "खेती", "फसल", "खाद", "बीज", "पानी", "मिट्टी", "रोग",
    "सरकार", "योजना", "सब्सिडी", "बीमा",
];
const ODIA_WORDS: &[&str] = &["କୃଷକ", "ଚାଷ", "ଫସଲ", "ସାର", "ବିହନ", "ଜଳ", "ମାଟି", "ରୋଗ"];
const PUNJABI_WORDS: &[&str] = &["ਕਿਸਾਨ", "ਖੇਤੀ", "ਫ਼ਸਲ", "ਖਾਦ", "ਬੀਜ", "ਪਾਣੀ", "ਮਿੱਟੀ"];
const BENGALI_WORDS: &[&str] = &["কৃষক", "চাষ", "ফসল", "সার", "বীজ", "পানি", "মাটি", "রোগ"];
const TAMIL_WORDS: &[&str] = &["விவசாயி", "வேளாண்மை", "பயிர்", "உர", "விதை", "நீர்", "மண்"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "hi")]
    Hindi,
    #[serde(rename = "or")]
    Odia,
    #[serde(rename = "pa")]
    Punjabi,
    #[serde(rename = "bn")]
    Bengali,
    #[serde(rename = "ta")]
    Tamil,
}

impl Language {
    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Hindi => "hi",
            Language::Odia => "or",
            Language::Punjabi => "pa",
            Language::Bengali => "bn",
            Language::Tamil => "ta",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Guess the language of `text`; English unless a known word turns up
pub fn detect_language(text: &str) -> Language {
    let checks: [(Language, &[&str]); 5] = [
        (Language::Hindi, HINDI_WORDS),
        (Language::Odia, ODIA_WORDS),
        (Language::Punjabi, PUNJABI_WORDS),
        (Language::Bengali, BENGALI_WORDS),
        (Language::Tamil, TAMIL_WORDS),
    ];

    checks
        .iter()
        .find(|(_, words)| words.iter().any(|w| text.contains(w)))
        .map(|(language, _)| *language)
        .unwrap_or(Language::English)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_scripts() {
        assert_eq!(detect_language("मेरी फसल में रोग है"), Language::Hindi);
        assert_eq!(detect_language("ମୋ ଚାଷ ପାଇଁ ସାର"), Language::Odia);
        assert_eq!(detect_language("ਖੇਤੀ ਬਾਰੇ ਦੱਸੋ"), Language::Punjabi);
        assert_eq!(detect_language("আমার চাষ"), Language::Bengali);
        assert_eq!(detect_language("பயிர் நோய்"), Language::Tamil);
    }

    #[test]
    fn test_defaults_to_english() {
        assert_eq!(detect_language("best fertilizer for wheat"), Language::English);
        assert_eq!(detect_language(""), Language::English);
    }

    #[test]
    fn test_language_code() {
        assert_eq!(Language::Odia.code(), "or");
        assert_eq!(
            serde_json::to_string(&Language::Punjabi).unwrap(),
            "\"pa\""
        );
    }
}
