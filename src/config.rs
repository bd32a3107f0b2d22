use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

pub const DEFAULT_DICTIONARY_PATH: &str = "resources/wordwise-dict-optimized.csv";
pub const DEFAULT_LEMMA_PATH: &str = "resources/lemmatization-en.csv";

/// How verbose the hints are: at level 1 only the hardest words get one,
/// at level 5 every word with a record does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HintLevel(u8);

impl HintLevel {
    pub const MIN: HintLevel = HintLevel(1);
    pub const MAX: HintLevel = HintLevel(5);

    pub const fn get(self) -> u8 {
        self.0
    }

    /// True when a record at `level` should be shown under this threshold.
    pub fn admits(self, level: HintLevel) -> bool {
        level <= self
    }
}

impl Default for HintLevel {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for HintLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(format!(
                "hint level must be between {} and {}, got {value}",
                Self::MIN.0,
                Self::MAX.0
            ))
        }
    }
}

impl FromStr for HintLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("hint level must be a number, got {s:?}"))?;
        Self::try_from(value)
    }
}

impl fmt::Display for HintLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which definition column is rendered in the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Primary definitions.
    #[default]
    English,
    /// Secondary definitions, prefixed with the phonetic transcription.
    Vietnamese,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Vietnamese => "vi",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "vi" | "vietnamese" => Ok(Language::Vietnamese),
            other => Err(format!("unsupported language {other:?}, expected `en` or `vi`")),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    pub hint_level: HintLevel,
    pub language: Language,
}

impl AnnotateOptions {
    pub fn new(hint_level: HintLevel, language: Language) -> Self {
        Self {
            hint_level,
            language,
        }
    }
}

/// Locations of the flat files the lexicon is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub dictionary: PathBuf,
    pub lemmas: PathBuf,
}

impl Default for ResourcePaths {
    fn default() -> Self {
        Self {
            dictionary: PathBuf::from(DEFAULT_DICTIONARY_PATH),
            lemmas: PathBuf::from(DEFAULT_LEMMA_PATH),
        }
    }
}
