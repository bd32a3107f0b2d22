use std::collections::{BTreeMap, HashMap};

use fst::automaton::Str;
use fst::{Automaton, IntoStreamer, Map, Streamer};
use serde::Serialize;

use crate::config::{HintLevel, Language};
use crate::error::ResourceError;

/// One dictionary row: a word or phrase and the hint shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HintRecord {
    pub word: String,
    pub phoneme: Option<String>,
    pub primary: String,
    pub secondary: String,
    pub hint_level: HintLevel,
}

impl HintRecord {
    /// Text rendered inside the annotation for the chosen language.
    pub fn meaning(&self, language: Language) -> String {
        match language {
            Language::English => self.primary.clone(),
            Language::Vietnamese => match self.phoneme.as_deref() {
                Some(phoneme) => format!("{phoneme} {}", self.secondary),
                None => self.secondary.clone(),
            },
        }
    }
}

/// Lowercased, trimmed form used as the lookup key for words and phrases.
pub fn normalize_key(word: &str) -> String {
    word.trim().to_lowercase()
}

/// Immutable word/phrase index. Keys live in an fst map whose values point
/// into the record table.
#[derive(Debug)]
pub struct Dictionary {
    index: Map<Vec<u8>>,
    records: Vec<HintRecord>,
}

impl Dictionary {
    /// Builds the index. A later record with the same normalized key replaces
    /// the earlier one; records with an empty key are dropped.
    pub fn from_records<I>(records: I) -> Result<Self, ResourceError>
    where
        I: IntoIterator<Item = HintRecord>,
    {
        let mut by_key: BTreeMap<String, HintRecord> = BTreeMap::new();
        for record in records {
            let key = normalize_key(&record.word);
            if key.is_empty() {
                continue;
            }
            by_key.insert(key, record);
        }
        let index = Map::from_iter(
            by_key
                .keys()
                .enumerate()
                .map(|(id, key)| (key.as_bytes(), id as u64)),
        )?;
        let records = by_key.into_values().collect();
        Ok(Self { index, records })
    }

    /// Exact lookup of an already-normalized key.
    pub fn get(&self, key: &str) -> Option<&HintRecord> {
        self.index
            .get(key)
            .and_then(|id| self.records.get(id as usize))
    }

    /// Returns up to `limit` records whose key starts with `prefix`.
    pub fn prefix(&self, prefix: &str, limit: usize) -> Vec<&HintRecord> {
        let automaton = Str::new(prefix).starts_with();
        let mut stream = self.index.search(automaton).into_stream();
        let mut results = Vec::new();
        while let Some((_, id)) = stream.next() {
            if results.len() >= limit {
                break;
            }
            if let Some(record) = self.records.get(id as usize) {
                results.push(record);
            }
        }
        results
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Inflected form to base form, many-to-one.
#[derive(Debug, Default, Clone)]
pub struct LemmaMap {
    lemmas: HashMap<String, String>,
}

impl LemmaMap {
    /// Builds the map from `(inflected, lemma)` pairs; later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let lemmas = pairs
            .into_iter()
            .map(|(inflected, lemma)| (normalize_key(inflected.as_ref()), normalize_key(lemma.as_ref())))
            .filter(|(inflected, lemma)| !inflected.is_empty() && !lemma.is_empty())
            .collect();
        Self { lemmas }
    }

    pub fn get(&self, inflected: &str) -> Option<&str> {
        self.lemmas.get(inflected).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lemmas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lemmas.is_empty()
    }
}

/// How a key was found in the dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchSource<'a> {
    Exact,
    Lemma(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub record: &'a HintRecord,
    pub source: MatchSource<'a>,
}

/// Dictionary plus lemma map, built once and shared read-only.
#[derive(Debug)]
pub struct Lexicon {
    dictionary: Dictionary,
    lemmas: LemmaMap,
}

impl Lexicon {
    pub fn new(dictionary: Dictionary, lemmas: LemmaMap) -> Self {
        Self { dictionary, lemmas }
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn lemmas(&self) -> &LemmaMap {
        &self.lemmas
    }

    /// Exact match first, then the key's lemma. Hint levels are not consulted.
    pub fn resolve(&self, key: &str) -> Option<Resolution<'_>> {
        if let Some(record) = self.dictionary.get(key) {
            return Some(Resolution {
                record,
                source: MatchSource::Exact,
            });
        }
        let lemma = self.lemmas.get(key)?;
        self.dictionary.get(lemma).map(|record| Resolution {
            record,
            source: MatchSource::Lemma(lemma),
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn record(word: &str, primary: &str, level: u8) -> HintRecord {
        HintRecord {
            word: word.to_string(),
            phoneme: None,
            primary: primary.to_string(),
            secondary: String::new(),
            hint_level: HintLevel::try_from(level).expect("valid hint level"),
        }
    }

    /// Entries used by the end-to-end annotation scenarios.
    pub fn sample_lexicon() -> Lexicon {
        let mut hard = record("obfuscate", "make unclear", 2);
        hard.phoneme = Some("/ˈɒbfəskeɪt/".to_string());
        hard.secondary = "làm khó hiểu".to_string();
        let dictionary = Dictionary::from_records([
            record("lantern", "a light carried by a handle", 5),
            record("centime", "a money unit", 5),
            record("chanting", "act of singing in a certain way", 5),
            record("disunion", "the ending of an association", 5),
            record("wand", "thin stick used by a magician", 5),
            record("warden", "one who is in charge", 5),
            record("whole life insurance", "a type of life insurance", 5),
            record("workman", "a skilled worker", 5),
            record("fresh water", "water that is not salty", 5),
            record("run", "move fast on foot", 5),
            hard,
        ])
        .expect("sample dictionary builds");
        let lemmas = LemmaMap::from_pairs([("ran", "run"), ("running", "run"), ("wands", "wand")]);
        Lexicon::new(dictionary, lemmas)
    }
}
