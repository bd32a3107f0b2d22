//! Builds the lexicon from the flat files shipped next to the binary.
//!
//! The dictionary is a CSV with a header row followed by
//! `word,phoneme,en,vi,hint_level` records. The lemma file has no header and
//! holds `lemma,inflected` pairs.

use std::fs;
use std::iter::Peekable;
use std::path::Path;
use std::str::Chars;

use tracing::{info, warn};

use crate::config::{HintLevel, ResourcePaths};
use crate::error::ResourceError;
use crate::lexicon::{Dictionary, HintRecord, LemmaMap, Lexicon};

const DICTIONARY_FIELDS: usize = 5;

pub fn load_lexicon(paths: &ResourcePaths) -> Result<Lexicon, ResourceError> {
    let dictionary = load_dictionary(&paths.dictionary)?;
    let lemmas = load_lemmas(&paths.lemmas)?;
    Ok(Lexicon::new(dictionary, lemmas))
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary, ResourceError> {
    let source = read_source(path)?;
    parse_dictionary(&source, path)
}

pub fn load_lemmas(path: &Path) -> Result<LemmaMap, ResourceError> {
    let source = read_source(path)?;
    parse_lemmas(&source, path)
}

fn read_source(path: &Path) -> Result<String, ResourceError> {
    fs::read_to_string(path).map_err(|source| ResourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses dictionary CSV text. `origin` only labels log lines and errors.
pub fn parse_dictionary(source: &str, origin: &Path) -> Result<Dictionary, ResourceError> {
    let mut rows = CsvRecords::new(source);
    if rows.next().is_none() {
        return Err(ResourceError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, fields) in rows {
        match parse_hint_record(&fields) {
            Ok(record) => records.push(record),
            Err(reason) => {
                skipped += 1;
                warn!(path = %origin.display(), line, %reason, "skipping dictionary row");
            }
        }
    }
    if records.is_empty() {
        return Err(ResourceError::Empty {
            path: origin.to_path_buf(),
        });
    }

    info!(path = %origin.display(), records = records.len(), skipped, "loaded dictionary");
    Dictionary::from_records(records)
}

fn parse_hint_record(fields: &[String]) -> Result<HintRecord, String> {
    if fields.len() < DICTIONARY_FIELDS {
        return Err(format!(
            "expected {DICTIONARY_FIELDS} fields, found {}",
            fields.len()
        ));
    }
    let word = fields[0].trim();
    if word.is_empty() {
        return Err("empty word".to_string());
    }
    let raw_level = fields[4].trim();
    let level: u8 = raw_level
        .parse()
        .map_err(|_| format!("non-numeric hint level {raw_level:?}"))?;
    let hint_level = HintLevel::try_from(level)?;
    let phoneme = Some(fields[1].trim())
        .filter(|phoneme| !phoneme.is_empty())
        .map(str::to_string);

    Ok(HintRecord {
        word: word.to_string(),
        phoneme,
        primary: fields[2].trim().to_string(),
        secondary: fields[3].trim().to_string(),
        hint_level,
    })
}

/// Parses `lemma,inflected` CSV text into an inflected-to-lemma map.
pub fn parse_lemmas(source: &str, origin: &Path) -> Result<LemmaMap, ResourceError> {
    let mut pairs = Vec::new();
    let mut skipped = 0usize;
    for (line, fields) in CsvRecords::new(source) {
        if fields.len() < 2 {
            skipped += 1;
            warn!(path = %origin.display(), line, fields = fields.len(), "skipping lemma row");
            continue;
        }
        let mut fields = fields.into_iter();
        let lemma = fields.next().unwrap_or_default();
        let inflected = fields.next().unwrap_or_default();
        pairs.push((inflected, lemma));
    }
    if pairs.is_empty() {
        return Err(ResourceError::Empty {
            path: origin.to_path_buf(),
        });
    }

    let lemmas = LemmaMap::from_pairs(pairs);
    info!(path = %origin.display(), pairs = lemmas.len(), skipped, "loaded lemma map");
    Ok(lemmas)
}

/// Iterates CSV records as `(line, fields)`. Quoted fields may contain commas,
/// doubled quotes and line breaks. Blank lines are skipped.
struct CsvRecords<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
}

impl<'a> CsvRecords<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.strip_prefix('\u{feff}').unwrap_or(source).chars().peekable(),
            line: 1,
        }
    }
}

impl Iterator for CsvRecords<'_> {
    type Item = (usize, Vec<String>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match *self.chars.peek()? {
                '\n' => {
                    self.chars.next();
                    self.line += 1;
                }
                '\r' => {
                    self.chars.next();
                }
                _ => break,
            }
        }

        let line = self.line;
        let mut fields = Vec::new();
        let mut field = String::new();
        let mut quoted = false;
        while let Some(ch) = self.chars.next() {
            match ch {
                '"' if quoted => {
                    if self.chars.peek() == Some(&'"') {
                        self.chars.next();
                        field.push('"');
                    } else {
                        quoted = false;
                    }
                }
                '"' if field.is_empty() => quoted = true,
                ',' if !quoted => fields.push(std::mem::take(&mut field)),
                '\n' if !quoted => {
                    self.line += 1;
                    break;
                }
                '\r' if !quoted => {}
                '\n' => {
                    self.line += 1;
                    field.push(ch);
                }
                _ => field.push(ch),
            }
        }
        fields.push(field);
        Some((line, fields))
    }
}
