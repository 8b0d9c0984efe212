//! Exact-match dictionary used to decide whether a recorded clip may exist.
//!
//! Recorded clips only exist for a constrained set of short entries. Looking a
//! word up here before touching the network avoids pointless requests for
//! arbitrary text.

use std::collections::HashSet;
use std::path::Path;

use crate::types::ConfigError;

/// Short-word list compiled into the binary. One entry per line.
const BUNDLED_WORDS: &str = include_str!("../data/dictionary.txt");

/// Synchronous exact-match lookup.
pub trait Dictionary: Send + Sync {
    /// Return the matching entry, or `None` when the word is unknown.
    fn lookup(&self, word: &str) -> Option<&str>;
}

/// `HashSet`-backed dictionary.
#[derive(Debug, Clone, Default)]
pub struct WordDictionary {
    entries: HashSet<String>,
}

impl WordDictionary {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// The list shipped with the binary.
    pub fn bundled() -> Self {
        Self::from_lines(BUNDLED_WORDS)
    }

    /// One entry per line. Blank lines and `#` comments are skipped.
    pub fn from_lines(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    /// Load from a file: a JSON array of strings when the extension is
    /// `.json`, otherwise one entry per line.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            let entries: Vec<String> =
                serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
                    path: path.to_path_buf(),
                    source,
                })?;
            Ok(Self::new(entries))
        } else {
            Ok(Self::from_lines(&text))
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Dictionary for WordDictionary {
    fn lookup(&self, word: &str) -> Option<&str> {
        self.entries.get(word).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn exact_match_only() {
        let dict = WordDictionary::new(["猫", "犬"]);
        assert_eq!(dict.lookup("猫"), Some("猫"));
        assert_eq!(dict.lookup("猫 "), None);
        assert_eq!(dict.lookup("ねこ"), None);
    }

    #[test]
    fn from_lines_skips_blanks_and_comments() {
        let dict = WordDictionary::from_lines("# animals\n猫\n\n  犬  \n");
        assert_eq!(dict.len(), 2);
        assert!(dict.lookup("犬").is_some());
        assert!(dict.lookup("# animals").is_none());
    }

    #[test]
    fn bundled_list_is_not_empty() {
        let dict = WordDictionary::bundled();
        assert!(!dict.is_empty());
        assert!(dict.lookup("猫").is_some());
    }

    #[test]
    fn load_json_array() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"["水", "火"]"#).unwrap();
        let dict = WordDictionary::load(file.path()).unwrap();
        assert_eq!(dict.len(), 2);
        assert!(dict.lookup("火").is_some());
    }

    #[test]
    fn load_plain_lines() {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        writeln!(file, "山\n川").unwrap();
        let dict = WordDictionary::load(file.path()).unwrap();
        assert!(dict.lookup("川").is_some());
    }

    #[test]
    fn load_bad_json_is_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            WordDictionary::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }
}
