use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;

use crate::pacing::PaceRate;

static SCRIPT_DIR: Dir = include_dir!("src/scripts");

#[derive(Debug)]
pub enum ScriptError {
    UnknownBuiltin(String),
    Malformed(String),
    Io(std::io::Error),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::UnknownBuiltin(name) => write!(f, "no builtin script named '{name}'"),
            ScriptError::Malformed(name) => write!(f, "script file '{name}' is not valid"),
            ScriptError::Io(e) => write!(f, "failed to read script: {e}"),
        }
    }
}

impl Error for ScriptError {}

impl From<std::io::Error> for ScriptError {
    fn from(e: std::io::Error) -> Self {
        ScriptError::Io(e)
    }
}

#[derive(Deserialize)]
struct ScriptFile {
    name: String,
    title: String,
    text: String,
}

/// A practice script: a title plus the ordered word sequence tokenized from
/// its text. Immutable once loaded for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    pub name: String,
    pub title: String,
    words: Vec<String>,
}

impl Script {
    /// Tokenizes a text blob on whitespace. Empty tokens never appear.
    pub fn from_text(name: &str, title: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            words: text.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom".to_string());
        Ok(Self::from_text(&name, &name, &text))
    }

    /// Loads one of the scripts embedded in the binary.
    pub fn builtin(name: &str) -> Result<Self, ScriptError> {
        let file = SCRIPT_DIR
            .get_file(format!("{name}.json"))
            .ok_or_else(|| ScriptError::UnknownBuiltin(name.to_string()))?;
        let contents = file
            .contents_utf8()
            .ok_or_else(|| ScriptError::Malformed(name.to_string()))?;
        let parsed: ScriptFile =
            from_str(contents).map_err(|_| ScriptError::Malformed(name.to_string()))?;
        Ok(Self::from_text(&parsed.name, &parsed.title, &parsed.text))
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Seconds a full read-through takes at the given pace, rounded up.
    pub fn estimated_secs(&self, rate: PaceRate) -> u64 {
        (self.words.len() as f64 / rate.words_per_sec()).ceil() as u64
    }
}

/// Names of all scripts embedded in the binary, sorted.
pub fn builtin_names() -> Vec<String> {
    let mut names: Vec<String> = SCRIPT_DIR
        .files()
        .filter_map(|f| f.path().file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_text_tokenizes_on_whitespace() {
        let script = Script::from_text("t", "T", "one two\tthree\n  four");
        assert_eq!(script.words(), &["one", "two", "three", "four"]);
        assert_eq!(script.word_count(), 4);
    }

    #[test]
    fn test_empty_text_yields_empty_script() {
        let script = Script::from_text("t", "T", "   \n\t ");
        assert!(script.is_empty());
        assert_eq!(script.word_count(), 0);
    }

    #[test]
    fn test_builtin_scripts_load() {
        for name in builtin_names() {
            let script = Script::builtin(&name).unwrap();
            assert_eq!(script.name, name);
            assert!(!script.is_empty(), "builtin '{name}' has no words");
            assert!(!script.title.is_empty());
        }
    }

    #[test]
    fn test_unknown_builtin_is_an_error() {
        assert!(matches!(
            Script::builtin("nope"),
            Err(ScriptError::UnknownBuiltin(_))
        ));
    }

    #[test]
    fn test_builtin_names_not_empty_and_sorted() {
        let names = builtin_names();
        assert!(names.contains(&"peppers".to_string()));
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_estimated_secs() {
        let script = Script::from_text("t", "T", "a b c d e f");
        let rate = PaceRate::new(60).unwrap();
        assert_eq!(script.estimated_secs(rate), 6);
        let fast = PaceRate::new(120).unwrap();
        assert_eq!(script.estimated_secs(fast), 3);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("intro.txt");
        std::fs::write(&path, "hello from a file").unwrap();
        let script = Script::from_file(&path).unwrap();
        assert_eq!(script.name, "intro");
        assert_eq!(script.word_count(), 4);
    }
}
