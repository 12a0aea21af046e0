//! Reader for the sectioned `key = value` text format used to declare
//! potentials.
//!
//! ```text
//! # comment
//! [parameters]
//! w = 2
//! v0 = -15
//!
//! [regions]
//! well = "0, w|v0"
//! ```
//!
//! Blank lines and lines starting with `#` or `;` are ignored. Values may be
//! wrapped in matching single or double quotes, which are stripped.

use std::{ fs, path::Path };
use crate::error::ConfigError;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// A single `key = value` entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
    /// 1-based line number of the entry in the source text.
    pub line: usize,
}

/// A named section and its entries, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    pub entries: Vec<Entry>,
}

impl Section {
    /// Get the value associated with a key, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.value.as_str())
    }
}

/// A parsed configuration, with sections in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Config {
    sections: Vec<Section>,
}

fn unquote(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2
        && (b[0] == b'"' || b[0] == b'\'')
        && b[b.len() - 1] == b[0]
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

impl Config {
    /// Parse configuration text.
    pub fn parse(text: &str) -> ConfigResult<Self> {
        let mut sections: Vec<Section> = Vec::new();
        for (k, raw) in text.lines().enumerate() {
            let line = k + 1;
            let s = raw.trim();
            if s.is_empty() || s.starts_with('#') || s.starts_with(';') {
                continue;
            }
            if let Some(name)
                = s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']'))
            {
                let name = name.trim();
                if sections.iter().any(|sec| sec.name == name) {
                    return Err(ConfigError::DuplicateSection {
                        line,
                        name: name.to_string(),
                    });
                }
                sections.push(
                    Section { name: name.to_string(), entries: Vec::new() });
                continue;
            }
            let (key, value)
                = s.split_once('=')
                .map(|(key, value)| (key.trim(), unquote(value.trim()).trim()))
                .filter(|(key, _)| !key.is_empty())
                .ok_or_else(|| {
                    ConfigError::Syntax { line, text: s.to_string() }
                })?;
            let section
                = sections.last_mut()
                .ok_or_else(|| {
                    ConfigError::Orphan { line, key: key.to_string() }
                })?;
            if section.get(key).is_some() {
                return Err(ConfigError::DuplicateKey {
                    line,
                    section: section.name.clone(),
                    key: key.to_string(),
                });
            }
            section.entries.push(
                Entry { key: key.to_string(), value: value.to_string(), line });
        }
        Ok(Self { sections })
    }

    /// Read and parse a configuration file.
    pub fn from_file<P>(path: P) -> ConfigResult<Self>
    where P: AsRef<Path>
    {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Get a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|sec| sec.name == name)
    }

    /// Return `true` if a section with the given name exists.
    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// Iterate over all sections.
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.sections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "
# a comment
[parameters]
w = 2
; another comment
v0 = -15

[regions]
a = \"0, w|v0\"
b = 'w, 2 * w|0'
";

    #[test]
    fn reads_sections_in_order() {
        let cfg = Config::parse(TEXT).unwrap();
        let names: Vec<&str> = cfg.sections().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["parameters", "regions"]);
        let params = cfg.section("parameters").unwrap();
        assert_eq!(params.get("w"), Some("2"));
        assert_eq!(params.get("v0"), Some("-15"));
        assert_eq!(params.entries[1].line, 6);
        let regions = cfg.section("regions").unwrap();
        assert_eq!(regions.get("a"), Some("0, w|v0"));
        assert_eq!(regions.get("b"), Some("w, 2 * w|0"));
        assert!(!cfg.has_section("other"));
    }

    #[test]
    fn equality_operators_stay_in_values() {
        let cfg = Config::parse("[r]\nk = 0, 1|where(x == 0, 1, 2)").unwrap();
        assert_eq!(
            cfg.section("r").unwrap().get("k"),
            Some("0, 1|where(x == 0, 1, 2)"),
        );
    }

    #[test]
    fn rejects_malformed_text() {
        assert!(matches!(
            Config::parse("[p]\njust some words"),
            Err(ConfigError::Syntax { line: 2, .. })
        ));
        assert!(matches!(
            Config::parse("a = 1\n[p]"),
            Err(ConfigError::Orphan { line: 1, .. })
        ));
        assert!(matches!(
            Config::parse("[p]\n[p]"),
            Err(ConfigError::DuplicateSection { line: 2, .. })
        ));
        assert!(matches!(
            Config::parse("[p]\na = 1\na = 2"),
            Err(ConfigError::DuplicateKey { line: 3, .. })
        ));
        assert!(matches!(
            Config::parse("[p]\n = 1"),
            Err(ConfigError::Syntax { line: 2, .. })
        ));
    }
}
