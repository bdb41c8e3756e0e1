//! Raw, pre-validated project records as they appear in the catalogue JSON
//! file. These types exist only to carry the shape across the `serde`
//! boundary; the actual construction rules live in
//! [`crate::catalogue::sync_details`].

use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectRecord {
    /// Presence (any value) marks the project `static` — a benign skip.
    #[serde(default, rename = "static")]
    pub is_static: Option<serde_json::Value>,
    pub rsync: Option<RsyncSection>,
    pub script: Option<ScriptSection>,
    pub password_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RsyncSection {
    pub syncs_per_day: u32,
    pub options: OptionsSpec,
    #[serde(default)]
    pub user: Option<String>,
    pub host: String,
    pub src: String,
    pub dest: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptSection {
    pub syncs_per_day: u32,
    pub command: String,
    #[serde(default)]
    pub arguments: Option<Vec<String>>,
}

/// `options` may be a single string, a list of option strings, or a list of
/// option lists. Each resulting *entry* becomes one rsync command.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionsSpec {
    Single(String),
    Multi(Vec<OptionsEntry>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OptionsEntry {
    Tokens(Vec<String>),
    Raw(String),
}

impl OptionsSpec {
    /// Normalize into one token list per rsync command. Returns `None` if
    /// the options are empty, which the caller treats as MALFORMED_PROJECT.
    pub fn entries(&self) -> Option<Vec<Vec<String>>> {
        match self {
            OptionsSpec::Single(s) => {
                if s.trim().is_empty() {
                    None
                } else {
                    Some(vec![tokenize(s)])
                }
            }
            OptionsSpec::Multi(items) => {
                if items.is_empty() {
                    return None;
                }
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    let tokens = match item {
                        OptionsEntry::Tokens(v) => {
                            if v.is_empty() {
                                return None;
                            }
                            v.clone()
                        }
                        OptionsEntry::Raw(s) => {
                            if s.trim().is_empty() {
                                return None;
                            }
                            tokenize(s)
                        }
                    };
                    out.push(tokens);
                }
                Some(out)
            }
        }
    }
}

fn tokenize(s: &str) -> Vec<String> {
    s.split_whitespace().map(String::from).collect()
}
