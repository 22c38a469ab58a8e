use std::collections::BTreeMap;

use regex::{Captures, Regex, RegexBuilder};
use tracing::warn;

use crate::app::params::ParamsError;

pub(crate) const COLOR_SLOTS: u8 = 32;
const ESCAPE: char = '\x1b';
/// An existing escape code: a letter run with an optional `[arg]`, or a single
/// symbol such as `\x1b{`.
const ESCAPE_CODE_PATTERN: &str = r"\x1b(?:[A-Za-z]+(?:\[[^\]]*\])?|.)";

/// Wraps listed words in `\x1bC[n]` color escapes.
#[derive(Debug, Clone)]
pub(crate) struct AutoColorTable {
    word_colors: BTreeMap<String, u8>,
    pattern: Option<Regex>,
}

impl AutoColorTable {
    /// Builds the table from the `C0`..`C31` word lists. Words are trimmed
    /// and lowercased; a word listed under several colors keeps the highest
    /// slot.
    pub(crate) fn from_params(lists: &BTreeMap<String, Vec<String>>) -> Result<Self, ParamsError> {
        for key in lists.keys() {
            if slot_from_key(key).is_none() {
                warn!(key = %key, "auto_color_key_ignored");
            }
        }

        let mut word_colors = BTreeMap::new();
        for slot in 0..COLOR_SLOTS {
            let Some(words) = lists.get(&format!("C{slot}")) else {
                continue;
            };
            for raw in words {
                let word = raw.trim().to_lowercase();
                if !word.is_empty() {
                    word_colors.insert(word, slot);
                }
            }
        }

        let pattern = if word_colors.is_empty() {
            None
        } else {
            Some(build_pattern(&word_colors)?)
        };
        Ok(Self {
            word_colors,
            pattern,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.word_colors.len()
    }

    pub(crate) fn color_for(&self, word: &str) -> Option<u8> {
        self.word_colors.get(&word.to_lowercase()).copied()
    }

    /// Colors whole-word, case-insensitive matches, keeping the matched
    /// text as written. Escape codes already in `text` pass through.
    pub(crate) fn apply(&self, text: &str) -> String {
        let Some(pattern) = &self.pattern else {
            return text.to_string();
        };
        pattern
            .replace_all(text, |caps: &Captures<'_>| {
                let matched = &caps[0];
                if matched.starts_with(ESCAPE) {
                    return matched.to_string();
                }
                match self.color_for(matched) {
                    Some(slot) => format!("{ESCAPE}C[{slot}]{matched}{ESCAPE}C[0]"),
                    None => matched.to_string(),
                }
            })
            .into_owned()
    }
}

fn slot_from_key(key: &str) -> Option<u8> {
    let slot = key.strip_prefix('C')?.parse::<u8>().ok()?;
    (slot < COLOR_SLOTS).then_some(slot)
}

fn build_pattern(word_colors: &BTreeMap<String, u8>) -> Result<Regex, ParamsError> {
    let mut words: Vec<&str> = word_colors.keys().map(String::as_str).collect();
    // Longest first so a phrase wins over a word it starts with.
    words.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    let alternation = words
        .iter()
        .map(|word| regex::escape(word))
        .collect::<Vec<_>>()
        .join("|");
    let source = format!(r"{ESCAPE_CODE_PATTERN}|\b(?:{alternation})\b");
    Ok(RegexBuilder::new(&source).case_insensitive(true).build()?)
}
