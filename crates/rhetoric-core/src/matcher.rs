// ─────────────────────────────────────────────────────────────────────
// Director-Class AI — Phrase Matcher
// ─────────────────────────────────────────────────────────────────────
//! Locates a single lower-cased phrase in lower-cased text.
//!
//! Word-boundary mode compiles one regex per phrase. A side of the
//! phrase is only boundary-anchored when its edge character is a word
//! character, so phrases such as `"coincidence?"` still match.

use regex::Regex;

use rhetoric_types::{GuardError, GuardResult, MatchMode, TextSpan};

/// A compiled phrase lookup.
#[derive(Debug, Clone)]
pub enum PhraseMatcher {
    Substring(String),
    Bounded { phrase: String, re: Regex },
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl PhraseMatcher {
    pub fn new(phrase: &str, mode: MatchMode) -> GuardResult<Self> {
        let phrase = phrase.trim().to_lowercase();
        if phrase.is_empty() {
            return Err(GuardError::Validation("empty phrase".to_string()));
        }
        match mode {
            MatchMode::LegacySubstring => Ok(PhraseMatcher::Substring(phrase)),
            MatchMode::WordBoundary => {
                let lead = phrase.chars().next().is_some_and(is_word_char);
                let trail = phrase.chars().last().is_some_and(is_word_char);
                let pattern = format!(
                    "{}{}{}",
                    if lead { r"\b" } else { "" },
                    regex::escape(&phrase),
                    if trail { r"\b" } else { "" },
                );
                let re = Regex::new(&pattern)
                    .map_err(|e| GuardError::Validation(format!("phrase '{phrase}': {e}")))?;
                Ok(PhraseMatcher::Bounded { phrase, re })
            }
        }
    }

    pub fn phrase(&self) -> &str {
        match self {
            PhraseMatcher::Substring(p) => p,
            PhraseMatcher::Bounded { phrase, .. } => phrase,
        }
    }

    /// First occurrence in `lowered`, as byte offsets.
    pub fn find(&self, lowered: &str) -> Option<TextSpan> {
        match self {
            PhraseMatcher::Substring(p) => lowered.find(p.as_str()).map(|start| TextSpan {
                start,
                end: start + p.len(),
            }),
            PhraseMatcher::Bounded { re, .. } => re.find(lowered).map(|m| TextSpan {
                start: m.start(),
                end: m.end(),
            }),
        }
    }

    pub fn is_match(&self, lowered: &str) -> bool {
        match self {
            PhraseMatcher::Substring(p) => lowered.contains(p.as_str()),
            PhraseMatcher::Bounded { re, .. } => re.is_match(lowered),
        }
    }
}

/// A named list of phrases; membership is "any phrase matches".
#[derive(Debug, Clone)]
pub struct PhraseSet {
    matchers: Vec<PhraseMatcher>,
}

impl PhraseSet {
    pub fn new(phrases: &[&str], mode: MatchMode) -> GuardResult<Self> {
        let matchers = phrases
            .iter()
            .map(|p| PhraseMatcher::new(p, mode))
            .collect::<GuardResult<Vec<_>>>()?;
        Ok(Self { matchers })
    }

    pub fn any_match(&self, lowered: &str) -> bool {
        self.matchers.iter().any(|m| m.is_match(lowered))
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
