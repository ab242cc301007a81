// Keyword intent matcher
//
// Picks the knowledge base topic whose keywords overlap the user's text the
// most. Stemmed token hits score 1 each, raw keyword substrings score 2 each.

use crate::error::{AdvisorError, Result};
use crate::intelligence::knowledge_base::{KnowledgeBase, Topic};
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

// Extra points for a keyword that appears verbatim in the input
const EXACT_MATCH_BONUS: u32 = 2;

// Words, hyphenated compounds, clitics like 's / 't, and lone punctuation.
// Only purely alphanumeric tokens survive, so compounds and clitics get dropped.
const TOKEN_PATTERN: &str = r"[^\W_]+(?:-[^\W_]+)*|'[^\W_]*|[^\w\s]";

/// Outcome of classifying one piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub topic: Option<Topic>,
    pub score: u32,
}

impl Classification {
    pub fn none() -> Self {
        Self {
            topic: None,
            score: 0,
        }
    }

    pub fn is_match(&self) -> bool {
        self.score > 0 && self.topic.is_some()
    }
}

// Keywords of one entry, prepared once at construction
struct CompiledEntry {
    stems: HashSet<String>,
    raw: Vec<String>,
}

pub struct KeywordIntentMatcher {
    knowledge: Arc<KnowledgeBase>,
    stemmer: Stemmer,
    tokenizer: Regex,
    compiled: Vec<CompiledEntry>,
}

impl KeywordIntentMatcher {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Result<Self> {
        let tokenizer = Regex::new(TOKEN_PATTERN)
            .map_err(|e| AdvisorError::KnowledgeBase(format!("bad tokenizer pattern: {}", e)))?;
        let stemmer = Stemmer::create(Algorithm::English);

        // Stem the keywords once so classify() only stems the input
        let compiled = knowledge
            .entries()
            .iter()
            .map(|entry| {
                let raw: Vec<String> = entry
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.trim().is_empty())
                    .collect();
                let stems = raw.iter().map(|k| stemmer.stem(k).into_owned()).collect();
                CompiledEntry { stems, raw }
            })
            .collect();

        Ok(Self {
            knowledge,
            stemmer,
            tokenizer,
            compiled,
        })
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Lowercase, tokenize, drop non-alphanumeric tokens and stem the rest
    pub fn stemmed_tokens(&self, text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        self.stem_lowered(&lowered)
    }

    fn stem_lowered(&self, lowered: &str) -> Vec<String> {
        self.tokenizer
            .find_iter(lowered)
            .map(|m| m.as_str())
            .filter(|token| token.chars().all(char::is_alphanumeric))
            .map(|token| self.stemmer.stem(token).into_owned())
            .collect()
    }

    /// Find the best topic for `text`
    ///
    /// Topics are scored in knowledge base order and only a strictly higher
    /// score replaces the current best, so the earlier topic wins a tie.
    pub fn classify(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();
        let tokens = self.stem_lowered(&lowered);

        let mut best = Classification::none();

        for (entry, compiled) in self.knowledge.entries().iter().zip(&self.compiled) {
            let stem_hits = tokens
                .iter()
                .filter(|token| compiled.stems.contains(token.as_str()))
                .count() as u32;

            let exact_hits = compiled
                .raw
                .iter()
                .filter(|keyword| lowered.contains(keyword.as_str()))
                .count() as u32;

            let score = stem_hits + exact_hits * EXACT_MATCH_BONUS;

            if score > best.score {
                best = Classification {
                    topic: Some(entry.topic),
                    score,
                };
            }
        }

        debug!(topic = ?best.topic, score = best.score, "classified chat input");
        best
    }

    /// Canned answer for the best topic, or the general fallback answer
    pub fn get_response(&self, text: &str) -> &str {
        self.response_for(&self.classify(text))
    }

    /// Canned answer for an existing classification
    pub fn response_for(&self, classification: &Classification) -> &str {
        match classification.topic {
            Some(topic) if classification.is_match() => self
                .knowledge
                .get(topic)
                .map(|entry| entry.response.as_str())
                .unwrap_or_else(|| self.knowledge.fallback_response()),
            _ => self.knowledge.fallback_response(),
        }
    }
}
