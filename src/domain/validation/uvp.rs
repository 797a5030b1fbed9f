//! Brand value proposition and product-term extraction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// What the brand sells and to whom, as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValueProposition {
    pub brand_name: String,
    pub industry: String,
    pub product_category: String,
    pub target_customer: String,
    pub headline: String,
    pub description: String,
    pub key_benefits: Vec<String>,
}

impl ValueProposition {
    /// Fields describing the offering, in the order terms are extracted.
    fn offering_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.product_category.as_str(),
            self.headline.as_str(),
            self.description.as_str(),
        ]
        .into_iter()
        .chain(self.key_benefits.iter().map(String::as_str))
    }

    /// Product-category terms derived from the offering text at call time.
    pub fn product_terms(&self) -> ProductTerms {
        let mut terms = ProductTerms::default();
        for field in self.offering_fields() {
            terms.extend_from(field);
        }
        terms
    }

    /// Domain-signal tokens of the industry field, plus the field itself.
    pub fn industry_terms(&self) -> Vec<String> {
        terms_of(&self.industry)
    }

    /// Domain-signal tokens of the target customer field, plus the field itself.
    pub fn target_customer_terms(&self) -> Vec<String> {
        terms_of(&self.target_customer)
    }
}

fn terms_of(field: &str) -> Vec<String> {
    let whole = field.trim().to_lowercase();
    let mut terms: Vec<String> = tokenize(&whole)
        .into_iter()
        .filter(|t| is_domain_signal(t))
        .collect();
    if !whole.is_empty() && !terms.contains(&whole) {
        terms.insert(0, whole);
    }
    terms
}

/// Single tokens and short phrases naming what the brand sells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductTerms {
    pub tokens: BTreeSet<String>,
    /// Two- and three-word phrases with at least one domain-signal token.
    pub phrases: BTreeSet<String>,
}

impl ProductTerms {
    fn extend_from(&mut self, field: &str) {
        let lowered = field.to_lowercase();
        // Punctuation and stop words split the text into runs; phrases
        // never cross them.
        for clause in lowered.split(|c: char| matches!(c, ',' | '.' | ';' | ':' | '!' | '?' | '(' | ')' | '/' | '|')) {
            let mut run: Vec<String> = Vec::new();
            for token in tokenize(clause) {
                if is_stop_word(&token) {
                    self.add_phrases(&run);
                    run.clear();
                    continue;
                }
                if is_domain_signal(&token) {
                    self.tokens.insert(token.clone());
                }
                run.push(token);
            }
            self.add_phrases(&run);
        }
    }

    fn add_phrases(&mut self, run: &[String]) {
        for size in 2..=3 {
            for window in run.windows(size) {
                if window.iter().any(|t| is_domain_signal(t)) {
                    self.phrases.insert(window.join(" "));
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty() && self.phrases.is_empty()
    }

    /// Terms found in `text`, phrases first.
    pub fn found_in(&self, text: &str) -> Vec<&str> {
        let text = text.to_lowercase();
        self.phrases
            .iter()
            .chain(self.tokens.iter())
            .filter(|term| mentions_word(&text, term))
            .map(String::as_str)
            .collect()
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|t| t.trim_matches(|c| c == '-' || c == '\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "have", "in", "into", "is", "it",
    "its", "of", "on", "or", "our", "that", "the", "their", "this", "to", "was", "we", "with", "you", "your",
    "who", "will", "can", "more", "most", "all", "any", "so", "than", "them", "they", "us",
];

/// Marketing filler that says nothing about the product category.
const GENERIC_WORDS: &[&str] = &[
    "best", "better", "great", "help", "helps", "helping", "easy", "easily", "simple", "fast", "faster",
    "quality", "solution", "solutions", "service", "services", "business", "businesses", "company",
    "companies", "customer", "customers", "team", "teams", "people", "new", "top", "leading", "trusted",
    "professional", "affordable", "results", "growth", "grow", "growing", "every", "one", "get", "make",
    "makes", "need", "needs", "way", "ways", "just", "also", "built", "powerful", "world", "class",
];

fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(&token)
}

/// A token that can identify a product category: not a stop word, not
/// filler, at least three characters (short acronyms like "seo" count).
fn is_domain_signal(token: &str) -> bool {
    token.chars().count() >= 3
        && !is_stop_word(token)
        && !GENERIC_WORDS.contains(&token)
        && !token.chars().all(|c| c.is_ascii_digit())
}

fn is_boundary(c: Option<char>) -> bool {
    c.map_or(true, |c| !c.is_alphanumeric())
}

/// Whole-word match in lowercase `text`, tolerating a plural `s`.
pub(crate) fn mentions_word(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(idx, _)| {
        let before = text[..idx].chars().next_back();
        let rest = &text[idx + term.len()..];
        let rest = rest.strip_prefix('s').filter(|r| is_boundary(r.chars().next())).unwrap_or(rest);
        is_boundary(before) && is_boundary(rest.chars().next())
    })
}

/// Word-start match in lowercase `text`; `term` may be a stem like "reconcil".
pub(crate) fn mentions_stem(text: &str, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }
    text.match_indices(term.as_str())
        .any(|(idx, _)| is_boundary(text[..idx].chars().next_back()))
}
