//! Rule-based English noun lemmatizer.
//!
//! Works like WordNet's noun morphology without the dictionary lookup: an
//! irregular-form table first, then plural suffix detachment. Words of three
//! characters or fewer, and words ending in `ss`, `us` or `is`, are left
//! alone.

use std::collections::HashMap;
use std::sync::LazyLock;

use super::Lemmatizer;

/// Irregular plurals and Latin/Greek forms. Every value is a fixed point of
/// [`RuleLemmatizer::lemmatize`].
const IRREGULAR_FORMS: &[(&str, &str)] = &[
    ("children", "child"),
    ("men", "man"),
    ("women", "woman"),
    ("people", "person"),
    ("mice", "mouse"),
    ("geese", "goose"),
    ("feet", "foot"),
    ("teeth", "tooth"),
    ("data", "datum"),
    ("criteria", "criterion"),
    ("phenomena", "phenomenon"),
    ("analyses", "analysis"),
    ("theses", "thesis"),
    ("hypotheses", "hypothesis"),
    ("indices", "index"),
    ("matrices", "matrix"),
    ("wolves", "wolf"),
    ("knives", "knife"),
    ("lives", "life"),
    ("leaves", "leaf"),
    ("wives", "wife"),
    ("halves", "half"),
    ("shelves", "shelf"),
    ("series", "series"),
    ("species", "species"),
    ("news", "news"),
];

/// Suffix substitutions tried in order, longest first.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("sses", "ss"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ies", "y"),
    ("xes", "x"),
    ("zes", "z"),
    ("s", ""),
];

const PROTECTED_ENDINGS: &[&str] = &["ss", "us", "is"];

static IRREGULAR_MAP: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| IRREGULAR_FORMS.iter().copied().collect());

/// Rule-based lemmatizer for English nouns.
#[derive(Debug, Clone, Default)]
pub struct RuleLemmatizer;

impl RuleLemmatizer {
    /// Create a new rule lemmatizer.
    pub fn new() -> Self {
        RuleLemmatizer
    }

    fn detach_suffix(word: &str) -> Option<String> {
        if word.chars().count() <= 3 || PROTECTED_ENDINGS.iter().any(|e| word.ends_with(e)) {
            return None;
        }

        SUFFIX_RULES
            .iter()
            .find(|(suffix, _)| word.ends_with(suffix))
            .map(|(suffix, replacement)| {
                let stem = &word[..word.len() - suffix.len()];
                format!("{stem}{replacement}")
            })
    }
}

impl Lemmatizer for RuleLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if let Some(lemma) = IRREGULAR_MAP.get(word) {
            return (*lemma).to_string();
        }

        match Self::detach_suffix(word) {
            // "womens" -> "women" must still land on "woman".
            Some(stem) => match IRREGULAR_MAP.get(stem.as_str()) {
                Some(lemma) => (*lemma).to_string(),
                None => stem,
            },
            None => word.to_string(),
        }
    }

    fn name(&self) -> &'static str {
        "rule"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_plurals() {
        let lemmatizer = RuleLemmatizer::new();

        assert_eq!(lemmatizer.lemmatize("sentences"), "sentence");
        assert_eq!(lemmatizer.lemmatize("cities"), "city");
        assert_eq!(lemmatizer.lemmatize("boxes"), "box");
        assert_eq!(lemmatizer.lemmatize("churches"), "church");
        assert_eq!(lemmatizer.lemmatize("classes"), "class");
    }

    #[test]
    fn test_irregular_forms() {
        let lemmatizer = RuleLemmatizer::new();

        assert_eq!(lemmatizer.lemmatize("children"), "child");
        assert_eq!(lemmatizer.lemmatize("mice"), "mouse");
        assert_eq!(lemmatizer.lemmatize("womens"), "woman");
    }

    #[test]
    fn test_protected_words() {
        let lemmatizer = RuleLemmatizer::new();

        assert_eq!(lemmatizer.lemmatize("glass"), "glass");
        assert_eq!(lemmatizer.lemmatize("corpus"), "corpus");
        assert_eq!(lemmatizer.lemmatize("analysis"), "analysis");
        assert_eq!(lemmatizer.lemmatize("gas"), "gas");
    }

    #[test]
    fn test_idempotent() {
        let lemmatizer = RuleLemmatizer::new();
        let words = [
            "sentences", "classes", "cities", "womens", "analyses", "buses", "series", "texts",
            "plagiarism", "copies", "wolves", "ñandús",
        ];

        for word in words {
            let once = lemmatizer.lemmatize(word);
            assert_eq!(lemmatizer.lemmatize(&once), once, "not idempotent for {word}");
        }
    }
}
