//! Fallback semester classification for course records missing period data
//!
//! Some course records arrive without a complete enrollment/period chain. For
//! those, a [`FallbackClassifier`] guesses a (year, term) so the course can
//! still be shown in a bucket. A classifier is only consulted when the record
//! carries no explicit period; it never overrides one.

use crate::period::PeriodKey;

/// Default year assumed for courses no rule recognizes
pub const DEFAULT_ANCHOR_YEAR: i32 = 2025;

/// Strategy for inferring a (year, term) for a course with no period data
///
/// Implementations must be pure: the result depends only on the arguments.
pub trait FallbackClassifier: Send + Sync {
    /// Guess the period of a course from its name and its position in the
    /// fetched course list
    fn classify(&self, course_name: &str, positional_index: usize) -> PeriodKey;
}

/// A substring rule mapping course names to a period relative to the anchor year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// Lower-case substring to look for
    pub token: String,
    /// Offset added to the anchor year
    pub year_offset: i32,
    /// Term to assign
    pub term: u8,
}

impl KeywordRule {
    /// Create a rule
    pub fn new(token: impl Into<String>, year_offset: i32, term: u8) -> Self {
        Self {
            token: token.into().to_lowercase(),
            year_offset,
            term,
        }
    }
}

/// Ordered keyword table with positional alternation as the last resort
///
/// Rules are tested in order and the first match wins, so more specific tokens
/// (`"cálculo iii"`) must precede the ones they contain (`"cálculo ii"`).
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    rules: Vec<KeywordRule>,
    anchor_year: i32,
}

impl KeywordClassifier {
    /// Classifier with the built-in curriculum table
    pub fn new(anchor_year: i32) -> Self {
        Self::with_rules(default_rules(), anchor_year)
    }

    /// Classifier with a custom rule table
    pub fn with_rules(rules: Vec<KeywordRule>, anchor_year: i32) -> Self {
        Self { rules, anchor_year }
    }

    /// Year used for unmatched courses
    pub fn anchor_year(&self) -> i32 {
        self.anchor_year
    }

    /// The rule table, in match order
    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_ANCHOR_YEAR)
    }
}

impl FallbackClassifier for KeywordClassifier {
    fn classify(&self, course_name: &str, positional_index: usize) -> PeriodKey {
        let name = course_name.to_lowercase();

        if let Some(rule) = self.rules.iter().find(|r| name.contains(&r.token)) {
            return PeriodKey::new(self.anchor_year + rule.year_offset, rule.term);
        }

        // Alternate terms so unmatched courses spread over the anchor year
        let term = (positional_index % 2) as u8 + 1;
        PeriodKey::new(self.anchor_year, term)
    }
}

fn default_rules() -> Vec<KeywordRule> {
    vec![
        // Specific courses with a known place in the sequence
        KeywordRule::new("cálculo iii", 0, 2),
        KeywordRule::new("calculo iii", 0, 2),
        KeywordRule::new("ecuaciones diferenciales", 0, 2),
        KeywordRule::new("cálculo ii", 0, 1),
        KeywordRule::new("calculo ii", 0, 1),
        KeywordRule::new("álgebra lineal", 0, 1),
        KeywordRule::new("algebra lineal", 0, 1),
        KeywordRule::new("física ii", 0, 1),
        KeywordRule::new("fisica ii", 0, 1),
        KeywordRule::new("cálculo i", -1, 2),
        KeywordRule::new("calculo i", -1, 2),
        KeywordRule::new("física i", -1, 2),
        KeywordRule::new("fisica i", -1, 2),
        KeywordRule::new("introducción a la programación", -1, 1),
        KeywordRule::new("introduccion a la programacion", -1, 1),
        // Broad subjects land in the earliest terms
        KeywordRule::new("precálculo", -1, 1),
        KeywordRule::new("precalculo", -1, 1),
        KeywordRule::new("álgebra", -1, 1),
        KeywordRule::new("algebra", -1, 1),
        KeywordRule::new("matemática", -1, 1),
        KeywordRule::new("matematica", -1, 1),
        KeywordRule::new("programación", -1, 2),
        KeywordRule::new("programacion", -1, 2),
        KeywordRule::new("química", -1, 2),
        KeywordRule::new("quimica", -1, 2),
        KeywordRule::new("física", -1, 2),
        KeywordRule::new("fisica", -1, 2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_specific_rule() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Cálculo II", 3), PeriodKey::new(2025, 1));
        assert_eq!(classifier.classify("CALCULO II", 0), PeriodKey::new(2025, 1));
    }

    #[test]
    fn test_specific_rule_precedes_contained_token() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Cálculo III", 0), PeriodKey::new(2025, 2));
        assert_eq!(classifier.classify("Cálculo I", 0), PeriodKey::new(2024, 2));
    }

    #[test]
    fn test_broad_keyword() {
        let classifier = KeywordClassifier::default();
        assert_eq!(
            classifier.classify("Taller de Programación Web", 7),
            PeriodKey::new(2024, 2)
        );
        assert_eq!(classifier.classify("Matemáticas Discretas", 0), PeriodKey::new(2024, 1));
    }

    #[test]
    fn test_positional_fallback() {
        let classifier = KeywordClassifier::default();
        assert_eq!(classifier.classify("Unrelated Elective", 4), PeriodKey::new(2025, 1));
        assert_eq!(classifier.classify("Unrelated Elective", 5), PeriodKey::new(2025, 2));
    }

    #[test]
    fn test_purity_across_calls() {
        let classifier = KeywordClassifier::default();
        let first = classifier.classify("Cálculo II", 3);
        classifier.classify("Unrelated Elective", 4);
        classifier.classify("Física I", 9);
        assert_eq!(classifier.classify("Cálculo II", 3), first);
    }

    #[test]
    fn test_custom_rules_and_anchor() {
        let classifier =
            KeywordClassifier::with_rules(vec![KeywordRule::new("Taller", 1, 2)], 2030);
        assert_eq!(classifier.anchor_year(), 2030);
        assert_eq!(classifier.classify("taller de tesis", 0), PeriodKey::new(2031, 2));
        assert_eq!(classifier.classify("Cálculo II", 1), PeriodKey::new(2030, 2));
    }
}
