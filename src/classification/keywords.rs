//! Affect keyword sets and the positive-affect confidence override.
use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use once_cell::sync::Lazy;

use super::{MoodLabel, Prediction};

/// The override only fires for raw confidences strictly below this value.
pub const DEFAULT_OVERRIDE_THRESHOLD: f64 = 0.85;
/// Confidence reported for an overridden (Neutral) prediction.
pub const DEFAULT_OVERRIDE_CONFIDENCE: f64 = 0.75;

const POSITIVE_AFFECT: [&str; 9] = [
    "happy",
    "great",
    "wonderful",
    "excited",
    "joy",
    "love",
    "good",
    "better",
    "amazing",
];

const NEGATIONS: [&str; 7] = ["not", "never", "can't", "don't", "won't", "no", "without"];

static POSITIVE_MATCHER: Lazy<KeywordSet> =
    Lazy::new(|| KeywordSet::new(&POSITIVE_AFFECT).expect("positive affect keyword matcher"));
static NEGATION_MATCHER: Lazy<KeywordSet> =
    Lazy::new(|| KeywordSet::new(&NEGATIONS).expect("negation keyword matcher"));

/// Case-insensitive substring test over a fixed phrase list, so `loved`
/// counts as `love` and `know` counts as `no`.
#[derive(Debug)]
pub struct KeywordSet {
    ac: AhoCorasick,
}

impl KeywordSet {
    /// # Errors
    /// Returns an error when the automaton cannot be built.
    pub fn new(words: &[&str]) -> Result<Self, aho_corasick::BuildError> {
        let ac = AhoCorasickBuilder::new()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(true)
            .build(words)?;
        Ok(Self { ac })
    }

    #[must_use]
    pub fn contains_any(&self, text: &str) -> bool {
        self.ac.is_match(text)
    }
}

/// Outcome of running the override over a raw prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverrideDecision {
    pub applied: bool,
    pub prediction: Prediction,
}

/// Downgrades low-confidence non-Neutral predictions to Neutral when the
/// normalized text is positive and free of negations.
#[derive(Debug, Clone, Copy)]
pub struct OverridePolicy {
    threshold: f64,
    confidence: f64,
}

impl OverridePolicy {
    #[must_use]
    pub fn new(threshold: f64, confidence: f64) -> Self {
        Self {
            threshold,
            confidence,
        }
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn apply(&self, normalized: &str, raw: Prediction) -> OverrideDecision {
        let unchanged = OverrideDecision {
            applied: false,
            prediction: raw,
        };
        if raw.label == MoodLabel::Neutral || raw.confidence >= self.threshold {
            return unchanged;
        }
        if !has_positive_affect(normalized) || has_negation(normalized) {
            return unchanged;
        }

        OverrideDecision {
            applied: true,
            prediction: Prediction::new(MoodLabel::Neutral, self.confidence),
        }
    }
}

impl Default for OverridePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_OVERRIDE_THRESHOLD, DEFAULT_OVERRIDE_CONFIDENCE)
    }
}

#[must_use]
pub fn has_positive_affect(text: &str) -> bool {
    POSITIVE_MATCHER.contains_any(text)
}

#[must_use]
pub fn has_negation(text: &str) -> bool {
    NEGATION_MATCHER.contains_any(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("happy today everything wonderful", true)]
    #[case("HAPPY", true)]
    #[case("unhappy goodbye", true)]
    #[case("enjoy", true)]
    #[case("loved joyful", true)]
    #[case("feel good", true)]
    #[case("tired worry", false)]
    fn positive_affect_matches_substrings(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(has_positive_affect(text), expected);
    }

    #[rstest]
    #[case("not happy", true)]
    #[case("nothing know now", true)]
    #[case("can't sleep", true)]
    #[case("no", true)]
    #[case("without you", true)]
    #[case("notable", true)]
    #[case("happy today", false)]
    fn negation_matches_substrings(#[case] text: &str, #[case] expected: bool) {
        assert_eq!(has_negation(text), expected);
    }

    #[test]
    fn overrides_positive_low_confidence_prediction() {
        let policy = OverridePolicy::default();
        let raw = Prediction::new(MoodLabel::Depression, 0.57);
        let decision = policy.apply("happy today everything wonderful", raw);
        assert!(decision.applied);
        assert_eq!(decision.prediction.label, MoodLabel::Neutral);
        assert!((decision.prediction.confidence - 0.75).abs() < f64::EPSILON);
    }

    #[test]
    fn negation_blocks_override() {
        let policy = OverridePolicy::default();
        let raw = Prediction::new(MoodLabel::Depression, 0.57);
        let decision = policy.apply("not happy nothing feel good anymore", raw);
        assert!(!decision.applied);
        assert_eq!(decision.prediction, raw);
    }

    #[rstest]
    #[case("loved today", true)]
    #[case("joyful day", true)]
    #[case("feel good know", false)]
    fn keyword_fragments_drive_the_override(#[case] text: &str, #[case] applied: bool) {
        let raw = Prediction::new(MoodLabel::Depression, 0.6);
        assert_eq!(OverridePolicy::default().apply(text, raw).applied, applied);
    }

    #[rstest]
    #[case(0.85)]
    #[case(0.9)]
    #[case(1.0)]
    fn never_fires_at_or_above_threshold(#[case] confidence: f64) {
        let policy = OverridePolicy::default();
        for label in MoodLabel::ALL {
            let raw = Prediction::new(label, confidence);
            let decision = policy.apply("happy great love", raw);
            assert!(!decision.applied);
            assert_eq!(decision.prediction, raw);
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.34)]
    #[case(0.84)]
    fn never_changes_neutral_predictions(#[case] confidence: f64) {
        let policy = OverridePolicy::default();
        let raw = Prediction::new(MoodLabel::Neutral, confidence);
        let decision = policy.apply("happy great love", raw);
        assert!(!decision.applied);
        assert_eq!(decision.prediction, raw);
    }

    #[test]
    fn requires_positive_affect() {
        let policy = OverridePolicy::default();
        let raw = Prediction::new(MoodLabel::Anxiety, 0.4);
        assert!(!policy.apply("tired worry", raw).applied);
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let policy = OverridePolicy::new(0.5, 0.6);
        let raw = Prediction::new(MoodLabel::Anxiety, 0.55);
        assert!(!policy.apply("good", raw).applied);

        let raw = Prediction::new(MoodLabel::Anxiety, 0.45);
        let decision = policy.apply("good", raw);
        assert!(decision.applied);
        assert!((decision.prediction.confidence - 0.6).abs() < f64::EPSILON);
    }
}
