use crate::classification::MoodLabel;

const CLASSES: usize = MoodLabel::ALL.len();

/// Rows are expected labels, columns are predicted labels, both in class-id order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfusionMatrix {
    counts: [[usize; CLASSES]; CLASSES],
}

impl ConfusionMatrix {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, expected: MoodLabel, predicted: MoodLabel) {
        self.counts[expected.class_id()][predicted.class_id()] += 1;
    }

    #[must_use]
    pub fn get(&self, expected: MoodLabel, predicted: MoodLabel) -> usize {
        self.counts[expected.class_id()][predicted.class_id()]
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn rows(&self) -> &[[usize; CLASSES]; CLASSES] {
        &self.counts
    }

    fn correct(&self) -> usize {
        (0..CLASSES).map(|class| self.counts[class][class]).sum()
    }

    fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    fn predicted(&self, class: usize) -> usize {
        self.counts.iter().map(|row| row[class]).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub label: MoodLabel,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub per_class: Vec<ClassMetrics>,
    pub macro_precision: f64,
    pub macro_recall: f64,
    pub macro_f1: f64,
    pub confusion: ConfusionMatrix,
}

impl ClassificationReport {
    /// Undefined ratios (zero denominators) count as 0.
    #[must_use]
    pub fn from_confusion(confusion: ConfusionMatrix) -> Self {
        let per_class: Vec<ClassMetrics> = MoodLabel::ALL
            .iter()
            .map(|&label| {
                let class = label.class_id();
                let true_positive = confusion.counts[class][class];
                let precision = ratio(true_positive, confusion.predicted(class));
                let recall = ratio(true_positive, confusion.support(class));
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                ClassMetrics {
                    label,
                    precision,
                    recall,
                    f1,
                    support: confusion.support(class),
                }
            })
            .collect();

        let mean = |select: fn(&ClassMetrics) -> f64| {
            per_class.iter().map(select).sum::<f64>() / per_class.len() as f64
        };

        Self {
            accuracy: ratio(confusion.correct(), confusion.total()),
            macro_precision: mean(|m| m.precision),
            macro_recall: mean(|m| m.recall),
            macro_f1: mean(|m| m.f1),
            per_class,
            confusion,
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use MoodLabel::{Anxiety, Depression, Neutral};

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn computes_per_class_and_macro_scores() {
        let mut confusion = ConfusionMatrix::new();
        for (expected, predicted) in [
            (Neutral, Neutral),
            (Neutral, Neutral),
            (Neutral, Anxiety),
            (Anxiety, Anxiety),
            (Anxiety, Depression),
            (Depression, Depression),
        ] {
            confusion.record(expected, predicted);
        }

        let report = ClassificationReport::from_confusion(confusion);
        assert!(approx(report.accuracy, 4.0 / 6.0));

        let neutral = report.per_class[0];
        assert!(approx(neutral.precision, 1.0));
        assert!(approx(neutral.recall, 2.0 / 3.0));
        assert!(approx(neutral.f1, 0.8));
        assert_eq!(neutral.support, 3);

        let anxiety = report.per_class[1];
        assert!(approx(anxiety.precision, 0.5));
        assert!(approx(anxiety.recall, 0.5));

        let depression = report.per_class[2];
        assert!(approx(depression.precision, 0.5));
        assert!(approx(depression.recall, 1.0));
        assert!(approx(report.macro_recall, (2.0 / 3.0 + 0.5 + 1.0) / 3.0));
        assert_eq!(report.confusion.get(Anxiety, Depression), 1);
    }

    #[test]
    fn empty_matrix_scores_zero() {
        let report = ClassificationReport::from_confusion(ConfusionMatrix::new());
        assert!(approx(report.accuracy, 0.0));
        assert!(report.per_class.iter().all(|m| approx(m.f1, 0.0)));
    }
}
