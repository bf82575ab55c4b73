//! Offline evaluation of the loaded artifacts against a labelled dataset.
pub mod metrics;

use std::{
    fmt,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use rayon::prelude::*;
use serde::Deserialize;

use crate::classification::{InferenceContext, InferenceError, MoodLabel};

pub use metrics::{ClassMetrics, ClassificationReport, ConfusionMatrix};

#[derive(Debug, Clone, PartialEq)]
pub struct LabelledSample {
    pub text: String,
    pub label: MoodLabel,
}

#[derive(Debug, Deserialize)]
struct RawSample {
    text: String,
    label: i64,
}

/// Reads a JSONL dataset of `{"text": ..., "label": 0|1|2}` lines.
/// Blank lines are skipped.
///
/// # Errors
/// Returns an error naming the line number of the first invalid line.
pub fn load_dataset(path: &Path) -> Result<Vec<LabelledSample>> {
    let file =
        File::open(path).with_context(|| format!("failed to open dataset {}", path.display()))?;
    parse_dataset(BufReader::new(file))
}

/// # Errors
/// Returns an error naming the line number of the first invalid line.
pub fn parse_dataset(reader: impl BufRead) -> Result<Vec<LabelledSample>> {
    let mut samples = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line_number = index + 1;
        let line = line.with_context(|| format!("failed to read line {line_number}"))?;
        if line.trim().is_empty() {
            continue;
        }
        let raw: RawSample = serde_json::from_str(&line)
            .with_context(|| format!("invalid sample on line {line_number}"))?;
        let label = MoodLabel::from_class_id(raw.label)
            .ok_or_else(|| anyhow!("unknown label {} on line {line_number}", raw.label))?;
        samples.push(LabelledSample {
            text: raw.text,
            label,
        });
    }
    Ok(samples)
}

/// Highest-weighted vocabulary terms for one class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassFeatures {
    pub label: MoodLabel,
    pub terms: Vec<(String, f64)>,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    pub samples: usize,
    pub classification: ClassificationReport,
    pub top_features: Vec<ClassFeatures>,
}

/// Scores every sample in parallel. Texts are expected to be normalized already.
///
/// # Errors
/// Returns the first inference failure.
pub fn evaluate(
    context: &InferenceContext,
    samples: &[LabelledSample],
    top_n: usize,
) -> Result<EvaluationReport, InferenceError> {
    let predicted = samples
        .par_iter()
        .map(|sample| context.infer(&sample.text).map(|(prediction, _)| prediction.label))
        .collect::<Result<Vec<_>, _>>()?;

    let mut confusion = ConfusionMatrix::new();
    for (sample, label) in samples.iter().zip(predicted) {
        confusion.record(sample.label, label);
    }

    Ok(EvaluationReport {
        samples: samples.len(),
        classification: ClassificationReport::from_confusion(confusion),
        top_features: top_features(context, top_n),
    })
}

#[must_use]
pub fn top_features(context: &InferenceContext, top_n: usize) -> Vec<ClassFeatures> {
    let names = context.vectorizer().feature_names();
    context
        .model()
        .labels()
        .iter()
        .filter_map(|&label| {
            let weights = context.model().coefficients(label)?;
            let mut ranked: Vec<(usize, f64)> = weights.iter().copied().enumerate().collect();
            ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
            let terms = ranked
                .into_iter()
                .take(top_n)
                .map(|(index, weight)| (names[index].to_string(), weight))
                .collect();
            Some(ClassFeatures { label, terms })
        })
        .collect()
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = &self.classification;
        writeln!(f, "samples:  {}", self.samples)?;
        writeln!(f, "accuracy: {:.4}", report.accuracy)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:<10} {:>9} {:>9} {:>9} {:>8}",
            "label", "precision", "recall", "f1", "support"
        )?;
        for metrics in &report.per_class {
            writeln!(
                f,
                "{:<10} {:>9.4} {:>9.4} {:>9.4} {:>8}",
                metrics.label.as_str(),
                metrics.precision,
                metrics.recall,
                metrics.f1,
                metrics.support
            )?;
        }
        writeln!(
            f,
            "{:<10} {:>9.4} {:>9.4} {:>9.4} {:>8}",
            "macro avg", report.macro_precision, report.macro_recall, report.macro_f1, self.samples
        )?;

        writeln!(f)?;
        writeln!(f, "confusion matrix (rows = expected, columns = predicted)")?;
        write!(f, "{:<10}", "")?;
        for label in MoodLabel::ALL {
            write!(f, " {:>9}", label.as_str())?;
        }
        writeln!(f)?;
        for (label, row) in MoodLabel::ALL.iter().zip(report.confusion.rows()) {
            write!(f, "{:<10}", label.as_str())?;
            for count in row {
                write!(f, " {count:>9}")?;
            }
            writeln!(f)?;
        }

        for class in &self.top_features {
            writeln!(f)?;
            writeln!(f, "top features for {}:", class.label)?;
            for (term, weight) in &class.terms {
                writeln!(f, "  {term:<24} {weight:>8.4}")?;
            }
        }
        Ok(())
    }
}
