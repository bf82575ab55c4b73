use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result, anyhow, bail};
use moodbot::{
    classification::InferenceContext,
    config::Config,
    evaluation::{evaluate, load_dataset},
};

const DEFAULT_TOP_FEATURES: usize = 10;

struct Args {
    dataset: PathBuf,
    top_features: usize,
}

fn main() -> Result<()> {
    let args = parse_args()?;
    let config = Config::from_env().context("failed to load configuration")?;

    let context = InferenceContext::load(config.vectorizer_path(), config.classifier_path())
        .context("failed to load model artifacts")?;
    let samples = load_dataset(&args.dataset)?;
    if samples.is_empty() {
        bail!("dataset {} contains no samples", args.dataset.display());
    }

    let report = evaluate(&context, &samples, args.top_features).context("evaluation failed")?;
    print!("{report}");
    Ok(())
}

fn parse_args() -> Result<Args> {
    let mut dataset = None;
    let mut top_features = DEFAULT_TOP_FEATURES;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dataset" => {
                let value = args.next().context("--dataset requires a path argument")?;
                dataset = Some(PathBuf::from(value));
            }
            "--top-features" => {
                let value = args.next().context("--top-features requires a count")?;
                top_features = value
                    .parse::<usize>()
                    .context("--top-features must be an integer")?;
            }
            "--help" => {
                print_usage();
                process::exit(0);
            }
            _ => {
                bail!("unknown argument: {}", arg);
            }
        }
    }

    let dataset = dataset.ok_or_else(|| anyhow!("--dataset is required"))?;
    Ok(Args {
        dataset,
        top_features,
    })
}

fn print_usage() {
    eprintln!("Usage: evaluate_model --dataset <path.jsonl> [--top-features 10]");
    eprintln!("Artifacts are read from MOODBOT_VECTORIZER_PATH and MOODBOT_CLASSIFIER_PATH.");
}
