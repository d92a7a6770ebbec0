//! risk-train - fit the student risk classifier and write its artifact

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use risk_core::constants::{DEFAULT_DATABASE_URL, DEFAULT_SPREADSHEET};
use risk_core::logic::features::FeatureBuilder;
use risk_core::logic::label::LabelThresholds;
use risk_core::logic::model::{ForestParams, DEFAULT_MODEL_PATH};
use risk_core::logic::trainer::{TrainError, Trainer, TrainerConfig, TrainingSources};

#[derive(Parser, Debug)]
#[command(name = "risk-train")]
#[command(author, version, about = "Train the student risk classifier", long_about = None)]
struct Cli {
    /// Record store to read students from
    #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
    database_url: String,

    /// Do not read the record store
    #[arg(long)]
    no_database: bool,

    /// Spreadsheet(s) with training rows (.xlsx, .xls, .ods, .csv)
    #[arg(long, env = "TRAINING_SPREADSHEET", default_value = DEFAULT_SPREADSHEET, value_delimiter = ',')]
    spreadsheet: Vec<PathBuf>,

    /// Column holding manual labels; "none" disables overrides
    #[arg(long, env = "LABEL_COLUMN", default_value = "label")]
    label_column: String,

    /// Include the built-in demo rows
    #[arg(long, env = "TRAIN_DEMO_DATA")]
    demo_data: bool,

    /// Where to write the model artifact
    #[arg(long, env = "MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    model_path: PathBuf,

    /// Number of trees
    #[arg(long, default_value = "100")]
    trees: usize,

    /// RNG seed for bootstrap sampling and the train/test split
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value = "0.2")]
    test_ratio: f64,

    /// Minimum rows before any are held out
    #[arg(long, default_value = "5")]
    min_holdout_rows: usize,

    /// Maximum tree depth (unlimited when omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Grades below this are risky
    #[arg(long, env = "RISK_GRADE_FLOOR", default_value = "65")]
    grade_floor: f64,

    /// Attendance below this is risky
    #[arg(long, env = "RISK_ATTENDANCE_FLOOR", default_value = "75")]
    attendance_floor: f64,

    /// Violation points above this are risky
    #[arg(long, env = "RISK_VIOLATION_CEILING", default_value = "9")]
    violation_ceiling: f64,

    /// Allowance below this is risky together with many siblings
    #[arg(long, env = "RISK_ALLOWANCE_FLOOR", default_value = "10000")]
    allowance_floor: f64,

    /// Sibling count at or above this completes the allowance condition
    #[arg(long, env = "RISK_SIBLING_FLOOR", default_value = "3")]
    sibling_floor: f64,
}

impl Cli {
    fn sources(&self) -> TrainingSources {
        TrainingSources {
            database_url: (!self.no_database).then(|| self.database_url.clone()),
            spreadsheets: self.spreadsheet.clone(),
            demo_data: self.demo_data,
        }
    }

    fn thresholds(&self) -> LabelThresholds {
        LabelThresholds {
            grade_floor: self.grade_floor,
            attendance_floor: self.attendance_floor,
            violation_ceiling: self.violation_ceiling,
            allowance_floor: self.allowance_floor,
            sibling_floor: self.sibling_floor,
        }
    }

    fn trainer_config(&self) -> TrainerConfig {
        TrainerConfig {
            test_ratio: self.test_ratio,
            min_holdout_rows: self.min_holdout_rows,
            forest: ForestParams {
                n_trees: self.trees,
                max_depth: self.max_depth,
                seed: self.seed,
                ..Default::default()
            },
            model_path: self.model_path.clone(),
        }
    }

    fn label_column(&self) -> Option<&str> {
        let column = self.label_column.trim();
        (!column.is_empty() && !column.eq_ignore_ascii_case("none")).then_some(column)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let sources = cli.sources();
    log::info!("Training sources: {}", sources.describe().join(", "));

    let tables = sources.collect().await;
    let table = FeatureBuilder::new()
        .with_label_column(cli.label_column())
        .build(tables)
        .map_err(TrainError::from)
        .context("Create a training spreadsheet, add students via the web form, or pass --demo-data")?;

    let outcome = Trainer::new(cli.trainer_config())
        .run(&table, &cli.thresholds())
        .context("training failed")?;

    log::info!(
        "Model written to {} (accuracy {:.1}%). Reload the server to use it.",
        outcome.path.display(),
        outcome.artifact.summary.evaluation.accuracy() * 100.0
    );

    Ok(())
}
