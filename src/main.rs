//! CLI entry point for the ALU grade calculator.
//!
//! Looks up single scores, prints and exports the grading scale, validates
//! custom scale files, and builds coursework reports from a CSV of
//! assignments.

use alu_grade_calc::assignments::{calculate_overall, course_standing, quick_overall, read_assignments};
use alu_grade_calc::config::{Settings, load_scale_file};
use alu_grade_calc::output::{
    LookupRecord, append_lookup, render_grade, render_quick, render_report, render_scale,
};
use alu_grade_calc::scale::{GradingScale, ScaleFormat};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::Directive,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "alu-grade")]
#[command(about = "Convert percentage scores to GPA, letter grade and pass/fail", long_about = None)]
struct Cli {
    /// Scale file to use instead of the default ALU scale (.json or .csv)
    #[arg(short, long, global = true, value_name = "FILE")]
    scale: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up the GPA, letter grade and pass/fail for a score
    Lookup {
        /// Percentage score, 0-100
        #[arg(allow_negative_numbers = true)]
        score: f64,

        /// CSV file to append the lookup to
        #[arg(long, value_name = "FILE")]
        history: Option<String>,
    },
    /// Print the grading scale reference table
    Scale,
    /// Export the grading scale
    Export {
        /// Output format: json or csv
        #[arg(short, long, default_value = "json")]
        format: ScaleFormat,

        /// File to write to (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Check that a scale file imports cleanly
    Validate {
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Override the format inferred from the extension
        #[arg(short, long)]
        format: Option<ScaleFormat>,
    },
    /// Overall grade from FA and SA category totals
    Quick {
        /// FA total score, 0-100
        #[arg(long, allow_negative_numbers = true)]
        fa: f64,

        /// SA total score, 0-100
        #[arg(long, allow_negative_numbers = true)]
        sa: f64,
    },
    /// Full course report from a CSV of assignments (kind,name,weight,grade)
    Report {
        #[arg(long)]
        student: String,

        #[arg(short, long, value_name = "CSV")]
        assignments: PathBuf,
    },
}

fn init_logging(log_file_path: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    // Logging setup: colored stderr + JSON rolling log file
    let log_dir = log_file_path.parent().unwrap_or(Path::new("logs"));
    let log_file_name = log_file_path
        .file_name()
        .unwrap_or(OsStr::new("alu_grade_calc.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse::<Directive>()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse::<Directive>()?),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let settings = Settings::from_env();
    let _file_guard = init_logging(&settings.log_file_path)?;

    let cli = Cli::parse();

    let scale = match &cli.scale {
        Some(path) => load_scale_file(path, None)?,
        None => settings.load_scale()?,
    };

    match cli.command {
        Commands::Lookup { score, history } => lookup(&scale, score, history.as_deref())?,
        Commands::Scale => print!("{}", render_scale(&scale)?),
        Commands::Export { format, output } => export(&scale, format, output.as_deref())?,
        Commands::Validate { path, format } => validate(&path, format)?,
        Commands::Quick { fa, sa } => {
            let quick = quick_overall(&scale, fa, sa).context("Please enter scores in the scale domain")?;
            print!("{}", render_quick(&scale, fa, sa, &quick)?);
        }
        Commands::Report {
            student,
            assignments,
        } => report(&scale, &student, &assignments)?,
    }

    Ok(())
}

#[tracing::instrument(skip(scale))]
fn lookup(scale: &GradingScale, score: f64, history: Option<&str>) -> Result<()> {
    let grade = scale
        .lookup(score)
        .with_context(|| format!("could not grade score {score}"))?;
    print!("{}", render_grade(score, &grade));

    if let Some(path) = history {
        append_lookup(path, &LookupRecord::new(score, &grade))
            .with_context(|| format!("failed to append lookup to {path}"))?;
    }
    Ok(())
}

#[tracing::instrument(skip(scale))]
fn export(scale: &GradingScale, format: ScaleFormat, output: Option<&Path>) -> Result<()> {
    let text = scale.export_scale(format)?;

    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), bands = scale.len(), "Exported grading scale");
        }
        None => println!("{}", text.trim_end()),
    }
    Ok(())
}

#[tracing::instrument]
fn validate(path: &Path, format: Option<ScaleFormat>) -> Result<()> {
    let scale = load_scale_file(path, format)?;
    let gaps = scale.coverage_gaps();

    if gaps.is_empty() {
        println!("{}: {} bands, full coverage", path.display(), scale.len());
    } else {
        warn!(gaps = gaps.len(), "Scale has coverage gaps");
        println!("{}: {} bands, {} gap(s)", path.display(), scale.len(), gaps.len());
        for (from, to) in gaps {
            println!("  uncovered: {from} to {to}");
        }
    }
    Ok(())
}

#[tracing::instrument(skip(scale))]
fn report(scale: &GradingScale, student: &str, path: &Path) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open assignments file {}", path.display()))?;
    let assignments = read_assignments(file)?;
    info!(count = assignments.len(), "Building grade report");

    let overall = calculate_overall(scale, &assignments)?;
    let standing = course_standing(&overall);
    print!(
        "{}",
        render_report(student, scale, &assignments, &overall, &standing)?
    );
    Ok(())
}
