//! blebmerge CLI — command-line interface for annotation reconciliation.

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

use blebmerge::{AnnotationSet, AnnotatorSource, ReconcileConfig};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "blebmerge")]
#[command(
    about = "Condense, compare and merge landmark annotations from several annotators on 3D meshes"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every mesh case of the annotator datasets.
    Reconcile(CliReconcileArgs),

    /// Collapse near-duplicate points of one annotation file.
    Condense {
        /// Input annotation file (JSON).
        #[arg(long)]
        input: PathBuf,
        /// Annotator label stamped on the kept points.
        #[arg(long)]
        label: String,
        /// Points closer than this collapse into one.
        #[arg(long)]
        threshold: f64,
        /// Output annotation file (JSON).
        #[arg(long)]
        out: PathBuf,
    },

    /// Check whether two condensed annotation files agree.
    Compare {
        #[arg(long)]
        left: PathBuf,
        #[arg(long)]
        right: PathBuf,
        /// Rank-paired points must be closer than this to agree.
        #[arg(long)]
        threshold: f64,
    },

    /// Merge annotation files; later inputs win vertex collisions.
    Merge {
        /// Input annotation files, in merge order.
        #[arg(long, num_args = 1.., required = true)]
        input: Vec<PathBuf>,
        /// Case name recorded in the merged file.
        #[arg(long)]
        file_name: String,
        #[arg(long)]
        out: PathBuf,
    },

    /// Print the records of an annotation file.
    Show {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct CliReconcileArgs {
    /// Output root; cases land in agreed_annotations/ or disagreed_annotations/.
    #[arg(long)]
    out: PathBuf,

    /// Reconciliation config (JSON). Flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Annotator dataset as LABEL=DIR. Repeat once per annotator, in merge order.
    #[arg(long = "annotator", value_parser = parse_annotator)]
    annotators: Vec<AnnotatorSource>,

    /// Per-annotator condense threshold.
    #[arg(long)]
    distance_threshold: Option<f64>,

    /// Cross-annotator agreement threshold.
    #[arg(long)]
    agreement_threshold: Option<f64>,
}

fn parse_annotator(raw: &str) -> Result<AnnotatorSource, String> {
    let (label, dir) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=DIR, got '{}'", raw))?;
    if label.trim().is_empty() || dir.trim().is_empty() {
        return Err(format!("expected LABEL=DIR, got '{}'", raw));
    }
    Ok(AnnotatorSource::new(label.trim(), dir.trim()))
}

impl CliReconcileArgs {
    fn to_config(&self) -> CliResult<ReconcileConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading config: {}", path.display());
                ReconcileConfig::load_json_file(path)?
            }
            None => ReconcileConfig::default(),
        };

        if !self.annotators.is_empty() {
            config.annotators = self.annotators.clone();
        }
        if let Some(t) = self.distance_threshold {
            config.distance_threshold = t;
        }
        if let Some(t) = self.agreement_threshold {
            config.agreement_threshold = t;
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Reconcile(args) => run_reconcile(&args),
        Commands::Condense {
            input,
            label,
            threshold,
            out,
        } => run_condense(&input, &label, threshold, &out),
        Commands::Compare {
            left,
            right,
            threshold,
        } => run_compare(&left, &right, threshold),
        Commands::Merge {
            input,
            file_name,
            out,
        } => run_merge(&input, &file_name, &out),
        Commands::Show { input } => run_show(&input),
    }
}

// ── reconcile ──────────────────────────────────────────────────────────

fn run_reconcile(args: &CliReconcileArgs) -> CliResult<()> {
    let config = args.to_config()?;
    for src in &config.annotators {
        tracing::info!("Annotator '{}': {}", src.label, src.dataset_dir.display());
    }
    tracing::info!(
        "distance_threshold={}, agreement_threshold={}",
        config.distance_threshold,
        config.agreement_threshold
    );

    let summary = blebmerge::process_dataset(&config, &args.out)?;

    println!("cases:      {}", summary.n_cases());
    println!("agreed:     {}", summary.agreed.len());
    println!("disagreed:  {}", summary.disagreed.len());
    println!("failed:     {}", summary.failed.len());
    for (case, reason) in &summary.failed {
        println!("  {}: {}", case, reason);
    }
    tracing::info!("Results written to {}", args.out.display());

    Ok(())
}

// ── condense ───────────────────────────────────────────────────────────

fn run_condense(input: &Path, label: &str, threshold: f64, out: &Path) -> CliResult<()> {
    let set = AnnotationSet::from_json_file(input)?;
    let (condensed, report) = blebmerge::condense_with_report(&set, threshold, label);

    println!(
        "{}: {} -> {} points ({} dropped)",
        set.file_name(),
        report.n_input,
        report.n_kept,
        report.n_dropped()
    );
    for (dropped, representative) in &report.absorbed {
        println!("  vertex {} -> vertex {}", dropped, representative);
    }

    condensed.write_json_file(out)?;
    tracing::info!("Condensed set written to {}", out.display());
    Ok(())
}

// ── compare ────────────────────────────────────────────────────────────

fn run_compare(left: &Path, right: &Path, threshold: f64) -> CliResult<()> {
    let left_set = AnnotationSet::from_json_file(left)?;
    let right_set = AnnotationSet::from_json_file(right)?;
    let report = blebmerge::compare(&left_set, &right_set, threshold);

    println!(
        "left:  {} ({} points)",
        left.display(),
        left_set.len()
    );
    println!(
        "right: {} ({} points)",
        right.display(),
        right_set.len()
    );
    for pair in &report.pairs {
        println!(
            "  rank {:>3}: vertex {:>7} <-> vertex {:>7}  dist={:.4}",
            pair.rank, pair.left_index, pair.right_index, pair.distance
        );
    }
    println!("verdict: {} (threshold {})", report.verdict, threshold);
    Ok(())
}

// ── merge ──────────────────────────────────────────────────────────────

fn run_merge(inputs: &[PathBuf], file_name: &str, out: &Path) -> CliResult<()> {
    let sets = inputs
        .iter()
        .map(|p| AnnotationSet::from_json_file(p))
        .collect::<Result<Vec<_>, _>>()?;

    let (merged, collisions) = blebmerge::merge_with_report(&sets, file_name);
    for c in &collisions {
        tracing::warn!(
            "vertex {}: '{}' replaced by '{}'",
            c.index,
            c.displaced,
            c.kept
        );
    }

    println!(
        "{}: merged {} files into {} points ({} collisions)",
        file_name,
        sets.len(),
        merged.len(),
        collisions.len()
    );
    merged.write_json_file(out)?;
    tracing::info!("Merged set written to {}", out.display());
    Ok(())
}

// ── show ───────────────────────────────────────────────────────────────

fn run_show(input: &Path) -> CliResult<()> {
    let set = AnnotationSet::from_json_file(input)?;
    println!("file_name:  {}", set.file_name());
    println!("points:     {}", set.len());
    let annotators: Vec<&str> = set.annotators().into_iter().collect();
    println!("annotators: {}", annotators.join(", "));
    for annotation in &set {
        println!("  {}", annotation);
    }
    Ok(())
}
