//! Filesystem driver: discovers mesh cases, reconciles them and files the
//! merged annotations under agreed/disagreed output directories.
//!
//! Expected layout, one dataset directory per annotator:
//!
//! ```text
//! <dataset_dir>/<case>/mesh.obj
//! <dataset_dir>/<case>/annotation.json
//! ```
//!
//! Output:
//!
//! ```text
//! <out>/agreed_annotations/<case>/{annotation.json, mesh.obj}
//! <out>/disagreed_annotations/<case>/{annotation.json, mesh.obj}
//! ```

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::annotation::AnnotationSet;
use crate::case::{reconcile_case, CaseOutcome, CaseVerdict};
use crate::config::ReconcileConfig;
use crate::error::AnnotationError;

/// Names of sub-directories of `dir` that contain `mesh_file_name`, sorted.
pub fn discover_cases(dir: &Path, mesh_file_name: &str) -> Result<Vec<String>, AnnotationError> {
    let entries = std::fs::read_dir(dir).map_err(|e| AnnotationError::io(dir, e))?;

    let mut cases = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnnotationError::io(dir, e))?;
        let path = entry.path();
        if !path.is_dir() || !path.join(mesh_file_name).is_file() {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => cases.push(name.to_string()),
            None => tracing::warn!(
                "Skipping case directory with non-UTF-8 name: {}",
                path.display()
            ),
        }
    }
    cases.sort();
    Ok(cases)
}

/// Path resolution for inputs and outputs of a dataset run.
#[derive(Debug, Clone)]
pub struct DatasetLayout<'a> {
    config: &'a ReconcileConfig,
    out_dir: PathBuf,
}

impl<'a> DatasetLayout<'a> {
    pub fn new(config: &'a ReconcileConfig, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            out_dir: out_dir.into(),
        }
    }

    pub fn annotation_path(&self, dataset_dir: &Path, case: &str) -> PathBuf {
        dataset_dir
            .join(case)
            .join(&self.config.annotation_file_name)
    }

    /// Mesh of `case`, taken from the first annotator's dataset.
    pub fn mesh_path(&self, case: &str) -> Option<PathBuf> {
        self.config
            .annotators
            .first()
            .map(|src| src.dataset_dir.join(case).join(&self.config.mesh_file_name))
    }

    pub fn output_dir(&self, verdict: CaseVerdict, case: &str) -> PathBuf {
        self.out_dir.join(verdict.dir_name()).join(case)
    }
}

/// Load every annotator's raw set for `case`. Any failure aborts the case.
pub fn load_case_inputs(
    layout: &DatasetLayout<'_>,
    case: &str,
) -> Result<Vec<(String, AnnotationSet)>, AnnotationError> {
    layout
        .config
        .annotators
        .iter()
        .map(|src| {
            let path = layout.annotation_path(&src.dataset_dir, case);
            if !path.is_file() {
                return Err(AnnotationError::MissingInput {
                    case: case.to_string(),
                    annotator: src.label.clone(),
                    path,
                });
            }
            let set = AnnotationSet::from_json_file(&path)?;
            Ok((src.label.clone(), set))
        })
        .collect()
}

/// Reconcile one case and write the merged set plus a mesh copy.
///
/// A copy of the case filed under the other verdict by an earlier run is
/// removed, so each case lives under exactly one verdict directory.
pub fn process_case(layout: &DatasetLayout<'_>, case: &str) -> Result<CaseOutcome, AnnotationError> {
    let inputs = load_case_inputs(layout, case)?;
    let borrowed: Vec<(&str, &AnnotationSet)> = inputs
        .iter()
        .map(|(label, set)| (label.as_str(), set))
        .collect();

    let outcome = reconcile_case(case, &borrowed, layout.config);

    let stale = layout.output_dir(outcome.verdict.opposite(), case);
    if stale.is_dir() {
        tracing::info!("Removing stale output {}", stale.display());
        std::fs::remove_dir_all(&stale).map_err(|e| AnnotationError::io(&stale, e))?;
    }

    let out = layout.output_dir(outcome.verdict, case);
    std::fs::create_dir_all(&out).map_err(|e| AnnotationError::io(&out, e))?;

    outcome
        .merged
        .write_json_file(&out.join(&layout.config.annotation_file_name))?;

    if let Some(mesh) = layout.mesh_path(case) {
        let dst = out.join(&layout.config.mesh_file_name);
        std::fs::copy(&mesh, &dst).map_err(|e| AnnotationError::io(&mesh, e))?;
    }

    Ok(outcome)
}

/// Per-verdict case names of a dataset run, sorted by case name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetSummary {
    pub agreed: Vec<String>,
    pub disagreed: Vec<String>,
    /// Cases that could not be processed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl DatasetSummary {
    pub fn n_cases(&self) -> usize {
        self.agreed.len() + self.disagreed.len() + self.failed.len()
    }
}

/// Reconcile every case found in the first annotator's dataset directory.
///
/// Cases are processed in parallel. A failing case is recorded in
/// [`DatasetSummary::failed`] and does not stop the run.
pub fn process_dataset(
    config: &ReconcileConfig,
    out_dir: &Path,
) -> Result<DatasetSummary, AnnotationError> {
    config.validate()?;

    let primary = &config.annotators[0];
    let cases = discover_cases(&primary.dataset_dir, &config.mesh_file_name)?;
    tracing::info!(
        "Found {} cases in {}",
        cases.len(),
        primary.dataset_dir.display()
    );

    let layout = DatasetLayout::new(config, out_dir);
    let results: Vec<(String, Result<CaseVerdict, AnnotationError>)> = cases
        .par_iter()
        .map(|case| {
            let result = process_case(&layout, case).map(|outcome| outcome.verdict);
            (case.clone(), result)
        })
        .collect();

    let mut summary = DatasetSummary::default();
    for (case, result) in results {
        match result {
            Ok(CaseVerdict::Agreed) => summary.agreed.push(case),
            Ok(CaseVerdict::Disagreed) => summary.disagreed.push(case),
            Err(e) => {
                tracing::warn!("Skipping case {}: {}", case, e);
                summary.failed.push((case, e.to_string()));
            }
        }
    }

    tracing::info!(
        "Dataset done: {} agreed, {} disagreed, {} failed",
        summary.agreed.len(),
        summary.disagreed.len(),
        summary.failed.len()
    );

    Ok(summary)
}
