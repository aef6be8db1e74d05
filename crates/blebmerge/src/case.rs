//! Reconciliation of a single mesh case across annotators.

use crate::agreement::{compare, AgreementReport};
use crate::annotation::AnnotationSet;
use crate::condense::condense;
use crate::config::ReconcileConfig;
use crate::merge::merge;

/// Where a reconciled case is filed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseVerdict {
    Agreed,
    Disagreed,
}

impl CaseVerdict {
    /// Output sub-directory name for this verdict.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Agreed => "agreed_annotations",
            Self::Disagreed => "disagreed_annotations",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Agreed => Self::Disagreed,
            Self::Disagreed => Self::Agreed,
        }
    }
}

impl std::fmt::Display for CaseVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Agreed => write!(f, "agreed"),
            Self::Disagreed => write!(f, "disagreed"),
        }
    }
}

/// Agreement check between two annotators' condensed sets.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseComparison {
    pub left: String,
    pub right: String,
    pub report: AgreementReport,
}

/// Everything produced while reconciling one case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseOutcome {
    pub case_name: String,
    pub verdict: CaseVerdict,
    /// Condensed set per annotator, in input order.
    pub condensed: Vec<AnnotationSet>,
    /// One comparison per unordered annotator pair.
    pub comparisons: Vec<PairwiseComparison>,
    /// Union of the condensed sets, named after the case.
    pub merged: AnnotationSet,
}

/// Condense, compare and merge the raw sets of one case.
///
/// `inputs` pairs each annotator label with that annotator's raw set. The
/// case agrees only when every pair of condensed sets agrees. The merged set
/// is built regardless of the verdict, in input order.
pub fn reconcile_case(
    case_name: &str,
    inputs: &[(&str, &AnnotationSet)],
    config: &ReconcileConfig,
) -> CaseOutcome {
    let condensed: Vec<AnnotationSet> = inputs
        .iter()
        .map(|(label, raw)| condense(raw, config.distance_threshold, label))
        .collect();

    let mut comparisons = Vec::new();
    for i in 0..condensed.len() {
        for j in (i + 1)..condensed.len() {
            let report = compare(&condensed[i], &condensed[j], config.agreement_threshold);
            tracing::debug!(
                "{}: '{}' vs '{}': {}",
                case_name,
                inputs[i].0,
                inputs[j].0,
                report.verdict
            );
            comparisons.push(PairwiseComparison {
                left: inputs[i].0.to_string(),
                right: inputs[j].0.to_string(),
                report,
            });
        }
    }

    let verdict = if comparisons.iter().all(|c| c.report.is_agreed()) {
        CaseVerdict::Agreed
    } else {
        CaseVerdict::Disagreed
    };

    let merged = merge(&condensed, case_name);

    tracing::info!(
        "{}: {} ({} merged points from {} annotators)",
        case_name,
        verdict,
        merged.len(),
        inputs.len()
    );

    CaseOutcome {
        case_name: case_name.to_string(),
        verdict,
        condensed,
        comparisons,
        merged,
    }
}
