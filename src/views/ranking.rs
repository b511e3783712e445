//! Ranked scatter plots: a single matrix row (or column) sorted ascending
//! and plotted as rank-vs-value, with the opposite-axis label on hover.

use plotly::common::Mode;
use plotly::{Plot, Scatter};

use crate::dataset::{DatasetStore, DatasetVariant, LabelledMatrix};
use crate::error::DashError;
use crate::palette::{ASSOCIATION_RESISTANCE, ASSOCIATION_SENSITIVITY};
use crate::views::{base_layout, figure_artifact, metabolite_label, Artifact};

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPoint {
    /// 1-based rank after the ascending sort.
    pub rank: usize,
    pub value: f64,
    pub label: String,
}

/// Sort values ascending with a stable sort: equal values keep their
/// original column/row order.
fn rank(labels: &[String], values: &[f64]) -> Vec<RankedPoint> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a].partial_cmp(&values[b]).unwrap_or(std::cmp::Ordering::Equal)
    });
    order
        .into_iter()
        .enumerate()
        .map(|(i, idx)| RankedPoint { rank: i + 1, value: values[idx], label: labels[idx].clone() })
        .collect()
}

pub fn ranked_row(
    matrix: &LabelledMatrix,
    key: &str,
    kind: &'static str,
) -> Result<Vec<RankedPoint>, DashError> {
    let row = matrix.row(key).ok_or_else(|| DashError::key_not_found(kind, key))?;
    Ok(rank(matrix.col_labels(), row))
}

pub fn ranked_column(
    matrix: &LabelledMatrix,
    key: &str,
    kind: &'static str,
) -> Result<Vec<RankedPoint>, DashError> {
    let col = matrix.column(key).ok_or_else(|| DashError::key_not_found(kind, key))?;
    Ok(rank(matrix.row_labels(), &col))
}

fn ranking_scatter(
    points: &[RankedPoint],
    title: &str,
    x_title: &str,
    y_title: &str,
) -> Result<Artifact, DashError> {
    let trace = Scatter::new(
        points.iter().map(|p| p.rank).collect::<Vec<_>>(),
        points.iter().map(|p| p.value).collect::<Vec<_>>(),
    )
    .mode(Mode::Markers)
    .text_array(points.iter().map(|p| p.label.clone()).collect::<Vec<_>>())
    .show_legend(false);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(base_layout(title, x_title, y_title));
    figure_artifact(&plot)
}

/// Ranked scatter split into Resistance (value >= 0) and Sensitivity
/// traces with their fixed colors.
fn association_scatter(
    points: &[RankedPoint],
    title: &str,
    x_title: &str,
    y_title: &str,
) -> Result<Artifact, DashError> {
    let mut plot = Plot::new();
    for (name, color, keep) in [
        (
            ASSOCIATION_RESISTANCE.0,
            ASSOCIATION_RESISTANCE.1,
            Box::new(|v: f64| v >= 0.0) as Box<dyn Fn(f64) -> bool>,
        ),
        (
            ASSOCIATION_SENSITIVITY.0,
            ASSOCIATION_SENSITIVITY.1,
            Box::new(|v: f64| v < 0.0),
        ),
    ] {
        let subset: Vec<&RankedPoint> = points.iter().filter(|p| keep(p.value)).collect();
        if subset.is_empty() {
            continue;
        }
        let trace = Scatter::new(
            subset.iter().map(|p| p.rank).collect::<Vec<_>>(),
            subset.iter().map(|p| p.value).collect::<Vec<_>>(),
        )
        .mode(Mode::Markers)
        .name(name)
        .marker(plotly::common::Marker::new().color(color))
        .text_array(subset.iter().map(|p| p.label.clone()).collect::<Vec<_>>());
        plot.add_trace(trace);
    }
    plot.set_layout(base_layout(title, x_title, y_title));
    figure_artifact(&plot)
}

// =============================================================================
// Page-level builders
// =============================================================================

/// Gene T-statistics ranked for one metabolite.
pub fn mutation_ranking(
    store: &DatasetStore,
    variant: DatasetVariant,
    ion_idx: i64,
) -> Result<Artifact, DashError> {
    let bundle = store.bundle(variant);
    let points = ranked_row(&bundle.associations, &ion_idx.to_string(), "metabolite")?;
    let name = metabolite_label(&bundle.reference, ion_idx, 2);
    ranking_scatter(
        &points,
        &format!("Mutation rankings for {}", name),
        "Mutation Rank",
        "T-Statistic",
    )
}

/// Transcription factors ranked against one pathway's activity.
pub fn tf_ranking_per_pathway(
    store: &DatasetStore,
    variant: DatasetVariant,
    pathway: &str,
) -> Result<Artifact, DashError> {
    let points = ranked_row(&store.bundle(variant).tf_pathway, pathway, "pathway")?;
    ranking_scatter(
        &points,
        &format!("Ranks of TFs against {} activity", pathway),
        "TF Rank",
        "-log10(Pvalue)",
    )
}

/// Pathways ranked against one transcription factor's activity.
pub fn pathway_ranking_per_tf(
    store: &DatasetStore,
    variant: DatasetVariant,
    tf: &str,
) -> Result<Artifact, DashError> {
    let points = ranked_column(&store.bundle(variant).tf_pathway, tf, "transcription factor")?;
    ranking_scatter(
        &points,
        &format!("Ranks of pathways against {} activity", tf),
        "Pathway Rank",
        "-log10(Pvalue)",
    )
}

/// Drugs ranked for one pathway, colored by resistance/sensitivity.
pub fn drug_sensitivity_per_pathway(
    store: &DatasetStore,
    variant: DatasetVariant,
    pathway: &str,
) -> Result<Artifact, DashError> {
    let points = ranked_row(&store.bundle(variant).drug_sensitivity, pathway, "pathway")?;
    association_scatter(
        &points,
        &format!("Association of {} activity with drug resistance/sensitivity", pathway),
        "Drug Rank",
        "log10(Pvalue) * correlation direction",
    )
}

/// Pathways ranked for one drug, colored by resistance/sensitivity.
pub fn pathway_ranking_per_drug(
    store: &DatasetStore,
    variant: DatasetVariant,
    drug: &str,
) -> Result<Artifact, DashError> {
    let points = ranked_column(&store.bundle(variant).drug_sensitivity, drug, "drug")?;
    association_scatter(
        &points,
        &format!("Association of resistance to {} with SMPDB pathway activity levels", drug),
        "Pathway Rank",
        "log10(Pvalue) * correlation direction",
    )
}
