//! Volcano plot: per-gene |T-statistic| against differential expression,
//! classified into three fixed effect categories.

use plotly::common::Mode;
use plotly::{Plot, Scatter};

use crate::dataset::{DatasetStore, DatasetVariant, VariantBundle};
use crate::error::DashError;
use crate::palette::VOLCANO_CATEGORIES;
use crate::views::{base_layout, figure_artifact, metabolite_label, Artifact};

const TSTAT_THRESHOLD: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    HighlyIncreased,
    HighlyDecreased,
    Neutral,
}

impl Effect {
    /// Total classification: every (tstat, diffexpr) pair lands in exactly
    /// one category. `diffexpr == 0` with a high T-statistic is Neutral.
    pub fn classify(tstat: f64, diffexpr: f64) -> Effect {
        if tstat >= TSTAT_THRESHOLD && diffexpr > 0.0 {
            Effect::HighlyIncreased
        } else if tstat >= TSTAT_THRESHOLD && diffexpr < 0.0 {
            Effect::HighlyDecreased
        } else {
            Effect::Neutral
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::HighlyIncreased => "Highly Increased",
            Effect::HighlyDecreased => "Highly Decreased",
            Effect::Neutral => "Neutral",
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolcanoRow {
    pub tstat: f64,
    pub diffexpr: f64,
    pub metabolite: String,
    pub effect: Effect,
}

/// Join |T-stat| and differential expression for one gene over the
/// index-sorted metabolite rows, with display names attached. Metabolites
/// missing from the differential-expression table join as NaN.
pub fn volcano_rows(bundle: &VariantBundle, gene: &str) -> Result<Vec<VolcanoRow>, DashError> {
    let tstats =
        bundle.associations.column(gene).ok_or_else(|| DashError::key_not_found("gene", gene))?;
    let diffs =
        bundle.diff_expr.column(gene).ok_or_else(|| DashError::key_not_found("gene", gene))?;

    let mut rows = Vec::with_capacity(tstats.len());
    for idx in bundle.associations.numeric_row_order() {
        let label = &bundle.associations.row_labels()[idx];
        let tstat = tstats[idx].abs();
        let diffexpr = bundle
            .diff_expr
            .row_position(label)
            .map(|pos| diffs[pos])
            .unwrap_or(f64::NAN);
        let metabolite = match label.parse::<i64>() {
            Ok(ion_idx) => metabolite_label(&bundle.reference, ion_idx, 1),
            Err(_) => format!("{}: ", label),
        };
        rows.push(VolcanoRow { tstat, diffexpr, metabolite, effect: Effect::classify(tstat, diffexpr) });
    }
    Ok(rows)
}

pub fn volcano_plot(
    store: &DatasetStore,
    variant: DatasetVariant,
    gene: &str,
) -> Result<Artifact, DashError> {
    let rows = volcano_rows(store.bundle(variant), gene)?;

    let mut plot = Plot::new();
    for (category, color) in VOLCANO_CATEGORIES {
        let subset: Vec<&VolcanoRow> =
            rows.iter().filter(|r| r.effect.as_str() == *category).collect();
        if subset.is_empty() {
            continue;
        }
        let trace = Scatter::new(
            subset.iter().map(|r| r.diffexpr).collect::<Vec<_>>(),
            subset.iter().map(|r| r.tstat).collect::<Vec<_>>(),
        )
        .mode(Mode::Markers)
        .name(*category)
        .marker(plotly::common::Marker::new().color(*color))
        .text_array(subset.iter().map(|r| r.metabolite.clone()).collect::<Vec<_>>());
        plot.add_trace(trace);
    }
    plot.set_layout(base_layout(
        &format!("Volcano plot for metabolite changes associated with {}", gene),
        "Metabolite log(10) Difference",
        "T-Statistic",
    ));
    figure_artifact(&plot)
}
