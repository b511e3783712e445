//! Page-level heatmaps: the mutation/metabolite T-statistic grid and the
//! progeny-signature/pathway correlation grid.

use plotly::common::{ColorBar, ExponentFormat, Title};
use plotly::layout::Axis;
use plotly::{HeatMap, Layout, Plot};

use crate::dataset::{DatasetStore, DatasetVariant};
use crate::error::DashError;
use crate::palette;
use crate::views::{figure_artifact, Artifact};

/// T-statistic range shown on the mutation heatmap; values outside are
/// clipped by the color axis, matching the published figure.
const TSTAT_RANGE: f64 = 15.0;

/// Mutation/metabolite association heatmap for the selected variant.
pub fn association_heatmap(
    store: &DatasetStore,
    variant: DatasetVariant,
) -> Result<Artifact, DashError> {
    let matrix = &store.bundle(variant).associations;
    let trace = HeatMap::new(
        matrix.col_labels().to_vec(),
        matrix.row_labels().to_vec(),
        matrix.rows().to_vec(),
    )
    .color_scale(palette::color_scale(palette::DIVERGING))
    .hover_template("Gene: %{x}<br>Metabolite: %{y}<br>T-Statistic: %{z}<extra></extra>");

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title(Title::with_text("T-statistics for Mutation/Metabolite Pairings"))
            .x_axis(Axis::new().title(Title::with_text("Gene")))
            .y_axis(Axis::new().title(Title::with_text("Metabolite"))),
    );

    // The color axis is clipped, not the data; set the range on the
    // serialized trace (the builder types zmin/zmax per z-row).
    let mut artifact = figure_artifact(&plot)?;
    if let Artifact::Figure { figure } = &mut artifact {
        figure["data"][0]["zmin"] = serde_json::json!(-TSTAT_RANGE);
        figure["data"][0]["zmax"] = serde_json::json!(TSTAT_RANGE);
        figure["data"][0]["zauto"] = serde_json::json!(false);
    }
    Ok(artifact)
}

/// Progeny-signature correlations against metabolic pathways, on the
/// natural data range with a power-notation colorbar.
pub fn tf_heatmap(store: &DatasetStore, variant: DatasetVariant) -> Result<Artifact, DashError> {
    let matrix = &store.bundle(variant).progeny;
    let trace = HeatMap::new(
        matrix.col_labels().to_vec(),
        matrix.row_labels().to_vec(),
        matrix.rows().to_vec(),
    )
    .color_scale(palette::color_scale(palette::SEQUENTIAL))
    .color_bar(ColorBar::new().exponent_format(ExponentFormat::Power))
    .hover_template(
        "Progeny Signature: %{x} <br>SMPDB Pathway: %{y}<br>-log10(P value): %{z}<extra></extra>",
    );

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().y_axis(Axis::new().title(Title::with_text(""))));
    figure_artifact(&plot)
}
