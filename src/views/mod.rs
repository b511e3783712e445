//! Derived view builders.
//!
//! Every builder is a pure function of the read-only store plus the
//! currently selected dataset variant and drill-down keys, returning a
//! renderable artifact: a Plotly figure (serialized to JSON for the
//! browser-side renderer), a dropdown option list, or table rows.

pub mod heatmap;
pub mod options;
pub mod ranking;
pub mod strip;
pub mod volcano;

use plotly::common::Title;
use plotly::layout::Axis;
use plotly::{Layout, Plot};
use serde::Serialize;
use serde_json::Value;

use crate::dataset::MetaboliteReference;
use crate::error::DashError;

pub const LABEL_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Artifact {
    Figure { figure: Value },
    Options { options: Vec<DropdownOption> },
    Table { columns: Vec<String>, rows: Vec<Value> },
}

/// Serialize a finished plot into the `{data, layout, config}` object the
/// browser hands to Plotly.
pub fn figure_artifact(plot: &Plot) -> Result<Artifact, DashError> {
    let figure: Value = serde_json::from_str(&plot.to_json())?;
    Ok(Artifact::Figure { figure })
}

/// Display label for a metabolite id: the first `head` candidate names
/// joined with `/`, prefixed with the id, truncated to 50 characters.
/// An id absent from the reference table yields `"<id>: "`.
pub fn metabolite_label(reference: &MetaboliteReference, ion_idx: i64, head: usize) -> String {
    let names: Vec<&str> = reference.names_for(ion_idx).take(head).collect();
    let full = format!("{}: {}", ion_idx, names.join("/"));
    full.chars().take(LABEL_MAX_CHARS).collect()
}

/// Common white-background layout with titled, black-lined axes.
pub fn base_layout(title: &str, x_title: &str, y_title: &str) -> Layout {
    Layout::new()
        .title(Title::with_text(title))
        .paper_background_color("#ffffff")
        .plot_background_color("#ffffff")
        .x_axis(axis(x_title))
        .y_axis(axis(y_title))
}

fn axis(title: &str) -> Axis {
    let axis = Axis::new()
        .show_line(true)
        .line_color("#000000")
        .show_grid(false)
        .zero_line(false);
    if title.is_empty() {
        axis
    } else {
        axis.title(Title::with_text(title))
    }
}
