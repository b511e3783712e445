//! Fixed color definitions shared by the chart builders.
//!
//! The diverging ramp matches the published dashboard's blue/red scheme
//! (hue 237 to hue 8.7, light midpoint); the sequential ramp runs from
//! near-white to the salmon used on the TF/pathway heatmap.

use plotly::common::{ColorScale, ColorScaleElement};

/// Diverging blue -> light -> red stops for signed T-statistics.
pub const DIVERGING: &[(f64, &str)] = &[
    (0.0, "#0410fd"),
    (0.125, "#3c45fd"),
    (0.25, "#7277fb"),
    (0.375, "#aaacf7"),
    (0.5, "#f2f2f2"),
    (0.625, "#f7a99e"),
    (0.75, "#fb7261"),
    (0.875, "#fd3d23"),
    (1.0, "#fe2502"),
];

/// Sequential near-white -> salmon stops for -log10(P) correlation grids.
pub const SEQUENTIAL: &[(f64, &str)] = &[
    (0.0, "#efefef"),
    (0.25, "#f0d4ce"),
    (0.5, "#f4b4a9"),
    (0.75, "#f89a8b"),
    (1.0, "#fb8072"),
];

/// Cycle used for per-category strip traces (plotly.js default qualitative set).
pub const QUALITATIVE: &[&str] = &[
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Volcano effect categories, in declared order, with their fixed colors.
pub const VOLCANO_CATEGORIES: &[(&str, &str)] = &[
    ("Highly Increased", "grey"),
    ("Highly Decreased", "blue"),
    ("Neutral", "red"),
];

/// Drug-association categories with their fixed colors.
pub const ASSOCIATION_RESISTANCE: (&str, &str) = ("Resistance", "blue");
pub const ASSOCIATION_SENSITIVITY: (&str, &str) = ("Sensitivity", "red");

pub fn color_scale(stops: &[(f64, &str)]) -> ColorScale {
    ColorScale::Vector(
        stops
            .iter()
            .map(|(p, hex)| ColorScaleElement(*p, (*hex).to_string()))
            .collect(),
    )
}

pub fn qualitative(idx: usize) -> &'static str {
    QUALITATIVE[idx % QUALITATIVE.len()]
}
