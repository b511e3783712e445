//! Strip plot of per-sample metabolite abundance against mutation status.
//!
//! The join pipeline mirrors the published dashboard: abundance samples
//! are mapped to cell-line IDs, qualifying mutations (non-silent, typed)
//! for the requested gene are collapsed to one `", "`-joined label per
//! cell line, labels are deduplicated keeping the first carrier, and
//! every sample without a surviving label gets the `" -"` sentinel with
//! mutant ordinal 0. Abundance is log10-transformed unguarded.

use std::collections::{HashMap, HashSet};

use plotly::common::Mode;
use plotly::{Plot, Scatter};

use crate::dataset::{mapping_by_ds_idx, DatasetStore, DatasetVariant, MutationRecord, VariantBundle};
use crate::error::DashError;
use crate::palette;
use crate::views::{base_layout, figure_artifact, metabolite_label, Artifact};

/// Label carried by samples whose cell line has no qualifying mutation.
/// The leading space is part of the published output.
pub const NO_MUTATION_LABEL: &str = " -";

#[derive(Debug, Clone, PartialEq)]
pub struct StripPoint {
    pub ds_idx: i64,
    pub cell_line: String,
    pub mutation: String,
    /// 1-based ordinal of the mutation label, 0 for the sentinel.
    pub mutant: usize,
    pub level_log10: f64,
}

pub fn strip_rows(
    bundle: &VariantBundle,
    mutations: &[MutationRecord],
    ion_idx: i64,
    gene: &str,
) -> Result<Vec<StripPoint>, DashError> {
    let key = ion_idx.to_string();
    let levels = bundle
        .levels
        .matrix
        .row(&key)
        .ok_or_else(|| DashError::key_not_found("metabolite", &key))?;

    // Samples joined to cell-line IDs; unmapped sample ids drop out.
    let by_ds = mapping_by_ds_idx(&bundle.mapping);
    let mut samples: Vec<(i64, f64, &str)> = Vec::new();
    for (pos, &ds_idx) in bundle.levels.sample_ids.iter().enumerate() {
        if let Some(&id) = by_ds.get(&ds_idx) {
            samples.push((ds_idx, levels[pos], id));
        }
    }
    let cell_lines: HashSet<&str> = samples.iter().map(|&(_, _, id)| id).collect();

    // Qualifying mutation records for this gene, grouped per cell line in
    // first-appearance order with distinct AA descriptors.
    let mut grouped: Vec<(&str, Vec<&str>)> = Vec::new();
    for record in mutations {
        if record.hgnc != gene {
            continue;
        }
        let qualifying = matches!(record.mutation_type.as_deref(), Some(t) if t != "Silent");
        if !qualifying || !cell_lines.contains(record.cell_line.as_str()) {
            continue;
        }
        let pos = match grouped.iter().position(|(line, _)| *line == record.cell_line) {
            Some(pos) => pos,
            None => {
                grouped.push((record.cell_line.as_str(), Vec::new()));
                grouped.len() - 1
            }
        };
        if !grouped[pos].1.contains(&record.aa_mutation.as_str()) {
            grouped[pos].1.push(record.aa_mutation.as_str());
        }
    }

    // Deduplicate by joined label, keeping the first carrier cell line;
    // later carriers of the same label fall back to the sentinel.
    let mut kept: HashMap<&str, (String, usize)> = HashMap::new();
    let mut seen_labels: HashSet<String> = HashSet::new();
    for (line, aa) in &grouped {
        let label = aa.join(", ");
        if seen_labels.insert(label.clone()) {
            let ordinal = seen_labels.len();
            kept.insert(*line, (label, ordinal));
        }
    }

    Ok(samples
        .into_iter()
        .map(|(ds_idx, level, id)| {
            let (mutation, mutant) = match kept.get(id) {
                Some((label, ordinal)) => (label.clone(), *ordinal),
                None => (NO_MUTATION_LABEL.to_string(), 0),
            };
            StripPoint {
                ds_idx,
                cell_line: id.to_string(),
                mutation,
                mutant,
                level_log10: level.log10(),
            }
        })
        .collect())
}

pub fn strip_plot(
    store: &DatasetStore,
    variant: DatasetVariant,
    ion_idx: i64,
    gene: &str,
) -> Result<Artifact, DashError> {
    let bundle = store.bundle(variant);
    let points = strip_rows(bundle, &store.mutations, ion_idx, gene)?;
    let name = metabolite_label(&bundle.reference, ion_idx, 2);

    // One overlaid trace per mutation label, in order of first appearance.
    let mut labels: Vec<&str> = Vec::new();
    for p in &points {
        if !labels.contains(&p.mutation.as_str()) {
            labels.push(&p.mutation);
        }
    }

    let mut plot = Plot::new();
    for (i, label) in labels.iter().enumerate() {
        let subset: Vec<&StripPoint> =
            points.iter().filter(|p| p.mutation == *label).collect();
        let trace = Scatter::new(
            vec![name.clone(); subset.len()],
            subset.iter().map(|p| p.level_log10).collect::<Vec<_>>(),
        )
        .mode(Mode::Markers)
        .name(*label)
        .marker(plotly::common::Marker::new().color(palette::qualitative(i)))
        .text_array(subset.iter().map(|p| p.cell_line.clone()).collect::<Vec<_>>());
        plot.add_trace(trace);
    }
    plot.set_layout(base_layout(
        &format!("Expression of {} in comparison to mutations in {}", name, gene),
        "",
        "log(10) metabolite expression",
    ));
    figure_artifact(&plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_fixtures;

    #[test]
    fn test_strip_rows_cover_every_mapped_sample() {
        let store = test_fixtures::store();
        let bundle = store.bundle(DatasetVariant::Shorthouse);
        let points = strip_rows(bundle, &store.mutations, 1, "A1CF").unwrap();
        assert_eq!(points.len(), bundle.levels.sample_ids.len());
    }

    #[test]
    fn test_silent_and_untyped_records_fall_to_sentinel() {
        let store = test_fixtures::store();
        let bundle = store.bundle(DatasetVariant::Shorthouse);
        let points = strip_rows(bundle, &store.mutations, 1, "A1CF").unwrap();
        let by_line: std::collections::HashMap<&str, &StripPoint> =
            points.iter().map(|p| (p.cell_line.as_str(), p)).collect();

        // CL-A: missense recorded twice with the same AA -> single descriptor
        assert_eq!(by_line["CL-A"].mutation, "p.R50C");
        assert_eq!(by_line["CL-A"].mutant, 1);
        // CL-B: nonsense qualifies
        assert_eq!(by_line["CL-B"].mutation, "p.Q10*");
        assert_eq!(by_line["CL-B"].mutant, 2);
        // CL-C carried only a Silent record, CL-D an untyped one
        assert_eq!(by_line["CL-C"].mutation, NO_MUTATION_LABEL);
        assert_eq!(by_line["CL-C"].mutant, 0);
        assert_eq!(by_line["CL-D"].mutation, NO_MUTATION_LABEL);
        assert_eq!(by_line["CL-D"].mutant, 0);
    }

    #[test]
    fn test_labels_are_distinct_joined_descriptors() {
        let store = test_fixtures::store();
        let bundle = store.bundle(DatasetVariant::Shorthouse);
        let points = strip_rows(bundle, &store.mutations, 1, "A1CF").unwrap();
        for p in &points {
            if p.mutation == NO_MUTATION_LABEL {
                continue;
            }
            let parts: Vec<&str> = p.mutation.split(", ").collect();
            let distinct: HashSet<&str> = parts.iter().copied().collect();
            assert_eq!(parts.len(), distinct.len(), "descriptors must be distinct");
            assert!(!parts.iter().any(|d| d.is_empty()));
        }
    }

    #[test]
    fn test_abundance_is_log10() {
        let store = test_fixtures::store();
        let bundle = store.bundle(DatasetVariant::Shorthouse);
        let points = strip_rows(bundle, &store.mutations, 1, "A1CF").unwrap();
        // Fixture levels for metabolite 1 are 10/100/1000/10 over samples
        // 101..104.
        let by_ds: std::collections::HashMap<i64, f64> =
            points.iter().map(|p| (p.ds_idx, p.level_log10)).collect();
        assert_eq!(by_ds[&101], 1.0);
        assert_eq!(by_ds[&102], 2.0);
        assert_eq!(by_ds[&103], 3.0);
    }

    #[test]
    fn test_strip_plot_one_trace_per_label() {
        let store = test_fixtures::store();
        let artifact = strip_plot(&store, DatasetVariant::Shorthouse, 1, "A1CF").unwrap();
        let Artifact::Figure { figure } = artifact else { panic!("expected figure") };
        let traces = figure["data"].as_array().unwrap();
        // Fixture yields two mutation labels plus the sentinel.
        assert_eq!(traces.len(), 3);
        let total: usize =
            traces.iter().map(|t| t["y"].as_array().unwrap().len()).sum();
        assert_eq!(total, 4, "every mapped sample is plotted exactly once");
    }
}
