//! Dropdown option lists and the metabolite reference table.

use serde_json::{json, Map, Value};

use crate::dataset::{DatasetStore, DatasetVariant};
use crate::error::DashError;
use crate::views::{metabolite_label, Artifact, DropdownOption};

pub const REFERENCE_COLUMNS: [&str; 4] = ["ionIdx", "id", "score", "name"];

fn plain_options(labels: &[String]) -> Artifact {
    Artifact::Options {
        options: labels
            .iter()
            .map(|l| DropdownOption { label: l.clone(), value: json!(l) })
            .collect(),
    }
}

/// Metabolite selector: ids in numeric order, labelled through the
/// name-lookup rule with two name candidates.
pub fn metabolite_options(
    store: &DatasetStore,
    variant: DatasetVariant,
) -> Result<Artifact, DashError> {
    let bundle = store.bundle(variant);
    let matrix = &bundle.associations;
    let mut options = Vec::with_capacity(matrix.n_rows());
    for idx in matrix.numeric_row_order() {
        let label = &matrix.row_labels()[idx];
        match label.parse::<i64>() {
            Ok(ion_idx) => options.push(DropdownOption {
                label: metabolite_label(&bundle.reference, ion_idx, 2),
                value: json!(ion_idx),
            }),
            Err(_) => options.push(DropdownOption { label: label.clone(), value: json!(label) }),
        }
    }
    Ok(Artifact::Options { options })
}

/// Gene selector over the differential-expression columns.
pub fn gene_options(store: &DatasetStore, variant: DatasetVariant) -> Result<Artifact, DashError> {
    Ok(plain_options(store.bundle(variant).diff_expr.col_labels()))
}

pub fn pathway_options(
    store: &DatasetStore,
    variant: DatasetVariant,
) -> Result<Artifact, DashError> {
    Ok(plain_options(store.bundle(variant).tf_pathway.row_labels()))
}

pub fn tf_options(store: &DatasetStore, variant: DatasetVariant) -> Result<Artifact, DashError> {
    Ok(plain_options(store.bundle(variant).tf_pathway.col_labels()))
}

pub fn drug_pathway_options(
    store: &DatasetStore,
    variant: DatasetVariant,
) -> Result<Artifact, DashError> {
    Ok(plain_options(store.bundle(variant).drug_sensitivity.row_labels()))
}

pub fn drug_options(store: &DatasetStore, variant: DatasetVariant) -> Result<Artifact, DashError> {
    Ok(plain_options(store.bundle(variant).drug_sensitivity.col_labels()))
}

/// The reference table as row-oriented field->value maps in declared
/// column order.
pub fn reference_table(
    store: &DatasetStore,
    variant: DatasetVariant,
) -> Result<Artifact, DashError> {
    let rows = store
        .bundle(variant)
        .reference
        .rows()
        .iter()
        .map(|r| {
            let mut map = Map::new();
            map.insert("ionIdx".to_string(), json!(r.ion_idx));
            map.insert("id".to_string(), json!(r.id));
            map.insert("score".to_string(), json!(r.score));
            map.insert("name".to_string(), json!(r.name));
            Value::Object(map)
        })
        .collect();
    Ok(Artifact::Table {
        columns: REFERENCE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    })
}
