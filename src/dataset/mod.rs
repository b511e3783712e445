//! Read-only dataset store.
//!
//! Every table is loaded once at startup from CSVs under the data
//! directory; a missing file or unexpected header aborts the process.
//! The two study variants carry structurally identical bundles, selected
//! per request by `DatasetVariant`. Nothing here is ever mutated after
//! load, so the store is shared across sessions as a plain `Arc`.

mod frame;

pub use frame::LabelledMatrix;

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::DashError;
use crate::logging::{log, obj, v_str, Domain, Level};

// =============================================================================
// Variants
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetVariant {
    Shorthouse,
    Cherkaoui,
}

pub const ALL_VARIANTS: [DatasetVariant; 2] =
    [DatasetVariant::Shorthouse, DatasetVariant::Cherkaoui];

impl DatasetVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetVariant::Shorthouse => "shorthouse",
            DatasetVariant::Cherkaoui => "cherkaoui",
        }
    }
}

impl FromStr for DatasetVariant {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shorthouse" => Ok(DatasetVariant::Shorthouse),
            "cherkaoui" => Ok(DatasetVariant::Cherkaoui),
            other => Err(DashError::UnknownDatasetVariant(other.to_string())),
        }
    }
}

// =============================================================================
// Row types
// =============================================================================

/// One row of the metabolite reference table. A metabolite id can carry
/// several candidate names, one row each, in file order.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceRow {
    pub ion_idx: i64,
    pub id: String,
    pub score: f64,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct MetaboliteReference {
    rows: Vec<ReferenceRow>,
}

impl MetaboliteReference {
    pub fn rows(&self) -> &[ReferenceRow] {
        &self.rows
    }

    /// Candidate names for a metabolite id, in file order.
    pub fn names_for(&self, ion_idx: i64) -> impl Iterator<Item = &str> {
        self.rows.iter().filter(move |r| r.ion_idx == ion_idx).map(|r| r.name.as_str())
    }
}

/// One observed mutation event in a cell line.
#[derive(Debug, Clone)]
pub struct MutationRecord {
    pub hgnc: String,
    /// None when the source row had no mutation type recorded.
    pub mutation_type: Option<String>,
    pub cell_line: String,
    pub aa_mutation: String,
}

/// Maps a numeric sample id onto a cell-line display identifier.
#[derive(Debug, Clone)]
pub struct MappingRow {
    pub ds_idx: i64,
    pub id: String,
}

/// Per-sample metabolite abundance. Columns are sample ids; the parsed
/// numeric ids are kept alongside for the mapping join.
#[derive(Debug, Clone)]
pub struct MetaboliteLevels {
    pub matrix: LabelledMatrix,
    pub sample_ids: Vec<i64>,
}

// =============================================================================
// Bundles and the store
// =============================================================================

/// All per-variant tables.
#[derive(Debug, Clone)]
pub struct VariantBundle {
    /// Metabolite x gene signed T-statistics, file row order.
    pub associations: LabelledMatrix,
    pub reference: MetaboliteReference,
    pub levels: MetaboliteLevels,
    /// Metabolite x gene signed log-fold-change, row labels shared with
    /// `associations`.
    pub diff_expr: LabelledMatrix,
    pub mapping: Vec<MappingRow>,
    /// Pathway x progeny signature, sign-flipped at load, prefixes stripped.
    pub progeny: LabelledMatrix,
    /// Pathway x transcription factor, sign-flipped at load, prefixes stripped.
    pub tf_pathway: LabelledMatrix,
    /// Pathway x drug signed significance, served as stored.
    pub drug_sensitivity: LabelledMatrix,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableManifest {
    pub table: String,
    pub path: String,
    pub sha256: String,
    pub rows: usize,
}

#[derive(Debug)]
pub struct DatasetStore {
    shorthouse: VariantBundle,
    cherkaoui: VariantBundle,
    /// Shared across variants.
    pub mutations: Vec<MutationRecord>,
    pub manifest: Vec<TableManifest>,
}

impl DatasetStore {
    pub fn load(data_dir: &Path) -> Result<Self> {
        let mut manifest = Vec::new();
        let shorthouse = load_bundle(data_dir, DatasetVariant::Shorthouse, &mut manifest)?;
        let cherkaoui = load_bundle(data_dir, DatasetVariant::Cherkaoui, &mut manifest)?;

        let mutations_path = data_dir.join("Mutations_in_celllines.csv");
        let mutations = read_mutations(&mutations_path)?;
        manifest.push(manifest_entry("mutations", &mutations_path, mutations.len())?);

        for entry in &manifest {
            log(
                Level::Info,
                Domain::Data,
                "table_loaded",
                obj(&[
                    ("table", v_str(&entry.table)),
                    ("path", v_str(&entry.path)),
                    ("sha256", v_str(&entry.sha256)),
                    ("rows", serde_json::json!(entry.rows)),
                ]),
            );
        }

        Ok(Self { shorthouse, cherkaoui, mutations, manifest })
    }

    pub fn bundle(&self, variant: DatasetVariant) -> &VariantBundle {
        match variant {
            DatasetVariant::Shorthouse => &self.shorthouse,
            DatasetVariant::Cherkaoui => &self.cherkaoui,
        }
    }
}

fn load_bundle(
    data_dir: &Path,
    variant: DatasetVariant,
    manifest: &mut Vec<TableManifest>,
) -> Result<VariantBundle> {
    let suffix = variant.as_str();
    let path = |stem: &str| data_dir.join(format!("{}_{}.csv", stem, suffix));

    let associations_path = path("Mutation_metabolite_associations_ordered");
    let associations = read_matrix(&associations_path, IndexColumn::First, &[])?;

    let reference_path = path("Metabolite_reference_table");
    let reference = read_reference(&reference_path)?;

    let levels_path = path("Metabolite_levels");
    let levels = read_levels(&levels_path)?;

    let diff_expr_path = path("Mutation_differential_expression");
    let diff_expr = read_matrix(&diff_expr_path, IndexColumn::Named("ionIdx"), &[])?;

    let mapping_path = path("Cellline_mappings");
    let mapping = read_mapping(&mapping_path)?;

    let progeny_path = path("Progeny_correlations");
    let progeny = read_signature_matrix(&progeny_path)?;

    let tf_path = path("TF_pathway_correlations");
    let tf_pathway = read_signature_matrix(&tf_path)?;

    let drug_path = path("Pathway_direction_pvalue");
    let drug_sensitivity = read_matrix(&drug_path, IndexColumn::Named("Pathway"), &[])?;

    for (table, p, rows) in [
        ("associations", &associations_path, associations.n_rows()),
        ("reference", &reference_path, reference.rows().len()),
        ("levels", &levels_path, levels.matrix.n_rows()),
        ("diff_expr", &diff_expr_path, diff_expr.n_rows()),
        ("mapping", &mapping_path, mapping.len()),
        ("progeny", &progeny_path, progeny.n_rows()),
        ("tf_pathway", &tf_path, tf_pathway.n_rows()),
        ("drug_sensitivity", &drug_path, drug_sensitivity.n_rows()),
    ] {
        manifest.push(manifest_entry(&format!("{}_{}", table, suffix), p, rows)?);
    }

    Ok(VariantBundle {
        associations,
        reference,
        levels,
        diff_expr,
        mapping,
        progeny,
        tf_pathway,
        drug_sensitivity,
    })
}

fn manifest_entry(table: &str, path: &Path, rows: usize) -> Result<TableManifest> {
    Ok(TableManifest {
        table: table.to_string(),
        path: path.display().to_string(),
        sha256: file_sha256(path)?,
        rows,
    })
}

// =============================================================================
// CSV readers
// =============================================================================

enum IndexColumn {
    /// Use whatever the first column is (the association exports carry a
    /// pandas artifact header there).
    First,
    Named(&'static str),
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    csv::ReaderBuilder::new()
        .from_path(path)
        .with_context(|| format!("cannot open {}", path.display()))
}

fn header_position(headers: &csv::StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .with_context(|| format!("{} is missing required column {:?}", path.display(), name))
}

fn parse_cell(field: &str, path: &Path, row: usize, col: &str) -> Result<f64> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(f64::NAN);
    }
    trimmed
        .parse::<f64>()
        .with_context(|| format!("{}: row {} column {:?}: bad number {:?}", path.display(), row, col, field))
}

fn parse_numeric_id(field: &str, path: &Path, what: &str) -> Result<i64> {
    let trimmed = field.trim();
    if let Ok(v) = trimmed.parse::<i64>() {
        return Ok(v);
    }
    trimmed
        .parse::<f64>()
        .map(|v| v as i64)
        .with_context(|| format!("{}: {} is not numeric: {:?}", path.display(), what, field))
}

fn read_matrix(path: &Path, index: IndexColumn, drop: &[&str]) -> Result<LabelledMatrix> {
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();
    let index_pos = match index {
        IndexColumn::First => 0,
        IndexColumn::Named(name) => header_position(&headers, name, path)?,
    };
    if headers.len() < 2 {
        bail!("{} has no value columns", path.display());
    }

    let mut keep: Vec<(usize, String)> = Vec::new();
    for (i, h) in headers.iter().enumerate() {
        if i == index_pos || drop.contains(&h) {
            continue;
        }
        keep.push((i, h.to_string()));
    }

    let mut row_labels = Vec::new();
    let mut values = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: row {}", path.display(), row_no + 1))?;
        let label = record
            .get(index_pos)
            .with_context(|| format!("{}: row {} has no index field", path.display(), row_no + 1))?
            .trim()
            .to_string();
        let mut row = Vec::with_capacity(keep.len());
        for (i, name) in &keep {
            let field = record.get(*i).unwrap_or("");
            row.push(parse_cell(field, path, row_no + 1, name)?);
        }
        row_labels.push(label);
        values.push(row);
    }

    let col_labels = keep.into_iter().map(|(_, name)| name).collect();
    LabelledMatrix::new(row_labels, col_labels, values)
        .with_context(|| format!("{}: invalid matrix", path.display()))
}

/// Signature matrices (progeny / TF) come with `<prefix>_<name>` column
/// headers and a sign convention opposite to what the dashboard shows:
/// strip the prefix, flip the sign.
fn read_signature_matrix(path: &Path) -> Result<LabelledMatrix> {
    let raw = read_matrix(path, IndexColumn::Named("Pathway"), &[])?;
    let stripped: Vec<String> =
        raw.col_labels().iter().map(|c| strip_signature_prefix(c)).collect();
    raw.with_col_labels(stripped)
        .with_context(|| format!("{}: prefix stripping produced duplicate columns", path.display()))
        .map(LabelledMatrix::negated)
}

pub fn strip_signature_prefix(label: &str) -> String {
    match label.split_once('_') {
        Some((_, rest)) => rest.to_string(),
        None => label.to_string(),
    }
}

fn read_reference(path: &Path) -> Result<MetaboliteReference> {
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();
    let ion_pos = header_position(&headers, "ionIdx", path)?;
    let id_pos = header_position(&headers, "id", path)?;
    let score_pos = header_position(&headers, "score", path)?;
    let name_pos = header_position(&headers, "name", path)?;

    let mut rows = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: row {}", path.display(), row_no + 1))?;
        rows.push(ReferenceRow {
            ion_idx: parse_numeric_id(record.get(ion_pos).unwrap_or(""), path, "ionIdx")?,
            id: record.get(id_pos).unwrap_or("").trim().to_string(),
            score: parse_cell(record.get(score_pos).unwrap_or(""), path, row_no + 1, "score")?,
            name: record.get(name_pos).unwrap_or("").trim().to_string(),
        });
    }
    Ok(MetaboliteReference { rows })
}

fn read_levels(path: &Path) -> Result<MetaboliteLevels> {
    let matrix = read_matrix(path, IndexColumn::Named("ionIdx"), &["ionMz"])?;
    let mut sample_ids = Vec::with_capacity(matrix.n_cols());
    for col in matrix.col_labels() {
        sample_ids.push(parse_numeric_id(col, path, "sample column")?);
    }
    Ok(MetaboliteLevels { matrix, sample_ids })
}

fn read_mapping(path: &Path) -> Result<Vec<MappingRow>> {
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();
    let ds_pos = header_position(&headers, "dsIdx", path)?;
    let id_pos = header_position(&headers, "ID", path)?;

    let mut rows = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: row {}", path.display(), row_no + 1))?;
        rows.push(MappingRow {
            ds_idx: parse_numeric_id(record.get(ds_pos).unwrap_or(""), path, "dsIdx")?,
            id: record.get(id_pos).unwrap_or("").trim().to_string(),
        });
    }
    Ok(rows)
}

fn read_mutations(path: &Path) -> Result<Vec<MutationRecord>> {
    let mut rdr = open_reader(path)?;
    let headers = rdr.headers()?.clone();
    let hgnc_pos = header_position(&headers, "HGNC", path)?;
    let type_pos = header_position(&headers, "MutationType", path)?;
    let line_pos = header_position(&headers, "CellLineName_Cellosaurus", path)?;
    let aa_pos = header_position(&headers, "AA_Mutation", path)?;

    let mut rows = Vec::new();
    for (row_no, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("{}: row {}", path.display(), row_no + 1))?;
        let mutation_type = record.get(type_pos).unwrap_or("").trim();
        rows.push(MutationRecord {
            hgnc: record.get(hgnc_pos).unwrap_or("").trim().to_string(),
            mutation_type: if mutation_type.is_empty() {
                None
            } else {
                Some(mutation_type.to_string())
            },
            cell_line: record.get(line_pos).unwrap_or("").trim().to_string(),
            aa_mutation: record.get(aa_pos).unwrap_or("").trim().to_string(),
        });
    }
    Ok(rows)
}

pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file =
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Lookup helper over the mapping rows, first entry wins on duplicates.
pub fn mapping_by_ds_idx(mapping: &[MappingRow]) -> HashMap<i64, &str> {
    let mut out = HashMap::with_capacity(mapping.len());
    for row in mapping {
        out.entry(row.ds_idx).or_insert(row.id.as_str());
    }
    out
}

/// In-memory store construction for unit tests. Tables are built the way
/// `load` leaves them: signature matrices already sign-flipped and
/// prefix-stripped.
#[cfg(test)]
pub mod test_fixtures {
    use super::*;

    pub fn reference_with(entries: &[(i64, &str)]) -> MetaboliteReference {
        MetaboliteReference {
            rows: entries
                .iter()
                .map(|(idx, name)| ReferenceRow {
                    ion_idx: *idx,
                    id: format!("HMDB{:07}", idx),
                    score: 1.0,
                    name: (*name).to_string(),
                })
                .collect(),
        }
    }

    pub fn matrix(rows: &[&str], cols: &[&str], values: &[&[f64]]) -> LabelledMatrix {
        LabelledMatrix::new(
            rows.iter().map(|s| s.to_string()).collect(),
            cols.iter().map(|s| s.to_string()).collect(),
            values.iter().map(|r| r.to_vec()).collect(),
        )
        .unwrap()
    }

    fn bundle(scale: f64) -> VariantBundle {
        let associations = matrix(
            &["1", "2", "3"],
            &["A1CF", "TP53", "KRAS"],
            &[
                &[6.0 * scale, -1.0, 2.0],
                &[-7.0 * scale, 0.5, 1.5],
                &[0.5 * scale, 3.0, -2.0],
            ],
        );
        let diff_expr = matrix(
            &["1", "2", "3"],
            &["A1CF", "TP53", "KRAS"],
            &[&[0.5, -0.2, 0.1], &[-0.4, 0.3, 0.2], &[0.0, 1.0, -1.0]],
        );
        let levels_matrix = matrix(
            &["1", "2", "3"],
            &["101", "102", "103", "104"],
            &[
                &[10.0, 100.0, 1000.0, 10.0],
                &[20.0, 200.0, 2000.0, 20.0],
                &[30.0, 300.0, 3000.0, 30.0],
            ],
        );
        VariantBundle {
            associations,
            reference: reference_with(&[
                (1, "Citrate"),
                (1, "Isocitrate"),
                (2, "Malate"),
                (3, "Fumarate"),
            ]),
            levels: MetaboliteLevels {
                matrix: levels_matrix,
                sample_ids: vec![101, 102, 103, 104],
            },
            diff_expr,
            mapping: vec![
                MappingRow { ds_idx: 101, id: "CL-A".into() },
                MappingRow { ds_idx: 102, id: "CL-B".into() },
                MappingRow { ds_idx: 103, id: "CL-C".into() },
                MappingRow { ds_idx: 104, id: "CL-D".into() },
            ],
            progeny: matrix(
                &["Citric Acid Cycle", "Glycolysis"],
                &["AR", "FOXA1"],
                &[&[1.0 * scale, 2.0], &[3.0, 4.0 * scale]],
            ),
            tf_pathway: matrix(
                &["Citric Acid Cycle", "Glycolysis", "Urea Cycle"],
                &["AR", "FOXA1"],
                &[&[1.0 * scale, -2.0], &[3.0, 0.5], &[-1.0, 2.5 * scale]],
            ),
            drug_sensitivity: matrix(
                &["Citric Acid Cycle", "Glycolysis"],
                &["Cisplatin", "Olaparib"],
                &[&[1.5 * scale, -0.5], &[-2.0, 0.3 * scale]],
            ),
        }
    }

    fn record(hgnc: &str, kind: Option<&str>, line: &str, aa: &str) -> MutationRecord {
        MutationRecord {
            hgnc: hgnc.into(),
            mutation_type: kind.map(|k| k.to_string()),
            cell_line: line.into(),
            aa_mutation: aa.into(),
        }
    }

    pub fn store() -> DatasetStore {
        DatasetStore {
            shorthouse: bundle(1.0),
            cherkaoui: bundle(2.0),
            mutations: vec![
                record("A1CF", Some("Missense"), "CL-A", "p.R50C"),
                record("A1CF", Some("Missense"), "CL-A", "p.R50C"),
                record("A1CF", Some("Nonsense"), "CL-B", "p.Q10*"),
                record("A1CF", Some("Silent"), "CL-C", "p.L5L"),
                record("A1CF", None, "CL-D", "p.G7V"),
                record("TP53", Some("Missense"), "CL-A", "p.R175H"),
            ],
            manifest: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_round_trip() {
        for v in ALL_VARIANTS {
            assert_eq!(v.as_str().parse::<DatasetVariant>().unwrap(), v);
        }
    }

    #[test]
    fn test_unknown_variant_is_typed_error() {
        let err = "Cherkaoui".parse::<DatasetVariant>().unwrap_err();
        assert!(matches!(err, DashError::UnknownDatasetVariant(_)), "case-sensitive by design");
    }

    #[test]
    fn test_strip_signature_prefix() {
        assert_eq!(strip_signature_prefix("TF_FOXA1"), "FOXA1");
        assert_eq!(strip_signature_prefix("sig_EGFR_signaling"), "EGFR_signaling");
        assert_eq!(strip_signature_prefix("noprefix"), "noprefix");
    }

    #[test]
    fn test_mapping_by_ds_idx_first_wins() {
        let rows = vec![
            MappingRow { ds_idx: 1, id: "SIDM1".into() },
            MappingRow { ds_idx: 1, id: "SIDM-other".into() },
            MappingRow { ds_idx: 2, id: "SIDM2".into() },
        ];
        let map = mapping_by_ds_idx(&rows);
        assert_eq!(map[&1], "SIDM1");
        assert_eq!(map[&2], "SIDM2");
    }
}
