//! Loader validation: the store either comes up with every table checked
//! and fingerprinted, or startup fails with a contextual error.

mod common;

use metabodash::dataset::{DatasetStore, DatasetVariant};

use common::{fixture_data_dir, write_file};

#[test]
fn load_succeeds_on_complete_directory() {
    let dir = fixture_data_dir();
    let store = DatasetStore::load(dir.path()).unwrap();

    for variant in [DatasetVariant::Shorthouse, DatasetVariant::Cherkaoui] {
        let bundle = store.bundle(variant);
        assert_eq!(bundle.associations.n_rows(), 3);
        assert_eq!(bundle.associations.n_cols(), 3);
        assert_eq!(bundle.diff_expr.n_rows(), 3);
        assert_eq!(bundle.reference.rows().len(), 4);
        assert_eq!(bundle.mapping.len(), 4);
    }
    assert_eq!(store.mutations.len(), 6);
}

#[test]
fn levels_drop_the_mz_column_and_keep_numeric_sample_ids() {
    let dir = fixture_data_dir();
    let store = DatasetStore::load(dir.path()).unwrap();
    let levels = &store.bundle(DatasetVariant::Shorthouse).levels;
    assert!(
        !levels.matrix.col_labels().iter().any(|c| c == "ionMz"),
        "ionMz is not a sample column"
    );
    assert_eq!(levels.sample_ids, vec![101, 102, 103, 104]);
}

#[test]
fn signature_matrices_are_prefix_stripped_and_sign_flipped() {
    let dir = fixture_data_dir();
    let store = DatasetStore::load(dir.path()).unwrap();
    let bundle = store.bundle(DatasetVariant::Shorthouse);

    assert_eq!(bundle.tf_pathway.col_labels(), &["AR".to_string(), "FOXA1".to_string()]);
    assert_eq!(bundle.progeny.col_labels(), &["AR".to_string(), "FOXA1".to_string()]);
    // File stores -1.0 for (Citric Acid Cycle, TF_AR); the dashboard
    // serves the flipped sign.
    assert_eq!(bundle.tf_pathway.row("Citric Acid Cycle").unwrap()[0], 1.0);
    assert_eq!(bundle.progeny.row("Glycolysis").unwrap()[0], 3.0);
}

#[test]
fn untyped_mutation_rows_parse_as_none() {
    let dir = fixture_data_dir();
    let store = DatasetStore::load(dir.path()).unwrap();
    let untyped: Vec<_> =
        store.mutations.iter().filter(|m| m.mutation_type.is_none()).collect();
    assert_eq!(untyped.len(), 1);
    assert_eq!(untyped[0].cell_line, "CL-D");
}

#[test]
fn manifest_fingerprints_every_table() {
    let dir = fixture_data_dir();
    let store = DatasetStore::load(dir.path()).unwrap();
    // 8 tables per variant plus the shared mutation records.
    assert_eq!(store.manifest.len(), 17);
    for entry in &store.manifest {
        assert_eq!(entry.sha256.len(), 64, "{} fingerprint", entry.table);
        assert!(entry.rows > 0, "{} row count", entry.table);
    }
}

#[test]
fn missing_file_aborts_load() {
    let dir = fixture_data_dir();
    std::fs::remove_file(dir.path().join("Cellline_mappings_cherkaoui.csv")).unwrap();
    let err = DatasetStore::load(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Cellline_mappings_cherkaoui.csv"));
}

#[test]
fn missing_required_column_aborts_load() {
    let dir = fixture_data_dir();
    write_file(
        dir.path(),
        "Cellline_mappings_shorthouse.csv",
        "sample,ID\n101,CL-A\n",
    );
    let err = DatasetStore::load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("dsIdx"));
}

#[test]
fn duplicate_row_labels_abort_load() {
    let dir = fixture_data_dir();
    write_file(
        dir.path(),
        "Mutation_metabolite_associations_ordered_shorthouse.csv",
        "Unnamed: 0,A1CF,TP53,KRAS\n1,0,0,0\n1,0,0,0\n",
    );
    let err = DatasetStore::load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("duplicate"));
}

#[test]
fn non_numeric_cell_aborts_load() {
    let dir = fixture_data_dir();
    write_file(
        dir.path(),
        "Mutation_differential_expression_shorthouse.csv",
        "ionIdx,A1CF,TP53,KRAS\n1,abc,0,0\n",
    );
    let err = DatasetStore::load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("bad number"));
}

#[test]
fn non_numeric_sample_column_aborts_load() {
    let dir = fixture_data_dir();
    write_file(
        dir.path(),
        "Metabolite_levels_shorthouse.csv",
        "ionIdx,ionMz,sampleA\n1,191.02,10\n",
    );
    let err = DatasetStore::load(dir.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("not numeric"));
}
