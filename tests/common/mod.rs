//! Shared CSV fixtures: a complete data directory with both variants,
//! small enough to reason about by hand.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

pub fn write_file(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

fn write_variant(dir: &Path, suffix: &str, scale: f64) {
    let s = |v: f64| format!("{}", v * scale);

    write_file(
        dir,
        &format!("Mutation_metabolite_associations_ordered_{}.csv", suffix),
        &format!(
            "Unnamed: 0,A1CF,TP53,KRAS\n2,{},0.5,1.5\n1,{},-1.0,2.0\n3,{},3.0,-2.0\n",
            s(-7.0),
            s(6.0),
            s(0.5),
        ),
    );

    write_file(
        dir,
        &format!("Metabolite_reference_table_{}.csv", suffix),
        "ionIdx,id,score,name,adduct\n\
         1,HMDB0000094,0.99,Citrate,M-H\n\
         1,HMDB0000193,0.90,Isocitrate,M-H\n\
         2,HMDB0000156,0.95,Malate,M-H\n\
         3,HMDB0000134,0.88,Fumarate,M-H\n",
    );

    write_file(
        dir,
        &format!("Metabolite_levels_{}.csv", suffix),
        "ionIdx,ionMz,101,102,103,104\n\
         1,191.02,10,100,1000,10\n\
         2,133.01,20,200,2000,20\n\
         3,115.00,30,300,3000,30\n",
    );

    write_file(
        dir,
        &format!("Mutation_differential_expression_{}.csv", suffix),
        "ionIdx,A1CF,TP53,KRAS\n\
         1,0.5,-0.2,0.1\n\
         2,-0.4,0.3,0.2\n\
         3,0.0,1.0,-1.0\n",
    );

    write_file(
        dir,
        &format!("Cellline_mappings_{}.csv", suffix),
        "dsIdx,ID\n101,CL-A\n102,CL-B\n103,CL-C\n104,CL-D\n",
    );

    // Stored sign-flipped relative to what the dashboard shows.
    write_file(
        dir,
        &format!("Progeny_correlations_{}.csv", suffix),
        &format!(
            "Pathway,sig_AR,sig_FOXA1\nCitric Acid Cycle,{},-2.0\nGlycolysis,-3.0,{}\n",
            s(-1.0),
            s(-4.0),
        ),
    );

    write_file(
        dir,
        &format!("TF_pathway_correlations_{}.csv", suffix),
        &format!(
            "Pathway,TF_AR,TF_FOXA1\nCitric Acid Cycle,{},2.0\nGlycolysis,-3.0,-0.5\nUrea Cycle,1.0,{}\n",
            s(-1.0),
            s(-2.5),
        ),
    );

    write_file(
        dir,
        &format!("Pathway_direction_pvalue_{}.csv", suffix),
        &format!(
            "Pathway,Cisplatin,Olaparib\nCitric Acid Cycle,{},-0.5\nGlycolysis,-2.0,{}\n",
            s(1.5),
            s(0.3),
        ),
    );
}

/// A full data directory: both variants plus the shared mutation records.
pub fn fixture_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_variant(dir.path(), "shorthouse", 1.0);
    write_variant(dir.path(), "cherkaoui", 2.0);
    write_file(
        dir.path(),
        "Mutations_in_celllines.csv",
        "HGNC,MutationType,CellLineName_Cellosaurus,AA_Mutation\n\
         A1CF,Missense,CL-A,p.R50C\n\
         A1CF,Missense,CL-A,p.R50C\n\
         A1CF,Nonsense,CL-B,p.Q10*\n\
         A1CF,Silent,CL-C,p.L5L\n\
         A1CF,,CL-D,p.G7V\n\
         TP53,Missense,CL-A,p.R175H\n",
    );
    dir
}
