//! Control registry and reactive binding graph.
//!
//! Each output declares the set of input controls it depends on. The
//! dispatcher recomputes exactly the outputs bound to a changed control,
//! each at most once per change; a mount (no changed control) recomputes
//! every output of the page. Builders are pure over the read-only store,
//! so there is no cross-output ordering to enforce.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::{DatasetStore, DatasetVariant};
use crate::error::DashError;
use crate::views::{heatmap, options, ranking, strip, volcano, Artifact};

// =============================================================================
// Pages and controls
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Mutations,
    TfActivity,
    DrugSensitivity,
}

pub const ALL_PAGES: [Page; 3] = [Page::Mutations, Page::TfActivity, Page::DrugSensitivity];

impl Page {
    pub fn path(&self) -> &'static str {
        match self {
            Page::Mutations => "page1",
            Page::TfActivity => "page2",
            Page::DrugSensitivity => "page3",
        }
    }
}

impl FromStr for Page {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "page1" => Ok(Page::Mutations),
            "page2" => Ok(Page::TfActivity),
            "page3" => Ok(Page::DrugSensitivity),
            other => Err(DashError::UnknownPage(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    DatasetType,
    MetaboliteId,
    MutationId,
    Pathway,
    Tf,
    Drug,
}

impl Control {
    pub fn id(&self) -> &'static str {
        match self {
            Control::DatasetType => "dataset_type",
            Control::MetaboliteId => "metabolite_id",
            Control::MutationId => "mutation_id",
            Control::Pathway => "pathway",
            Control::Tf => "tf",
            Control::Drug => "drug",
        }
    }
}

impl FromStr for Control {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dataset_type" => Ok(Control::DatasetType),
            "metabolite_id" => Ok(Control::MetaboliteId),
            "mutation_id" => Ok(Control::MutationId),
            "pathway" => Ok(Control::Pathway),
            "tf" => Ok(Control::Tf),
            "drug" => Ok(Control::Drug),
            other => Err(DashError::UnknownControl(other.to_string())),
        }
    }
}

/// Current value of every control, with the page-mount defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlValues {
    #[serde(default = "defaults::dataset")]
    pub dataset_type: String,
    #[serde(default = "defaults::metabolite")]
    pub metabolite_id: i64,
    #[serde(default = "defaults::gene")]
    pub mutation_id: String,
    #[serde(default = "defaults::pathway")]
    pub pathway: String,
    #[serde(default = "defaults::tf")]
    pub tf: String,
    #[serde(default = "defaults::drug")]
    pub drug: String,
}

mod defaults {
    pub fn dataset() -> String {
        "shorthouse".to_string()
    }
    pub fn metabolite() -> i64 {
        1
    }
    pub fn gene() -> String {
        "A1CF".to_string()
    }
    pub fn pathway() -> String {
        "Citric Acid Cycle".to_string()
    }
    pub fn tf() -> String {
        "AR".to_string()
    }
    pub fn drug() -> String {
        "Cisplatin".to_string()
    }
}

impl Default for ControlValues {
    fn default() -> Self {
        Self {
            dataset_type: defaults::dataset(),
            metabolite_id: defaults::metabolite(),
            mutation_id: defaults::gene(),
            pathway: defaults::pathway(),
            tf: defaults::tf(),
            drug: defaults::drug(),
        }
    }
}

impl ControlValues {
    pub fn variant(&self) -> Result<DatasetVariant, DashError> {
        self.dataset_type.parse()
    }
}

// =============================================================================
// Outputs
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Output {
    TstatHeatmap,
    MetaboliteTable,
    MetaboliteOptions,
    GeneOptions,
    MutationRanking,
    VolcanoPlot,
    StripPlot,
    TfHeatmap,
    PathwayOptions,
    TfOptions,
    TfRanking,
    PathwayRankingPerTf,
    DrugPathwayOptions,
    DrugOptions,
    DrugRanking,
    PathwayRankingPerDrug,
}

impl Output {
    pub fn id(&self) -> &'static str {
        match self {
            Output::TstatHeatmap => "heatmap_tstats",
            Output::MetaboliteTable => "metabolite_table",
            Output::MetaboliteOptions => "metabolite_options",
            Output::GeneOptions => "gene_options",
            Output::MutationRanking => "mutation_ranking_per_metabolite",
            Output::VolcanoPlot => "mutation_volcano_plot",
            Output::StripPlot => "strip_plot_metabolite",
            Output::TfHeatmap => "heatmap_tfs",
            Output::PathwayOptions => "pathway_options",
            Output::TfOptions => "tf_options",
            Output::TfRanking => "tf_ranking_per_pathway",
            Output::PathwayRankingPerTf => "pathway_ranking_per_tf",
            Output::DrugPathwayOptions => "drug_pathway_options",
            Output::DrugOptions => "drug_options",
            Output::DrugRanking => "drug_sensitivity_by_pathway",
            Output::PathwayRankingPerDrug => "pathway_ranking_by_drug",
        }
    }

    /// DOM element the artifact lands in: figures and tables render into a
    /// slot of their own id, option lists refill their control's select.
    pub fn target(&self) -> &'static str {
        match self {
            Output::MetaboliteOptions => Control::MetaboliteId.id(),
            Output::GeneOptions => Control::MutationId.id(),
            Output::PathwayOptions => Control::Pathway.id(),
            Output::TfOptions => Control::Tf.id(),
            Output::DrugPathwayOptions => Control::Pathway.id(),
            Output::DrugOptions => Control::Drug.id(),
            other => other.id(),
        }
    }

    pub fn page(&self) -> Page {
        match self {
            Output::TstatHeatmap
            | Output::MetaboliteTable
            | Output::MetaboliteOptions
            | Output::GeneOptions
            | Output::MutationRanking
            | Output::VolcanoPlot
            | Output::StripPlot => Page::Mutations,
            Output::TfHeatmap
            | Output::PathwayOptions
            | Output::TfOptions
            | Output::TfRanking
            | Output::PathwayRankingPerTf => Page::TfActivity,
            Output::DrugPathwayOptions
            | Output::DrugOptions
            | Output::DrugRanking
            | Output::PathwayRankingPerDrug => Page::DrugSensitivity,
        }
    }

    pub fn inputs(&self) -> &'static [Control] {
        match self {
            Output::TstatHeatmap
            | Output::MetaboliteTable
            | Output::MetaboliteOptions
            | Output::GeneOptions
            | Output::TfHeatmap
            | Output::PathwayOptions
            | Output::TfOptions
            | Output::DrugPathwayOptions
            | Output::DrugOptions => &[Control::DatasetType],
            Output::MutationRanking => &[Control::MetaboliteId, Control::DatasetType],
            Output::VolcanoPlot => &[Control::MutationId, Control::DatasetType],
            Output::StripPlot => {
                &[Control::MetaboliteId, Control::MutationId, Control::DatasetType]
            }
            Output::TfRanking => &[Control::Pathway, Control::DatasetType],
            Output::PathwayRankingPerTf => &[Control::Tf, Control::DatasetType],
            Output::DrugRanking => &[Control::Pathway, Control::DatasetType],
            Output::PathwayRankingPerDrug => &[Control::Drug, Control::DatasetType],
        }
    }

    pub fn compute(
        &self,
        store: &DatasetStore,
        values: &ControlValues,
    ) -> Result<Artifact, DashError> {
        let variant = values.variant()?;
        match self {
            Output::TstatHeatmap => heatmap::association_heatmap(store, variant),
            Output::MetaboliteTable => options::reference_table(store, variant),
            Output::MetaboliteOptions => options::metabolite_options(store, variant),
            Output::GeneOptions => options::gene_options(store, variant),
            Output::MutationRanking => {
                ranking::mutation_ranking(store, variant, values.metabolite_id)
            }
            Output::VolcanoPlot => volcano::volcano_plot(store, variant, &values.mutation_id),
            Output::StripPlot => {
                strip::strip_plot(store, variant, values.metabolite_id, &values.mutation_id)
            }
            Output::TfHeatmap => heatmap::tf_heatmap(store, variant),
            Output::PathwayOptions => options::pathway_options(store, variant),
            Output::TfOptions => options::tf_options(store, variant),
            Output::TfRanking => ranking::tf_ranking_per_pathway(store, variant, &values.pathway),
            Output::PathwayRankingPerTf => {
                ranking::pathway_ranking_per_tf(store, variant, &values.tf)
            }
            Output::DrugPathwayOptions => options::drug_pathway_options(store, variant),
            Output::DrugOptions => options::drug_options(store, variant),
            Output::DrugRanking => {
                ranking::drug_sensitivity_per_pathway(store, variant, &values.pathway)
            }
            Output::PathwayRankingPerDrug => {
                ranking::pathway_ranking_per_drug(store, variant, &values.drug)
            }
        }
    }
}

pub fn page_outputs(page: Page) -> &'static [Output] {
    match page {
        Page::Mutations => &[
            Output::TstatHeatmap,
            Output::MetaboliteTable,
            Output::MetaboliteOptions,
            Output::GeneOptions,
            Output::MutationRanking,
            Output::VolcanoPlot,
            Output::StripPlot,
        ],
        Page::TfActivity => &[
            Output::TfHeatmap,
            Output::PathwayOptions,
            Output::TfOptions,
            Output::TfRanking,
            Output::PathwayRankingPerTf,
        ],
        Page::DrugSensitivity => &[
            Output::DrugPathwayOptions,
            Output::DrugOptions,
            Output::DrugRanking,
            Output::PathwayRankingPerDrug,
        ],
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct OutputUpdate {
    pub id: &'static str,
    pub target: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<Artifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Recompute the outputs of `page` affected by `changed` (all of them on
/// mount). A builder failure turns into a per-output error entry rather
/// than failing the batch, mirroring the original's per-callback
/// isolation.
pub fn dispatch(
    store: &DatasetStore,
    page: Page,
    changed: Option<Control>,
    values: &ControlValues,
) -> Vec<OutputUpdate> {
    let mut updates = Vec::new();
    for output in page_outputs(page) {
        let fires = match changed {
            None => true,
            Some(control) => output.inputs().contains(&control),
        };
        if !fires {
            continue;
        }
        match output.compute(store, values) {
            Ok(artifact) => updates.push(OutputUpdate {
                id: output.id(),
                target: output.target(),
                artifact: Some(artifact),
                error: None,
            }),
            Err(err) => updates.push(OutputUpdate {
                id: output.id(),
                target: output.target(),
                artifact: None,
                error: Some(err.to_string()),
            }),
        }
    }
    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::test_fixtures;

    #[test]
    fn test_every_output_belongs_to_its_page_listing() {
        for page in ALL_PAGES {
            for output in page_outputs(page) {
                assert_eq!(output.page(), page);
            }
        }
    }

    #[test]
    fn test_mount_fires_every_page_output() {
        let store = test_fixtures::store();
        let values = ControlValues::default();
        for page in ALL_PAGES {
            let updates = dispatch(&store, page, None, &values);
            assert_eq!(updates.len(), page_outputs(page).len());
            assert!(updates.iter().all(|u| u.artifact.is_some()), "defaults must resolve");
        }
    }

    #[test]
    fn test_change_fires_only_bound_outputs_once() {
        let store = test_fixtures::store();
        let values = ControlValues::default();
        let updates = dispatch(&store, Page::Mutations, Some(Control::MetaboliteId), &values);
        let ids: Vec<&str> = updates.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["mutation_ranking_per_metabolite", "strip_plot_metabolite"]);

        let unique: std::collections::HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len(), "at most one recomputation per output");
    }

    #[test]
    fn test_dataset_change_fires_everything_on_page1() {
        let store = test_fixtures::store();
        let values = ControlValues::default();
        let updates = dispatch(&store, Page::Mutations, Some(Control::DatasetType), &values);
        assert_eq!(updates.len(), page_outputs(Page::Mutations).len());
    }

    #[test]
    fn test_builder_error_is_isolated() {
        let store = test_fixtures::store();
        let values = ControlValues { mutation_id: "NOPE".into(), ..ControlValues::default() };
        let updates = dispatch(&store, Page::Mutations, None, &values);
        let volcano = updates.iter().find(|u| u.id == "mutation_volcano_plot").unwrap();
        assert!(volcano.error.is_some());
        let heatmap = updates.iter().find(|u| u.id == "heatmap_tstats").unwrap();
        assert!(heatmap.artifact.is_some(), "other outputs still render");
    }

    #[test]
    fn test_control_ids_round_trip() {
        for control in [
            Control::DatasetType,
            Control::MetaboliteId,
            Control::MutationId,
            Control::Pathway,
            Control::Tf,
            Control::Drug,
        ] {
            assert_eq!(control.id().parse::<Control>().unwrap(), control);
        }
    }
}
