//! Static page skeletons.
//!
//! Each page is a full HTML document: navbar, intro copy, the dataset
//! radio toggle, the page's dropdowns and chart slots, and the client
//! runtime that posts control changes to `/callback` and renders the
//! returned artifacts with Plotly.

use crate::reactive::{ControlValues, Page};

pub const NOT_FOUND_MESSAGE: &str = "404 Page Error! Please choose a link";

const BRAND: &str = "Heterogeneity of the Cancer Cell Line Metabolic Landscape";

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.32.0.min.js";

pub fn page_html(page: Page) -> String {
    let content = match page {
        Page::Mutations => mutations_content(),
        Page::TfActivity => tf_activity_content(),
        Page::DrugSensitivity => drug_sensitivity_content(),
    };
    let defaults = serde_json::to_string(&ControlValues::default()).unwrap_or_else(|_| "{}".into());
    let runtime = RUNTIME
        .replace("__PAGE__", page.path())
        .replace("__DEFAULTS__", &defaults);
    shell(&content, Some(&runtime))
}

pub fn not_found_html() -> String {
    shell(&format!("<p>{}</p>", NOT_FOUND_MESSAGE), None)
}

fn shell(content: &str, runtime: Option<&str>) -> String {
    let script = match runtime {
        Some(js) => format!("<script>{}</script>", js),
        None => String::new(),
    };
    format!(
        r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width">
<title>{brand}</title>
<script src="{plotly}"></script>
<style>{css}</style>
</head>
<body>
{navbar}
<div id="page-content">
{content}
</div>
{script}
</body>
</html>
"##,
        brand = BRAND,
        plotly = PLOTLY_CDN,
        css = STYLE,
        navbar = navbar(),
        content = content,
        script = script,
    )
}

fn navbar() -> String {
    format!(
        r##"<nav class="navbar">
<a class="brand" href="/page1">{}</a>
<a href="/page1">Mutations</a>
<a href="/page2">Transcription Factors</a>
<a href="/page3">Drug Sensitivity</a>
</nav>"##,
        BRAND
    )
}

fn dataset_radio() -> &'static str {
    r##"<div class="centered">
<label><input type="radio" name="dataset_type" data-control="dataset_type" value="shorthouse" checked> Shorthouse et al</label>
<label><input type="radio" name="dataset_type" data-control="dataset_type" value="cherkaoui"> Cherkaoui et al</label>
</div>"##
}

fn mutations_content() -> String {
    format!(
        r##"<h1 class="centered">Influence of Mutations on Metabolite Abundance</h1>
<p class="centered">This page contains plots to explore the relationships between nonsynonymous mutations and metabolites.
Included are a heatmap of T-statistics (proportional to a p-value) for a logistic regression run on every
nonsynonymous mutation/metabolite pairing. Click and drag to zoom. Scroll down for the metabolite table, and to
explore the relationships between specific metabolites and mutations using the dropdown menus.</p>
<p class="centered">This data has been normalised in two differing ways - please see the relevant publications for
details, but toggle between them below - default is Shorthouse et al.</p>
{radio}
<div class="graph" id="heatmap_tstats"></div>
<div class="row">
<div class="col"><div class="table-box" id="metabolite_table"></div></div>
<div class="col">
<select data-control="metabolite_id" id="metabolite_id"></select>
<div class="graph" id="mutation_ranking_per_metabolite"></div>
</div>
</div>
<div class="row">
<div class="col">
<select data-control="mutation_id" id="mutation_id"></select>
<div class="graph" id="mutation_volcano_plot"></div>
</div>
<div class="col"><div class="graph" id="strip_plot_metabolite"></div></div>
</div>"##,
        radio = dataset_radio()
    )
}

fn tf_activity_content() -> String {
    format!(
        r##"<h1 class="centered">Correlations between transcription factor (TF) activity and metabolic pathways</h1>
<p class="centered">This page contains plots to explore the relationships between transcription factors (TFS) and
SMPDB metabolic pathways. The top of the page is a heatmap of the top pathway/PROGENY associations, scroll down to
explore the correlations between specific SMPDB pathways and transcription factors using the dropdown menus.</p>
<p class="centered">This data has been normalised in two differing ways - please see the relevant publications for
details, but toggle between them below - default is Shorthouse et al.</p>
{radio}
<div class="graph" id="heatmap_tfs"></div>
<div class="row">
<div class="col">
<select data-control="pathway" id="pathway"></select>
<div class="graph" id="tf_ranking_per_pathway"></div>
</div>
<div class="col">
<select data-control="tf" id="tf"></select>
<div class="graph" id="pathway_ranking_per_tf"></div>
</div>
</div>"##,
        radio = dataset_radio()
    )
}

fn drug_sensitivity_content() -> String {
    format!(
        r##"<h1>Relationship between Metabolic Pathways and Drug Sensitivity</h1>
<p>Here you can explore the relationships between metabolic pathways and drug sensitivity. A positive value
indicates that activity of the pathway is associated with an increased resistance to a drug. Use dropdown menus
to explore specific pathways and drugs.</p>
<p class="centered">This data has been normalised in two differing ways - please see the relevant publications for
details, but toggle between them below - default is Shorthouse et al.</p>
{radio}
<div class="row">
<div class="col">
<select data-control="pathway" id="pathway"></select>
<div class="graph" id="drug_sensitivity_by_pathway"></div>
</div>
<div class="col">
<select data-control="drug" id="drug"></select>
<div class="graph" id="pathway_ranking_by_drug"></div>
</div>
</div>"##,
        radio = dataset_radio()
    )
}

const STYLE: &str = r##"
body { font-family: sans-serif; margin: 0; }
.navbar { background: #222; padding: 10px 16px; }
.navbar a { color: #ddd; margin-right: 16px; text-decoration: none; }
.navbar a.brand { color: #fff; font-weight: bold; }
#page-content { padding: 16px; }
.centered { text-align: center; }
.row { display: flex; }
.col { width: 50%; padding: 10px; }
.graph { min-height: 420px; }
select { width: 100%; margin-bottom: 8px; }
.table-box { max-height: 550px; overflow: auto; }
.table-box table { border-collapse: collapse; font-size: 12px; }
.table-box th, .table-box td { border: 1px solid #ccc; padding: 3px 8px; text-align: center; }
"##;

/// Browser-side half of the reactive layer. Posts the full control-value
/// map plus the changed control id; applies each returned artifact by
/// kind. Builder errors leave the previous render in place.
const RUNTIME: &str = r##"
const PAGE = "__PAGE__";
const values = __DEFAULTS__;

async function refresh(changed) {
  const resp = await fetch("/callback", {
    method: "POST",
    headers: {"Content-Type": "application/json"},
    body: JSON.stringify({page: PAGE, changed: changed, values: values}),
  });
  if (!resp.ok) {
    console.error("callback failed:", await resp.text());
    return;
  }
  const payload = await resp.json();
  for (const update of payload.outputs) {
    apply(update);
  }
}

function apply(update) {
  if (update.error) {
    console.error(update.id + ":", update.error);
    return;
  }
  const el = document.getElementById(update.target);
  if (!el) return;
  const art = update.artifact;
  if (art.kind === "figure") {
    Plotly.react(el, art.figure.data, art.figure.layout, {responsive: true});
  } else if (art.kind === "options") {
    fillOptions(el, update.target, art.options);
  } else if (art.kind === "table") {
    renderTable(el, art.columns, art.rows);
  }
}

function fillOptions(select, control, options) {
  select.innerHTML = "";
  for (const opt of options) {
    const o = document.createElement("option");
    o.value = JSON.stringify(opt.value);
    o.textContent = opt.label;
    select.appendChild(o);
  }
  const current = JSON.stringify(values[control]);
  if ([...select.options].some(o => o.value === current)) {
    select.value = current;
  }
}

function renderTable(el, columns, rows) {
  const table = document.createElement("table");
  const thead = document.createElement("thead");
  const headRow = document.createElement("tr");
  for (const c of columns) {
    const th = document.createElement("th");
    th.textContent = c;
    headRow.appendChild(th);
  }
  thead.appendChild(headRow);
  table.appendChild(thead);
  const tbody = document.createElement("tbody");
  for (const row of rows) {
    const tr = document.createElement("tr");
    for (const c of columns) {
      const td = document.createElement("td");
      td.textContent = row[c] === null ? "" : row[c];
      tr.appendChild(td);
    }
    tbody.appendChild(tr);
  }
  table.appendChild(tbody);
  el.innerHTML = "";
  el.appendChild(table);
}

document.querySelectorAll("[data-control]").forEach(el => {
  el.addEventListener("change", () => {
    const name = el.dataset.control;
    if (el.type === "radio") {
      if (!el.checked) return;
      values[name] = el.value;
    } else {
      values[name] = JSON.parse(el.value);
    }
    refresh(name);
  });
});

refresh(null);
"##;
