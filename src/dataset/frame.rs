//! Dense labelled matrix backing the association/correlation tables.
//!
//! Row and column labels are unique strings in file order; cells are f64.
//! Lookups go through label -> position maps so the view builders never
//! scan. Matrices are built once at load and never mutated.

use std::collections::HashMap;

use anyhow::{bail, Result};

#[derive(Debug, Clone)]
pub struct LabelledMatrix {
    row_labels: Vec<String>,
    col_labels: Vec<String>,
    values: Vec<Vec<f64>>,
    row_index: HashMap<String, usize>,
    col_index: HashMap<String, usize>,
}

impl LabelledMatrix {
    pub fn new(
        row_labels: Vec<String>,
        col_labels: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self> {
        if values.len() != row_labels.len() {
            bail!(
                "matrix shape mismatch: {} rows of values for {} row labels",
                values.len(),
                row_labels.len()
            );
        }
        for (i, row) in values.iter().enumerate() {
            if row.len() != col_labels.len() {
                bail!(
                    "matrix shape mismatch: row {} has {} cells, expected {}",
                    row_labels[i],
                    row.len(),
                    col_labels.len()
                );
            }
        }
        let row_index = build_index(&row_labels, "row")?;
        let col_index = build_index(&col_labels, "column")?;
        Ok(Self { row_labels, col_labels, values, row_index, col_index })
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_labels.len()
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn col_labels(&self) -> &[String] {
        &self.col_labels
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn row(&self, label: &str) -> Option<&[f64]> {
        self.row_index.get(label).map(|&i| self.values[i].as_slice())
    }

    pub fn row_position(&self, label: &str) -> Option<usize> {
        self.row_index.get(label).copied()
    }

    pub fn has_col(&self, label: &str) -> bool {
        self.col_index.contains_key(label)
    }

    pub fn column(&self, label: &str) -> Option<Vec<f64>> {
        let &c = self.col_index.get(label)?;
        Some(self.values.iter().map(|row| row[c]).collect())
    }

    pub fn cell(&self, row: usize, col: usize) -> f64 {
        self.values[row][col]
    }

    /// Row positions ordered by label compared numerically (the original
    /// matrices are indexed by integer metabolite ids). Non-numeric labels
    /// sort after numeric ones, lexicographically.
    pub fn numeric_row_order(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.row_labels.len()).collect();
        order.sort_by(|&a, &b| {
            let pa = self.row_labels[a].parse::<f64>();
            let pb = self.row_labels[b].parse::<f64>();
            match (pa, pb) {
                (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(std::cmp::Ordering::Equal),
                (Ok(_), Err(_)) => std::cmp::Ordering::Less,
                (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
                (Err(_), Err(_)) => self.row_labels[a].cmp(&self.row_labels[b]),
            }
        });
        order
    }

    /// A copy with every cell negated. The correlation tables are stored
    /// sign-flipped so higher means stronger association on screen.
    pub fn negated(mut self) -> Self {
        for row in &mut self.values {
            for v in row.iter_mut() {
                *v = -*v;
            }
        }
        self
    }

    /// A copy with column labels rewritten (used to strip signature
    /// prefixes). Fails if the rewrite introduces duplicates.
    pub fn with_col_labels(self, col_labels: Vec<String>) -> Result<Self> {
        LabelledMatrix::new(self.row_labels, col_labels, self.values)
    }
}

fn build_index(labels: &[String], what: &str) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(labels.len());
    for (i, label) in labels.iter().enumerate() {
        if index.insert(label.clone(), i).is_some() {
            bail!("duplicate {} label: {}", what, label);
        }
    }
    Ok(index)
}
