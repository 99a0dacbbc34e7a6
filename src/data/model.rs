use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

/// Violations of the dataset invariants, detected once at construction.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("dataset has no rows")]
    Empty,
    #[error("dataset declares no feature columns")]
    NoFeatures,
    #[error("dataset declares no classes")]
    NoClasses,
    #[error("feature '{0}' is declared more than once")]
    DuplicateFeature(String),
    #[error("row {row}: expected {expected} feature values, found {found}")]
    WrongWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("row {row}: feature '{feature}' is not a finite number")]
    NonFinite { row: usize, feature: String },
    #[error("row {row}: label '{label}' is not one of the declared classes")]
    UnknownLabel { row: usize, label: String },
}

// ---------------------------------------------------------------------------
// Row – one observation
// ---------------------------------------------------------------------------

/// A single observation: feature values aligned with [`Dataset::features`]
/// plus the class label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<f64>,
    pub label: String,
}

impl Row {
    pub fn new(values: Vec<f64>, label: impl Into<String>) -> Self {
        Self {
            values,
            label: label.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The validated, read-only table every derivation reads from.
///
/// Fields are private so the invariants checked in [`Dataset::new`] hold for
/// the whole process lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    features: Vec<String>,
    label_name: String,
    classes: Vec<String>,
    rows: Vec<Row>,
}

impl Dataset {
    /// Build a dataset, checking that it is non-empty, that every row has
    /// one finite value per feature, and that every label is a declared class.
    pub fn new(
        features: Vec<String>,
        label_name: impl Into<String>,
        classes: Vec<String>,
        rows: Vec<Row>,
    ) -> Result<Self, DatasetError> {
        if features.is_empty() {
            return Err(DatasetError::NoFeatures);
        }
        if classes.is_empty() {
            return Err(DatasetError::NoClasses);
        }
        if rows.is_empty() {
            return Err(DatasetError::Empty);
        }

        let mut seen = BTreeSet::new();
        for name in &features {
            if !seen.insert(name.as_str()) {
                return Err(DatasetError::DuplicateFeature(name.clone()));
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != features.len() {
                return Err(DatasetError::WrongWidth {
                    row: i,
                    expected: features.len(),
                    found: row.values.len(),
                });
            }
            if let Some(j) = row.values.iter().position(|v| !v.is_finite()) {
                return Err(DatasetError::NonFinite {
                    row: i,
                    feature: features[j].clone(),
                });
            }
            if !classes.contains(&row.label) {
                return Err(DatasetError::UnknownLabel {
                    row: i,
                    label: row.label.clone(),
                });
            }
        }

        Ok(Self {
            features,
            label_name: label_name.into(),
            classes,
            rows,
        })
    }

    /// Feature (numeric column) names in source order.
    pub fn features(&self) -> &[String] {
        &self.features
    }

    /// Name of the categorical label column, e.g. `species`.
    pub fn label_name(&self) -> &str {
        &self.label_name
    }

    /// Declared classes, in display order.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Column position of a feature, if it exists.
    pub fn feature_index(&self, feature: &str) -> Option<usize> {
        self.features.iter().position(|f| f == feature)
    }

    /// All values of one feature in row order.
    pub fn column(&self, feature: &str) -> Option<Vec<f64>> {
        let idx = self.feature_index(feature)?;
        Some(self.rows.iter().map(|r| r.values[idx]).collect())
    }

    /// The first `n` rows in load order.
    pub fn head(&self, n: usize) -> &[Row] {
        &self.rows[..n.min(self.rows.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    fn tiny() -> Dataset {
        Dataset::new(
            names(&["a", "b"]),
            "kind",
            names(&["x", "y"]),
            vec![
                Row::new(vec![1.0, 2.0], "x"),
                Row::new(vec![3.0, 4.0], "y"),
                Row::new(vec![5.0, 6.0], "x"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn accessors_follow_load_order() {
        let ds = tiny();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.label_name(), "kind");
        assert_eq!(ds.column("b").unwrap(), vec![2.0, 4.0, 6.0]);
        assert_eq!(ds.head(2).len(), 2);
        assert_eq!(ds.head(99).len(), 3);
        assert_eq!(ds.feature_index("c"), None);
    }

    #[test]
    fn rejects_empty_table() {
        let err = Dataset::new(names(&["a"]), "kind", names(&["x"]), vec![]).unwrap_err();
        assert_eq!(err, DatasetError::Empty);
    }

    #[test]
    fn rejects_short_row() {
        let err = Dataset::new(
            names(&["a", "b"]),
            "kind",
            names(&["x"]),
            vec![Row::new(vec![1.0], "x")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::WrongWidth {
                row: 0,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn rejects_nan_and_unknown_label() {
        let err = Dataset::new(
            names(&["a"]),
            "kind",
            names(&["x"]),
            vec![Row::new(vec![f64::NAN], "x")],
        )
        .unwrap_err();
        assert!(matches!(err, DatasetError::NonFinite { row: 0, .. }));

        let err = Dataset::new(
            names(&["a"]),
            "kind",
            names(&["x"]),
            vec![Row::new(vec![1.0], "x"), Row::new(vec![1.0], "z")],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::UnknownLabel {
                row: 1,
                label: "z".into()
            }
        );
    }

    #[test]
    fn rejects_duplicate_feature() {
        let err = Dataset::new(
            names(&["a", "a"]),
            "kind",
            names(&["x"]),
            vec![Row::new(vec![1.0, 2.0], "x")],
        )
        .unwrap_err();
        assert_eq!(err, DatasetError::DuplicateFeature("a".into()));
    }
}
