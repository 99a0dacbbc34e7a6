use super::model::Dataset;

// ---------------------------------------------------------------------------
// Group-by-label: row indices per class
// ---------------------------------------------------------------------------

/// Row indices belonging to one class, in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassGroup<'a> {
    pub class: &'a str,
    pub indices: Vec<usize>,
}

/// Partition the dataset's rows by label.
///
/// Groups come back in the dataset's declared class order. A class with no
/// rows is omitted, so every returned group is non-empty.
pub fn group_by_label(dataset: &Dataset) -> Vec<ClassGroup<'_>> {
    dataset
        .classes()
        .iter()
        .filter_map(|class| {
            let indices: Vec<usize> = dataset
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, row)| row.label == *class)
                .map(|(i, _)| i)
                .collect();
            (!indices.is_empty()).then_some(ClassGroup {
                class: class.as_str(),
                indices,
            })
        })
        .collect()
}

/// Values of column `feature_idx` for the given rows.
pub fn select(dataset: &Dataset, indices: &[usize], feature_idx: usize) -> Vec<f64> {
    let rows = dataset.rows();
    indices.iter().map(|&i| rows[i].values[feature_idx]).collect()
}
