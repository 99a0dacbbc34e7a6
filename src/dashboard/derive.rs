use crate::artifact::{
    HistogramSeries, HistogramSpec, ScatterSeries, ScatterSpec, TableArtifact, TextNode,
};
use crate::color::{ClassColors, SINGLE_SERIES};
use crate::data::group::{group_by_label, select};
use crate::data::model::Dataset;
use crate::data::stats::{Bins, Summary};
use crate::reactive::binding::DeriveError;

/// Opacity of each per-class histogram when they overlay each other.
pub const OVERLAY_OPACITY: f32 = 0.7;

fn feature_index(dataset: &Dataset, feature: &str) -> Result<usize, DeriveError> {
    dataset
        .feature_index(feature)
        .ok_or_else(|| DeriveError::UnknownFeature(feature.to_string()))
}

fn feature_values(dataset: &Dataset, feature: &str) -> Result<Vec<f64>, DeriveError> {
    dataset
        .column(feature)
        .ok_or_else(|| DeriveError::UnknownFeature(feature.to_string()))
}

fn summarize(feature: &str, values: &[f64]) -> Result<Summary, DeriveError> {
    Summary::of(values).ok_or_else(|| DeriveError::EmptySample(feature.to_string()))
}

fn bins_for(feature: &str, values: &[f64]) -> Result<Bins, DeriveError> {
    Bins::auto(values).ok_or_else(|| DeriveError::EmptySample(feature.to_string()))
}

/// Two decimals. The std of a single value is NaN and prints as `nan`.
fn fixed2(v: f64) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{v:.2}")
    }
}

/// `species` → `Species`.
pub fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Scatter
// ---------------------------------------------------------------------------

/// Every row as an `(x, y)` point, one series per class.
pub fn scatter(
    dataset: &Dataset,
    colors: &ClassColors,
    x: &str,
    y: &str,
) -> Result<ScatterSpec, DeriveError> {
    let xi = feature_index(dataset, x)?;
    let yi = feature_index(dataset, y)?;

    let series = group_by_label(dataset)
        .into_iter()
        .map(|group| {
            let xs = select(dataset, &group.indices, xi);
            let ys = select(dataset, &group.indices, yi);
            ScatterSeries {
                name: group.class.to_string(),
                color: colors.color_for(group.class),
                points: xs.into_iter().zip(ys).map(|(a, b)| [a, b]).collect(),
            }
        })
        .collect();

    Ok(ScatterSpec {
        title: format!("{x} vs {y}"),
        x_label: x.to_string(),
        y_label: y.to_string(),
        series,
    })
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Distribution of one feature, either overlaid per class or as one series.
pub fn histogram(
    dataset: &Dataset,
    colors: &ClassColors,
    feature: &str,
    by_class: bool,
) -> Result<HistogramSpec, DeriveError> {
    let fi = feature_index(dataset, feature)?;
    let all = feature_values(dataset, feature)?;
    let bins = bins_for(feature, &all)?;

    let (title, series) = if by_class {
        let series = group_by_label(dataset)
            .into_iter()
            .map(|group| HistogramSeries {
                name: group.class.to_string(),
                color: colors.color_for(group.class),
                opacity: OVERLAY_OPACITY,
                counts: bins.counts(&select(dataset, &group.indices, fi)),
            })
            .collect();
        (
            format!(
                "Distribution of {feature} by {}",
                title_case(dataset.label_name())
            ),
            series,
        )
    } else {
        let series = vec![HistogramSeries {
            name: feature.to_string(),
            color: SINGLE_SERIES,
            opacity: 1.0,
            counts: bins.counts(&all),
        }];
        (format!("Distribution of {feature}"), series)
    };

    Ok(HistogramSpec {
        title,
        x_label: feature.to_string(),
        y_label: "count".to_string(),
        bins,
        overlay: by_class,
        series,
    })
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// The first `n` rows in load order, `n` clamped to `[1, dataset size]`.
pub fn table(dataset: &Dataset, n: i64) -> TableArtifact {
    let n = n.clamp(1, dataset.len() as i64) as usize;
    let mut columns = dataset.features().to_vec();
    columns.push(dataset.label_name().to_string());
    TableArtifact {
        columns,
        rows: dataset.head(n).to_vec(),
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Overall and per-class summary of one feature, values to 2 decimals.
pub fn statistics(dataset: &Dataset, feature: &str) -> Result<TextNode, DeriveError> {
    let fi = feature_index(dataset, feature)?;
    let overall = summarize(feature, &feature_values(dataset, feature)?)?;

    let overall_section = TextNode::section(
        format!("Overall Statistics for {feature}"),
        4,
        vec![
            TextNode::line(format!("Mean: {}", fixed2(overall.mean))),
            TextNode::line(format!("Standard Deviation: {}", fixed2(overall.std))),
            TextNode::line(format!("Minimum: {}", fixed2(overall.min))),
            TextNode::line(format!("Maximum: {}", fixed2(overall.max))),
        ],
    );

    // class sections are listed by name, not by declaration order
    let mut groups = group_by_label(dataset);
    groups.sort_by_key(|g| g.class);

    let per_class = groups
        .into_iter()
        .map(|group| {
            let s = summarize(group.class, &select(dataset, &group.indices, fi))?;
            Ok(TextNode::section(
                group.class,
                5,
                vec![
                    TextNode::line(format!("Mean: {}", fixed2(s.mean))),
                    TextNode::line(format!("Std: {}", fixed2(s.std))),
                ],
            ))
        })
        .collect::<Result<Vec<_>, DeriveError>>()?;

    let by_class_section = TextNode::section(
        format!("Statistics by {}", title_case(dataset.label_name())),
        4,
        per_class,
    );

    Ok(TextNode::section(
        feature,
        3,
        vec![overall_section, by_class_section],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader;
    use crate::data::model::Row;
    use approx::assert_relative_eq;

    fn iris() -> (Dataset, ClassColors) {
        let ds = loader::load().unwrap();
        let colors = ClassColors::new(ds.classes());
        (ds, colors)
    }

    #[test]
    fn scatter_has_every_row_for_every_feature_pair() {
        let (ds, colors) = iris();
        for x in ds.features() {
            for y in ds.features() {
                let spec = scatter(&ds, &colors, x, y).unwrap();
                assert_eq!(spec.point_count(), ds.len());
                for s in &spec.series {
                    assert!(ds.classes().contains(&s.name));
                }
            }
        }
    }

    #[test]
    fn scatter_points_carry_the_chosen_columns() {
        let (ds, colors) = iris();
        let spec = scatter(&ds, &colors, "petal width (cm)", "sepal length (cm)").unwrap();
        assert_eq!(spec.title, "petal width (cm) vs sepal length (cm)");
        // first setosa row is (5.1, 3.5, 1.4, 0.2)
        assert_eq!(spec.series[0].points[0], [0.2, 5.1]);
        let colors_used: std::collections::BTreeSet<_> =
            spec.series.iter().map(|s| s.color).collect();
        assert_eq!(colors_used.len(), 3);
    }

    #[test]
    fn scatter_rejects_unknown_feature() {
        let (ds, colors) = iris();
        assert_eq!(
            scatter(&ds, &colors, "height", "sepal width (cm)").unwrap_err(),
            DeriveError::UnknownFeature("height".into())
        );
    }

    #[test]
    fn table_returns_leading_rows_for_every_n() {
        let (ds, _) = iris();
        for n in 1..=150 {
            let t = table(&ds, n);
            assert_eq!(t.rows.len(), n as usize);
            assert_eq!(t.rows.as_slice(), &ds.rows()[..n as usize]);
            assert_eq!(t, table(&ds, n));
        }
        assert_eq!(table(&ds, 0).rows.len(), 1);
        assert_eq!(table(&ds, -4).rows.len(), 1);
        assert_eq!(table(&ds, 500).rows.len(), 150);
        assert_eq!(table(&ds, 3).columns.last().map(String::as_str), Some("species"));
    }

    #[test]
    fn grouped_histogram_has_one_series_per_class() {
        let (ds, colors) = iris();
        for feature in ds.features() {
            let h = histogram(&ds, &colors, feature, true).unwrap();
            assert!(h.overlay);
            assert_eq!(h.series.len(), 3);
            for (s, class) in h.series.iter().zip(ds.classes()) {
                assert_eq!(&s.name, class);
                assert_eq!(s.total(), 50);
                assert_relative_eq!(s.opacity, OVERLAY_OPACITY);
                assert_eq!(s.counts.len(), h.bins.count);
            }
            assert_eq!(h.title, format!("Distribution of {feature} by Species"));
        }
    }

    #[test]
    fn ungrouped_histogram_is_a_single_series_over_all_rows() {
        let (ds, colors) = iris();
        let h = histogram(&ds, &colors, "petal length (cm)", false).unwrap();
        assert!(!h.overlay);
        assert_eq!(h.series.len(), 1);
        assert_eq!(h.series[0].total(), 150);
        assert_eq!(h.series[0].color, SINGLE_SERIES);
        assert_eq!(h.title, "Distribution of petal length (cm)");
    }

    #[test]
    fn statistics_match_column_means() {
        let (ds, _) = iris();
        for feature in ds.features() {
            let tree = statistics(&ds, feature).unwrap();
            let column = ds.column(feature).unwrap();
            let mean = column.iter().sum::<f64>() / column.len() as f64;

            let overall = tree
                .find_section(&format!("Overall Statistics for {feature}"))
                .unwrap();
            assert_eq!(overall.lines()[0], format!("Mean: {mean:.2}"));

            for class in ds.classes() {
                let values: Vec<f64> = ds
                    .rows()
                    .iter()
                    .filter(|r| &r.label == class)
                    .map(|r| r.values[ds.feature_index(feature).unwrap()])
                    .collect();
                let class_mean = values.iter().sum::<f64>() / values.len() as f64;
                let section = tree.find_section(class).unwrap();
                assert_eq!(section.lines()[0], format!("Mean: {class_mean:.2}"));
            }
        }
    }

    #[test]
    fn sepal_length_statistics_text() {
        let (ds, _) = iris();
        let tree = statistics(&ds, "sepal length (cm)").unwrap();
        let overall = tree
            .find_section("Overall Statistics for sepal length (cm)")
            .unwrap();
        assert_eq!(
            overall.lines(),
            vec![
                "Mean: 5.84",
                "Standard Deviation: 0.83",
                "Minimum: 4.30",
                "Maximum: 7.90"
            ]
        );
        assert!(tree.find_section("Statistics by Species").is_some());
        assert_eq!(
            tree.find_section("setosa").unwrap().lines(),
            vec!["Mean: 5.01", "Std: 0.35"]
        );
    }

    #[test]
    fn empty_sample_is_reported_as_such() {
        assert_eq!(
            summarize("f", &[]).unwrap_err(),
            DeriveError::EmptySample("f".into())
        );
        assert_eq!(
            bins_for("f", &[]).unwrap_err(),
            DeriveError::EmptySample("f".into())
        );
        assert_eq!(
            statistics(&iris().0, "height").unwrap_err(),
            DeriveError::UnknownFeature("height".into())
        );
    }

    #[test]
    fn class_statistics_are_sorted_by_name() {
        let ds = Dataset::new(
            vec!["f".into()],
            "label",
            vec!["zeta".into(), "alpha".into()],
            vec![
                Row::new(vec![1.0], "zeta"),
                Row::new(vec![2.0], "alpha"),
                Row::new(vec![4.0], "alpha"),
            ],
        )
        .unwrap();
        let tree = statistics(&ds, "f").unwrap();

        let by_class = tree.find_section("Statistics by Label").unwrap();
        let headings: Vec<&str> = match by_class {
            TextNode::Section { children, .. } => children
                .iter()
                .filter_map(|c| match c {
                    TextNode::Section { heading, .. } => Some(heading.as_str()),
                    TextNode::Line { .. } => None,
                })
                .collect(),
            TextNode::Line { .. } => panic!("expected a section"),
        };
        assert_eq!(headings, vec!["alpha", "zeta"]);

        assert_eq!(
            tree.find_section("alpha").unwrap().lines(),
            vec!["Mean: 3.00", "Std: 1.41"]
        );
        // a single value has no sample deviation
        assert_eq!(
            tree.find_section("zeta").unwrap().lines(),
            vec!["Mean: 1.00", "Std: nan"]
        );
    }
}
