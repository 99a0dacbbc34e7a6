use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Dataset, Row};

/// The Iris measurements, compiled into the binary.
const IRIS_CSV: &str = include_str!("iris.csv");

/// Label column of the embedded dataset.
pub const IRIS_LABEL: &str = "species";

/// The fixed class set of the embedded dataset.
pub const IRIS_CLASSES: [&str; 3] = ["setosa", "versicolor", "virginica"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the embedded Iris dataset.
///
/// Labels are validated against [`IRIS_CLASSES`]; any mismatch is an error.
pub fn load() -> Result<Dataset> {
    let classes = IRIS_CLASSES.iter().map(|c| c.to_string()).collect();
    parse_csv(csv::Reader::from_reader(IRIS_CSV.as_bytes()), IRIS_LABEL, Some(classes))
        .context("parsing embedded Iris dataset")
}

/// Load a dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one numeric column per feature plus the label column
/// * `.json`    – `[{ "<feature>": 5.1, ..., "<label>": "setosa" }, ...]`
/// * `.parquet` – numeric feature columns plus a UTF-8 label column
///
/// The class set is every distinct label in order of first appearance.
pub fn load_file(path: &Path, label_column: &str) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "csv" => csv::Reader::from_path(path)
            .context("opening CSV")
            .and_then(|reader| parse_csv(reader, label_column, None)),
        "json" => load_json(path, label_column),
        "parquet" | "pq" => load_parquet(path, label_column),
        other => bail!("Unsupported file extension: .{other}"),
    };
    loaded.with_context(|| format!("loading dataset from {}", path.display()))
}

// ---------------------------------------------------------------------------
// Shared assembly
// ---------------------------------------------------------------------------

/// Collects rows, discovering classes on the fly unless a fixed set is given.
struct TableBuilder {
    features: Vec<String>,
    label_column: String,
    classes: Vec<String>,
    fixed_classes: bool,
    rows: Vec<Row>,
}

impl TableBuilder {
    fn new(features: Vec<String>, label_column: &str, classes: Option<Vec<String>>) -> Self {
        let fixed_classes = classes.is_some();
        Self {
            features,
            label_column: label_column.to_string(),
            classes: classes.unwrap_or_default(),
            fixed_classes,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, values: Vec<f64>, label: String) {
        if !self.fixed_classes && !self.classes.contains(&label) {
            self.classes.push(label.clone());
        }
        self.rows.push(Row::new(values, label));
    }

    fn finish(self) -> Result<Dataset> {
        Ok(Dataset::new(
            self.features,
            self.label_column,
            self.classes,
            self.rows,
        )?)
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one label column, every other
/// column numeric. Ragged records are rejected by the csv reader itself.
fn parse_csv<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    label_column: &str,
    classes: Option<Vec<String>>,
) -> Result<Dataset> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .with_context(|| format!("CSV missing '{label_column}' column"))?;

    let features: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, h)| h.clone())
        .collect();

    let mut table = TableBuilder::new(features, label_column, classes);

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;

        let mut values = Vec::with_capacity(headers.len() - 1);
        for (col_idx, cell) in record.iter().enumerate() {
            if col_idx == label_idx {
                continue;
            }
            let v = cell.trim().parse::<f64>().with_context(|| {
                format!(
                    "Row {row_no}, column '{}': '{cell}' is not a number",
                    headers[col_idx]
                )
            })?;
            values.push(v);
        }

        let label = record.get(label_idx).unwrap_or("").trim().to_string();
        table.push(values, label);
    }

    table.finish()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "sepal length (cm)": 5.1, "sepal width (cm)": 3.5, "species": "setosa" },
///   ...
/// ]
/// ```
///
/// Feature order is taken from the first record.
fn load_json(path: &Path, label_column: &str) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    parse_json(&text, label_column)
}

fn parse_json(text: &str, label_column: &str) -> Result<Dataset> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;
    let first = records
        .first()
        .and_then(|r| r.as_object())
        .context("Expected at least one JSON object")?;

    let features: Vec<String> = first
        .keys()
        .filter(|k| k.as_str() != label_column)
        .cloned()
        .collect();

    let mut table = TableBuilder::new(features.clone(), label_column, None);

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        if obj.len() != features.len() + 1 {
            bail!(
                "Row {i}: expected {} columns, found {}",
                features.len() + 1,
                obj.len()
            );
        }

        let values = features
            .iter()
            .map(|f| {
                obj.get(f)
                    .and_then(|v| v.as_f64())
                    .with_context(|| format!("Row {i}, '{f}': missing or not a number"))
            })
            .collect::<Result<Vec<f64>>>()?;

        let label = obj
            .get(label_column)
            .and_then(|v| v.as_str())
            .with_context(|| format!("Row {i}: missing or non-string '{label_column}'"))?;

        table.push(values, label.to_string());
    }

    table.finish()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with numeric feature columns (Float64, Float32, Int32
/// or Int64) and a UTF-8 label column.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path, label_column: &str) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut table: Option<TableBuilder> = None;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let label_idx = schema
            .index_of(label_column)
            .map_err(|_| anyhow::anyhow!("Parquet file missing '{label_column}' column"))?;

        let feature_cols: Vec<(usize, String)> = schema
            .fields()
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(i, f)| (i, f.name().clone()))
            .collect();

        let table = table.get_or_insert_with(|| {
            let names = feature_cols.iter().map(|(_, n)| n.clone()).collect();
            TableBuilder::new(names, label_column, None)
        });

        let label_col = batch.column(label_idx);
        for row in 0..batch.num_rows() {
            let mut values = Vec::with_capacity(feature_cols.len());
            for (col_idx, col_name) in &feature_cols {
                let v = extract_f64(batch.column(*col_idx), row)
                    .with_context(|| format!("Row {row}: failed to read '{col_name}'"))?;
                values.push(v);
            }
            let label = extract_label(label_col, row)
                .with_context(|| format!("Row {row}: failed to read '{label_column}'"))?;
            table.push(values, label);
        }
    }

    table
        .context("Parquet file contains no record batches")?
        .finish()
}

// -- Parquet / Arrow helpers --

/// Extract a numeric cell as `f64`.
fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<f64> {
    if col.is_null(row) {
        bail!("null value in feature column");
    }
    let any = col.as_any();
    match col.data_type() {
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| a.value(row))
            .context("expected Float64Array"),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| a.value(row) as f64)
            .context("expected Float32Array"),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| a.value(row) as f64)
            .context("expected Int64Array"),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| a.value(row) as f64)
            .context("expected Int32Array"),
        other => bail!("Expected a numeric column, got {other:?}"),
    }
}

/// Extract a label cell from a Utf8 or LargeUtf8 column.
fn extract_label(col: &Arc<dyn Array>, row: usize) -> Result<String> {
    if col.is_null(row) {
        bail!("null label");
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string())
            .context("expected StringArray"),
        DataType::LargeUtf8 => Ok(col.as_string::<i64>().value(row).to_string()),
        other => bail!("Expected a string label column, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::ArrayRef;
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("iris-explorer-{}-{name}", std::process::id()))
    }

    #[test]
    fn embedded_iris_is_complete() {
        let ds = load().unwrap();
        assert_eq!(ds.len(), 150);
        assert_eq!(
            ds.features(),
            &[
                "sepal length (cm)",
                "sepal width (cm)",
                "petal length (cm)",
                "petal width (cm)"
            ]
        );
        assert_eq!(ds.classes(), &IRIS_CLASSES);
        assert_eq!(ds.rows()[0].values, vec![5.1, 3.5, 1.4, 0.2]);
        assert_eq!(ds.rows()[149].label, "virginica");
        for class in IRIS_CLASSES {
            assert_eq!(ds.rows().iter().filter(|r| r.label == class).count(), 50);
        }
    }

    #[test]
    fn csv_rejects_non_numeric_feature() {
        let text = "a,species\n1.0,x\nabc,x\n";
        let err = parse_csv(csv::Reader::from_reader(text.as_bytes()), "species", None)
            .unwrap_err();
        assert!(format!("{err:#}").contains("'abc' is not a number"));
    }

    #[test]
    fn csv_rejects_wrong_column_count() {
        let text = "a,b,species\n1.0,2.0,x\n1.0,x\n";
        assert!(parse_csv(csv::Reader::from_reader(text.as_bytes()), "species", None).is_err());
    }

    #[test]
    fn csv_rejects_label_outside_fixed_classes() {
        let text = "a,species\n1.0,setosa\n2.0,rose\n";
        let classes = Some(vec!["setosa".to_string()]);
        let err = parse_csv(csv::Reader::from_reader(text.as_bytes()), "species", classes)
            .unwrap_err();
        assert!(format!("{err:#}").contains("'rose'"));
    }

    #[test]
    fn csv_requires_label_column() {
        let text = "a,b\n1.0,2.0\n";
        let err =
            parse_csv(csv::Reader::from_reader(text.as_bytes()), "species", None).unwrap_err();
        assert!(format!("{err:#}").contains("missing 'species'"));
    }

    #[test]
    fn csv_header_only_is_empty_dataset() {
        let text = "a,species\n";
        assert!(parse_csv(csv::Reader::from_reader(text.as_bytes()), "species", None).is_err());
    }

    #[test]
    fn json_records_keep_file_column_order() {
        let text = r#"[
            {"z": 1.0, "a": 2.0, "kind": "p"},
            {"z": 3.0, "a": 4.0, "kind": "q"}
        ]"#;
        let ds = parse_json(text, "kind").unwrap();
        assert_eq!(ds.features(), &["z", "a"]);
        assert_eq!(ds.classes(), &["p", "q"]);
        assert_eq!(ds.rows()[1].values, vec![3.0, 4.0]);
    }

    #[test]
    fn json_rejects_string_feature() {
        let text = r#"[{"a": "1.0", "kind": "p"}]"#;
        assert!(parse_json(text, "kind").is_err());
    }

    #[test]
    fn loaders_agree_on_the_same_table() {
        let csv_path = temp_path("agree.csv");
        std::fs::write(&csv_path, "len,wid,species\n1.5,2,a\n3.5,4,b\n").unwrap();

        let json_path = temp_path("agree.json");
        std::fs::write(
            &json_path,
            r#"[{"len":1.5,"wid":2,"species":"a"},{"len":3.5,"wid":4,"species":"b"}]"#,
        )
        .unwrap();

        let parquet_path = temp_path("agree.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("len", DataType::Float64, false),
            Field::new("wid", DataType::Int64, false),
            Field::new("species", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![1.5, 3.5])) as ArrayRef,
                Arc::new(Int64Array::from(vec![2, 4])) as ArrayRef,
                Arc::new(StringArray::from(vec!["a", "b"])) as ArrayRef,
            ],
        )
        .unwrap();
        let file = std::fs::File::create(&parquet_path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let from_csv = load_file(&csv_path, "species").unwrap();
        let from_json = load_file(&json_path, "species").unwrap();
        let from_parquet = load_file(&parquet_path, "species").unwrap();

        assert_eq!(from_csv, from_json);
        assert_eq!(from_csv, from_parquet);
        assert_eq!(from_csv.rows()[1].values, vec![3.5, 4.0]);

        for p in [csv_path, json_path, parquet_path] {
            let _ = std::fs::remove_file(p);
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = load_file(Path::new("data.xlsx"), "species").unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported file extension"));
    }
}
