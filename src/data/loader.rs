use std::path::Path;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Date32Type, Float64Type, Int64Type};
use chrono::NaiveDate;
use indexmap::IndexSet;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Column, ColumnType, Table, DATE_FORMAT};

// ---------------------------------------------------------------------------
// Format detection
// ---------------------------------------------------------------------------

/// On-disk / on-wire table formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Parquet,
}

impl Format {
    /// Pick the format from the extension of a path or URL.
    pub fn from_source(source: &str) -> Result<Self> {
        let path = source.split(&['?', '#'][..]).next().unwrap_or(source);
        let ext = Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(Format::Csv),
            "json" => Ok(Format::Json),
            "parquet" | "pq" => Ok(Format::Parquet),
            other => bail!("Unsupported table extension: .{other}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table from a local file.  Dispatch by extension.
pub fn load_file(name: &str, path: &Path) -> Result<Table> {
    let format = Format::from_source(&path.to_string_lossy())?;
    match format {
        Format::Parquet => load_parquet(name, path),
        text_format => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_text(name, text_format, &text)
        }
    }
}

/// Parse a textual payload (CSV or JSON records).
pub fn parse_text(name: &str, format: Format, text: &str) -> Result<Table> {
    match format {
        Format::Csv => parse_csv(name, text),
        Format::Json => parse_json(name, text),
        Format::Parquet => bail!("Parquet tables can only be read from local files"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names, one record per row. Empty cells are null.
pub fn parse_csv(name: &str, text: &str) -> Result<Table> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields but {} headers",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, value) in record.iter().enumerate() {
            raw[col_idx].push(value.trim().to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(header, cells)| column_from_text(header, &cells))
        .collect();

    Table::from_columns(name, columns).with_context(|| format!("building table '{name}'"))
}

fn column_from_text(name: String, cells: &[String]) -> Column {
    let dtype = infer_text_type(cells);
    let values = cells.iter().map(|s| text_to_cell(s, dtype)).collect();
    Column::new(name, dtype, values)
}

/// Infer a dtype the way a dataframe reader would: integers with gaps
/// become floats, and an entirely empty column is float.
fn infer_text_type(cells: &[String]) -> ColumnType {
    let present: Vec<&str> = cells
        .iter()
        .map(String::as_str)
        .filter(|s| !s.is_empty())
        .collect();
    if present.is_empty() {
        return ColumnType::Float;
    }
    let has_gaps = present.len() < cells.len();

    if present.iter().all(|s| s.parse::<i64>().is_ok()) {
        return if has_gaps {
            ColumnType::Float
        } else {
            ColumnType::Integer
        };
    }
    if present.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnType::Float;
    }
    if present.iter().all(|s| parse_bool(s).is_some()) {
        return ColumnType::Bool;
    }
    if present.iter().all(|s| parse_date(s).is_some()) {
        return ColumnType::Date;
    }
    ColumnType::Text
}

fn text_to_cell(s: &str, dtype: ColumnType) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    let parsed = match dtype {
        ColumnType::Float => s.parse::<f64>().ok().map(CellValue::Float),
        ColumnType::Integer => s.parse::<i64>().ok().map(CellValue::Integer),
        ColumnType::Bool => parse_bool(s).map(CellValue::Bool),
        ColumnType::Date => parse_date(s).map(CellValue::Date),
        ColumnType::Text => Some(CellValue::Text(s.to_string())),
    };
    parsed.unwrap_or(CellValue::Null)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "location": "France", "date": "2021-03-01", "new_cases": 21000 },
///   ...
/// ]
/// ```
///
/// Column order is the first-seen key order; a record missing a key is null there.
pub fn parse_json(name: &str, text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut keys: IndexSet<&str> = IndexSet::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        keys.extend(obj.keys().map(String::as_str));
    }

    let columns = keys
        .iter()
        .map(|&key| {
            let cells: Vec<&JsonValue> = records
                .iter()
                .map(|rec| rec.get(key).unwrap_or(&JsonValue::Null))
                .collect();
            column_from_json(key, &cells)
        })
        .collect();

    Table::from_columns(name, columns).with_context(|| format!("building table '{name}'"))
}

fn column_from_json(name: &str, cells: &[&JsonValue]) -> Column {
    let present: Vec<&JsonValue> = cells.iter().copied().filter(|v| !v.is_null()).collect();
    let has_gaps = present.len() < cells.len();

    let dtype = if present.is_empty() {
        ColumnType::Float
    } else if present.iter().all(|v| v.is_i64()) && !has_gaps {
        ColumnType::Integer
    } else if present.iter().all(|v| v.is_number()) {
        ColumnType::Float
    } else if present.iter().all(|v| v.is_boolean()) {
        ColumnType::Bool
    } else if present
        .iter()
        .all(|v| v.as_str().and_then(parse_date).is_some())
    {
        ColumnType::Date
    } else {
        ColumnType::Text
    };

    let values = cells.iter().map(|v| json_to_cell(v, dtype)).collect();
    Column::new(name, dtype, values)
}

fn json_to_cell(val: &JsonValue, dtype: ColumnType) -> CellValue {
    match (val, dtype) {
        (JsonValue::Null, _) => CellValue::Null,
        (v, ColumnType::Integer) => v.as_i64().map(CellValue::Integer).unwrap_or(CellValue::Null),
        (v, ColumnType::Float) => v.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null),
        (v, ColumnType::Bool) => v.as_bool().map(CellValue::Bool).unwrap_or(CellValue::Null),
        (v, ColumnType::Date) => v
            .as_str()
            .and_then(parse_date)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        (JsonValue::String(s), ColumnType::Text) => CellValue::Text(s.clone()),
        (other, ColumnType::Text) => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): timestamps become dates, categoricals
/// and string views become text, and narrower numeric types are widened.
/// String columns whose values are all `YYYY-MM-DD` are promoted to dates.
/// Any other Arrow type is an error naming the column.
fn load_parquet(name: &str, path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let fields: Vec<(String, DataType)> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| Ok((f.name().clone(), scalar_type(f.name(), f.data_type())?)))
        .collect::<Result<_>>()?;
    let reader = builder.build().context("building parquet reader")?;

    let mut raw: Vec<Vec<CellValue>> = vec![Vec::new(); fields.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for ((column, (field_name, target)), cells) in
            batch.columns().iter().zip(&fields).zip(raw.iter_mut())
        {
            let column = cast(column, target)
                .with_context(|| format!("converting column '{field_name}' to {target}"))?;
            for row in 0..batch.num_rows() {
                cells.push(extract_cell(&column, row));
            }
        }
    }

    let columns = fields
        .into_iter()
        .zip(raw)
        .map(|((field_name, data_type), values)| arrow_column(field_name, &data_type, values))
        .collect();

    Table::from_columns(name, columns).with_context(|| format!("building table '{name}'"))
}

/// The Arrow type a column is cast to before its cells are read.
fn scalar_type(column: &str, data_type: &DataType) -> Result<DataType> {
    Ok(match data_type {
        DataType::Float16 | DataType::Float32 | DataType::Float64 => DataType::Float64,
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64 => DataType::Int64,
        DataType::Boolean => DataType::Boolean,
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => DataType::Date32,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => DataType::Utf8,
        DataType::Dictionary(_, values) => scalar_type(column, values)?,
        other => bail!("column '{column}' has unsupported parquet type {other}"),
    })
}

/// Settle the dtype of a column read from Arrow.
fn arrow_column(name: String, data_type: &DataType, values: Vec<CellValue>) -> Column {
    match data_type {
        DataType::Float64 => Column::new(name, ColumnType::Float, values),
        DataType::Int64 => {
            if values.iter().any(CellValue::is_null) {
                let floats = values
                    .into_iter()
                    .map(|v| v.as_f64().map(CellValue::Float).unwrap_or(CellValue::Null))
                    .collect();
                Column::new(name, ColumnType::Float, floats)
            } else {
                Column::new(name, ColumnType::Integer, values)
            }
        }
        DataType::Boolean => Column::new(name, ColumnType::Bool, values),
        DataType::Date32 => Column::new(name, ColumnType::Date, values),
        _ => {
            let all_dates = values.iter().any(|v| !v.is_null())
                && values
                    .iter()
                    .all(|v| v.is_null() || v.as_str().and_then(parse_date).is_some());
            if all_dates {
                let dates = values
                    .into_iter()
                    .map(|v| {
                        v.as_str()
                            .and_then(parse_date)
                            .map(CellValue::Date)
                            .unwrap_or(CellValue::Null)
                    })
                    .collect();
                Column::new(name, ColumnType::Date, dates)
            } else {
                Column::new(name, ColumnType::Text, values)
            }
        }
    }
}

/// Extract a single cell from a column already cast by [`scalar_type`].
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        _ => CellValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
iso_code,location,date,new_cases,gdp_per_capita,icu,tests_units
FRA,France,2021-01-01,100,38605.67,,
FRA,France,2021-01-02,120,38605.67,3.5,
DEU,Germany,2021-01-01,90,45229.25,,
";

    #[test]
    fn csv_types_are_inferred_per_column() {
        let table = parse_csv("historical", CSV).unwrap();
        assert_eq!(table.len(), 3);
        let dtype = |name: &str| table.column(name).unwrap().dtype;
        assert_eq!(dtype("location"), ColumnType::Text);
        assert_eq!(dtype("date"), ColumnType::Date);
        assert_eq!(dtype("new_cases"), ColumnType::Integer);
        assert_eq!(dtype("gdp_per_capita"), ColumnType::Float);
        assert_eq!(dtype("icu"), ColumnType::Float);
        assert_eq!(dtype("tests_units"), ColumnType::Float);

        let icu = table.column("icu").unwrap();
        assert_eq!(icu.values[0], CellValue::Null);
        assert_eq!(icu.values[1], CellValue::Float(3.5));
    }

    #[test]
    fn integers_with_gaps_become_floats() {
        let table = parse_csv("t", "n\n1\n\n3\n").unwrap();
        let n = table.column("n").unwrap();
        assert_eq!(n.dtype, ColumnType::Float);
        assert_eq!(n.values, vec![CellValue::Float(1.0), CellValue::Null, CellValue::Float(3.0)]);
    }

    #[test]
    fn json_keeps_first_seen_column_order() {
        let json = r#"[
            {"location": "France", "date": "2021-01-01", "new_cases": 1},
            {"location": "Chile", "date": "2021-01-02", "new_cases": null, "continent": "South America"}
        ]"#;
        let table = parse_json("latest", json).unwrap();
        let names: Vec<&str> = table.column_names().collect();
        assert_eq!(names, vec!["location", "date", "new_cases", "continent"]);
        assert_eq!(table.column("date").unwrap().dtype, ColumnType::Date);
        assert_eq!(table.column("new_cases").unwrap().dtype, ColumnType::Float);
        assert_eq!(table.column("continent").unwrap().values[0], CellValue::Null);
    }

    #[test]
    fn format_follows_extension_and_ignores_query() {
        assert_eq!(Format::from_source("data/latest.csv").unwrap(), Format::Csv);
        assert_eq!(
            Format::from_source("https://example.org/t.json?raw=1").unwrap(),
            Format::Json
        );
        assert_eq!(Format::from_source("t.PQ").unwrap(), Format::Parquet);
        assert!(Format::from_source("t.xlsx").is_err());
    }

    #[test]
    fn ragged_csv_rows_are_rejected() {
        let err = parse_csv("t", "a,b\n1,2\n3\n").unwrap_err();
        assert!(format!("{err:#}").contains("CSV row"));
    }
}
