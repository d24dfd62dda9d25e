use std::path::Path;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{Data, DataType as _, Reader, open_workbook_auto};
use chrono::NaiveDateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, first row is the header
/// * `.csv`     – header row, cell types guessed
/// * `.json`    – `[{ "col": value, ... }, ...]`
/// * `.parquet` – scalar columns
pub fn load_file(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_workbook(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

/// Extensions accepted by [`load_file`], for the open dialog.
pub const SUPPORTED_EXTENSIONS: &[&str] =
    &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"];

/// Text spellings read as a missing value in CSV and workbook cells.
const NA_VALUES: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Format of date/time cells, e.g. `2024-01-01 00:00:00`.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn is_na(s: &str) -> bool {
    NA_VALUES.contains(&s)
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

fn load_workbook(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).context("opening workbook")?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .context("Workbook has no worksheets")?;
    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading worksheet '{sheet}'"))?;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header) => header
            .iter()
            .map(|cell| excel_to_cell(cell).to_text().unwrap_or_default())
            .collect(),
        None => Vec::new(),
    };
    let body: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(excel_to_cell).collect())
        .collect();

    log::debug!("Worksheet '{sheet}': {} columns, {} rows", headers.len(), body.len());
    Ok(Table::new(headers, body))
}

fn excel_to_cell(cell: &Data) -> CellValue {
    match cell {
        Data::String(s) if s.trim().is_empty() || is_na(s.trim()) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Integer(*i),
        // Excel stores every number as a float; whole values read back as integers.
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) if !f.is_finite() => CellValue::Null,
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::Date(cell.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            let datetime = cell
                .as_datetime()
                .or_else(|| cell.as_date().and_then(|d| d.and_hms_opt(0, 0, 0)));
            match datetime {
                Some(dt) => CellValue::Date(format_datetime(dt)),
                None => CellValue::Date(cell.to_string()),
            }
        }
        Data::DurationIso(_) => CellValue::Date(cell.to_string()),
        Data::Error(_) | Data::Empty => CellValue::Null,
    }
}

fn format_datetime(dt: NaiveDateTime) -> String {
    dt.format(DATETIME_FORMAT).to_string()
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per row.
/// Records may be ragged; missing trailing cells are `Null`.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Ok(Table::new(headers, rows))
}

/// Blank cells and NA spellings are `Null`; `inf` and friends stay text.
fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() || is_na(s) {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::String(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "内容": "项目 进度 正常", "负责人": "李四" },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; keys missing from a record are `Null`.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(Table::new(headers, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.trim().is_empty() => CellValue::Null,
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                finite(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file written by **Pandas** (`df.to_parquet()`) or
/// **Polars** (`df.write_parquet()`).
///
/// Strings, integers, floats and booleans map to their cell types; dates and
/// timestamps keep their formatted text; anything else is shown as text.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| arrow_to_cell(col.as_ref(), row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row}"))?;
            rows.push(cells);
        }
    }

    Ok(Table::new(headers, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_to_cell(col: &dyn Array, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => finite(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => finite(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 | DataType::Date64 | DataType::Timestamp(_, _) => {
            CellValue::Date(array_value_to_string(col, row)?)
        }
        _ => CellValue::String(array_value_to_string(col, row)?),
    };
    Ok(value)
}

/// Pandas writes missing floats as NaN.
fn finite(f: f64) -> CellValue {
    if f.is_finite() {
        CellValue::Float(f)
    } else {
        CellValue::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn loads_csv_with_guessed_types() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "内容,负责人,工时,完成").unwrap();
        writeln!(file, "项目 进度 正常,李四,8,true").unwrap();
        writeln!(file, "项目 延期 风险,,2.5").unwrap();
        drop(file);

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), &["内容", "负责人", "工时", "完成"]);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.rows()[0],
            vec![s("项目 进度 正常"), s("李四"), CellValue::Integer(8), CellValue::Bool(true)]
        );
        assert_eq!(
            table.rows()[1],
            vec![s("项目 延期 风险"), CellValue::Null, CellValue::Float(2.5), CellValue::Null]
        );
    }

    #[test]
    fn loads_json_records_in_first_appearance_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(
            &path,
            r#"[{"内容": "项目 完成 顺利", "负责人": "王五"},
                {"负责人": null, "内容": "需求 变更", "优先级": 1}]"#,
        )
        .unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), &["内容", "负责人", "优先级"]);
        assert_eq!(table.rows()[0][2], CellValue::Null);
        assert_eq!(table.rows()[1], vec![s("需求 变更"), CellValue::Null, CellValue::Integer(1)]);
    }

    #[test]
    fn json_must_be_an_array_of_objects() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, r#"{"内容": "x"}"#).unwrap();
        assert!(load_file(&path).is_err());
    }

    #[test]
    fn rejects_unknown_extension() {
        let err = load_file(Path::new("notes.docx")).unwrap_err();
        assert!(err.to_string().contains(".docx"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_file(&dir.path().join("absent.xlsx")).is_err());
    }

    #[test]
    fn excel_cells_map_to_cell_values() {
        assert_eq!(excel_to_cell(&Data::Float(3.0)), CellValue::Integer(3));
        assert_eq!(excel_to_cell(&Data::Float(0.5)), CellValue::Float(0.5));
        assert_eq!(excel_to_cell(&Data::Empty), CellValue::Null);
        assert_eq!(excel_to_cell(&Data::String("  ".into())), CellValue::Null);
        assert_eq!(excel_to_cell(&Data::String("风险".into())), s("风险"));
        assert_eq!(excel_to_cell(&Data::String("NA".into())), CellValue::Null);
        assert_eq!(excel_to_cell(&Data::Float(f64::NAN)), CellValue::Null);
    }

    #[test]
    fn excel_dates_are_formatted_not_serials() {
        use calamine::{ExcelDateTime, ExcelDateTimeType};

        let new_year = Data::DateTime(ExcelDateTime::new(45292.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(excel_to_cell(&new_year), CellValue::Date("2024-01-01 00:00:00".into()));

        let afternoon = Data::DateTime(ExcelDateTime::new(45292.75, ExcelDateTimeType::DateTime, false));
        assert_eq!(excel_to_cell(&afternoon), CellValue::Date("2024-01-01 18:00:00".into()));

        let iso = Data::DateTimeIso("2024-03-05".into());
        assert_eq!(excel_to_cell(&iso), CellValue::Date("2024-03-05 00:00:00".into()));
    }

    #[test]
    fn csv_na_spellings_are_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.csv");
        std::fs::write(&path, "内容,负责人\nNaN,张三\n项目,NA\nnull,N/A\ninf,李四\n").unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.rows()[0], vec![CellValue::Null, s("张三")]);
        assert_eq!(table.rows()[1], vec![s("项目"), CellValue::Null]);
        assert_eq!(table.rows()[2], vec![CellValue::Null, CellValue::Null]);
        assert_eq!(table.rows()[3], vec![s("inf"), s("李四")]);
    }

    #[test]
    fn loads_parquet_written_by_arrow() {
        use std::sync::Arc;

        use arrow::array::{ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let schema = Arc::new(Schema::new(vec![
            Field::new("内容", DataType::Utf8, true),
            Field::new("工时", DataType::Int64, false),
            Field::new("得分", DataType::Float64, false),
            Field::new("完成", DataType::Boolean, false),
            Field::new("日期", DataType::Date32, false),
        ]));
        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(vec![Some("项目 进度 正常"), None])),
            Arc::new(Int64Array::from(vec![8, 3])),
            Arc::new(Float64Array::from(vec![2.5, f64::NAN])),
            Arc::new(BooleanArray::from(vec![true, false])),
            Arc::new(Date32Array::from(vec![19723, 19724])),
        ];
        let batch = RecordBatch::try_new(schema.clone(), columns).unwrap();

        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), &["内容", "工时", "得分", "完成", "日期"]);
        assert_eq!(
            table.rows()[0],
            vec![
                s("项目 进度 正常"),
                CellValue::Integer(8),
                CellValue::Float(2.5),
                CellValue::Bool(true),
                CellValue::Date("2024-01-01".into()),
            ]
        );
        assert_eq!(table.rows()[1][0], CellValue::Null);
        assert_eq!(table.rows()[1][2], CellValue::Null);
    }

    #[test]
    fn loads_first_worksheet_of_a_workbook() {
        use rust_xlsxwriter::{ExcelDateTime as XlsxDate, Format, Workbook};

        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, name) in ["内容", "负责人", "工时", "日期"].into_iter().enumerate() {
            sheet.write_string(0, col as u16, name).unwrap();
        }
        sheet.write_string(1, 0, "项目 进度 正常").unwrap();
        sheet.write_string(1, 1, "李四").unwrap();
        sheet.write_number(1, 2, 8).unwrap();
        let date_format = Format::new().set_num_format("yyyy-mm-dd");
        let date = XlsxDate::from_ymd(2024, 1, 1).unwrap();
        sheet.write_datetime_with_format(1, 3, &date, &date_format).unwrap();
        sheet.write_string(2, 0, "项目 延期 风险").unwrap();
        sheet.write_string(2, 1, "NA").unwrap();
        sheet.write_number(2, 2, 2.5).unwrap();
        workbook.add_worksheet().write_string(0, 0, "ignored").unwrap();
        workbook.save(&path).unwrap();

        let table = load_file(&path).unwrap();
        assert_eq!(table.columns(), &["内容", "负责人", "工时", "日期"]);
        assert_eq!(
            table.rows()[0],
            vec![
                s("项目 进度 正常"),
                s("李四"),
                CellValue::Integer(8),
                CellValue::Date("2024-01-01 00:00:00".into()),
            ]
        );
        assert_eq!(
            table.rows()[1],
            vec![s("项目 延期 风险"), CellValue::Null, CellValue::Float(2.5), CellValue::Null]
        );
    }
}
