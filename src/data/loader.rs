use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Date32Type, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type,
    UInt16Type, UInt32Type, UInt64Type, UInt8Type,
};
use calamine::{open_workbook_auto, Data, DataType as _, Reader};
use chrono::{DateTime, NaiveDate};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{columns, parse_date_str, CellValue, SaleRecord, SalesDataset};
use crate::error::DataError;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first worksheet, header row first
/// * `.csv`     – header row, comma separated
/// * `.json`    – `[{ "ID_vente": ..., "Date_vente": ..., ... }, ...]`
/// * `.parquet` – flat columns, dates as Date32/Date64/Timestamp or ISO text
///
/// Every format must carry the columns listed in [`columns::REQUIRED`].
pub fn load_file(path: &Path) -> Result<SalesDataset, DataError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path)?,
        "csv" => read_csv(path)?,
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => {
            return Err(DataError::unavailable(
                path,
                format!("unsupported file extension: .{other}"),
            ))
        }
    };

    let records = records_from_table(&table)?;
    let dataset = SalesDataset::from_records(&records)?;
    log::info!(
        "Loaded {} sales from {} ({} years, {} brands)",
        dataset.len(),
        path.display(),
        dataset.years().len(),
        dataset.brands().len()
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// RawTable – what every format reader produces
// ---------------------------------------------------------------------------

/// Header names plus untyped cells, row-major.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

fn normalize_header_name(name: &str) -> String {
    // Excel CSV exports often prefix the first header with a BOM.
    name.trim().trim_start_matches('\u{feff}').trim().to_string()
}

// ---------------------------------------------------------------------------
// Schema mapping: RawTable → SaleRecord
// ---------------------------------------------------------------------------

static NULL_CELL: CellValue = CellValue::Null;

/// Column positions of every required field.
struct ColumnIndex {
    by_name: HashMap<&'static str, usize>,
}

impl ColumnIndex {
    fn resolve(headers: &[String]) -> Result<Self, DataError> {
        let positions: HashMap<String, usize> = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header_name(h), i))
            .collect();

        let mut by_name = HashMap::new();
        for &name in columns::REQUIRED.iter() {
            let idx = positions.get(name).ok_or_else(|| {
                DataError::schema(name, format!("column not found (headers: {headers:?})"))
            })?;
            by_name.insert(name, *idx);
        }
        Ok(ColumnIndex { by_name })
    }

    fn cell<'a>(&self, row: &'a [CellValue], column: &'static str) -> &'a CellValue {
        self.by_name
            .get(column)
            .and_then(|&i| row.get(i))
            .unwrap_or(&NULL_CELL)
    }
}

/// Typed accessors over one row, reporting the 1-based data row on mismatch.
struct RowReader<'a> {
    index: &'a ColumnIndex,
    cells: &'a [CellValue],
    line: usize,
}

impl RowReader<'_> {
    fn mismatch(&self, column: &'static str, expected: &str) -> DataError {
        let got = self.index.cell(self.cells, column);
        DataError::schema(column, format!("row {}: expected {expected}, got '{got}'", self.line))
    }

    fn text(&self, column: &'static str) -> Result<String, DataError> {
        self.index
            .cell(self.cells, column)
            .as_text()
            .ok_or_else(|| self.mismatch(column, "text"))
    }

    fn number(&self, column: &'static str) -> Result<f64, DataError> {
        self.index
            .cell(self.cells, column)
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or_else(|| self.mismatch(column, "a number"))
    }

    /// A satisfaction score on the 1 to 10 scale.
    fn score(&self, column: &'static str) -> Result<f64, DataError> {
        let v = self.number(column)?;
        if !(1.0..=10.0).contains(&v) {
            return Err(self.mismatch(column, "a score between 1 and 10"));
        }
        Ok(v)
    }

    fn non_negative(&self, column: &'static str) -> Result<f64, DataError> {
        let v = self.number(column)?;
        if v < 0.0 {
            return Err(self.mismatch(column, "a non-negative number"));
        }
        Ok(v)
    }

    fn count(&self, column: &'static str) -> Result<u32, DataError> {
        self.index
            .cell(self.cells, column)
            .as_i64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| self.mismatch(column, "a non-negative whole number"))
    }

    fn year(&self, column: &'static str) -> Result<i32, DataError> {
        self.index
            .cell(self.cells, column)
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .ok_or_else(|| self.mismatch(column, "a year"))
    }

    fn date(&self, column: &'static str) -> Result<NaiveDate, DataError> {
        let cell = self.index.cell(self.cells, column);
        let date = match cell {
            // Records-oriented JSON stores dates as epoch milliseconds.
            CellValue::Integer(ms) => DateTime::from_timestamp_millis(*ms).map(|dt| dt.date_naive()),
            other => other.as_date(),
        };
        date.ok_or_else(|| self.mismatch(column, "a date"))
    }
}

/// Validate every non-blank row. A table without headers (an empty sheet)
/// fails on the first required column.
fn records_from_table(table: &RawTable) -> Result<Vec<SaleRecord>, DataError> {
    let index = ColumnIndex::resolve(&table.headers)?;
    let mut records = Vec::with_capacity(table.rows.len());

    for (i, cells) in table.rows.iter().enumerate() {
        if cells.iter().all(|c| *c == CellValue::Null) {
            log::debug!("Skipping blank row {}", i + 1);
            continue;
        }
        let row = RowReader {
            index: &index,
            cells,
            line: i + 1,
        };
        records.push(SaleRecord {
            sale_id: row.text(columns::SALE_ID)?,
            sale_date: row.date(columns::SALE_DATE)?,
            brand: row.text(columns::BRAND)?,
            model: row.text(columns::MODEL)?,
            country: row.text(columns::COUNTRY)?,
            price: row.non_negative(columns::PRICE)?,
            model_year: row.year(columns::MODEL_YEAR)?,
            mileage: row.count(columns::MILEAGE)?,
            warranty_months: row.count(columns::WARRANTY)?,
            client_type: row.text(columns::CLIENT_TYPE)?,
            satisfaction: row.score(columns::SATISFACTION)?,
            discount: row.number(columns::DISCOUNT)?,
            delivery_delay_days: row.count(columns::DELIVERY_DELAY)?,
            fuel_type: row.text(columns::FUEL_TYPE)?,
        });
    }

    Ok(records)
}

// ---------------------------------------------------------------------------
// Workbook reader (xlsx, xls, ods)
// ---------------------------------------------------------------------------

fn read_workbook(path: &Path) -> Result<RawTable, DataError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DataError::unavailable(path, e))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| DataError::unavailable(path, "workbook has no worksheets"))?
        .map_err(|e| DataError::unavailable(path, e))?;

    let mut rows = range.rows();
    let headers = match rows.next() {
        Some(first) => first.iter().map(|c| workbook_cell(c).to_string()).collect(),
        None => return Ok(RawTable::default()),
    };
    let rows = rows.map(|r| r.iter().map(workbook_cell).collect()).collect();
    Ok(RawTable { headers, rows })
}

fn workbook_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| CellValue::Date(dt.date()))
            .unwrap_or(CellValue::Null),
        Data::DateTimeIso(s) => parse_date_str(s)
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::String(s.clone())),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
        Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

/// Cells stay textual; the schema mapping parses numbers and dates per column,
/// so identifiers such as "007" keep their leading zeros.
fn read_csv(path: &Path) -> Result<RawTable, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::unavailable(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| DataError::unavailable(path, format!("reading CSV headers: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result
            .map_err(|e| DataError::unavailable(path, format!("CSV row {}: {e}", row_no + 1)))?;
        rows.push(
            record
                .iter()
                .map(|v| {
                    if v.is_empty() {
                        CellValue::Null
                    } else {
                        CellValue::String(v.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "ID_vente": 1, "Date_vente": 1672531200000, "Marque": "Renault", ... },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable, DataError> {
    let text = std::fs::read_to_string(path).map_err(|e| DataError::unavailable(path, e))?;
    let root: JsonValue = serde_json::from_str(&text)
        .map_err(|e| DataError::unavailable(path, format!("parsing JSON: {e}")))?;

    let records = root
        .as_array()
        .ok_or_else(|| DataError::unavailable(path, "expected a top-level JSON array"))?;

    // Header order follows first appearance across all records.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| DataError::unavailable(path, format!("row {} is not a JSON object", i + 1)))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
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
// Parquet reader
// ---------------------------------------------------------------------------

fn read_parquet(path: &Path) -> Result<RawTable, DataError> {
    let file = File::open(path).map_err(|e| DataError::unavailable(path, e))?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| DataError::unavailable(path, format!("reading parquet metadata: {e}")))?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| DataError::unavailable(path, format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result
            .map_err(|e| DataError::unavailable(path, format!("reading parquet record batch: {e}")))?;

        let arrays = batch
            .columns()
            .iter()
            .map(normalize_temporal)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DataError::unavailable(path, format!("converting date column: {e}")))?;

        for row in 0..batch.num_rows() {
            rows.push(arrays.iter().map(|col| arrow_cell(col, row)).collect());
        }
    }

    Ok(RawTable { headers, rows })
}

// -- Parquet / Arrow helpers --

/// Cast Date64 and Timestamp columns to Date32 so only one temporal type
/// reaches [`arrow_cell`].
fn normalize_temporal(col: &ArrayRef) -> Result<ArrayRef, arrow::error::ArrowError> {
    match col.data_type() {
        DataType::Date64 | DataType::Timestamp(_, _) => cast(col, &DataType::Date32),
        _ => Ok(col.clone()),
    }
}

/// Extract a single cell from an Arrow column at a given row.
fn arrow_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row).into()),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row).into()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row).into()),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row).into()),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row).into()),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row).into()),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => CellValue::Float(col.as_primitive::<Float32Type>().value(row).into()),
        DataType::Float64 => CellValue::Float(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => col
            .as_primitive::<Date32Type>()
            .value_as_date(row)
            .map(CellValue::Date)
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;

    use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::Duration;
    use parquet::arrow::ArrowWriter;

    use super::*;
    use crate::data::model::{float_values, int_values, text_values};

    const HEADER: &str = "ID_vente,Date_vente,Marque,Modèle,Pays_vente,Prix_vente (€),Année_modèle,\
Kilométrage (km),Garantie (mois),Client_type,Score_satisfaction_client (1-10),Remise (€),\
Délai_livraison (jours),Type_carburant";

    fn sale_dates(ds: &SalesDataset) -> Vec<NaiveDate> {
        int_values(ds.frame(), columns::SALE_DATE)
            .unwrap()
            .into_iter()
            .map(|days| NaiveDate::default() + Duration::days(days.into()))
            .collect()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_and_derives_sale_year() {
        let dir = tempfile::tempdir().unwrap();
        let csv = format!(
            "\u{feff}{HEADER}\n\
             007,2021-03-04,Renault,Clio,France,15000.5,2020,12000,24,Particulier,8.5,300,10,Essence\n\
             008,2022-11-30 09:15:00,Audi,A3,Belgique,32000,2022,0,36,Professionnel,9,0,21,Diesel\n"
        );
        let path = write_file(&dir, "sales.csv", &csv);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        let frame = ds.frame();
        assert_eq!(text_values(frame, columns::SALE_ID).unwrap(), vec!["007", "008"]);
        assert_eq!(int_values(frame, columns::SALE_YEAR).unwrap(), vec![2021, 2022]);
        assert_eq!(text_values(frame, columns::MODEL).unwrap()[0], "Clio");
        assert_eq!(float_values(frame, columns::PRICE).unwrap()[0], 15000.5);
        assert_eq!(int_values(frame, columns::MILEAGE).unwrap()[0], 12000);
        assert_eq!(sale_dates(&ds)[1], ymd(2022, 11, 30));
        assert_eq!(ds.years().iter().copied().collect::<Vec<_>>(), vec![2021, 2022]);
    }

    #[test]
    fn missing_column_is_schema_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let header = HEADER.replace(",Type_carburant", "");
        let path = write_file(
            &dir,
            "sales.csv",
            &format!("{header}\n1,2021-03-04,Renault,Clio,France,1,2020,1,1,Particulier,8,0,1\n"),
        );

        match load_file(&path) {
            Err(DataError::SchemaMismatch { column, .. }) => assert_eq!(column, "Type_carburant"),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_cell_type_is_schema_mismatch_with_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sales.csv",
            &format!(
                "{HEADER}\n\
                 1,2021-03-04,Renault,Clio,France,1,2020,1,1,Particulier,8,0,1,Essence\n\
                 2,not-a-date,Renault,Clio,France,1,2020,1,1,Particulier,8,0,1,Essence\n"
            ),
        );

        let err = load_file(&path).unwrap_err();
        match &err {
            DataError::SchemaMismatch { column, detail } => {
                assert_eq!(column, "Date_vente");
                assert!(detail.contains("row 2"), "{detail}");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn negative_mileage_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sales.csv",
            &format!("{HEADER}\n1,2021-03-04,Renault,Clio,France,1,2020,-5,1,Particulier,8,0,1,Essence\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(DataError::SchemaMismatch { ref column, .. }) if column == "Kilométrage (km)"
        ));
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(&dir.path().join("STAGE.csv")).unwrap_err();
        assert!(matches!(err, DataError::DataUnavailable { .. }));
    }

    #[test]
    fn unknown_extension_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "sales.txt", "whatever");
        assert!(matches!(load_file(&path), Err(DataError::DataUnavailable { .. })));
    }

    #[test]
    fn loads_records_json_with_epoch_dates() {
        let dir = tempfile::tempdir().unwrap();
        // 2023-01-01T00:00:00Z
        let json = r#"[
            {"ID_vente": 1, "Date_vente": 1672531200000, "Marque": "Peugeot", "Modèle": "208",
             "Pays_vente": "France", "Prix_vente (€)": 18000.0, "Année_modèle": 2022,
             "Kilométrage (km)": 5000, "Garantie (mois)": 24.0, "Client_type": "Particulier",
             "Score_satisfaction_client (1-10)": 7.5, "Remise (€)": 250, "Délai_livraison (jours)": 12,
             "Type_carburant": "Essence"}
        ]"#;
        let path = write_file(&dir, "sales.json", json);

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        let frame = ds.frame();
        assert_eq!(text_values(frame, columns::SALE_ID).unwrap(), vec!["1"]);
        assert_eq!(sale_dates(&ds), vec![ymd(2023, 1, 1)]);
        assert_eq!(int_values(frame, columns::WARRANTY).unwrap(), vec![24]);
        assert_eq!(float_values(frame, columns::DISCOUNT).unwrap(), vec![250.0]);
    }

    #[test]
    fn loads_parquet_with_date32_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sales.parquet");

        let text = |v: &str| Arc::new(StringArray::from(vec![v])) as ArrayRef;
        let int = |v: i64| Arc::new(Int64Array::from(vec![v])) as ArrayRef;
        let float = |v: f64| Arc::new(Float64Array::from(vec![v])) as ArrayRef;
        let date = NaiveDate::from_ymd_opt(2020, 7, 14).unwrap();
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let days = (date - epoch).num_days() as i32;

        let mut fields = Vec::new();
        let mut arrays = Vec::new();
        for name in columns::REQUIRED {
            let array = match name {
                columns::SALE_ID => int(42),
                columns::SALE_DATE => Arc::new(Date32Array::from(vec![days])) as ArrayRef,
                columns::BRAND => text("Toyota"),
                columns::MODEL => text("Yaris"),
                columns::COUNTRY => text("Espagne"),
                columns::PRICE => float(21000.0),
                columns::MODEL_YEAR => int(2019),
                columns::MILEAGE => int(30000),
                columns::WARRANTY => int(12),
                columns::CLIENT_TYPE => text("Professionnel"),
                columns::SATISFACTION => float(6.0),
                columns::DISCOUNT => float(0.0),
                columns::DELIVERY_DELAY => int(5),
                _ => text("Hybride"),
            };
            fields.push(Field::new(name, array.data_type().clone(), false));
            arrays.push(array);
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        let frame = ds.frame();
        assert_eq!(sale_dates(&ds), vec![date]);
        assert_eq!(int_values(frame, columns::SALE_YEAR).unwrap(), vec![2020]);
        assert_eq!(text_values(frame, columns::SALE_ID).unwrap(), vec!["42"]);
        assert_eq!(text_values(frame, columns::FUEL_TYPE).unwrap(), vec!["Hybride"]);
        assert_eq!(text_values(frame, columns::CLIENT_TYPE).unwrap(), vec!["Professionnel"]);
    }

    #[test]
    fn satisfaction_outside_one_to_ten_names_the_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "sales.csv",
            &format!(
                "{HEADER}
                 1,2021-03-04,Renault,Clio,France,1,2020,1,1,Particulier,10,0,1,Essence
                 2,2021-03-05,Renault,Clio,France,1,2020,1,1,Particulier,42,0,1,Essence
"
            ),
        );

        match load_file(&path) {
            Err(DataError::SchemaMismatch { column, detail }) => {
                assert_eq!(column, columns::SATISFACTION);
                assert!(detail.contains("row 2"), "{detail}");
                assert!(detail.contains("'42'"), "{detail}");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn workbook_cells_map_dates_and_blanks() {
        let serial = Data::DateTime(ExcelDateTime::new(44927.0, ExcelDateTimeType::DateTime, false));
        assert_eq!(workbook_cell(&serial), CellValue::Date(ymd(2023, 1, 1)));
        assert_eq!(
            workbook_cell(&Data::DateTimeIso("2023-01-01T10:30:00".into())),
            CellValue::Date(ymd(2023, 1, 1))
        );
        assert_eq!(
            workbook_cell(&Data::DateTimeIso("soon".into())),
            CellValue::String("soon".into())
        );
        assert_eq!(workbook_cell(&Data::String("   ".into())), CellValue::Null);
        assert_eq!(workbook_cell(&Data::Empty), CellValue::Null);
        assert_eq!(workbook_cell(&Data::Float(24.0)), CellValue::Float(24.0));
    }

    /// One row the way calamine hands it over: numbers as floats, dates as serials.
    fn workbook_table(warranty: f64) -> RawTable {
        let row = columns::REQUIRED
            .iter()
            .map(|&name| match name {
                columns::SALE_ID => Data::Float(1.0),
                columns::SALE_DATE => Data::DateTime(ExcelDateTime::new(44927.0, ExcelDateTimeType::DateTime, false)),
                columns::BRAND => Data::String("Renault".into()),
                columns::MODEL => Data::String("Clio".into()),
                columns::COUNTRY => Data::String("France".into()),
                columns::PRICE => Data::Float(18_990.0),
                columns::MODEL_YEAR => Data::Float(2022.0),
                columns::MILEAGE => Data::Float(15_000.0),
                columns::WARRANTY => Data::Float(warranty),
                columns::CLIENT_TYPE => Data::String("Particulier".into()),
                columns::SATISFACTION => Data::Float(8.0),
                columns::DISCOUNT => Data::Int(500),
                columns::DELIVERY_DELAY => Data::Float(7.0),
                _ => Data::String("Essence".into()),
            })
            .map(|cell| workbook_cell(&cell))
            .collect();
        RawTable {
            headers: columns::REQUIRED.iter().map(|h| h.to_string()).collect(),
            rows: vec![row],
        }
    }

    #[test]
    fn workbook_floats_fill_integer_columns() {
        let records = records_from_table(&workbook_table(24.0)).unwrap();
        let r = &records[0];
        assert_eq!(r.sale_id, "1");
        assert_eq!(r.sale_date, ymd(2023, 1, 1));
        assert_eq!(r.model_year, 2022);
        assert_eq!(r.mileage, 15_000);
        assert_eq!(r.warranty_months, 24);
        assert_eq!(r.delivery_delay_days, 7);
        assert_eq!(r.discount, 500.0);
    }

    #[test]
    fn fractional_workbook_count_is_rejected() {
        match records_from_table(&workbook_table(24.5)) {
            Err(DataError::SchemaMismatch { column, detail }) => {
                assert_eq!(column, columns::WARRANTY);
                assert!(detail.contains("row 1"), "{detail}");
            }
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn empty_sheet_misses_every_column() {
        match records_from_table(&RawTable::default()) {
            Err(DataError::SchemaMismatch { column, .. }) => assert_eq!(column, columns::SALE_ID),
            other => panic!("expected schema mismatch, got {other:?}"),
        }
    }

    #[test]
    fn sample_generator_writes_the_required_headers() {
        let source = include_str!("../bin/generate_sample.rs");
        let block = source
            .split("const HEADERS")
            .nth(1)
            .and_then(|rest| rest.split("];").next())
            .unwrap();
        let headers: Vec<&str> = block.split('"').skip(1).step_by(2).collect();
        assert_eq!(headers, columns::REQUIRED);
    }
}
