use crate::error::{AnalysisError, Result};
use crate::structs::{Dataset, Reading, Season};
use arrow_array::{Array, Float64Array, RecordBatch, StringArray};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::debug;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use std::{fs::File, io::Read, path::Path};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    city: String,
    timestamp: String,
    season: String,
    temperature: f64,
}

/// Reads a dataset from a CSV or Parquet file, chosen by the `.parquet` extension.
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let is_parquet = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        read_parquet(path)
    } else {
        read_csv(path)
    }
}

/// Reads readings from a headed CSV file.
///
/// Columns are matched by name (`city`, `timestamp`, `season`, `temperature`);
/// their order does not matter and extra columns are ignored.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidSeason` for a season outside the four known
/// names and `AnalysisError::Data` for an unparsable timestamp.
pub fn read_csv(path: &Path) -> Result<Dataset> {
    debug!("Reading CSV file: {}", path.display());
    let file = File::open(path)?;
    read_csv_from(file)
}

/// Reads readings from any CSV source; see [`read_csv`].
pub fn read_csv_from<R: Read>(source: R) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(source);
    let mut readings = Vec::new();
    for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        readings.push(Reading {
            city: row.city,
            timestamp: parse_timestamp(&row.timestamp)
                .map_err(|e| AnalysisError::Data(format!("row {}: {}", line + 1, e)))?,
            season: row.season.parse::<Season>()?,
            temperature: row.temperature,
        });
    }
    debug!("Read {} readings", readings.len());
    Ok(Dataset::new(readings))
}

/// Reads readings from a Parquet file with Utf8 `city`, `timestamp`, `season`
/// columns and a Float64 `temperature` column.
///
/// # Errors
///
/// Returns `AnalysisError::Data` naming the row and column of the first null
/// cell in any of the four columns.
pub fn read_parquet(path: &Path) -> Result<Dataset> {
    debug!("Reading Parquet file: {}", path.display());
    let file = File::open(path)?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)?.build()?;

    let mut readings = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let city_col = get_column_str(&batch, "city")?;
        let timestamp_col = get_column_str(&batch, "timestamp")?;
        let season_col = get_column_str(&batch, "season")?;
        let temp_col = get_column_f64(&batch, "temperature")?;

        for i in 0..batch.num_rows() {
            let row = readings.len() + 1;
            let columns: [(&str, &dyn Array); 4] = [
                ("city", city_col),
                ("timestamp", timestamp_col),
                ("season", season_col),
                ("temperature", temp_col),
            ];
            if let Some((name, _)) = columns.iter().find(|(_, col)| col.is_null(i)) {
                return Err(AnalysisError::Data(format!("row {}: null {}", row, name)));
            }
            readings.push(Reading {
                city: city_col.value(i).to_string(),
                timestamp: parse_timestamp(timestamp_col.value(i))
                    .map_err(|e| AnalysisError::Data(format!("row {}: {}", row, e)))?,
                season: season_col.value(i).parse::<Season>()?,
                temperature: temp_col.value(i),
            });
        }
    }
    debug!("Read {} readings", readings.len());
    Ok(Dataset::new(readings))
}

/// Parses a date or date-time; a bare date is taken at midnight.
pub fn parse_timestamp(value: &str) -> std::result::Result<NaiveDateTime, String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date.and_time(chrono::NaiveTime::MIN));
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.naive_local())
        .map_err(|_| format!("unrecognized timestamp: {}", value))
}

fn get_column_f64<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AnalysisError::Data(format!("Column not found: {}", name)))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| AnalysisError::Data(format!("Column {} is not Float64", name)))
}

fn get_column_str<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| AnalysisError::Data(format!("Column not found: {}", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| AnalysisError::Data(format!("Column {} is not Utf8/String", name)))
}
