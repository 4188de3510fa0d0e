use crate::error::Result;
use crate::structs::{CityWeatherData, round2};
use arrow_array::{Float64Array, RecordBatch, StringArray, TimestampSecondArray};
use arrow_schema::{DataType, Field, Schema, TimeUnit};
use csv::Writer;
use log::debug;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::{fs::File, path::Path, sync::Arc};

/// Writes one summary row per city to a CSV file, values rounded to 2 decimals.
///
/// # Arguments
/// * `results` - Analysis records, one per city
/// * `output_path` - Path where the CSV file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_csv(results: &[CityWeatherData], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "City",
        "Mean_Temp",
        "Min_Temp",
        "Max_Temp",
        "Trend_Time",
        "Trend_Lag",
        "Outliers",
    ])?;

    for data in results {
        writer.write_record(&[
            data.city.to_string(),
            format!("{:.2}", data.mean_temp),
            format!("{:.2}", data.min_temp),
            format!("{:.2}", data.max_temp),
            format!("{:.2}", round2(data.slope.time)),
            format!("{:.2}", round2(data.slope.lag)),
            data.outliers.len().to_string(),
        ])?;
    }

    writer.flush()?;
    debug!("Wrote {} summary rows to {}", results.len(), output_path.display());
    Ok(())
}

/// Writes the per-season mean/std table of every city to a CSV file.
///
/// An undefined std is written as `NaN`.
///
/// # Arguments
/// * `results` - Analysis records, one per city
/// * `output_path` - Path where the CSV file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or written to.
pub fn write_profile_csv(results: &[CityWeatherData], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    let mut writer = Writer::from_writer(file);

    writer.write_record(["City", "Season", "Mean", "Std"])?;
    for data in results {
        for (season, stats) in &data.season_profile {
            writer.write_record(&[
                data.city.to_string(),
                season.to_string(),
                format!("{:.2}", stats.mean),
                format!("{:.2}", stats.std),
            ])?;
        }
    }

    writer.flush()?;
    debug!("Wrote profile rows for {} cities to {}", results.len(), output_path.display());
    Ok(())
}

/// Writes the full analysis records to a pretty-formatted JSON file.
///
/// # Arguments
/// * `results` - Analysis records, one per city
/// * `output_path` - Path where the JSON file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created or serialization fails.
pub fn write_json(results: &[CityWeatherData], output_path: &Path) -> Result<()> {
    let file = File::create(output_path)?;
    serde_json::to_writer_pretty(file, results)?;
    debug!("Wrote {} records to {}", results.len(), output_path.display());
    Ok(())
}

/// Writes every city's outliers to a Parquet file for plotting.
///
/// # Arguments
/// * `results` - Analysis records, one per city
/// * `output_path` - Path where the Parquet file will be created
///
/// # Returns
/// Returns `Ok(())` on success.
///
/// # Errors
/// Returns error if file cannot be created, schema is invalid, or Arrow operations fail.
pub fn write_parquet(results: &[CityWeatherData], output_path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("city", DataType::Utf8, false),
        Field::new("timestamp", DataType::Timestamp(TimeUnit::Second, None), false),
        Field::new("season", DataType::Utf8, false),
        Field::new("temperature", DataType::Float64, false),
    ]));

    let outliers: Vec<_> = results.iter().flat_map(|r| r.outliers.iter()).collect();

    let cities = StringArray::from_iter_values(outliers.iter().map(|r| r.city.as_str()));
    let timestamps = TimestampSecondArray::from(
        outliers
            .iter()
            .map(|r| r.timestamp.and_utc().timestamp())
            .collect::<Vec<i64>>(),
    );
    let seasons = StringArray::from_iter_values(outliers.iter().map(|r| r.season.as_str()));
    let temperatures: Float64Array = outliers.iter().map(|r| r.temperature).collect();

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(cities),
            Arc::new(timestamps),
            Arc::new(seasons),
            Arc::new(temperatures),
        ],
    )?;

    let file = File::create(output_path)?;
    let props = WriterProperties::builder().build();
    let mut writer = ArrowWriter::try_new(file, schema, Some(props))?;
    writer.write(&batch)?;
    writer.close()?;
    debug!("Wrote {} outliers to {}", outliers.len(), output_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structs::{Reading, Season, SeasonProfile, SeasonStats, TrendSlope};
    use chrono::NaiveDate;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn sample() -> CityWeatherData {
        let outlier = Reading {
            city: "Berlin".to_string(),
            timestamp: NaiveDate::from_ymd_opt(2020, 2, 3)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            season: Season::Winter,
            temperature: 50.0,
        };
        CityWeatherData {
            city: "Berlin".to_string(),
            mean_temp: 5.004,
            min_temp: -1.0,
            max_temp: 50.0,
            season_profile: SeasonProfile::from([
                (Season::Winter, SeasonStats { mean: 5.0, std: 15.83 }),
                (Season::Spring, SeasonStats { mean: 9.0, std: f64::NAN }),
            ]),
            slope: TrendSlope { time: 0.123, lag: -0.456 },
            outliers: vec![outlier],
        }
    }

    #[test]
    fn summary_csv_is_rounded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        write_csv(&[sample()], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "City,Mean_Temp,Min_Temp,Max_Temp,Trend_Time,Trend_Lag,Outliers"
        );
        assert_eq!(lines.next().unwrap(), "Berlin,5.00,-1.00,50.00,0.12,-0.46,1");
    }

    #[test]
    fn profile_csv_lists_each_season() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.csv");
        write_profile_csv(&[sample()], &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let rows: Vec<_> = text.lines().skip(1).collect();
        assert_eq!(rows, vec!["Berlin,spring,9.00,NaN", "Berlin,winter,5.00,15.83"]);
    }

    #[test]
    fn profile_csv_reports_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("profile.csv");
        let err = write_profile_csv(&[sample()], &path).unwrap_err();
        assert!(matches!(err, crate::error::AnalysisError::Io(_)));
    }

    #[test]
    fn json_encodes_nan_std_as_null() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_json(&[sample()], &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(value[0]["city"], "Berlin");
        assert!(value[0]["season_profile"]["spring"]["std"].is_null());
        assert_eq!(value[0]["outliers"][0]["season"], "winter");
    }

    #[test]
    fn parquet_holds_outlier_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outliers.parquet");
        write_parquet(&[sample()], &path).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let rows: usize = reader.map(|b| b.unwrap().num_rows()).sum();
        assert_eq!(rows, 1);
    }
}
