//! Save stored observations to a parquet file, one row per month.

use std::{fs::File, path::Path, sync::Arc};

use anyhow::Result;
use arrow::{
    array::{ArrayRef, Date32Array, Float64Array, Int32Array, RecordBatch, StringArray},
    datatypes::{DataType, Field, Schema},
};
use chrono::{Datelike, NaiveDate};
use parquet::{arrow::ArrowWriter, file::properties::WriterProperties};

use crate::{cli::create_progress_bar, db::ObservationRow};

const CHUNK_SIZE: usize = 100_000;

/// Days from 0001-01-01 to 1970-01-01, the Date32 epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

pub fn save_observations(observations: &[ObservationRow], file_path: &Path) -> Result<()> {
    let file = File::create(file_path)?;

    let schema = Arc::new(Schema::new(vec![
        Field::new("region", DataType::Utf8, false),
        Field::new("parameter", DataType::Utf8, false),
        Field::new("date", DataType::Date32, true),
        Field::new("year", DataType::Int32, false),
        Field::new("month", DataType::Int32, false),
        Field::new("value", DataType::Float64, false),
    ]));

    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, schema.clone(), Some(props))?;

    let pb = create_progress_bar(
        observations.len() as u64,
        "Writing parquet file chunks".to_string(),
    );

    for chunk in observations.chunks(CHUNK_SIZE) {
        let regions: Vec<&str> = chunk.iter().map(|o| o.region_code.as_str()).collect();
        let parameters: Vec<&str> = chunk.iter().map(|o| o.parameter_code.as_str()).collect();
        let dates: Vec<Option<i32>> = chunk.iter().map(|o| date32(o.year, o.month)).collect();
        let years: Vec<i32> = chunk.iter().map(|o| o.year).collect();
        let months: Vec<i32> = chunk.iter().map(|o| o.month as i32).collect();
        let values: Vec<f64> = chunk.iter().map(|o| o.value).collect();

        let columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from(regions)),
            Arc::new(StringArray::from(parameters)),
            Arc::new(Date32Array::from(dates)),
            Arc::new(Int32Array::from(years)),
            Arc::new(Int32Array::from(months)),
            Arc::new(Float64Array::from(values)),
        ];

        let batch = RecordBatch::try_new(schema.clone(), columns)?;
        writer.write(&batch)?;

        pb.inc(chunk.len() as u64);
    }

    writer.close()?;
    pb.finish_with_message("Finished writing Parquet file");

    Ok(())
}

/// The first day of the month as days since the Unix epoch.
fn date32(year: i32, month: u32) -> Option<i32> {
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
}

// -- Tests -------------------------------------------------------------------

#[cfg(test)]
mod tests {

    use chrono::Utc;
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    use super::*;

    fn row(year: i32, month: u32, value: f64) -> ObservationRow {
        ObservationRow {
            id: 1,
            region_code: "UK".to_string(),
            region_name: "United Kingdom".to_string(),
            parameter_code: "Rainfall".to_string(),
            parameter_name: "Rainfall".to_string(),
            parameter_unit: "mm".to_string(),
            year,
            month,
            value,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn should_convert_dates() {
        assert_eq!(date32(1970, 1), Some(0));
        assert_eq!(date32(1970, 2), Some(31));
        assert_eq!(date32(1969, 12), Some(-31));
        assert_eq!(date32(2000, 13), None);
    }

    #[test]
    fn should_write_observations() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("observations.parquet");
        let rows = vec![row(2023, 1, 120.4), row(2023, 2, 98.0), row(2022, 12, 143.9)];

        save_observations(&rows, &path).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(&path).unwrap())
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.collect::<Result<_, _>>().unwrap();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();

        assert_eq!(total, 3);
        assert_eq!(batches[0].schema().field(2).name(), "date");

        let values = batches[0]
            .column(5)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(values.value(2), 143.9);
    }

    #[test]
    fn should_write_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.parquet");

        save_observations(&[], &path).unwrap();

        assert!(path.exists());
    }
}
