use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Builder, Int64Builder, StringBuilder};
use arrow::datatypes::Schema;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use csv::ReaderBuilder;
use gd_core::data::DataSource;
use tracing::{debug, info};

use crate::schema::{gapminder_schema, ColumnLayout};
use crate::DataError;

// Positions inside the schema built by `gapminder_schema`
const COUNTRY: usize = 0;
const CONTINENT: usize = 1;
const YEAR: usize = 2;
const LIFE_EXP: usize = 3;
const POPULATION: usize = 4;
const GDP_CAP: usize = 5;
const ISO_ALPHA: usize = 6;

/// CSV data source holding the whole GapMinder table in memory
pub struct CsvSource {
    name: String,
    schema: Arc<Schema>,
    batch: RecordBatch,
}

impl CsvSource {
    /// Read the CSV file at `path`. The file is parsed on a blocking thread.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DataError> {
        let path = path.into();
        let batch = tokio::task::spawn_blocking({
            let path = path.clone();
            move || read_file(&path)
        })
        .await??;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!("Loaded {} rows from {}", batch.num_rows(), path.display());

        Ok(Self {
            name,
            schema: batch.schema(),
            batch,
        })
    }
}

#[async_trait]
impl DataSource for CsvSource {
    async fn schema(&self) -> Arc<Schema> {
        self.schema.clone()
    }

    async fn query_all(&self) -> anyhow::Result<RecordBatch> {
        Ok(self.batch.clone())
    }

    async fn row_count(&self) -> anyhow::Result<usize> {
        Ok(self.batch.num_rows())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

fn read_file(path: &Path) -> Result<RecordBatch, DataError> {
    let file = File::open(path)?;
    read_table(BufReader::new(file))
}

/// Parse GapMinder CSV from any reader into a batch with [`gapminder_schema`].
///
/// Empty numeric cells become nulls. A year that is not an integer, or a
/// measure that is not a number, is rejected with its line number.
pub fn read_table<R: Read>(reader: R) -> Result<RecordBatch, DataError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let layout = ColumnLayout::from_headers(headers.iter())?;
    let schema = gapminder_schema();
    let column_name = |idx: usize| schema.field(idx).name().clone();

    let mut country = StringBuilder::new();
    let mut continent = StringBuilder::new();
    let mut year = Int64Builder::new();
    let mut life_exp = Float64Builder::new();
    let mut population = Float64Builder::new();
    let mut gdp_cap = Float64Builder::new();
    let mut iso_alpha = StringBuilder::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let cell = |idx: usize| record.get(layout.positions[idx]).unwrap_or("");

        country.append_value(cell(COUNTRY));
        continent.append_value(cell(CONTINENT));

        let raw_year = cell(YEAR);
        let parsed_year = parse_year(raw_year).ok_or_else(|| DataError::InvalidValue {
            column: column_name(YEAR),
            value: raw_year.to_string(),
            line,
        })?;
        year.append_value(parsed_year);

        for (idx, builder) in [
            (LIFE_EXP, &mut life_exp),
            (POPULATION, &mut population),
            (GDP_CAP, &mut gdp_cap),
        ] {
            let raw = cell(idx);
            if raw.is_empty() {
                builder.append_null();
                continue;
            }
            let value = raw.parse::<f64>().map_err(|_| DataError::InvalidValue {
                column: column_name(idx),
                value: raw.to_string(),
                line,
            })?;
            builder.append_value(value);
        }

        let iso = cell(ISO_ALPHA);
        if iso.is_empty() {
            iso_alpha.append_null();
        } else {
            iso_alpha.append_value(iso);
        }
    }

    let columns: Vec<ArrayRef> = vec![
        Arc::new(country.finish()),
        Arc::new(continent.finish()),
        Arc::new(year.finish()),
        Arc::new(life_exp.finish()),
        Arc::new(population.finish()),
        Arc::new(gdp_cap.finish()),
        Arc::new(iso_alpha.finish()),
    ];

    let batch = RecordBatch::try_new(Arc::new(schema), columns)?;
    debug!("Parsed {} CSV records", batch.num_rows());
    Ok(batch)
}

/// Years are integers; "1952.0" is accepted, "1952.5" is not
fn parse_year(raw: &str) -> Option<i64> {
    if let Ok(year) = raw.parse::<i64>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    (value.is_finite() && value.fract() == 0.0).then_some(value as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Array, Float64Array, Int64Array, StringArray};
    use std::io::Cursor;

    #[test]
    fn test_read_table_columns_any_order() {
        let data = "\
year,extra,iso_alpha,country,continent,population,gdp_cap,life_exp
1952,x,AFG,Afghanistan,Asia,8425333,779.4453145,28.801
1962,y,AGO,Angola,Africa,4826015,4269.276742,34.0
";
        let batch = read_table(Cursor::new(data)).unwrap();
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 7);

        let country = batch.column(COUNTRY).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(country.value(1), "Angola");
        let year = batch.column(YEAR).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(year.value(0), 1952);
        let life = batch.column(LIFE_EXP).as_any().downcast_ref::<Float64Array>().unwrap();
        assert!((life.value(0) - 28.801).abs() < 1e-9);
    }

    #[test]
    fn test_read_table_missing_column() {
        let data = "country,continent,year,life_exp,population,gdp_cap\nA,Asia,1952,1,2,3\n";
        let err = read_table(Cursor::new(data)).unwrap_err();
        assert!(matches!(err, DataError::MissingColumn(ref c) if c == "iso_alpha"));
    }

    #[test]
    fn test_read_table_non_numeric_year() {
        let data = "\
country,continent,year,life_exp,population,gdp_cap,iso_alpha
Afghanistan,Asia,1952,28.8,8425333,779.4,AFG
Albania,Europe,soon,55.2,1282697,1601.0,ALB
";
        let err = read_table(Cursor::new(data)).unwrap_err();
        match err {
            DataError::InvalidValue { column, value, line } => {
                assert_eq!(column, "year");
                assert_eq!(value, "soon");
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_table_empty_measure_is_null() {
        let data = "\
country,continent,year,life_exp,population,gdp_cap,iso_alpha
Afghanistan,Asia,1952.0,,8425333,779.4,
";
        let batch = read_table(Cursor::new(data)).unwrap();
        assert!(batch.column(LIFE_EXP).is_null(0));
        assert!(batch.column(ISO_ALPHA).is_null(0));
        let year = batch.column(YEAR).as_any().downcast_ref::<Int64Array>().unwrap();
        assert_eq!(year.value(0), 1952);
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2007"), Some(2007));
        assert_eq!(parse_year("2007.0"), Some(2007));
        assert_eq!(parse_year("2007.5"), None);
        assert_eq!(parse_year(""), None);
    }

    #[tokio::test]
    async fn test_open_file() {
        let path = std::env::temp_dir().join(format!("gapdash-csv-{}.csv", std::process::id()));
        std::fs::write(
            &path,
            "country,continent,year,life_exp,population,gdp_cap,iso_alpha\nAlbania,Europe,2007,76.4,3600523,5937.0,ALB\n",
        )
        .unwrap();

        let source = CsvSource::open(&path).await.unwrap();
        assert_eq!(source.row_count().await.unwrap(), 1);
        assert_eq!(source.schema().await.fields().len(), 7);
        assert!(source.source_name().starts_with("gapdash-csv-"));

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_open_missing_file() {
        let err = CsvSource::open("/nonexistent/gapminder.csv").await.err().unwrap();
        assert!(matches!(err, DataError::Io(_)));
    }
}
