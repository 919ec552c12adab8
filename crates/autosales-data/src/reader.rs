//! CSV loading for the historical automobile sales table.
//!
//! Parses the source file once into an immutable [`Dataset`].  Every error
//! raised here happens before the aggregation engine sees the table.

use std::io::Read;
use std::path::Path;

use autosales_core::error::{Result, SalesError};
use autosales_core::models::{Dataset, Field, Month, Record, Schema};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

/// Date layouts seen in published copies of the dataset.
const DATE_FORMATS: [&str; 3] = ["%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the dataset stored at `path`.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).map_err(|source| SalesError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = read_dataset(file)?;
    info!(
        "Loaded {} records ({} columns) from {}",
        dataset.len(),
        dataset.schema().len(),
        path.display()
    );
    Ok(dataset)
}

/// Parse CSV text from any reader.  The first row must be the header.
///
/// Unrecognised columns are ignored.  Recognised columns that are missing
/// from the header are left out of the dataset's [`Schema`].
pub fn read_dataset<R: Read>(input: R) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(input);

    let columns = resolve_columns(reader.headers()?);
    let schema = Schema::from_fields(columns.iter().flatten().copied());

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.push(parse_row(&row, &columns, line)?);
    }

    debug!("Parsed {} rows", records.len());
    Ok(Dataset::new(schema, records))
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Map each header position to the field it carries.
fn resolve_columns(headers: &StringRecord) -> Vec<Option<Field>> {
    headers
        .iter()
        .map(|name| {
            let field = Field::from_column_name(name);
            if field.is_none() {
                debug!("Ignoring unknown column {:?}", name);
            }
            field
        })
        .collect()
}

fn parse_row(row: &StringRecord, columns: &[Option<Field>], line: u64) -> Result<Record> {
    let mut record = Record::default();
    for (raw, field) in row.iter().zip(columns) {
        if let Some(field) = field {
            assign(&mut record, *field, raw, line)?;
        }
    }
    Ok(record)
}

fn invalid(field: Field, raw: &str, line: u64) -> SalesError {
    SalesError::InvalidValue {
        line,
        column: field.column_name().to_string(),
        value: raw.to_string(),
    }
}

/// Empty numeric cells become NaN and flow through aggregation unchanged.
fn parse_number(field: Field, raw: &str, line: u64) -> Result<f64> {
    if raw.is_empty() {
        return Ok(f64::NAN);
    }
    raw.parse().map_err(|_| invalid(field, raw, line))
}

fn parse_flag(field: Field, raw: &str, line: u64) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "1.0" | "true" | "yes" => Ok(true),
        "0" | "0.0" | "false" | "no" | "" => Ok(false),
        _ => Err(invalid(field, raw, line)),
    }
}

fn parse_date(field: Field, raw: &str, line: u64) -> Result<Option<NaiveDate>> {
    if raw.is_empty() {
        return Ok(None);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .map(Some)
        .ok_or_else(|| invalid(field, raw, line))
}

fn assign(record: &mut Record, field: Field, raw: &str, line: u64) -> Result<()> {
    match field {
        Field::Date => record.date = parse_date(field, raw, line)?,
        Field::Year => record.year = raw.parse().map_err(|_| invalid(field, raw, line))?,
        Field::Month => {
            record.month = raw
                .parse::<Month>()
                .map_err(|_| invalid(field, raw, line))?
        }
        Field::Recession => record.recession = parse_flag(field, raw, line)?,
        Field::ConsumerConfidence => record.consumer_confidence = parse_number(field, raw, line)?,
        Field::SeasonalityWeight => record.seasonality_weight = parse_number(field, raw, line)?,
        Field::Price => record.price = parse_number(field, raw, line)?,
        Field::AdvertisingExpenditure => {
            record.advertising_expenditure = parse_number(field, raw, line)?
        }
        Field::Competition => record.competition = parse_number(field, raw, line)?,
        Field::Gdp => record.gdp = parse_number(field, raw, line)?,
        Field::GrowthRate => record.growth_rate = parse_number(field, raw, line)?,
        Field::UnemploymentRate => record.unemployment_rate = parse_number(field, raw, line)?,
        Field::AutomobileSales => record.automobile_sales = parse_number(field, raw, line)?,
        Field::VehicleType => record.vehicle_type = raw.to_string(),
        Field::City => record.city = raw.to_string(),
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "Date,Year,Month,Recession,Consumer_Confidence,Seasonality_Weight,Price,\
Advertising_Expenditure,Competition,GDP,Growth_Rate,unemployment_rate,Automobile_Sales,Vehicle_Type,City";

    fn sample_csv() -> String {
        [
            HEADER,
            "1/31/1980,1980,Jan,1,108.24,0.5,27483.571,1558,7,60.223,0.01,5.4,456,Supperminicar,Georgia",
            "2/29/1980,1980,Feb,1,98.75,0.75,24308.678,3048,4,45.986,-0.31,4.8,555.9,Supperminicar,New York",
            "3/31/1981,1981,Mar,0,107.48,0.2,28238.443,3137,3,35.141,-0.92,3.4,620,Mediumfamilycar,Illinois",
        ]
        .join("\n")
    }

    // ── read_dataset ──────────────────────────────────────────────────────────

    #[test]
    fn test_read_dataset_full_schema() {
        let ds = read_dataset(sample_csv().as_bytes()).unwrap();

        assert_eq!(ds.len(), 3);
        assert_eq!(ds.schema(), &Schema::full());

        let first = &ds.records()[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(1980, 1, 31));
        assert_eq!(first.year, 1980);
        assert_eq!(first.month, Month::Jan);
        assert!(first.recession);
        assert_eq!(first.advertising_expenditure, 1558.0);
        assert_eq!(first.unemployment_rate, 5.4);
        assert_eq!(first.automobile_sales, 456.0);
        assert_eq!(first.vehicle_type, "Supperminicar");
        assert_eq!(first.city, "Georgia");
    }

    #[test]
    fn test_read_dataset_preserves_row_order() {
        let ds = read_dataset(sample_csv().as_bytes()).unwrap();
        let months: Vec<Month> = ds.records().iter().map(|r| r.month).collect();
        assert_eq!(months, vec![Month::Jan, Month::Feb, Month::Mar]);
    }

    #[test]
    fn test_read_dataset_partial_schema() {
        let csv = "Year,Vehicle_Type,Automobile_Sales\n2000,SUV,100\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();

        assert!(ds.schema().contains(Field::Year));
        assert!(ds.schema().contains(Field::AutomobileSales));
        assert!(!ds.schema().contains(Field::Recession));
        assert!(!ds.schema().contains(Field::AdvertisingExpenditure));
        assert_eq!(ds.schema().len(), 3);
    }

    #[test]
    fn test_read_dataset_ignores_unknown_columns_and_header_case() {
        let csv = "YEAR,Colour,automobile_sales\n1999,red,42\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.schema().len(), 2);
        assert_eq!(ds.records()[0].year, 1999);
        assert_eq!(ds.records()[0].automobile_sales, 42.0);
    }

    #[test]
    fn test_read_dataset_invalid_year_reports_line() {
        let csv = "Year,Automobile_Sales\n2000,1\n20x1,2\n";
        let err = read_dataset(csv.as_bytes()).unwrap_err();
        match err {
            SalesError::InvalidValue {
                line,
                column,
                value,
            } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Year");
                assert_eq!(value, "20x1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_read_dataset_empty_measure_is_nan() {
        let csv = "Year,Automobile_Sales\n2000,\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert!(ds.records()[0].automobile_sales.is_nan());
    }

    #[test]
    fn test_blank_cells_do_not_poison_aggregates() {
        use crate::aggregator::SalesAggregator;
        use autosales_core::models::GroupKey;

        let csv = "Year,Vehicle_Type,Automobile_Sales,Advertising_Expenditure,unemployment_rate\n\
2000,SUV,100,10,5.0\n\
2000,SUV,,20,\n\
2000,SUV,300,,5.0\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.len(), 3);

        let mean =
            SalesAggregator::group_mean(&ds, Field::VehicleType, Field::AutomobileSales).unwrap();
        assert_eq!(mean.rows[0].value, 200.0);
        assert_eq!(mean.rows[0].count, 2);

        let spend =
            SalesAggregator::group_sum(&ds, Field::VehicleType, Field::AdvertisingExpenditure)
                .unwrap();
        assert_eq!(spend.rows[0].value, 30.0);

        let pairs = SalesAggregator::group_mean_by_pair(
            &ds,
            Field::UnemploymentRate,
            Field::VehicleType,
            Field::AutomobileSales,
        )
        .unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs.value_for(&[GroupKey::Number(5.0), GroupKey::Text("SUV".into())]),
            Some(200.0)
        );
    }

    #[test]
    fn test_read_dataset_month_numbers_and_names() {
        let csv = "Year,Month\n2000,3\n2000,December\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].month, Month::Mar);
        assert_eq!(ds.records()[1].month, Month::Dec);
    }

    #[test]
    fn test_read_dataset_iso_dates() {
        let csv = "Date,Year\n2001-05-31,2001\n";
        let ds = read_dataset(csv.as_bytes()).unwrap();
        assert_eq!(ds.records()[0].date, NaiveDate::from_ymd_opt(2001, 5, 31));
    }

    #[test]
    fn test_read_dataset_rejects_bad_recession_flag() {
        let csv = "Year,Recession\n2000,maybe\n";
        assert!(matches!(
            read_dataset(csv.as_bytes()),
            Err(SalesError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_read_dataset_header_only() {
        let ds = read_dataset(HEADER.as_bytes()).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.schema(), &Schema::full());
    }

    // ── load_dataset ──────────────────────────────────────────────────────────

    #[test]
    fn test_load_dataset_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sales.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", sample_csv()).unwrap();

        let ds = load_dataset(&path).unwrap();
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.year_domain(), vec![1980, 1981]);
    }

    #[test]
    fn test_load_dataset_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.csv");
        let err = load_dataset(&path).unwrap_err();
        assert!(matches!(err, SalesError::FileRead { .. }));
        assert!(err.to_string().contains("absent.csv"));
    }
}
