use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::{Result, SalesError};

// ── Month ─────────────────────────────────────────────────────────────────────

/// Calendar month.  Ordering follows the calendar, not the label.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Month {
    #[default]
    Jan = 1,
    Feb,
    Mar,
    Apr,
    May,
    Jun,
    Jul,
    Aug,
    Sep,
    Oct,
    Nov,
    Dec,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::Jan,
        Month::Feb,
        Month::Mar,
        Month::Apr,
        Month::May,
        Month::Jun,
        Month::Jul,
        Month::Aug,
        Month::Sep,
        Month::Oct,
        Month::Nov,
        Month::Dec,
    ];

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self as u32
    }

    /// Month for a 1-based number, `None` outside 1..=12.
    pub fn from_number(n: u32) -> Option<Month> {
        n.checked_sub(1)
            .and_then(|i| Month::ALL.get(i as usize))
            .copied()
    }

    /// Three-letter label as used in the source CSV.
    pub fn abbreviation(self) -> &'static str {
        match self {
            Month::Jan => "Jan",
            Month::Feb => "Feb",
            Month::Mar => "Mar",
            Month::Apr => "Apr",
            Month::May => "May",
            Month::Jun => "Jun",
            Month::Jul => "Jul",
            Month::Aug => "Aug",
            Month::Sep => "Sep",
            Month::Oct => "Oct",
            Month::Nov => "Nov",
            Month::Dec => "Dec",
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for Month {
    type Err = String;

    /// Accepts `"Jan"`, `"january"`, `"JAN"` or `"1"`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Ok(n) = trimmed.parse::<u32>() {
            return Month::from_number(n).ok_or_else(|| format!("month out of range: {n}"));
        }
        let lower = trimmed.to_ascii_lowercase();
        Month::ALL
            .into_iter()
            .find(|m| {
                let abbr = m.abbreviation().to_ascii_lowercase();
                lower.len() >= 3 && lower.starts_with(&abbr) && full_name(*m).starts_with(&lower)
            })
            .ok_or_else(|| format!("unknown month: {trimmed}"))
    }
}

fn full_name(m: Month) -> &'static str {
    match m {
        Month::Jan => "january",
        Month::Feb => "february",
        Month::Mar => "march",
        Month::Apr => "april",
        Month::May => "may",
        Month::Jun => "june",
        Month::Jul => "july",
        Month::Aug => "august",
        Month::Sep => "september",
        Month::Oct => "october",
        Month::Nov => "november",
        Month::Dec => "december",
    }
}

// ── Record ────────────────────────────────────────────────────────────────────

/// One row of the historical automobile sales table.
///
/// Every attribute is always populated; columns missing from the source file
/// hold their default and are reported absent by the dataset's [`Schema`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub date: Option<NaiveDate>,
    pub year: i32,
    pub month: Month,
    /// Whether the row falls inside a recession period.
    pub recession: bool,
    pub consumer_confidence: f64,
    pub seasonality_weight: f64,
    pub price: f64,
    /// Advertising spend, in currency units.
    pub advertising_expenditure: f64,
    pub competition: f64,
    pub gdp: f64,
    pub growth_rate: f64,
    /// Unemployment rate in percent.
    pub unemployment_rate: f64,
    /// Units sold.
    pub automobile_sales: f64,
    pub vehicle_type: String,
    pub city: String,
}

// ── Field ─────────────────────────────────────────────────────────────────────

/// A named column of the sales table, usable as a grouping key or a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Date,
    Year,
    Month,
    Recession,
    ConsumerConfidence,
    SeasonalityWeight,
    Price,
    AdvertisingExpenditure,
    Competition,
    Gdp,
    GrowthRate,
    UnemploymentRate,
    AutomobileSales,
    VehicleType,
    City,
}

impl Field {
    pub const ALL: [Field; 15] = [
        Field::Date,
        Field::Year,
        Field::Month,
        Field::Recession,
        Field::ConsumerConfidence,
        Field::SeasonalityWeight,
        Field::Price,
        Field::AdvertisingExpenditure,
        Field::Competition,
        Field::Gdp,
        Field::GrowthRate,
        Field::UnemploymentRate,
        Field::AutomobileSales,
        Field::VehicleType,
        Field::City,
    ];

    /// Header spelling in the source CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Date => "Date",
            Field::Year => "Year",
            Field::Month => "Month",
            Field::Recession => "Recession",
            Field::ConsumerConfidence => "Consumer_Confidence",
            Field::SeasonalityWeight => "Seasonality_Weight",
            Field::Price => "Price",
            Field::AdvertisingExpenditure => "Advertising_Expenditure",
            Field::Competition => "Competition",
            Field::Gdp => "GDP",
            Field::GrowthRate => "Growth_Rate",
            Field::UnemploymentRate => "unemployment_rate",
            Field::AutomobileSales => "Automobile_Sales",
            Field::VehicleType => "Vehicle_Type",
            Field::City => "City",
        }
    }

    /// Resolve a CSV header (case-insensitive, surrounding whitespace ignored).
    pub fn from_column_name(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.column_name().eq_ignore_ascii_case(name))
    }

    /// Whether the field can be reduced with mean/sum.
    pub fn is_numeric(self) -> bool {
        !matches!(
            self,
            Field::Date | Field::Month | Field::Recession | Field::VehicleType | Field::City
        )
    }

    /// Ordinal keys are emitted in ascending order; categorical keys keep
    /// first-seen order.
    pub fn is_ordinal(self) -> bool {
        !matches!(self, Field::Recession | Field::VehicleType | Field::City)
    }

    /// Numeric value of the field for `record`, `None` for non-numeric fields.
    pub fn numeric_value(self, record: &Record) -> Option<f64> {
        let value = match self {
            Field::Year => f64::from(record.year),
            Field::ConsumerConfidence => record.consumer_confidence,
            Field::SeasonalityWeight => record.seasonality_weight,
            Field::Price => record.price,
            Field::AdvertisingExpenditure => record.advertising_expenditure,
            Field::Competition => record.competition,
            Field::Gdp => record.gdp,
            Field::GrowthRate => record.growth_rate,
            Field::UnemploymentRate => record.unemployment_rate,
            Field::AutomobileSales => record.automobile_sales,
            Field::Date | Field::Month | Field::Recession | Field::VehicleType | Field::City => {
                return None
            }
        };
        Some(value)
    }

    /// Grouping key of the field for `record`.
    pub fn key_value(self, record: &Record) -> GroupKey {
        match self {
            Field::Date => record
                .date
                .map(GroupKey::Date)
                .unwrap_or_else(|| GroupKey::Text(String::new())),
            Field::Year => GroupKey::Year(record.year),
            Field::Month => GroupKey::Month(record.month),
            Field::Recession => GroupKey::Flag(record.recession),
            Field::VehicleType => GroupKey::Text(record.vehicle_type.clone()),
            Field::City => GroupKey::Text(record.city.clone()),
            numeric => GroupKey::Number(numeric.numeric_value(record).unwrap_or_default()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

// ── GroupKey ──────────────────────────────────────────────────────────────────

/// One grouping-key value.
///
/// `Number` compares and hashes by bit pattern (with `-0.0` folded into
/// `0.0`) so float-valued columns can partition records.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Year(i32),
    Month(Month),
    Date(NaiveDate),
    Number(f64),
    Flag(bool),
    Text(String),
}

impl GroupKey {
    fn rank(&self) -> u8 {
        match self {
            GroupKey::Year(_) => 0,
            GroupKey::Month(_) => 1,
            GroupKey::Date(_) => 2,
            GroupKey::Number(_) => 3,
            GroupKey::Flag(_) => 4,
            GroupKey::Text(_) => 5,
        }
    }

    fn number_bits(n: f64) -> u64 {
        if n == 0.0 {
            0.0f64.to_bits()
        } else {
            n.to_bits()
        }
    }

    /// Numeric position for plotting; `None` for categorical keys.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            GroupKey::Year(y) => Some(f64::from(*y)),
            GroupKey::Month(m) => Some(f64::from(m.number())),
            GroupKey::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            GroupKey::Year(y) => y.hash(state),
            GroupKey::Month(m) => m.hash(state),
            GroupKey::Date(d) => d.hash(state),
            GroupKey::Number(n) => Self::number_bits(*n).hash(state),
            GroupKey::Flag(b) => b.hash(state),
            GroupKey::Text(s) => s.hash(state),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (GroupKey::Year(a), GroupKey::Year(b)) => a.cmp(b),
            (GroupKey::Month(a), GroupKey::Month(b)) => a.cmp(b),
            (GroupKey::Date(a), GroupKey::Date(b)) => a.cmp(b),
            (GroupKey::Number(a), GroupKey::Number(b)) => {
                if Self::number_bits(*a) == Self::number_bits(*b) {
                    Ordering::Equal
                } else {
                    a.total_cmp(b)
                }
            }
            (GroupKey::Flag(a), GroupKey::Flag(b)) => a.cmp(b),
            (GroupKey::Text(a), GroupKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Year(y) => write!(f, "{y}"),
            GroupKey::Month(m) => write!(f, "{m}"),
            GroupKey::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            GroupKey::Number(n) => write!(f, "{n}"),
            GroupKey::Flag(b) => f.write_str(if *b { "1" } else { "0" }),
            GroupKey::Text(s) => f.write_str(s),
        }
    }
}

// ── Schema ────────────────────────────────────────────────────────────────────

/// The set of columns present in a loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Schema {
    fields: BTreeSet<Field>,
}

impl Schema {
    /// Schema with every known column present.
    pub fn full() -> Self {
        Self::from_fields(Field::ALL)
    }

    pub fn from_fields(fields: impl IntoIterator<Item = Field>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }

    /// Fail with [`SalesError::SchemaMismatch`] when `field` is absent.
    pub fn require(&self, field: Field) -> Result<()> {
        if self.contains(field) {
            Ok(())
        } else {
            Err(SalesError::missing_field(field))
        }
    }

    /// As [`Schema::require`], additionally rejecting non-numeric fields.
    pub fn require_measure(&self, field: Field) -> Result<()> {
        self.require(field)?;
        if field.is_numeric() {
            Ok(())
        } else {
            Err(SalesError::not_a_measure(field))
        }
    }

    /// Present columns in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.fields.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// An immutable, ordered table of records together with its schema.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    schema: Schema,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(schema: Schema, records: Vec<Record>) -> Self {
        Self { schema, records }
    }

    /// Dataset whose schema lists every column.  Mostly useful in tests and
    /// for records built in code.
    pub fn from_records(records: Vec<Record>) -> Self {
        Self::new(Schema::full(), records)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Records in insertion order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Order-preserving subsequence of records matching `predicate`, sharing
    /// this dataset's schema.
    pub fn retain_where(&self, predicate: impl Fn(&Record) -> bool) -> Dataset {
        Dataset {
            schema: self.schema.clone(),
            records: self
                .records
                .iter()
                .filter(|r| predicate(r))
                .cloned()
                .collect(),
        }
    }

    /// Distinct years in ascending order.  Empty when the year column is
    /// absent.
    pub fn year_domain(&self) -> Vec<i32> {
        if !self.schema.contains(Field::Year) {
            return Vec::new();
        }
        let years: BTreeSet<i32> = self.records.iter().map(|r| r.year).collect();
        years.into_iter().collect()
    }
}
