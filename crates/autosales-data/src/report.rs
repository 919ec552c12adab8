//! The two report modes and the four charts each one is made of.
//!
//! [`ReportSelector::build`] is a stateless dispatch: it is re-run from the
//! immutable dataset whenever the mode or the selected year changes.

use std::ops::RangeInclusive;

use autosales_core::error::{Result, SalesError};
use autosales_core::models::{Dataset, Field};
use serde::Serialize;
use tracing::{debug, warn};

use crate::aggregator::{Aggregate, SalesAggregator};

/// Years offered by the year picker when the dataset cannot supply a domain.
pub const YEAR_PICKER_RANGE: RangeInclusive<i32> = 1980..=2023;

// ── ReportMode ────────────────────────────────────────────────────────────────

/// Which report to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ReportMode {
    /// Global trends plus per-type breakdowns for one selected year.
    YearlyStatistics { year: i32 },
    /// Everything restricted to recession periods.
    RecessionStatistics,
}

impl ReportMode {
    /// Yearly statistics for the first year the dataset offers.
    pub fn initial(dataset: &Dataset) -> Self {
        ReportMode::YearlyStatistics {
            year: year_choices(dataset)[0],
        }
    }

    /// Resolve the CLI `--mode` / `--year` pair.
    pub fn from_settings(mode: &str, year: Option<i32>, dataset: &Dataset) -> Result<Self> {
        match (mode, year) {
            ("yearly", Some(year)) => Ok(ReportMode::YearlyStatistics { year }),
            ("yearly", None) => Ok(Self::initial(dataset)),
            ("recession", None) => Ok(ReportMode::RecessionStatistics),
            ("recession", Some(_)) => Err(SalesError::Config(
                "--year only applies to --mode yearly".to_string(),
            )),
            (other, _) => Err(SalesError::Config(format!("unknown report mode: {other}"))),
        }
    }

    /// Sidebar label of the mode.
    pub fn label(&self) -> &'static str {
        match self {
            ReportMode::YearlyStatistics { .. } => "Yearly Statistics",
            ReportMode::RecessionStatistics => "Recession Period Statistics",
        }
    }

    /// Heading shown above the charts.
    pub fn title(&self) -> String {
        match self {
            ReportMode::YearlyStatistics { year } => format!("Yearly Statistics for {year}"),
            ReportMode::RecessionStatistics => "Recession Period Statistics".to_string(),
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            ReportMode::YearlyStatistics { year } => Some(*year),
            ReportMode::RecessionStatistics => None,
        }
    }

    /// Switch to the other mode.  Entering yearly mode selects the initial
    /// year.
    pub fn toggled(self, dataset: &Dataset) -> Self {
        match self {
            ReportMode::YearlyStatistics { .. } => ReportMode::RecessionStatistics,
            ReportMode::RecessionStatistics => Self::initial(dataset),
        }
    }
}

/// Years the year picker offers: the dataset's observed domain, or
/// [`YEAR_PICKER_RANGE`] when the dataset has none.  Never empty.
pub fn year_choices(dataset: &Dataset) -> Vec<i32> {
    let domain = dataset.year_domain();
    if domain.is_empty() {
        YEAR_PICKER_RANGE.collect()
    } else {
        domain
    }
}

// ── Report ────────────────────────────────────────────────────────────────────

/// Suggested rendering for a chart.  Presentation is free to ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportChart {
    pub title: String,
    pub kind: ChartKind,
    pub aggregate: Aggregate,
}

impl ReportChart {
    fn new(title: impl Into<String>, kind: ChartKind, aggregate: Aggregate) -> Self {
        Self {
            title: title.into(),
            kind,
            aggregate,
        }
    }
}

/// A complete report: the mode it was built for and its four charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub mode: ReportMode,
    pub title: String,
    pub charts: Vec<ReportChart>,
}

impl Report {
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

// ── ReportSelector ────────────────────────────────────────────────────────────

/// Stateless dispatcher from a [`ReportMode`] to its [`Report`].
pub struct ReportSelector;

impl ReportSelector {
    /// Build the report for `mode`.  A schema mismatch in any chart fails the
    /// whole report.
    pub fn build(dataset: &Dataset, mode: ReportMode) -> Result<Report> {
        debug!("Building {:?} over {} records", mode, dataset.len());
        let charts = match mode {
            ReportMode::YearlyStatistics { year } => Self::yearly(dataset, year)?,
            ReportMode::RecessionStatistics => Self::recession(dataset)?,
        };
        Ok(Report {
            mode,
            title: mode.title(),
            charts,
        })
    }

    /// Annual and monthly series span the whole table; only the per-type
    /// charts are restricted to `year`.
    fn yearly(dataset: &Dataset, year: i32) -> Result<Vec<ReportChart>> {
        let annual = SalesAggregator::group_mean(dataset, Field::Year, Field::AutomobileSales)?;
        let monthly = SalesAggregator::group_mean(dataset, Field::Month, Field::AutomobileSales)?;

        let in_year = SalesAggregator::filter_by_year(dataset, year)?;
        if in_year.is_empty() {
            warn!("No records for {}; per-type charts will be empty", year);
        }
        let by_type =
            SalesAggregator::group_mean(&in_year, Field::VehicleType, Field::AutomobileSales)?;
        let ad_spend = SalesAggregator::group_sum(
            &in_year,
            Field::VehicleType,
            Field::AdvertisingExpenditure,
        )?;

        Ok(vec![
            ReportChart::new("Annual Automobile Sales", ChartKind::Line, annual),
            ReportChart::new("Monthly Automobile Sales", ChartKind::Line, monthly),
            ReportChart::new(
                format!("Vehicles Sold by Type in {year}"),
                ChartKind::Bar,
                by_type,
            ),
            ReportChart::new(
                format!("Ad Spending Share in {year}"),
                ChartKind::Pie,
                ad_spend,
            ),
        ])
    }

    fn recession(dataset: &Dataset) -> Result<Vec<ReportChart>> {
        let recession = SalesAggregator::filter_by_recession(dataset)?;

        let yearly = SalesAggregator::group_mean(&recession, Field::Year, Field::AutomobileSales)?;
        let by_type =
            SalesAggregator::group_mean(&recession, Field::VehicleType, Field::AutomobileSales)?;
        let ad_spend = SalesAggregator::group_sum(
            &recession,
            Field::VehicleType,
            Field::AdvertisingExpenditure,
        )?;
        let unemployment = SalesAggregator::group_mean_by_pair(
            &recession,
            Field::UnemploymentRate,
            Field::VehicleType,
            Field::AutomobileSales,
        )?;

        Ok(vec![
            ReportChart::new(
                "Average Automobile Sales During Recessions",
                ChartKind::Line,
                yearly,
            ),
            ReportChart::new("Sales by Vehicle Type (Recession)", ChartKind::Bar, by_type),
            ReportChart::new("Ad Spending Share (Recession)", ChartKind::Pie, ad_spend),
            ReportChart::new("Unemployment Rate vs Sales", ChartKind::Bar, unemployment),
        ])
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
