//! Per-session report state with memoisation.
//!
//! A [`ReportSession`] holds a shared, read-only [`Dataset`] plus the
//! currently selected [`ReportMode`].  Built reports are cached by mode (the
//! mode carries the selected year), which is sound because the dataset never
//! changes after load.  Several sessions may share one dataset through the
//! `Arc`; each keeps its own cache.

use std::collections::HashMap;
use std::sync::Arc;

use autosales_core::error::Result;
use autosales_core::models::Dataset;
use autosales_data::report::{year_choices, Report, ReportMode, ReportSelector};

pub struct ReportSession {
    dataset: Arc<Dataset>,
    mode: ReportMode,
    /// Year picker options, fixed for the session.
    years: Vec<i32>,
    cache: HashMap<ReportMode, Report>,
    /// Number of reports actually built (cache misses).
    builds: usize,
    last_error: Option<String>,
}

impl ReportSession {
    /// Start in the initial mode: yearly statistics for the first year.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        let mode = ReportMode::initial(&dataset);
        Self::with_mode(dataset, mode)
    }

    pub fn with_mode(dataset: Arc<Dataset>, mode: ReportMode) -> Self {
        let years = year_choices(&dataset);
        tracing::info!(
            records = dataset.len(),
            years = years.len(),
            "report session started in {}",
            mode.label()
        );
        Self {
            dataset,
            mode,
            years,
            cache: HashMap::new(),
            builds: 0,
            last_error: None,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn mode(&self) -> ReportMode {
        self.mode
    }

    pub fn year_choices(&self) -> &[i32] {
        &self.years
    }

    /// How many reports were built rather than served from the cache.
    pub fn build_count(&self) -> usize {
        self.builds
    }

    pub fn cached_reports(&self) -> usize {
        self.cache.len()
    }

    /// Description of the last failed build, cleared by the next success.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // ── Parameter changes ─────────────────────────────────────────────────

    pub fn set_mode(&mut self, mode: ReportMode) {
        if mode != self.mode {
            tracing::debug!("mode changed: {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Switch between yearly and recession statistics.
    pub fn toggle_mode(&mut self) {
        let next = self.mode.toggled(&self.dataset);
        self.set_mode(next);
    }

    /// Select the next later year.  Stops at the last year; ignored outside
    /// yearly mode.
    pub fn select_next_year(&mut self) {
        if let ReportMode::YearlyStatistics { year } = self.mode {
            let idx = match self.years.binary_search(&year) {
                Ok(i) => i + 1,
                Err(i) => i,
            };
            if let Some(&next) = self.years.get(idx) {
                self.set_mode(ReportMode::YearlyStatistics { year: next });
            }
        }
    }

    /// Select the next earlier year.  Stops at the first year; ignored
    /// outside yearly mode.
    pub fn select_previous_year(&mut self) {
        if let ReportMode::YearlyStatistics { year } = self.mode {
            let idx = match self.years.binary_search(&year) {
                Ok(i) | Err(i) => i.checked_sub(1),
            };
            if let Some(&prev) = idx.and_then(|i| self.years.get(i)) {
                self.set_mode(ReportMode::YearlyStatistics { year: prev });
            }
        }
    }

    // ── Reports ───────────────────────────────────────────────────────────

    /// Report for the current mode, built on first request and cached after.
    ///
    /// Build failures are returned to the caller and nothing is cached.
    pub fn report(&mut self) -> Result<&Report> {
        let mode = self.mode;
        if !self.cache.contains_key(&mode) {
            match ReportSelector::build(&self.dataset, mode) {
                Ok(report) => {
                    self.builds += 1;
                    self.last_error = None;
                    tracing::debug!(builds = self.builds, "built report for {:?}", mode);
                    self.cache.insert(mode, report);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "report build failed for {:?}", mode);
                    self.last_error = Some(e.to_string());
                    return Err(e);
                }
            }
        } else {
            tracing::debug!("returning cached report for {:?}", mode);
        }
        Ok(&self.cache[&mode])
    }

    /// Drop every cached report.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
        tracing::debug!("report cache invalidated");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
