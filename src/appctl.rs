use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use log::*;

use crate::charts::{draw_charts, ChartFiles};
use crate::record::{FeedbackForm, FeedbackRecord};
use crate::report::Report;
use crate::senti::{Senti, Sentiment};
use crate::store::FeedbackStore;
use crate::Error;

/// What the report section of the page shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub report: Report,
    pub charts: Option<ChartFiles>,
}

/// Process wide state. Built once at startup and shared by reference with
/// every front end.
pub struct AppCtl {
    alive: AtomicBool,
    senti: Senti,
    store: FeedbackStore,
    chart_dir: Option<PathBuf>,
    recent_count: usize,
}

impl AppCtl {
    pub fn new(senti: Senti, store: FeedbackStore, chart_dir: Option<PathBuf>, recent_count: usize) -> Self {
        Self {
            alive: AtomicBool::new(true),
            senti,
            store,
            chart_dir,
            recent_count,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    pub fn stop(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    pub fn store(&self) -> &FeedbackStore {
        &self.store
    }

    /// Validate, classify and persist one submission.
    pub fn submit_feedback(&self, form: FeedbackForm) -> Result<FeedbackRecord, Error> {
        let candidate = form.submit()?;
        let sentiment = self.senti.sentimentice(&candidate.feedback)?;
        let record = candidate.into_record(sentiment);
        self.store.append(&record)?;
        info!("Recorded {} feedback", record.sentiment);
        Ok(record)
    }

    /// Read the store back and summarise it. `None` while there is no feedback.
    pub fn render_report(&self) -> Result<Option<ReportPage>, Error> {
        let records = self.store.read_all()?;
        let report = match Report::build(&records, self.recent_count) {
            Some(report) => report,
            None => return Ok(None),
        };
        debug!(
            "Report over {} records: {} positive, {} negative",
            report.total,
            report.count(Sentiment::Positive),
            report.count(Sentiment::Negative)
        );
        let charts = match &self.chart_dir {
            Some(dir) => Some(draw_charts(&report, dir)?),
            None => None,
        };
        Ok(Some(ReportPage { report, charts }))
    }
}
