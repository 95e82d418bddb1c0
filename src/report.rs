use std::fmt::Write;

use crate::record::FeedbackRecord;
use crate::senti::Sentiment;

const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub total: usize,
    pub recent: Vec<FeedbackRecord>,
    pub counts: Vec<(Sentiment, usize)>,
}

impl Report {
    /// `None` when there is nothing to report on.
    pub fn build(records: &[FeedbackRecord], recent_count: usize) -> Option<Self> {
        if records.is_empty() {
            return None;
        }
        let start = records.len().saturating_sub(recent_count);
        Some(Self {
            total: records.len(),
            recent: records[start..].to_vec(),
            counts: value_counts(records),
        })
    }

    pub fn count(&self, sentiment: Sentiment) -> usize {
        self.counts
            .iter()
            .find(|(label, _)| *label == sentiment)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn percentages(&self) -> Vec<(Sentiment, f64)> {
        self.counts
            .iter()
            .map(|(label, count)| (*label, 100.0 * *count as f64 / self.total as f64))
            .collect()
    }

    /// Plain text page: recent table, bar chart and distribution.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Feedback Reports ({} total)", self.total);
        let _ = writeln!(out);
        let _ = writeln!(out, "Recent Feedbacks");
        let _ = writeln!(
            out,
            "{:<16} {:<7} {:>3}  {:<24} {:<9} {}",
            "Name", "Gender", "Age", "Email", "Sentiment", "Feedback"
        );
        for record in &self.recent {
            let _ = writeln!(
                out,
                "{:<16} {:<7} {:>3}  {:<24} {:<9} {}",
                clip(&record.name, 16),
                record.gender,
                record.age,
                clip(&record.email, 24),
                record.sentiment,
                clip(&record.feedback.replace('\n', " "), 48),
            );
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Sentiment Bar Chart");
        let top = self.counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
        for (label, count) in &self.counts {
            let width = if top == 0 { 0 } else { count * BAR_WIDTH / top };
            let _ = writeln!(out, "{:<9} {:<width$} {}", label, "#".repeat(width), count, width = BAR_WIDTH);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "Sentiment Distribution");
        for (label, pct) in self.percentages() {
            let _ = writeln!(out, "{:<9} {:.1}%", label, pct);
        }
        out
    }
}

/// Counts per label, most frequent first. Equal counts keep the order in
/// which the labels first appear.
pub fn value_counts(records: &[FeedbackRecord]) -> Vec<(Sentiment, usize)> {
    let mut counts: Vec<(Sentiment, usize)> = vec![];
    for record in records {
        match counts.iter_mut().find(|(label, _)| *label == record.sentiment) {
            Some((_, count)) => *count += 1,
            None => counts.push((record.sentiment, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
        short.push('…');
        short
    }
}
