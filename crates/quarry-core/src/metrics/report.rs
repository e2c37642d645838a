//! Human-readable performance reports.

use std::fmt::Write;
use std::time::Duration;

use super::BatchMetrics;
use crate::retry::ErrorClass;

const SLOW_RESPONSE: Duration = Duration::from_secs(5);
const HIGH_RETRY_RATE: f64 = 0.5;
const DELAY_DOMINANT_SHARE: f64 = 0.5;

const RULE: &str = "  ====================================";
const THIN_RULE: &str = "  ------------------------------------";

impl BatchMetrics {
    /// Retries per finished search.
    pub fn retry_rate(&self) -> f64 {
        if self.total_searches == 0 {
            0.0
        } else {
            f64::from(self.total_retries) / self.total_searches as f64
        }
    }

    /// Fraction of wall time spent in backoff or scheduled pauses.
    pub fn delay_share(&self) -> f64 {
        let total = self.total_duration.as_secs_f64();
        if total > 0.0 {
            (self.total_delay_time.as_secs_f64() / total).min(1.0)
        } else {
            0.0
        }
    }

    /// Qualitative observations derived from the counters.
    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();

        if self.total_searches == 0 {
            insights.push("No searches were run".to_string());
            return insights;
        }
        if self.average_response_time > SLOW_RESPONSE {
            insights.push(format!(
                "Slow responses: average response time {:.1}s exceeds {}s",
                self.average_response_time.as_secs_f64(),
                SLOW_RESPONSE.as_secs()
            ));
        }
        if self.retry_rate() > HIGH_RETRY_RATE {
            insights.push(format!(
                "High retry rate: {:.2} retries per search; consider longer pauses between searches",
                self.retry_rate()
            ));
        }
        if self.failed_searches > 0 {
            insights.push(format!(
                "{} of {} searches failed",
                self.failed_searches, self.total_searches
            ));
        }
        if let Some(n) = self.error_counts.get(&ErrorClass::AbuseDetection) {
            insights.push(format!(
                "Secondary rate limit stopped {n} search(es); increase the schedule delays"
            ));
        }
        if let Some(n) = self.error_counts.get(&ErrorClass::RateLimit) {
            insights.push(format!(
                "Primary rate limit stopped {n} search(es); spread batches over a longer period"
            ));
        }
        if self.delay_share() > DELAY_DOMINANT_SHARE {
            insights.push(format!(
                "Waiting accounts for {:.0}% of wall time",
                self.delay_share() * 100.0
            ));
        }
        if insights.is_empty() {
            insights.push("All searches completed without notable issues".to_string());
        }
        insights
    }

    /// Summary box with totals, timings and insights.
    pub fn summary_report(&self) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail
        let _ = self.write_summary(&mut out);
        out
    }

    /// Summary followed by one row per search and the error breakdown.
    pub fn detailed_report(&self) -> String {
        let mut out = self.summary_report();
        let _ = self.write_details(&mut out);
        out
    }

    fn write_summary(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "       Search Performance Summary")?;
        writeln!(out, "{RULE}")?;
        writeln!(
            out,
            "    Searches:     {:>8}",
            format!("{}/{}", self.total_searches, self.planned_searches)
        )?;
        writeln!(out, "    Succeeded:    {:>8}", self.successful_searches)?;
        if self.failed_searches > 0 {
            writeln!(out, "    Failed:       {:>8}", self.failed_searches)?;
        }
        writeln!(out, "    Results:      {:>8}", self.total_results)?;
        writeln!(out, "    Retries:      {:>8}", self.total_retries)?;
        writeln!(out, "{THIN_RULE}")?;
        writeln!(out, "    Duration:     {:>7.1}s", self.total_duration.as_secs_f64())?;
        writeln!(
            out,
            "    Avg response: {:>7.2}s",
            self.average_response_time.as_secs_f64()
        )?;
        writeln!(
            out,
            "    Waiting:      {:>7.1}s",
            self.total_delay_time.as_secs_f64()
        )?;
        writeln!(out, "{RULE}")?;
        writeln!(out, "  Insights:")?;
        for insight in self.insights() {
            writeln!(out, "    - {insight}")?;
        }
        Ok(())
    }

    fn write_details(&self, out: &mut String) -> std::fmt::Result {
        writeln!(out)?;
        writeln!(out, "  Searches:")?;
        for s in &self.searches {
            let status = if s.success { "ok" } else { "FAIL" };
            write!(
                out,
                "    [{status:<4}] {} ({:?}) results={} retries={} time={:.2}s wait={:.2}s",
                s.task_name,
                s.query,
                s.result_count,
                s.retry_count,
                s.duration.as_secs_f64(),
                s.delay_time.as_secs_f64()
            )?;
            if let Some(class) = s.error_class {
                write!(out, " error={class}")?;
            }
            writeln!(out)?;
        }
        if !self.error_counts.is_empty() {
            writeln!(out)?;
            writeln!(out, "  Errors by class:")?;
            for (class, count) in &self.error_counts {
                writeln!(out, "    {class:<16} {count}")?;
            }
        }
        Ok(())
    }
}
