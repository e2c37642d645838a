//! The `quarry plan` command: dry-run pacing for a batch file.
//!
//! A batch file is TOML:
//!
//! ```toml
//! name = "async-runtimes"
//! description = "Compare runtime ecosystems"
//!
//! [[tasks]]
//! name = "tokio"
//! query = "tokio runtime"
//! max_results = 50
//!
//! [[tasks]]
//! name = "smol"
//! query = "smol executor"
//! [tasks.filters]
//! language = "rust"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use quarry_core::{
    BatchOptions, Config, DelayScheduler, OperationComplexity, ReportMode, SearchTask,
};
use serde::{Deserialize, Serialize};

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Batch file (TOML) describing the searches
    pub file: PathBuf,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}

/// On-disk batch definition.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchFile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tasks: Vec<SearchTask>,
}

impl BatchFile {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read batch file {}", path.display()))?;
        let batch: BatchFile = toml::from_str(&content)
            .with_context(|| format!("Invalid batch file {}", path.display()))?;
        batch.validate()?;
        Ok(batch)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.name.trim().is_empty() {
            anyhow::bail!("batch name must not be empty");
        }
        for (i, task) in self.tasks.iter().enumerate() {
            if task.name.trim().is_empty() {
                anyhow::bail!("task #{} has an empty name", i + 1);
            }
            if task.query.trim().is_empty() {
                anyhow::bail!("task '{}' has an empty query", task.name);
            }
            if task.max_results == 0 {
                anyhow::bail!("task '{}' must request at least one result", task.name);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlannedSearch {
    pub name: String,
    pub query: String,
    pub max_results: u32,
    pub complexity: OperationComplexity,
    /// Pause scheduled after this search; none after the last one.
    pub pause_after_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub name: String,
    pub description: String,
    pub max_retries: u32,
    /// Cross-search comparison enabled by `[report] compare`
    pub compare: bool,
    /// Per-search rows enabled by `[report] detailed`
    pub detailed_report: bool,
    pub searches: Vec<PlannedSearch>,
    pub total_pause_ms: u64,
}

/// Build the pacing plan the executor would follow for `batch`.
pub fn build_plan(batch: &BatchFile, config: &Config) -> Plan {
    let scheduler = DelayScheduler::from(&config.schedule);
    let options = BatchOptions::from_config(config, &batch.name, &batch.description);
    let last = batch.tasks.len().saturating_sub(1);

    let searches: Vec<PlannedSearch> = batch
        .tasks
        .iter()
        .enumerate()
        .map(|(i, task)| {
            let complexity = OperationComplexity::of(task);
            let pause_after_ms = (i < last).then(|| millis(scheduler.delay_for(complexity)));
            PlannedSearch {
                name: task.name.clone(),
                query: task.query.clone(),
                max_results: task.max_results,
                complexity,
                pause_after_ms,
            }
        })
        .collect();

    let total_pause_ms = searches.iter().filter_map(|s| s.pause_after_ms).sum();

    Plan {
        name: options.name,
        description: options.description,
        max_retries: config.retry.max_retries,
        compare: options.compare,
        detailed_report: options.report == ReportMode::Detailed,
        searches,
        total_pause_ms,
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

pub async fn execute(args: PlanArgs, config: &Config) -> anyhow::Result<()> {
    let expanded = shellexpand::tilde(&args.file.to_string_lossy()).to_string();
    let path = PathBuf::from(expanded);

    let batch = BatchFile::load(&path)?;
    tracing::debug!(batch = %batch.name, tasks = batch.tasks.len(), "Loaded batch file");

    let plan = build_plan(&batch, config);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print!("{}", render(&plan));
    }
    Ok(())
}

fn render(plan: &Plan) -> String {
    let mut out = format!("Batch: {}\n", plan.name);
    if !plan.description.is_empty() {
        out.push_str(&format!("  {}\n", plan.description));
    }
    out.push('\n');

    if plan.searches.is_empty() {
        out.push_str("  (no searches)\n");
        return out;
    }

    for (i, s) in plan.searches.iter().enumerate() {
        let pause = s
            .pause_after_ms
            .map(|ms| format!("then wait {:.1}s", ms as f64 / 1000.0))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:>2}. {:<20} {:<6} max={:<4} {:?} {pause}\n",
            i + 1,
            s.name,
            s.complexity.to_string(),
            s.max_results,
            s.query,
        ));
    }

    out.push_str(&format!(
        "\n  {} searches, up to {} retries each, {:.1}s of scheduled pauses\n",
        plan.searches.len(),
        plan.max_retries,
        plan.total_pause_ms as f64 / 1000.0
    ));
    out.push_str(&format!(
        "  report: {}, comparison: {}\n",
        if plan.detailed_report { "detailed" } else { "summary" },
        if plan.compare { "on" } else { "off" }
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"
name = "runtimes"
description = "Compare async runtimes"

[[tasks]]
name = "tokio"
query = "tokio"

[[tasks]]
name = "wide"
query = "async* runtime work stealing scheduler"
max_results = 150

[[tasks]]
name = "smol"
query = "smol executor"
[tasks.filters]
language = "rust"
"#;

    fn write_batch(content: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_batch_file() {
        let (_dir, path) = write_batch(BATCH);
        let batch = BatchFile::load(&path).unwrap();
        assert_eq!(batch.name, "runtimes");
        assert_eq!(batch.tasks.len(), 3);
        assert_eq!(batch.tasks[0].max_results, 30);
        assert_eq!(batch.tasks[2].filters.get("language").unwrap(), "rust");
    }

    #[test]
    fn test_plan_paces_between_searches_only() {
        let (_dir, path) = write_batch(BATCH);
        let batch = BatchFile::load(&path).unwrap();
        let plan = build_plan(&batch, &Config::default());

        let complexities: Vec<_> = plan.searches.iter().map(|s| s.complexity).collect();
        assert_eq!(
            complexities,
            vec![
                OperationComplexity::Low,
                OperationComplexity::High,
                OperationComplexity::Low
            ]
        );
        assert_eq!(plan.searches[0].pause_after_ms, Some(500));
        assert_eq!(plan.searches[1].pause_after_ms, Some(2000));
        assert_eq!(plan.searches[2].pause_after_ms, None);
        assert_eq!(plan.total_pause_ms, 2500);
        assert_eq!(plan.max_retries, 3);
    }

    #[test]
    fn test_plan_uses_configured_delays() {
        let (_dir, path) = write_batch(BATCH);
        let batch = BatchFile::load(&path).unwrap();
        let mut config = Config::default();
        config.schedule.low_delay_ms = 0;
        config.schedule.high_delay_ms = 5000;

        let plan = build_plan(&batch, &config);
        assert_eq!(plan.searches[0].pause_after_ms, Some(0));
        assert_eq!(plan.total_pause_ms, 5000);
    }

    #[test]
    fn test_plan_reflects_report_config() {
        let (_dir, path) = write_batch(BATCH);
        let batch = BatchFile::load(&path).unwrap();
        let mut config = Config::default();
        config.report.detailed = true;
        config.report.compare = false;

        let plan = build_plan(&batch, &config);
        assert!(plan.detailed_report);
        assert!(!plan.compare);
        assert!(render(&plan).contains("report: detailed, comparison: off"));
    }

    #[test]
    fn test_rejects_empty_query() {
        let (_dir, path) = write_batch("name = \"b\"\n[[tasks]]\nname = \"t\"\nquery = \"  \"\n");
        let err = BatchFile::load(&path).unwrap_err();
        assert!(err.to_string().contains("empty query"));
    }

    #[test]
    fn test_rejects_zero_results() {
        let (_dir, path) =
            write_batch("name = \"b\"\n[[tasks]]\nname = \"t\"\nquery = \"q\"\nmax_results = 0\n");
        assert!(BatchFile::load(&path).is_err());
    }

    #[test]
    fn test_render_mentions_every_search() {
        let (_dir, path) = write_batch(BATCH);
        let batch = BatchFile::load(&path).unwrap();
        let text = render(&build_plan(&batch, &Config::default()));
        assert!(text.contains("Batch: runtimes"));
        assert!(text.contains("wide"));
        assert!(text.contains("high"));
        assert!(text.contains("then wait 2.0s"));
        assert!(text.contains("3 searches, up to 3 retries each, 2.5s of scheduled pauses"));
        assert!(text.contains("report: summary, comparison: on"));
    }

    #[test]
    fn test_empty_batch_renders_placeholder() {
        let batch = BatchFile {
            name: "empty".to_string(),
            description: String::new(),
            tasks: Vec::new(),
        };
        let plan = build_plan(&batch, &Config::default());
        assert_eq!(plan.total_pause_ms, 0);
        assert!(render(&plan).contains("(no searches)"));
    }
}
