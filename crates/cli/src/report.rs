//! Progress lines and the end-of-run report.

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

use stickerfit_core::{TargetType, TaskEvent, TaskEventKind, TaskResult, ValidationIssue};

/// Counts over the finished tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Outcome of one task, as written to the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub id: usize,
    pub label: String,
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub success: bool,
    pub error: Option<String>,
    pub issues: Vec<ValidationIssue>,
}

impl TaskReport {
    fn new(id: usize, label: String, result: &TaskResult) -> Self {
        Self {
            id,
            label,
            input: result.input_path.clone(),
            output: result.output_path.clone(),
            success: result.is_success(),
            error: result.failure_message(),
            issues: result.issues.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub target: TargetType,
    pub cancelled: bool,
    pub summary: RunSummary,
    /// Finished tasks ordered by id; tasks that never ran are absent.
    pub tasks: Vec<TaskReport>,
}

/// Turns executor events into progress lines and collects per-task outcomes.
pub struct Reporter<W: Write> {
    out: W,
    total: usize,
    done: usize,
    summary: RunSummary,
    slots: Vec<Option<TaskReport>>,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, total: usize) -> Self {
        Self {
            out,
            total,
            done: 0,
            summary: RunSummary {
                total,
                ..Default::default()
            },
            slots: (0..total).map(|_| None).collect(),
        }
    }

    pub fn handle(&mut self, event: TaskEvent) -> io::Result<()> {
        match event.kind {
            TaskEventKind::Started => writeln!(self.out, "[RUN] {}", event.task.label),
            TaskEventKind::Finished => {
                let Some(result) = event.result else {
                    return Ok(());
                };
                match result.failure_message() {
                    None => {
                        self.summary.succeeded += 1;
                        let output = result.output_path.clone().unwrap_or_default();
                        writeln!(
                            self.out,
                            "[DONE] {} -> {}",
                            result.input_path.display(),
                            output.display()
                        )?;
                    }
                    Some(message) => {
                        self.summary.failed += 1;
                        writeln!(
                            self.out,
                            "[FAIL] {} ({})",
                            result.input_path.display(),
                            message
                        )?;
                    }
                }
                self.done += 1;
                writeln!(self.out, "Done: {}/{}", self.done, self.total)?;

                let report = TaskReport::new(event.task.id, event.task.label, &result);
                if let Some(slot) = self.slots.get_mut(report.id) {
                    *slot = Some(report);
                }
                Ok(())
            }
        }
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Writes the summary line and returns the collected report.
    pub fn finish(mut self, target: TargetType, cancelled: bool) -> io::Result<RunReport> {
        writeln!(
            self.out,
            "Summary: success={} failed={}",
            self.summary.succeeded, self.summary.failed
        )?;
        self.out.flush()?;
        Ok(RunReport {
            target,
            cancelled,
            summary: self.summary,
            tasks: self.slots.into_iter().flatten().collect(),
        })
    }
}

/// Feeds every event to `reporter` until the executor closes the channel.
pub async fn drain<W: Write>(
    mut events: mpsc::Receiver<TaskEvent>,
    mut reporter: Reporter<W>,
) -> io::Result<Reporter<W>> {
    while let Some(event) = events.recv().await {
        reporter.handle(event)?;
    }
    Ok(reporter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stickerfit_core::testing::fixtures;
    use stickerfit_core::{IssueCode, TaskError, TaskType};

    fn output(reporter: Reporter<Vec<u8>>) -> String {
        String::from_utf8(reporter.out).unwrap()
    }

    #[test]
    fn test_success_and_failure_lines() {
        let mut reporter = Reporter::new(Vec::new(), 2);
        let ok = fixtures::task(0, TaskType::VideoSticker, "in/a.mp4");
        let bad = fixtures::task(1, TaskType::VideoSticker, "in/b.mp4");

        reporter.handle(TaskEvent::started(ok.clone())).unwrap();
        reporter
            .handle(TaskEvent::finished(
                ok,
                TaskResult::succeeded("in/a.mp4", "out/a_sticker.webm"),
            ))
            .unwrap();
        reporter.handle(TaskEvent::started(bad.clone())).unwrap();
        reporter
            .handle(TaskEvent::finished(
                bad,
                TaskResult::failed("in/b.mp4", TaskError::Cancelled),
            ))
            .unwrap();

        assert_eq!(
            reporter.summary(),
            RunSummary {
                total: 2,
                succeeded: 1,
                failed: 1
            }
        );
        assert_eq!(
            output(reporter),
            "[RUN] in/a.mp4\n\
             [DONE] in/a.mp4 -> out/a_sticker.webm\n\
             Done: 1/2\n\
             [RUN] in/b.mp4\n\
             [FAIL] in/b.mp4 (cancelled)\n\
             Done: 2/2\n"
        );
    }

    #[test]
    fn test_issues_without_error_count_as_failure() {
        let mut reporter = Reporter::new(Vec::new(), 1);
        let task = fixtures::task(0, TaskType::Emoji, "face.png");
        let result = TaskResult {
            input_path: "face.png".into(),
            output_path: Some("face_emoji.png".into()),
            error: None,
            issues: vec![ValidationIssue::new(
                IssueCode::Size,
                "dimension must be 100x100",
            )],
        };

        reporter.handle(TaskEvent::finished(task, result)).unwrap();

        assert_eq!(reporter.summary().failed, 1);
        assert!(output(reporter).contains("[FAIL] face.png (dimension must be 100x100)"));
    }

    #[test]
    fn test_finish_orders_tasks_by_id() {
        let mut reporter = Reporter::new(Vec::new(), 3);
        for id in [2, 0] {
            let path = format!("{id}.png");
            let task = fixtures::task(id, TaskType::StaticSticker, &path);
            reporter
                .handle(TaskEvent::finished(
                    task,
                    TaskResult::succeeded(&path, format!("{id}_sticker.png")),
                ))
                .unwrap();
        }

        let report = reporter.finish(TargetType::StaticSticker, true).unwrap();
        let ids: Vec<usize> = report.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![0, 2]);
        assert!(report.cancelled);
        assert_eq!(report.summary.succeeded, 2);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["target"], "static_sticker");
        assert_eq!(json["tasks"][1]["output"], "2_sticker.png");
    }

    #[tokio::test]
    async fn test_drain_until_channel_closes() {
        let (tx, rx) = mpsc::channel(4);
        let task = fixtures::task(0, TaskType::VideoSticker, "a.mp4");
        tx.send(TaskEvent::started(task)).await.unwrap();
        drop(tx);

        let reporter = drain(rx, Reporter::new(Vec::new(), 1)).await.unwrap();
        assert_eq!(output(reporter), "[RUN] a.mp4\n");
    }
}
