use std::{
    io::{BufRead, BufReader},
    process::{Child, Command, Stdio},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use super::{parse_trace_line, Snapshot, TraceSource};
use crate::{Result, SortVizError, TraceCommand};

/// Reads a trace from the standard output of an external sorter, one
/// snapshot per line.
///
/// Reading stops when the process closes its output, when `max_lines` lines
/// have been seen, or when the overall timeout elapses; in the latter two
/// cases the child is killed.
#[derive(Debug, Clone)]
pub struct ProcessSource {
    command: TraceCommand,
    timeout: Duration,
    max_lines: usize,
}

impl ProcessSource {
    pub fn new(command: TraceCommand) -> Self {
        Self {
            command,
            timeout: Duration::from_secs(5),
            max_lines: 100_000,
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = max_lines;
        self
    }

    fn spawn(&self) -> Result<Child> {
        Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| {
                SortVizError::msg(format!(
                    "failed to launch `{}`: {err}",
                    self.command.program
                ))
            })
    }
}

impl TraceSource for ProcessSource {
    fn describe(&self) -> String {
        if self.command.args.is_empty() {
            self.command.program.clone()
        } else {
            format!("{} {}", self.command.program, self.command.args.join(" "))
        }
    }

    fn snapshots(&mut self) -> Result<Vec<Snapshot>> {
        let mut child = self.spawn()?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SortVizError::msg("trace source stdout was not captured"))?;

        let (tx, rx) = mpsc::channel::<String>();
        let reader = thread::spawn(move || {
            for line in BufReader::new(stdout).lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });

        let deadline = Instant::now() + self.timeout;
        let mut steps: Vec<Snapshot> = Vec::new();
        let mut seen = 0usize;
        let mut cut_short = false;

        loop {
            if seen >= self.max_lines {
                tracing::warn!(max_lines = self.max_lines, "trace line ceiling reached");
                cut_short = true;
                break;
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            match rx.recv_timeout(remaining) {
                Ok(line) => {
                    seen += 1;
                    match parse_trace_line(&line) {
                        Some(values) => {
                            let width = steps.first().map(Vec::len);
                            if width.is_some_and(|width| width != values.len()) {
                                tracing::warn!(
                                    line = seen,
                                    expected = ?width,
                                    found = values.len(),
                                    "skipping trace line with mismatched width"
                                );
                            } else {
                                steps.push(values);
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => tracing::warn!(line = seen, "skipping malformed trace line"),
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(timeout = ?self.timeout, "trace source timed out");
                    cut_short = true;
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // A grandchild that inherited stdout can hold the pipe open after the
        // kill, so the reader is only joined once the stream has ended.
        if cut_short {
            let _ = child.kill();
        } else {
            let _ = reader.join();
        }
        drop(rx);
        let status = child.wait()?;

        if !cut_short && !status.success() {
            if steps.is_empty() {
                return Err(SortVizError::msg(format!(
                    "`{}` exited with {status}",
                    self.describe()
                )));
            }
            tracing::warn!(
                %status,
                steps = steps.len(),
                "trace source exited unsuccessfully, keeping its output"
            );
        }

        Ok(steps)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn shell(script: &str) -> ProcessSource {
        ProcessSource::new(TraceCommand::new("sh").with_args(["-c", script]))
    }

    #[test]
    fn skips_lines_of_the_wrong_width() {
        let mut source = shell("echo '4 3 2 1'; echo '3 4'; echo '3 4 2 1'");
        let steps = source.snapshots().unwrap();
        assert_eq!(steps, vec![vec![4, 3, 2, 1], vec![3, 4, 2, 1]]);
    }

    #[test]
    fn failing_process_without_output_is_an_error() {
        let mut source = shell("exit 3");
        assert!(source.snapshots().is_err());
    }

    #[test]
    fn failing_process_with_output_keeps_lines() {
        let mut source = shell("echo '2 1'; echo '1 2'; exit 1");
        assert_eq!(source.snapshots().unwrap().len(), 2);
    }

    #[test]
    fn line_ceiling_stops_endless_source() {
        let mut source = shell("while true; do echo '1 2 3'; done").max_lines(50);
        let steps = source.snapshots().unwrap();
        assert_eq!(steps.len(), 50);
    }

    #[test]
    fn timeout_stops_stalled_source() {
        let mut source = shell("echo '2 1'; exec sleep 30").timeout(Duration::from_millis(200));
        let started = Instant::now();
        let steps = source.snapshots().unwrap();
        assert_eq!(steps, vec![vec![2, 1]]);
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn timeout_does_not_wait_for_grandchildren() {
        let mut source =
            shell("echo '2 1'; sleep 8; echo '1 2'").timeout(Duration::from_millis(200));
        let started = Instant::now();
        let steps = source.snapshots().unwrap();
        assert_eq!(steps, vec![vec![2, 1]]);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn line_ceiling_does_not_wait_for_grandchildren() {
        let mut source = shell("echo '2 1'; echo '1 2'; echo '2 1'; sleep 8").max_lines(2);
        let started = Instant::now();
        assert_eq!(source.snapshots().unwrap().len(), 2);
        assert!(started.elapsed() < Duration::from_secs(3));
    }

    #[test]
    fn describe_includes_arguments() {
        let source =
            ProcessSource::new(TraceCommand::new("./quick_sort").with_args(["--len", "8"]));
        assert_eq!(source.describe(), "./quick_sort --len 8");
    }
}
