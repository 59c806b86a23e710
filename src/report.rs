//! Operator-facing status and outcome messages.
//!
//! Every message goes to the console and to the audit log with the same text.

use std::io::Write;

use tracing::{error, info};

use crate::command::CommandDefinition;
use crate::dispatch::{ExecutionOutput, ExecutionResult};
use crate::error::ClusterError;

/// `""` for exactly one, `"s"` otherwise.
pub fn plural_suffix(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Replace each `{name}` placeholder in `template`.
fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
}

/// The announcement emitted before dispatch.
///
/// Standby-aware commands report the coordinator and a standalone standby by
/// name, so those are left out of the segment host count.
pub fn pre_run_status(
    definition: &CommandDefinition,
    total_hosts: usize,
    standby_alone: bool,
    includes_coordinator: bool,
) -> String {
    let messages = &definition.messages;
    let Some(standby_clause) = messages.standby_clause else {
        let count = total_hosts.to_string();
        return render(
            messages.status,
            &[("count", count.as_str()), ("plural", plural_suffix(total_hosts))],
        );
    };

    let mut count = total_hosts;
    if includes_coordinator {
        count = count.saturating_sub(1);
    }
    let clause = if standby_alone {
        count = count.saturating_sub(1);
        standby_clause
    } else {
        ""
    };

    let rendered_count = count.to_string();
    render(
        messages.status,
        &[
            ("clause", clause),
            ("count", rendered_count.as_str()),
            ("plural", plural_suffix(count)),
        ],
    )
}

/// First line of a host's failure text, the second line if any, and `...`
/// when more follow.
pub fn error_excerpt(result: &ExecutionResult) -> String {
    let text = [result.stderr.as_str(), result.stdout.as_str()]
        .into_iter()
        .chain(result.error.as_deref())
        .map(|s| s.trim_end_matches(['\n', '\r']))
        .find(|s| !s.trim().is_empty())
        .unwrap_or_default();

    let mut lines = text.lines();
    let mut excerpt = lines.next().unwrap_or_default().to_string();
    if let Some(second) = lines.next() {
        excerpt.push('\n');
        excerpt.push_str(second);
    }
    if lines.next().is_some() {
        excerpt.push_str("...");
    }
    excerpt
}

/// Aggregated failure: a headline plus one `host ==> excerpt` line per failed
/// host, in selection order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub headline: String,
    pub details: String,
}

impl std::fmt::Display for FailureReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.headline, self.details)
    }
}

impl From<FailureReport> for ClusterError {
    fn from(report: FailureReport) -> Self {
        ClusterError::ExecutionFailed {
            report: report.to_string(),
        }
    }
}

/// The outcome emitted after dispatch.
pub fn final_report(
    definition: &CommandDefinition,
    total_hosts: usize,
    output: &ExecutionOutput,
) -> Result<String, FailureReport> {
    let messages = &definition.messages;
    let total = total_hosts.to_string();
    let plural = plural_suffix(total_hosts);

    let failed_count = output.failed_count();
    if failed_count == 0 {
        return Ok(render(
            messages.success,
            &[("succeeded", total.as_str()), ("total", total.as_str()), ("plural", plural)],
        ));
    }

    let details: String = output
        .failed()
        .map(|result| format!("{} ==> {}\n", result.host, error_excerpt(result)))
        .collect();
    let failed = failed_count.to_string();
    Err(FailureReport {
        headline: render(
            messages.failure,
            &[("failed", failed.as_str()), ("total", total.as_str()), ("plural", plural)],
        ),
        details,
    })
}

/// Operator surface: stdout and stderr writers mirrored into the audit log.
pub struct Console<'a> {
    out: &'a mut (dyn Write + Send),
    err: &'a mut (dyn Write + Send),
}

impl<'a> Console<'a> {
    pub fn new(out: &'a mut (dyn Write + Send), err: &'a mut (dyn Write + Send)) -> Self {
        Self { out, err }
    }

    pub fn status(&mut self, message: &str) -> std::io::Result<()> {
        info!("{}", message);
        writeln!(self.out, "{}", message)
    }

    /// Write a prompt without a trailing newline.
    pub fn prompt(&mut self, message: &str) -> std::io::Result<()> {
        info!("{}", message.trim_end());
        write!(self.out, "{}", message)?;
        self.out.flush()
    }

    pub fn success(&mut self, message: &str) -> std::io::Result<()> {
        self.status(message)
    }

    pub fn failure(&mut self, report: &FailureReport) -> std::io::Result<()> {
        error!("{}", report.headline);
        error!("{}", report.details);
        write!(self.err, "ERROR: {}", report)
    }

    pub fn error(&mut self, err: &ClusterError) -> std::io::Result<()> {
        error!("{}", err);
        writeln!(self.err, "ERROR: {}", err)
    }
}
