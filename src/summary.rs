use crate::report::Report;
use anyhow::{Context, Result, bail};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::debug;

const CLIPBOARD_COMMANDS: [(&str, &[&str]); 5] = [
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip", &[]),
];

pub fn build_summary(report: &Report) -> String {
    format!(
        "Daily Report: {}\nTeacher: {}\nClass: {}\nAttendance: {}/{}\nComments: {}",
        report.date,
        report.teacher_name,
        report.class_grade,
        report.present,
        report.total,
        report.comments
    )
}

/// Pipes `text` into the first clipboard command that accepts it.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut last_error = None;

    for (program, args) in CLIPBOARD_COMMANDS {
        match pipe_into(program, args, text) {
            Ok(()) => {
                debug!(program, "summary copied");
                return Ok(());
            }
            Err(error) => last_error = Some(error),
        }
    }

    match last_error {
        Some(error) => Err(error).context("No clipboard command accepted the summary"),
        None => bail!("No clipboard command available"),
    }
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to start {program}"))?;

    child
        .stdin
        .take()
        .context("Clipboard stdin unavailable")?
        .write_all(text.as_bytes())
        .with_context(|| format!("Failed to write to {program}"))?;

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for {program}"))?;
    if !status.success() {
        bail!("{program} exited with {status}");
    }

    Ok(())
}

pub fn clipboard_available() -> Option<&'static str> {
    let path = std::env::var_os("PATH")?;

    CLIPBOARD_COMMANDS
        .iter()
        .map(|(program, _)| *program)
        .find(|program| {
            std::env::split_paths(&path).any(|dir| {
                dir.join(program).is_file() || dir.join(format!("{program}.exe")).is_file()
            })
        })
}

#[cfg(test)]
mod tests {
    use super::build_summary;
    use crate::report::Report;

    #[test]
    fn summary_follows_fixed_template() {
        let report = Report {
            date: "2026-03-09".to_string(),
            teacher_name: "Ms. Achieng".to_string(),
            class_grade: "7A".to_string(),
            total: "30".to_string(),
            present: "26".to_string(),
            comments: "Fractions revision went well.".to_string(),
            ..Report::default()
        };

        assert_eq!(
            build_summary(&report),
            "Daily Report: 2026-03-09\nTeacher: Ms. Achieng\nClass: 7A\nAttendance: 26/30\nComments: Fractions revision went well."
        );
    }

    #[test]
    fn summary_keeps_empty_fields_in_place() {
        let report = Report {
            date: "2026-03-09".to_string(),
            ..Report::default()
        };

        let summary = build_summary(&report);
        assert_eq!(summary.lines().count(), 5);
        assert!(summary.contains("Attendance: /\n"));
    }
}
