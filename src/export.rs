use crate::report::Report;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct SavedExport {
    pub markdown_path: PathBuf,
    pub json_path: PathBuf,
}

/// Printable layout of the report, without any of the form's controls.
pub fn render_markdown(report: &Report) -> String {
    let incident_rows = if report.needs_incident_details() {
        format!(
            "\n### Incident Details\n{}\n",
            or_placeholder(&report.incident_details, "- Not provided")
        )
    } else {
        String::new()
    };

    format!(
        "# Teacher's Daily Report - {}\n\n| Date | Class/Grade | Teacher |\n|------|-------------|---------|\n| {} | {} | {} |\n\n## A. Attendance Summary\n| Item | Count |\n|------|-------|\n| Total Students in Class | {} |\n| Number of Students Present | {} |\n| Number of Students Absent | {} |\n| Students Sick (In School) | {} |\n| Students Sent Home Sick | {} |\n\n### Disciplinary Issues\n{}\n\n## B. Health & Welfare\n- Health Complaints? {}\n- Accidents/Injuries? {}\n{}\n## C. Teacher Comments\n{}\n\n## Signatures\n- Teacher's Digital Signature: {}\n- Received By: {}\n- Time of Submission: {}\n",
        report.date,
        cell(&report.date),
        cell(&report.class_grade),
        cell(&report.teacher_name),
        cell(&report.total),
        cell(&report.present),
        cell(&report.absent),
        cell(&report.sick_in),
        cell(&report.sent_home),
        or_placeholder(&report.disciplinary, "- None recorded"),
        report.has_health_complaint,
        report.has_accident,
        incident_rows,
        or_placeholder(&report.comments, "- None"),
        or_placeholder(&report.signature, "-"),
        or_placeholder(&report.received_by, "-"),
        report.submitted_time
    )
}

pub fn save_export(report: &Report, export_dir: &Path) -> Result<SavedExport> {
    fs::create_dir_all(export_dir).with_context(|| {
        format!(
            "Failed to create export directory: {}",
            export_dir.display()
        )
    })?;

    let stem = export_stem(report);
    let markdown_path = export_dir.join(format!("{stem}.md"));
    let json_path = export_dir.join(format!("{stem}.json"));

    fs::write(&markdown_path, render_markdown(report)).with_context(|| {
        format!(
            "Failed to write Markdown export: {}",
            markdown_path.display()
        )
    })?;

    let json_content =
        serde_json::to_string_pretty(report).context("Failed to serialize report JSON")?;
    fs::write(&json_path, json_content)
        .with_context(|| format!("Failed to write JSON export: {}", json_path.display()))?;

    Ok(SavedExport {
        markdown_path,
        json_path,
    })
}

fn export_stem(report: &Report) -> String {
    let class = report
        .class_grade
        .trim()
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() { ch } else { '_' })
        .collect::<String>();
    let date = report
        .date
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '-')
        .collect::<String>();

    match (date.is_empty(), class.is_empty()) {
        (false, false) => format!("{date}-{class}"),
        (false, true) => date,
        (true, false) => class,
        (true, true) => "report".to_string(),
    }
}

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    if value.trim().is_empty() {
        placeholder.to_string()
    } else {
        value.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{export_stem, render_markdown, save_export};
    use crate::report::{Choice, Report};

    fn sample() -> Report {
        Report {
            date: "2026-03-09".to_string(),
            teacher_name: "Ms. Achieng".to_string(),
            class_grade: "7 A".to_string(),
            total: "30".to_string(),
            present: "26".to_string(),
            absent: "4".to_string(),
            ..Report::default()
        }
    }

    #[test]
    fn incident_section_only_when_flagged() {
        let calm = render_markdown(&sample());
        assert!(!calm.contains("Incident Details"));
        assert!(calm.contains("| Number of Students Present | 26 |"));

        let flagged = render_markdown(&Report {
            has_accident: Choice::Yes,
            ..sample()
        });
        assert!(flagged.contains("### Incident Details\n- Not provided"));
    }

    #[test]
    fn stem_is_filesystem_safe() {
        assert_eq!(export_stem(&sample()), "2026-03-09-7_A");
        assert_eq!(
            export_stem(&Report {
                date: String::new(),
                class_grade: String::new(),
                ..Report::default()
            }),
            "report"
        );
    }

    #[test]
    fn writes_markdown_and_json() {
        let dir = tempfile::tempdir().expect("temp dir");
        let saved = save_export(&sample(), dir.path()).expect("export saved");

        assert!(saved.markdown_path.ends_with("2026-03-09-7_A.md"));
        let json = std::fs::read_to_string(&saved.json_path).expect("json written");
        assert!(json.contains("\"teacherName\": \"Ms. Achieng\""));
    }
}
