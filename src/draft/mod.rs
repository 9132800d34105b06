use crate::config::set_mode_600;
use crate::report::Report;
use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DRAFT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DraftRecord<'a> {
    version: u32,
    saved_at: String,
    report: &'a Report,
}

#[derive(Debug, Deserialize)]
struct StoredEnvelope {
    version: u32,
    report: Value,
}

/// Single-slot persistence for the in-progress report.
#[derive(Debug, Clone)]
pub struct DraftStore {
    path: PathBuf,
}

impl DraftStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored draft. A missing, unreadable or malformed slot yields
    /// `None`; the caller falls back to a fresh report.
    pub fn load(&self) -> Option<Report> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(error) if error.kind() == ErrorKind::NotFound => return None,
            Err(error) => {
                warn!(error = %error, path = %self.path.display(), "draft unreadable, starting fresh");
                return None;
            }
        };

        match parse_draft(&content) {
            Ok(report) => {
                debug!(path = %self.path.display(), "draft loaded");
                Some(report)
            }
            Err(error) => {
                warn!(error = %error, path = %self.path.display(), "draft malformed, starting fresh");
                None
            }
        }
    }

    pub fn load_or_default(&self) -> Report {
        self.load().unwrap_or_default()
    }

    /// Writes the whole report through a temp file and rename so a crash
    /// never leaves a half-written slot.
    pub fn save(&self, report: &Report) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create draft directory: {}", parent.display())
            })?;
        }

        let record = DraftRecord {
            version: DRAFT_VERSION,
            saved_at: Utc::now().to_rfc3339(),
            report,
        };
        let content =
            serde_json::to_string_pretty(&record).context("Failed to serialize draft")?;

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write draft file: {}", temp_path.display()))?;
        set_mode_600(&temp_path)?;
        fs::rename(&temp_path, &self.path)
            .with_context(|| format!("Failed to replace draft file: {}", self.path.display()))?;

        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error)
                .with_context(|| format!("Failed to remove draft file: {}", self.path.display())),
        }
    }
}

/// Accepts the versioned envelope or a bare report object. Missing fields
/// take fresh defaults through `#[serde(default)]` on `Report`.
fn parse_draft(content: &str) -> Result<Report> {
    let value: Value = serde_json::from_str(content).context("draft is not valid JSON")?;

    let report_value = if value.get("version").is_some() {
        let envelope: StoredEnvelope =
            serde_json::from_value(value).context("draft envelope is malformed")?;
        if envelope.version > DRAFT_VERSION {
            bail!("draft version {} is newer than supported", envelope.version);
        }
        envelope.report
    } else {
        value
    };

    if !report_value.is_object() {
        bail!("draft report is not a JSON object");
    }

    serde_json::from_value(report_value).context("draft report fields are malformed")
}

#[cfg(test)]
mod tests {
    use super::{DraftStore, parse_draft};
    use crate::report::{Choice, Report};
    use std::fs;

    fn store() -> (tempfile::TempDir, DraftStore) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = DraftStore::new(dir.path().join("nested").join("draft.json"));
        (dir, store)
    }

    #[test]
    fn missing_slot_loads_nothing() {
        let (_dir, store) = store();
        assert!(store.load().is_none());
    }

    #[test]
    fn saved_draft_loads_back() {
        let (_dir, store) = store();
        let report = Report {
            teacher_name: "Ms. Achieng".to_string(),
            class_grade: "7A".to_string(),
            total: "30".to_string(),
            has_accident: Choice::Yes,
            ..Report::default()
        };

        store.save(&report).expect("draft saved");

        assert_eq!(store.load(), Some(report));
        assert!(!store.path().with_extension("json.tmp").exists());
    }

    #[test]
    fn malformed_json_falls_back_to_defaults() {
        let (_dir, store) = store();
        fs::create_dir_all(store.path().parent().expect("parent")).expect("dir");
        fs::write(store.path(), "{\"teacherName\": ").expect("write garbage");

        assert!(store.load().is_none());
        let report = store.load_or_default();
        assert!(report.teacher_name.is_empty());
        assert!(!report.date.is_empty());
    }

    #[test]
    fn legacy_blob_merges_with_defaults() {
        let report = parse_draft(r#"{"teacherName":"Mr. Otieno","total":"30","absent":"4","present":26}"#)
            .expect("legacy draft accepted");

        assert_eq!(report.teacher_name, "Mr. Otieno");
        assert_eq!(report.present, "26");
        assert_eq!(report.has_health_complaint, Choice::No);
        assert!(!report.submitted_time.is_empty());
    }

    #[test]
    fn rejects_newer_versions_and_non_objects() {
        assert!(parse_draft(r#"{"version":99,"report":{}}"#).is_err());
        assert!(parse_draft("[1,2,3]").is_err());
        assert!(parse_draft(r#"{"version":1,"report":"text"}"#).is_err());
    }

    #[test]
    fn bad_choice_keeps_the_rest_of_the_draft() {
        let report = parse_draft(
            r#"{"teacherName":"Mr. Otieno","classGrade":"7A","comments":"long notes","hasAccident":null,"hasHealthComplaint":"Sometimes"}"#,
        )
        .expect("draft kept");

        assert_eq!(report.teacher_name, "Mr. Otieno");
        assert_eq!(report.class_grade, "7A");
        assert_eq!(report.comments, "long notes");
        assert_eq!(report.has_accident, Choice::No);
        assert_eq!(report.has_health_complaint, Choice::No);
    }

    #[test]
    fn clear_is_idempotent() {
        let (_dir, store) = store();
        store.save(&Report::default()).expect("draft saved");

        store.clear().expect("first clear");
        store.clear().expect("second clear");
        assert!(store.load().is_none());
    }
}
