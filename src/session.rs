use crate::draft::DraftStore;
use crate::notify::{self, Notice, NoticeKind, StatusSlot};
use crate::report::derive::apply_derivation;
use crate::report::{Field, Report};
use crate::submit::{SubmitError, SubmitReceipt, Submitter, Transport};
use crate::summary;
use anyhow::Result;
use std::time::{Duration, Instant};
use tracing::{debug, error};

/// The one report being edited, together with its draft slot, status line and
/// in-flight flag. Every mutation goes through here.
pub struct FormSession {
    report: Report,
    drafts: DraftStore,
    status: StatusSlot,
    /// Mirrors the form's "sending" guard. `submit` borrows the session
    /// mutably and runs to completion, so exclusivity itself comes from the
    /// borrow checker; the flag keeps the busy outcome explicit.
    in_flight: bool,
    clear_after_submit: bool,
}

impl FormSession {
    /// Restores the stored draft (or a fresh report) and runs the attendance
    /// derivation once, as the form does on first render.
    pub fn open(drafts: DraftStore, notice_duration: Duration) -> Result<Self> {
        let report = apply_derivation(drafts.load_or_default());
        drafts.save(&report)?;

        Ok(Self {
            report,
            drafts,
            status: StatusSlot::new(notice_duration),
            in_flight: false,
            clear_after_submit: false,
        })
    }

    pub fn clear_after_submit(mut self, enabled: bool) -> Self {
        self.clear_after_submit = enabled;
        self
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    /// Replaces one field, re-derives `present` when an attendance input
    /// changed, and persists the whole report.
    pub fn set_field(&mut self, field: Field, value: &str) -> Result<()> {
        let previous = self.report.get_field(field);
        let mut next = self.report.clone().set_field(field, value)?;

        if field.feeds_derivation() && previous != next.get_field(field) {
            next = apply_derivation(next);
        }

        self.drafts.save(&next)?;
        self.report = next;
        debug!(field = %field, "field updated");

        Ok(())
    }

    /// Starts over with a fresh report in the draft slot.
    pub fn reset(&mut self) -> Result<()> {
        let report = Report::default();
        self.drafts.save(&report)?;
        self.report = report;
        Ok(())
    }

    pub fn submit<T: Transport>(
        &mut self,
        submitter: &Submitter<T>,
    ) -> Result<SubmitReceipt, SubmitError> {
        if self.in_flight {
            self.notify(notify::SUBMIT_BUSY, NoticeKind::Error);
            return Err(SubmitError::InFlight);
        }

        self.in_flight = true;
        let result = submitter.submit(&self.report);
        self.in_flight = false;

        match &result {
            Ok(_) => {
                self.notify(notify::SUBMITTED, NoticeKind::Success);
                if self.clear_after_submit {
                    if let Err(error) = self.reset() {
                        error!(error = %error, "failed to clear draft after submission");
                    }
                }
            }
            Err(SubmitError::Config) => self.notify(notify::WEBHOOK_MISSING, NoticeKind::Error),
            Err(SubmitError::Validation { .. }) => {
                self.notify(notify::IDENTITY_MISSING, NoticeKind::Error)
            }
            Err(SubmitError::Rejected { status }) => self.notify(
                format!("Submission rejected by the sheet (HTTP {status})."),
                NoticeKind::Error,
            ),
            Err(SubmitError::Network(_)) | Err(SubmitError::InFlight) => {
                self.notify(notify::SUBMIT_FAILED, NoticeKind::Error)
            }
        }

        result
    }

    /// Builds the summary and hands it to `copy`; the outcome lands in the
    /// status line.
    pub fn copy_summary_with<F>(&mut self, copy: F) -> bool
    where
        F: FnOnce(&str) -> Result<()>,
    {
        let text = summary::build_summary(&self.report);
        match copy(&text) {
            Ok(()) => {
                self.notify(notify::SUMMARY_COPIED, NoticeKind::Success);
                true
            }
            Err(error) => {
                error!(error = %error, "clipboard write failed");
                self.notify(notify::SUMMARY_COPY_FAILED, NoticeKind::Error);
                false
            }
        }
    }

    pub fn copy_summary(&mut self) -> bool {
        self.copy_summary_with(summary::copy_to_clipboard)
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NoticeKind) {
        self.status.show(message, kind, Instant::now());
    }

    pub fn notice(&mut self) -> Option<&Notice> {
        self.status.current(Instant::now())
    }
}
