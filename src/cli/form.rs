use crate::export;
use crate::report::{Choice, Field};
use crate::session::FormSession;
use crate::submit::{Submitter, Transport};
use anyhow::{Context, Result};
use dialoguer::{Input, Select, theme::ColorfulTheme};
use std::path::Path;
use tracing::debug;

const ATTENDANCE_FIELDS: [Field; 5] = [
    Field::Total,
    Field::Present,
    Field::Absent,
    Field::SickIn,
    Field::SentHome,
];

const ACTIONS: [&str; 5] = ["Submit Report", "Copy summary", "Export (PDF layout)", "Edit again", "Quit"];

pub fn run_form<T: Transport>(
    session: &mut FormSession,
    submitter: &Submitter<T>,
    export_dir: &Path,
) -> Result<()> {
    let theme = ColorfulTheme::default();

    println!("──────────────────────────────────────────");
    println!("  TEACHER'S DAILY REPORT");
    println!("  Changes are saved as you type.");
    println!("──────────────────────────────────────────");

    loop {
        fill_sections(session, &theme)?;

        loop {
            print_notice(session);

            let action = Select::with_theme(&theme)
                .with_prompt("  Next step")
                .default(0)
                .items(&ACTIONS)
                .interact()
                .context("Failed to read action")?;

            match action {
                0 => {
                    println!("  Sending...");
                    if let Err(error) = session.submit(submitter) {
                        debug!(%error, "submit failed");
                    }
                }
                1 => {
                    session.copy_summary();
                }
                2 => {
                    let saved = export::save_export(session.report(), export_dir)?;
                    println!("  ✓ Markdown: {}", saved.markdown_path.display());
                    println!("  ✓ JSON: {}", saved.json_path.display());
                }
                3 => break,
                _ => {
                    print_notice(session);
                    println!("  Draft kept at the last saved state.");
                    return Ok(());
                }
            }
        }
    }
}

fn fill_sections(session: &mut FormSession, theme: &ColorfulTheme) -> Result<()> {
    println!("\n[Basic info]");
    for field in [Field::Date, Field::ClassGrade, Field::TeacherName] {
        prompt_text(session, theme, field)?;
    }

    println!("\n[A] Attendance summary");
    for field in ATTENDANCE_FIELDS {
        prompt_text(session, theme, field)?;
    }
    prompt_text(session, theme, Field::Disciplinary)?;

    println!("\n[B] Health & welfare");
    prompt_choice(session, theme, Field::HasHealthComplaint)?;
    prompt_choice(session, theme, Field::HasAccident)?;
    if session.report().needs_incident_details() {
        println!("  Incident details are mandatory when a complaint or accident is reported.");
        prompt_text(session, theme, Field::IncidentDetails)?;
    }

    println!("\n[C] Teacher comments");
    prompt_text(session, theme, Field::Comments)?;

    println!("\n[Signatures]");
    prompt_text(session, theme, Field::Signature)?;
    prompt_text(session, theme, Field::ReceivedBy)?;
    println!("  Time of Submission: {}", session.report().submitted_time);

    if session.report().incident_details_missing() {
        println!("  ! Incident details are still empty.");
    }

    Ok(())
}

fn prompt_text(session: &mut FormSession, theme: &ColorfulTheme, field: Field) -> Result<()> {
    let current = session.report().get_field(field);

    let value: String = Input::with_theme(theme)
        .with_prompt(format!("  {}", field.label()))
        .with_initial_text(current)
        .allow_empty(true)
        .interact_text()
        .with_context(|| format!("Failed to read {}", field.label()))?;

    session.set_field(field, &value)
}

fn prompt_choice(session: &mut FormSession, theme: &ColorfulTheme, field: Field) -> Result<()> {
    let choices = [Choice::Yes, Choice::No];
    let current = session.report().get_field(field);
    let default = choices
        .iter()
        .position(|choice| choice.as_str() == current)
        .unwrap_or(1);

    let selected = Select::with_theme(theme)
        .with_prompt(format!("  {}", field.label()))
        .default(default)
        .items(&choices)
        .interact()
        .with_context(|| format!("Failed to read {}", field.label()))?;

    let choice = choices.get(selected).copied().unwrap_or_default();
    session.set_field(field, choice.as_str())
}

fn print_notice(session: &mut FormSession) {
    if let Some(notice) = session.notice() {
        println!("\n  {notice}");
    }
}
