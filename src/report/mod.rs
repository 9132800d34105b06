pub mod derive;

use chrono::{DateTime, Local};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const CLOCK_FORMAT: &str = "%I:%M %p";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Choice {
    Yes,
    #[default]
    No,
}

impl Choice {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }

    pub fn is_yes(self) -> bool {
        self == Self::Yes
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Choice {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "y" | "true" => Ok(Self::Yes),
            "no" | "n" | "false" => Ok(Self::No),
            _ => Err(FieldError::InvalidChoice(raw.to_string())),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown report field: {0}")]
    UnknownField(String),
    #[error("expected Yes or No, got {0:?}")]
    InvalidChoice(String),
}

/// One teacher's daily report. Numeric-labeled fields stay text so the form
/// never blocks typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Report {
    #[serde(deserialize_with = "lenient_text")]
    pub date: String,
    #[serde(deserialize_with = "lenient_text")]
    pub teacher_name: String,
    #[serde(deserialize_with = "lenient_text")]
    pub class_grade: String,
    #[serde(deserialize_with = "lenient_text")]
    pub total: String,
    #[serde(deserialize_with = "lenient_text")]
    pub present: String,
    #[serde(deserialize_with = "lenient_text")]
    pub absent: String,
    #[serde(deserialize_with = "lenient_text")]
    pub sick_in: String,
    #[serde(deserialize_with = "lenient_text")]
    pub sent_home: String,
    #[serde(deserialize_with = "lenient_text")]
    pub disciplinary: String,
    #[serde(deserialize_with = "lenient_choice")]
    pub has_health_complaint: Choice,
    #[serde(deserialize_with = "lenient_choice")]
    pub has_accident: Choice,
    #[serde(deserialize_with = "lenient_text")]
    pub incident_details: String,
    #[serde(deserialize_with = "lenient_text")]
    pub comments: String,
    #[serde(deserialize_with = "lenient_text")]
    pub signature: String,
    #[serde(deserialize_with = "lenient_text")]
    pub received_by: String,
    #[serde(deserialize_with = "lenient_text")]
    pub submitted_time: String,
}

impl Default for Report {
    fn default() -> Self {
        Self::new_at(Local::now())
    }
}

impl Report {
    pub fn new_at(now: DateTime<Local>) -> Self {
        Self {
            date: now.format(DATE_FORMAT).to_string(),
            teacher_name: String::new(),
            class_grade: String::new(),
            total: String::new(),
            present: String::new(),
            absent: String::new(),
            sick_in: String::new(),
            sent_home: String::new(),
            disciplinary: String::new(),
            has_health_complaint: Choice::No,
            has_accident: Choice::No,
            incident_details: String::new(),
            comments: String::new(),
            signature: String::new(),
            received_by: String::new(),
            submitted_time: now.format(CLOCK_FORMAT).to_string(),
        }
    }

    /// Returns a copy with `field` replaced. Only the Yes/No fields can reject
    /// input; every text field takes the value verbatim.
    pub fn set_field(self, field: Field, value: &str) -> Result<Self, FieldError> {
        let mut next = self;
        let value = value.to_string();

        match field {
            Field::Date => next.date = value,
            Field::TeacherName => next.teacher_name = value,
            Field::ClassGrade => next.class_grade = value,
            Field::Total => next.total = value,
            Field::Present => next.present = value,
            Field::Absent => next.absent = value,
            Field::SickIn => next.sick_in = value,
            Field::SentHome => next.sent_home = value,
            Field::Disciplinary => next.disciplinary = value,
            Field::HasHealthComplaint => next.has_health_complaint = value.parse()?,
            Field::HasAccident => next.has_accident = value.parse()?,
            Field::IncidentDetails => next.incident_details = value,
            Field::Comments => next.comments = value,
            Field::Signature => next.signature = value,
            Field::ReceivedBy => next.received_by = value,
            Field::SubmittedTime => next.submitted_time = value,
        }

        Ok(next)
    }

    pub fn get_field(&self, field: Field) -> String {
        match field {
            Field::Date => self.date.clone(),
            Field::TeacherName => self.teacher_name.clone(),
            Field::ClassGrade => self.class_grade.clone(),
            Field::Total => self.total.clone(),
            Field::Present => self.present.clone(),
            Field::Absent => self.absent.clone(),
            Field::SickIn => self.sick_in.clone(),
            Field::SentHome => self.sent_home.clone(),
            Field::Disciplinary => self.disciplinary.clone(),
            Field::HasHealthComplaint => self.has_health_complaint.to_string(),
            Field::HasAccident => self.has_accident.to_string(),
            Field::IncidentDetails => self.incident_details.clone(),
            Field::Comments => self.comments.clone(),
            Field::Signature => self.signature.clone(),
            Field::ReceivedBy => self.received_by.clone(),
            Field::SubmittedTime => self.submitted_time.clone(),
        }
    }

    /// Identity fields that must be filled before submitting, by wire name.
    pub fn missing_identity(&self) -> Vec<&'static str> {
        [
            (Field::TeacherName, &self.teacher_name),
            (Field::ClassGrade, &self.class_grade),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field.wire_name())
        .collect()
    }

    pub fn needs_incident_details(&self) -> bool {
        self.has_health_complaint.is_yes() || self.has_accident.is_yes()
    }

    /// Incident details are expected but never enforced before submission.
    pub fn incident_details_missing(&self) -> bool {
        self.needs_incident_details() && self.incident_details.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    TeacherName,
    ClassGrade,
    Total,
    Present,
    Absent,
    SickIn,
    SentHome,
    Disciplinary,
    HasHealthComplaint,
    HasAccident,
    IncidentDetails,
    Comments,
    Signature,
    ReceivedBy,
    SubmittedTime,
}

impl Field {
    pub const ALL: [Field; 16] = [
        Field::Date,
        Field::TeacherName,
        Field::ClassGrade,
        Field::Total,
        Field::Present,
        Field::Absent,
        Field::SickIn,
        Field::SentHome,
        Field::Disciplinary,
        Field::HasHealthComplaint,
        Field::HasAccident,
        Field::IncidentDetails,
        Field::Comments,
        Field::Signature,
        Field::ReceivedBy,
        Field::SubmittedTime,
    ];

    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::TeacherName => "teacherName",
            Self::ClassGrade => "classGrade",
            Self::Total => "total",
            Self::Present => "present",
            Self::Absent => "absent",
            Self::SickIn => "sickIn",
            Self::SentHome => "sentHome",
            Self::Disciplinary => "disciplinary",
            Self::HasHealthComplaint => "hasHealthComplaint",
            Self::HasAccident => "hasAccident",
            Self::IncidentDetails => "incidentDetails",
            Self::Comments => "comments",
            Self::Signature => "signature",
            Self::ReceivedBy => "receivedBy",
            Self::SubmittedTime => "submittedTime",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Date => "Date",
            Self::TeacherName => "Teacher",
            Self::ClassGrade => "Class/Grade",
            Self::Total => "Total Students in Class",
            Self::Present => "Number of Students Present",
            Self::Absent => "Number of Students Absent",
            Self::SickIn => "Students Sick (In School)",
            Self::SentHome => "Students Sent Home Sick",
            Self::Disciplinary => "Disciplinary Issues",
            Self::HasHealthComplaint => "Health Complaints?",
            Self::HasAccident => "Accidents/Injuries?",
            Self::IncidentDetails => "Incident Details",
            Self::Comments => "Teacher Comments",
            Self::Signature => "Teacher's Digital Signature",
            Self::ReceivedBy => "Received By",
            Self::SubmittedTime => "Time of Submission",
        }
    }

    /// Inputs of the `present` derivation.
    pub fn feeds_derivation(self) -> bool {
        matches!(self, Self::Total | Self::Absent)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Field {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-' && *ch != '.')
            .collect::<String>()
            .to_lowercase();

        Self::ALL
            .into_iter()
            .find(|field| field.wire_name().to_lowercase() == normalized)
            .ok_or_else(|| FieldError::UnknownField(raw.to_string()))
    }
}

/// Accepts strings, numbers, booleans and null for a text field. Older drafts
/// stored the derived `present` count as a JSON number.
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => other.to_string(),
    })
}

/// Reads a Yes/No value the way the form accepts it; null or anything
/// unrecognised falls back to `No` so the rest of the record survives.
fn lenient_choice<'de, D>(deserializer: D) -> Result<Choice, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text.parse().unwrap_or_default(),
        Value::Bool(true) => Choice::Yes,
        _ => Choice::No,
    })
}
