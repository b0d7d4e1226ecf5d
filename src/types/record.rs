//! Student record types
//!
//! This module defines the stored [`Record`], its closed-set enums
//! ([`Gender`], [`Faculty`], [`StudentStatus`]) and the typed partial
//! update [`RecordPatch`] built from a validated payload.

use super::error::RecordError;
use super::payload::RecordPayload;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Student identifier (e.g. `22120001`)
pub type RecordId = String;

/// Date format used for `date_of_birth` in payloads and exports
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fields that must be present to create a record
///
/// `address` is optional and defaults to an empty string.
pub const REQUIRED_FIELDS: [&str; 10] = [
    "id",
    "full_name",
    "date_of_birth",
    "gender",
    "faculty",
    "course",
    "program",
    "email",
    "phone",
    "status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

/// Faculty a student is enrolled in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faculty {
    #[serde(rename = "Khoa Luật")]
    Law,
    #[serde(rename = "Khoa Tiếng Anh thương mại")]
    BusinessEnglish,
    #[serde(rename = "Khoa Tiếng Nhật")]
    Japanese,
    #[serde(rename = "Khoa Tiếng Pháp")]
    French,
}

impl Faculty {
    pub const ALL: [Faculty; 4] = [
        Faculty::Law,
        Faculty::BusinessEnglish,
        Faculty::Japanese,
        Faculty::French,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Faculty::Law => "Khoa Luật",
            Faculty::BusinessEnglish => "Khoa Tiếng Anh thương mại",
            Faculty::Japanese => "Khoa Tiếng Nhật",
            Faculty::French => "Khoa Tiếng Pháp",
        }
    }
}

/// Enrollment status of a student
///
/// Which changes between statuses are allowed is decided by
/// [`crate::core::status_rules`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StudentStatus {
    #[serde(rename = "Đang học")]
    Studying,
    #[serde(rename = "Bảo lưu")]
    Deferred,
    #[serde(rename = "Đình chỉ")]
    Suspended,
    #[serde(rename = "Đã tốt nghiệp")]
    Graduated,
    #[serde(rename = "Đã thôi học")]
    DroppedOut,
}

impl StudentStatus {
    pub const ALL: [StudentStatus; 5] = [
        StudentStatus::Studying,
        StudentStatus::Deferred,
        StudentStatus::Suspended,
        StudentStatus::Graduated,
        StudentStatus::DroppedOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StudentStatus::Studying => "Đang học",
            StudentStatus::Deferred => "Bảo lưu",
            StudentStatus::Suspended => "Đình chỉ",
            StudentStatus::Graduated => "Đã tốt nghiệp",
            StudentStatus::DroppedOut => "Đã thôi học",
        }
    }
}

/// Case-insensitive lookup of a closed-set value by its display string
fn parse_closed<T: Copy>(value: &str, all: &[T], name: fn(&T) -> &'static str) -> Option<T> {
    let wanted = value.trim().to_lowercase();
    all.iter().copied().find(|v| name(v).to_lowercase() == wanted)
}

macro_rules! closed_set_impls {
    ($ty:ty, $field:literal) => {
        impl FromStr for $ty {
            type Err = RecordError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_closed(s, &<$ty>::ALL, <$ty>::as_str).ok_or_else(|| {
                    RecordError::format($field, format!("unknown {} '{}'", $field, s.trim()))
                })
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_set_impls!(Gender, "gender");
closed_set_impls!(Faculty, "faculty");
closed_set_impls!(StudentStatus, "status");

/// One student's stored data
///
/// Field declaration order is the column order of CSV exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub faculty: Faculty,
    pub course: String,
    pub program: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub status: StudentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    /// Flatten the record into the raw payload form used by imports
    ///
    /// Server timestamps are left out.
    pub fn to_payload(&self) -> RecordPayload {
        RecordPayload::from_pairs([
            ("id", self.id.clone()),
            ("full_name", self.full_name.clone()),
            (
                "date_of_birth",
                self.date_of_birth.format(DATE_FORMAT).to_string(),
            ),
            ("gender", self.gender.to_string()),
            ("faculty", self.faculty.to_string()),
            ("course", self.course.clone()),
            ("program", self.program.clone()),
            ("address", self.address.clone()),
            ("email", self.email.clone()),
            ("phone", self.phone.clone()),
            ("status", self.status.to_string()),
        ])
    }

    /// Compare everything except `created_at`/`updated_at`
    pub fn same_content(&self, other: &Record) -> bool {
        self.id == other.id
            && self.full_name == other.full_name
            && self.date_of_birth == other.date_of_birth
            && self.gender == other.gender
            && self.faculty == other.faculty
            && self.course == other.course
            && self.program == other.program
            && self.address == other.address
            && self.email == other.email
            && self.phone == other.phone
            && self.status == other.status
    }
}

/// Typed partial update
///
/// Every field is optional; only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordPatch {
    pub id: Option<RecordId>,
    pub full_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub faculty: Option<Faculty>,
    pub course: Option<String>,
    pub program: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub status: Option<StudentStatus>,
}

pub fn parse_date(value: &str) -> Result<NaiveDate, RecordError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        RecordError::format(
            "date_of_birth",
            format!("'{}' is not a YYYY-MM-DD date", value.trim()),
        )
    })
}

impl RecordPatch {
    /// Convert the fields present in a payload into typed values
    ///
    /// Text fields are trimmed. Unrecognized keys (including the server
    /// timestamps found in exports) are ignored.
    pub fn from_payload(payload: &RecordPayload) -> Result<Self, RecordError> {
        let text = |field: &str| payload.get(field).map(|v| v.trim().to_string());

        Ok(RecordPatch {
            id: text("id"),
            full_name: text("full_name"),
            date_of_birth: payload.get("date_of_birth").map(parse_date).transpose()?,
            gender: payload.get("gender").map(str::parse).transpose()?,
            faculty: payload.get("faculty").map(str::parse).transpose()?,
            course: text("course"),
            program: text("program"),
            address: text("address"),
            email: text("email"),
            phone: text("phone"),
            status: payload.get("status").map(str::parse).transpose()?,
        })
    }

    /// Build a new record, failing on the first missing required field
    pub fn into_record(self, now: DateTime<Utc>) -> Result<Record, RecordError> {
        fn required<T>(value: Option<T>, field: &str) -> Result<T, RecordError> {
            value.ok_or_else(|| RecordError::missing_field(field))
        }

        Ok(Record {
            id: required(self.id, "id")?,
            full_name: required(self.full_name, "full_name")?,
            date_of_birth: required(self.date_of_birth, "date_of_birth")?,
            gender: required(self.gender, "gender")?,
            faculty: required(self.faculty, "faculty")?,
            course: required(self.course, "course")?,
            program: required(self.program, "program")?,
            address: self.address.unwrap_or_default(),
            email: required(self.email, "email")?,
            phone: required(self.phone, "phone")?,
            status: required(self.status, "status")?,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply the present fields onto `record`
    ///
    /// The identifier is never changed by a patch.
    pub fn apply(&self, record: &mut Record) {
        if let Some(v) = &self.full_name {
            record.full_name = v.clone();
        }
        if let Some(v) = self.date_of_birth {
            record.date_of_birth = v;
        }
        if let Some(v) = self.gender {
            record.gender = v;
        }
        if let Some(v) = self.faculty {
            record.faculty = v;
        }
        if let Some(v) = &self.course {
            record.course = v.clone();
        }
        if let Some(v) = &self.program {
            record.program = v.clone();
        }
        if let Some(v) = &self.address {
            record.address = v.clone();
        }
        if let Some(v) = &self.email {
            record.email = v.clone();
        }
        if let Some(v) = &self.phone {
            record.phone = v.clone();
        }
        if let Some(v) = self.status {
            record.status = v;
        }
    }
}
