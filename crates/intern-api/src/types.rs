//! Wire types for the internship backend
//!
//! Field names and enumerated values mirror the backend's JSON exactly;
//! serde renames cover the spots where Rust naming and the wire diverge.
//! Ids arriving from the backend stay plain strings so one odd record
//! cannot sink a whole listing; requests built by this crate go through
//! [`crate::UniversityId`] instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::university_id::UniversityId;

/// Progress of a student's internship. Closed set on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudentStatus {
    Pending,
    Ongoing,
    #[serde(rename = "Behind Schedule")]
    BehindSchedule,
    Completed,
}

/// Student row in the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminStudent {
    pub id: i64,
    pub university_id: String,
    pub institutional_email: String,
    pub full_name: String,
    pub phone_number: String,
    pub telegram_id: String,
    pub status: StudentStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub student_grade: f64,
    pub assigned_advisor: Option<i64>,
}

/// Advisor row in the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisor {
    pub id: i64,
    pub phone_number: String,
    pub first_name: String,
    pub last_name: String,
    pub user: i64,
}

impl Advisor {
    /// Username the assignment endpoint conventionally expects.
    ///
    /// The backend exposes no username field on advisor rows, but
    /// account usernames follow the advisor's first name with only the
    /// leading letter capitalized. This derives that suggestion for a
    /// caller to present; the client never substitutes it silently.
    pub fn assignment_username(&self) -> String {
        let mut chars = self.first_name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
            None => String::new(),
        }
    }
}

/// Offer letter attached to a student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferLetter {
    pub id: i64,
    pub document: String,
    pub advisor_approved: bool,
    pub submission_date: String,
    pub approval_date: Option<String>,
    pub student: i64,
}

/// Periodic report attached to a student record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternshipReport {
    pub id: i64,
    pub document: String,
    pub submission_date: String,
    pub advisor_approved: bool,
    pub grade: f64,
    pub student: i64,
}

/// Full student record in the advisor view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub university_id: String,
    pub institutional_email: String,
    pub full_name: String,
    pub phone_number: String,
    pub telegram_id: String,
    pub status: StudentStatus,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub student_grade: f64,
    pub assigned_advisor: i64,
    pub internship_offer_letter: Option<OfferLetter>,
    #[serde(default)]
    pub internship_reports: Vec<InternshipReport>,
}

/// Envelope around the advisor's student listing.
#[derive(Debug, Deserialize)]
pub(crate) struct StudentsEnvelope {
    pub students: Vec<Student>,
}

/// Signup payload for a new advisor account.
#[derive(Clone, Serialize)]
pub struct AdvisorProfile {
    pub username: String,
    pub password: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl fmt::Debug for AdvisorProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdvisorProfile")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("email", &self.email)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("phone_number", &self.phone_number)
            .finish()
    }
}

/// Decision on a pending offer letter. Wire values are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

/// Confirmation returned by the offer-letter decision endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferDecisionReceipt {
    pub message: String,
    pub student_name: String,
    pub student_university_id: String,
    pub advisor_approved: bool,
    #[serde(default)]
    pub approval_date: Option<String>,
}

/// Confirmation returned by the advisor assignment endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentReceipt {
    pub message: String,
}

/// Recipients of an outbound announcement.
///
/// `Everyone` serializes the recipient list as JSON `null`, which the
/// messaging relay reads as a broadcast. An explicit empty list stays
/// `[]` on the wire and reaches nobody; the two are not interchangeable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageAudience {
    Everyone,
    Students(Vec<UniversityId>),
}
