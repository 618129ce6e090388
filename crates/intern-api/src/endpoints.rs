//! Typed calls for the backend's domain operations
//!
//! Each method pairs a fixed path with its request and response types
//! and returns the taxonomy from [`crate::error`]. Admin and advisor
//! scopes share the same session; the backend enforces roles, so a call
//! outside the signed-in role comes back as an authorization error.

use reqwest::Method;
use serde::Serialize;

use crate::error::{ApiError, Result};
use crate::session::{Session, decode, expect_success};
use crate::types::{
    AdminStudent, Advisor, AssignmentReceipt, MessageAudience, OfferDecisionReceipt,
    ReviewDecision, Student, StudentsEnvelope,
};
use crate::university_id::UniversityId;

/// Longest message the announcement relay accepts.
pub const MAX_MESSAGE_LEN: usize = 4096;

impl Session {
    /// Every student, admin scope.
    pub async fn list_students(&self) -> Result<Vec<AdminStudent>> {
        let response = self
            .execute(self.request(Method::GET, "internship/students/"))
            .await?;
        decode(response).await
    }

    /// Every advisor, admin scope.
    pub async fn list_advisors(&self) -> Result<Vec<Advisor>> {
        let response = self
            .execute(self.request(Method::GET, "internship/advisors/"))
            .await?;
        decode(response).await
    }

    /// Pair a student with an advisor, admin scope.
    ///
    /// `advisor_username` is sent verbatim; [`Advisor::assignment_username`]
    /// derives the conventional value for a caller to offer.
    pub async fn assign_advisor(
        &self,
        student: &UniversityId,
        advisor_username: &str,
    ) -> Result<AssignmentReceipt> {
        #[derive(Serialize)]
        struct AssignRequest<'a> {
            university_id: &'a str,
            advisor_username: &'a str,
        }

        let body = AssignRequest {
            university_id: student.as_compact(),
            advisor_username,
        };
        let response = self
            .execute(
                self.request(Method::POST, "internship/assign-advisor/")
                    .json(&body),
            )
            .await?;
        decode(response).await
    }

    /// Students assigned to the signed-in advisor.
    pub async fn assigned_students(&self) -> Result<Vec<Student>> {
        let response = self
            .execute(self.request(Method::GET, "advisor/students/"))
            .await?;
        let envelope: StudentsEnvelope = decode(response).await?;
        Ok(envelope.students)
    }

    /// Full record for one of the advisor's students.
    pub async fn student_detail(&self, student: &UniversityId) -> Result<Student> {
        let path = format!("advisor/students/{}/", student.as_compact());
        let response = self.execute(self.request(Method::GET, &path)).await?;
        decode(response).await
    }

    /// Approve or reject a pending offer letter.
    pub async fn decide_offer_letter(
        &self,
        student: &UniversityId,
        decision: ReviewDecision,
    ) -> Result<OfferDecisionReceipt> {
        #[derive(Serialize)]
        struct DecisionRequest<'a> {
            university_id: &'a str,
            status: ReviewDecision,
        }

        let body = DecisionRequest {
            university_id: student.as_compact(),
            status: decision,
        };
        let response = self
            .execute(
                self.request(Method::PUT, "advisor/approve-offer-letter/")
                    .json(&body),
            )
            .await?;
        decode(response).await
    }

    /// Reject an offer letter with written feedback for the student.
    pub async fn reject_offer_letter(
        &self,
        student: &UniversityId,
        feedback: &str,
    ) -> Result<()> {
        let path = format!(
            "advisor/students/{}/reject-offer-letter/",
            student.as_compact()
        );
        let response = self
            .execute(
                self.request(Method::POST, &path)
                    .json(&FeedbackRequest { feedback }),
            )
            .await?;
        expect_success(response).await
    }

    /// Approve one internship report.
    pub async fn approve_report(&self, student: &UniversityId, report_id: i64) -> Result<()> {
        let path = format!(
            "advisor/students/{}/reports/{report_id}/approve/",
            student.as_compact()
        );
        let response = self.execute(self.request(Method::POST, &path)).await?;
        expect_success(response).await
    }

    /// Reject one internship report with written feedback.
    pub async fn reject_report(
        &self,
        student: &UniversityId,
        report_id: i64,
        feedback: &str,
    ) -> Result<()> {
        let path = format!(
            "advisor/students/{}/reports/{report_id}/reject/",
            student.as_compact()
        );
        let response = self
            .execute(
                self.request(Method::POST, &path)
                    .json(&FeedbackRequest { feedback }),
            )
            .await?;
        expect_success(response).await
    }

    /// Relay an announcement to students through the messaging bot.
    ///
    /// The message is trimmed, must not be empty, and is capped at
    /// [`MAX_MESSAGE_LEN`] characters; both checks fail before anything
    /// touches the network. Broadcast and an empty recipient list are
    /// different payloads, see [`MessageAudience`].
    pub async fn send_message(&self, text: &str, audience: &MessageAudience) -> Result<()> {
        #[derive(Serialize)]
        struct MessageRequest<'a> {
            message: &'a str,
            // None serializes as null: broadcast. An empty list stays [].
            student_ids: Option<Vec<&'a str>>,
        }

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ApiError::Validation("message must not be empty".into()));
        }
        if trimmed.chars().count() > MAX_MESSAGE_LEN {
            return Err(ApiError::Validation(format!(
                "message exceeds {MAX_MESSAGE_LEN} characters"
            )));
        }

        let student_ids = match audience {
            MessageAudience::Everyone => None,
            MessageAudience::Students(ids) => {
                Some(ids.iter().map(|id| id.as_compact()).collect())
            }
        };
        let body = MessageRequest {
            message: trimmed,
            student_ids,
        };
        let response = self
            .execute(
                self.request(Method::POST, "internship/send-telegram-message/")
                    .json(&body),
            )
            .await?;
        expect_success(response).await
    }
}

#[derive(Serialize)]
struct FeedbackRequest<'a> {
    feedback: &'a str,
}
