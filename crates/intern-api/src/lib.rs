//! Client library for the university internship tracking backend
//!
//! Wraps the backend's REST API behind a [`Session`] that keeps the
//! caller signed in across requests and process restarts:
//!
//! 1. [`CredentialStore::load`] reads the pair persisted by an earlier run
//! 2. [`Session::login`] stores the pair the backend issues
//! 3. Authenticated calls attach the access token as a bearer header
//! 4. A 401 triggers one refresh and one replay of the failed request
//! 5. [`Session::logout`] invalidates the refresh token and clears the store
//!
//! Domain calls live in [`endpoints`]; everything returns the error
//! taxonomy in [`error`].

pub mod credentials;
pub mod endpoints;
pub mod error;
pub mod session;
pub mod types;
pub mod university_id;

pub use credentials::{CredentialStore, StoreError, TokenPair};
pub use endpoints::MAX_MESSAGE_LEN;
pub use error::{ApiError, Result};
pub use session::Session;
pub use types::{
    AdminStudent, Advisor, AdvisorProfile, AssignmentReceipt, InternshipReport, MessageAudience,
    OfferDecisionReceipt, OfferLetter, ReviewDecision, Student, StudentStatus,
};
pub use university_id::{ParseIdError, UniversityId};
