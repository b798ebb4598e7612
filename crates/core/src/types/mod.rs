//! Core types for Libris.
//!
//! These mirror the records the backend returns. The client never owns them;
//! it only holds transient copies while a view is on screen.

pub mod credential;
pub mod ebook;
pub mod email;
pub mod id;
pub mod review;
pub mod stats;
pub mod timestamp;
pub mod user;

pub use credential::{Credential, DecodeError, Identity, Role, decode_identity};
pub use ebook::{Attachment, Category, Ebook, EbookUpdate, EbookUpload, SortOrder};
pub use email::{Email, EmailError};
pub use id::*;
pub use review::{NewReview, Rating, RatingError, Review};
pub use stats::{DashboardSummary, EbookStat, MonitoringPanel, UserStat};
pub use timestamp::Timestamp;
pub use user::{ActivityLog, Registration, UserProfile};
