//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area and shares the one
//! `LibraryRepository`.

mod auth;
mod catalog;
mod circulation;
mod doctor;
pub mod logging;
mod member;
mod notify;
mod status;

pub use auth::AuthService;
pub use catalog::{CatalogService, CopyFilter};
pub use circulation::{CirculationService, ReturnReceipt};
pub use doctor::{CheckResult, CheckStatus, DoctorResult, DoctorService, DoctorSummary};
pub use logging::{EntryPoint, LogEntry, LogEvent, LoggingService};
pub use member::{Login, MemberService};
pub use notify::{BroadcastReport, NotifyService};
pub use status::{OverdueCopy, StatusService, StatusSummary, TitleSummary};
