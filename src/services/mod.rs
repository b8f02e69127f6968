//! Services for session storage, synchronization and reporting

pub mod aggregator;
pub mod http_repository;
pub mod reconciler;
pub mod remote;
pub mod report;
pub mod scheduler;
pub mod sender;
pub mod session_service;
pub mod session_store;

pub use aggregator::{format_minutes, Aggregator};
pub use http_repository::HttpRepository;
pub use reconciler::{DeleteOutcome, MergePlan, Reconciler, SyncReport, SyncStatus};
pub use remote::{MemoryRepository, SessionRepository};
pub use report::{ReportFormat, ReportRenderer};
pub use scheduler::{
    DispatchOutcome, MarkSentPolicy, ReportDecision, ReportDispatcher, ReportScheduler,
};
pub use sender::{OutboxSender, ReportSender};
pub use session_service::{CompletionOutcome, SessionService};
pub use session_store::SessionStore;
