//! Ports - interfaces between the engine and the outside world.
//!
//! Following hexagonal architecture, ports define the contracts the
//! application layer depends on. Adapters implement them: in-memory for
//! tests, Postgres for production, Resend for mail delivery.

mod assignment;
mod clock;
mod discussion_store;
mod mailer;
mod notification_store;
mod org_directory;
mod reconciliation;
mod work_cycle_repository;
mod work_item_repository;

pub use assignment::WorkAssignmentRepository;
pub use clock::{Clock, SystemClock};
pub use discussion_store::DiscussionStore;
pub use mailer::{MailError, MailMessage, Mailer};
pub use notification_store::NotificationStore;
pub use org_directory::{OrgDirectory, UserProfile};
pub use reconciliation::{ReconciliationDirective, ReconciliationOutcome, ReconciliationStore};
pub use work_cycle_repository::WorkCycleRepository;
pub use work_item_repository::WorkItemRepository;
