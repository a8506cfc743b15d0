//! PostgreSQL adapters backing the persistence ports.
//!
//! One struct per port, all sharing a `PgPool`. Reconciliation is the one
//! multi-table write and runs inside a single transaction.

mod discussions;
mod notifications;
mod org_directory;
mod reconciliation;
mod work_cycles;
mod work_items;

pub use discussions::PostgresDiscussionStore;
pub use notifications::PostgresNotificationStore;
pub use org_directory::PostgresOrgDirectory;
pub use reconciliation::PostgresReconciliationStore;
pub use work_cycles::PostgresWorkCycleRepository;
pub use work_items::PostgresWorkItemRepository;
