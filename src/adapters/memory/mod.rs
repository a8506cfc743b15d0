//! In-memory adapters.
//!
//! Single-process implementations of every port, used by unit tests and the
//! integration suite. Each store takes one coarse lock per operation, which
//! gives the same atomicity the Postgres adapters get from transactions.

mod clock;
mod discussions;
mod mailer;
mod notifications;
mod org;
mod work_board;
mod work_cycles;

pub use clock::FixedClock;
pub use discussions::InMemoryDiscussionStore;
pub use mailer::RecordingMailer;
pub use notifications::InMemoryNotificationStore;
pub use org::InMemoryOrgDirectory;
pub use work_board::InMemoryWorkBoard;
pub use work_cycles::InMemoryWorkCycleRepository;
