//! Whole-document persistence: the JSON backup format, stores, and the save-after-mutate
//! session wrapper.

pub mod document;
mod session;
pub mod store;

pub use document::{AllocationRecord, DutyDocument, RestoreError, TimetableRecord, UNASSIGNED};
pub use session::{PersistentOffice, SessionError};
pub use store::{DocumentStore, JsonFileStore, MemoryStore, StoreError};
