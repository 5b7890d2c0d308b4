//! Data types for the storage gateway.
//!
//! Nothing here is persisted by the service itself: requests and summaries are
//! built per call, and object metadata lives in the object store.

pub mod delete_event;
pub mod file_summary;
pub mod metadata;
pub mod storage_request;
