//! Data providers.
//!
//! Each provider drives its own query sequence, folds the results into a
//! statistics record, and writes its own snapshot file.

pub mod cloudflare;
pub mod github;
