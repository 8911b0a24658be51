//! Shared models, memo builders and collaborator traits of the relay workspace.
//!
//! Nothing in this crate performs I/O. The types here describe what the protocol adapter
//! assembles (memos, deposit requests, approval requests) and the contracts of the host
//! supplied collaborators it hands them to.
pub mod memo;
pub mod models;
pub mod traits;

/// Transaction hash as returned by the host's deposit function.
pub type TxHash = String;
