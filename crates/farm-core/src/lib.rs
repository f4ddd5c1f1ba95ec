//! Core types and rules for the farmstead system.
//!
//! Every persisted record lives here together with its validation rules, the
//! sequence-number and document-id generators, and the filter types used by
//! the storage layer.

pub mod activity;
pub mod collection;
pub mod credentials;
pub mod dates;
pub mod document;
pub mod egg;
pub mod enums;
pub mod feed;
pub mod filter;
pub mod finance;
pub mod idgen;
pub mod jsonl;
pub mod sales;
pub mod sequence;
pub mod task;
pub mod user;
pub mod validation;

pub use document::Document;
