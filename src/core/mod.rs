//! Core layer: the paginated fetch and field projection engine
//!
//! Data flows `source` → (`fetch` + `cache`) → `assemble` (`fields`), with a
//! `session` carrying identity and counters through every step.

pub mod assemble;
pub mod cache;
pub mod entity;
pub mod fetch;
pub mod fields;
pub mod services;
pub mod session;
pub mod source;
