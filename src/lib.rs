//! Keeps a markdown time ledger in step with itself. The entries table is
//! edited by hand inside a notes app; every change event recomputes the
//! weekly and monthly balances and rewrites the document, but only when the
//! result actually differs from what is on disk.
//!

pub mod cli;
pub mod fs;
pub mod ledger;
pub mod observer;
pub mod utils;
