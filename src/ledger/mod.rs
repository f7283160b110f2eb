//! The accounting core: parsing the ledger document, folding entries into
//! weekly and monthly buckets, and rendering the document back out
//! deterministically. Everything here is pure string/date work; file access
//! and event handling live in [crate::observer].

pub mod balance;
pub mod block;
pub mod config;
pub mod entry;
pub mod parse;
pub mod render;
