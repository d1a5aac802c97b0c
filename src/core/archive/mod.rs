//! Season archival and union view reads

pub mod engine;

pub use engine::{ArchivalEngine, ArchivalStatus, ArchiveReport, ArchiveTally};
