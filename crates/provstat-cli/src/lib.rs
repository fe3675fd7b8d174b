//! provstat-cli
//! ============
//!
//! Command-line interface for the `provstat-core` harmonized provincial
//! dataset.
//!
//! The binary (`provstat`) is the primary deliverable; the library target
//! exposes its argument parser, logging setup and renderers so they can be
//! tested without spawning a process.
//!
//! Quick start
//! -----------
//!
//! ```text
//! provstat --help
//! provstat --data-dir ./data stats
//! provstat --region Sumatra top --limit 5
//! provstat --province "Kep. Riau" summary
//! provstat map --metric gini_ratio --output gini.geojson
//! provstat table --format json
//! ```
//!
//! For programmatic access to the harmonized data, use the
//! `provstat-core` crate directly.
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod args;
pub mod logging;
pub mod report;
