//! provstat-rs
//!
//! Workspace facade over [`provstat_core`]. The demos under `demos/` import
//! from here so they read the same whether they build against the
//! workspace or the core crate alone.

pub use provstat_core::*;

pub mod prelude {
    pub use provstat_core::analysis::{crime_trend, top_provinces};
    pub use provstat_core::prelude::*;
    pub use provstat_core::Summary;
}
