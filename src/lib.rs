//! # discdiag
//!
//! An interactive raw-block-device exerciser: it fills and compares sector
//! buffers against drive contents and drives the device through scripted
//! I/O workloads to surface data-integrity and firmware defects.
//! ```text
//! Disc Diagnostic 2.1
//! Diag> █
//! ```
//!
//! **This program runs with privileged access and can destroy any drive it
//! is pointed at.** All drives start write locked; only `unprot` clears it.
//!

#[path = "doc/introduction.rs"]
#[allow(non_snake_case)]
pub mod _Introduction;

#[path = "doc/appendix_a.rs"]
#[allow(non_snake_case)]
pub mod __Appendix_A;

pub mod lang;

pub mod disc;
pub mod mach;
pub mod term;
