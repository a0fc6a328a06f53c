//! Batch driver: manifest groups in, one looping video per group out.
//!
//! Every failure is contained: a bad image is skipped, a bad group is reported, and the
//! batch always moves on to the next group.

/// Group-name to image-list provider.
pub mod manifest;
/// Per-group runner and the end-of-run report.
pub mod runner;
