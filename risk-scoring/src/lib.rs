//! Risk scoring for water mains.
//!
//! Likelihood of failure (LOF) blends a service-life decay score with a
//! historical break-frequency score. Consequence of failure (COF) is a
//! proximity proxy: service laterals and critical facilities per isolation
//! zone, plus nearest distances to roads, buildings and water features.
//! All scoring procedures are pure per-row transforms over joined tables;
//! reading and writing the tables is the only I/O in this crate.
#![warn(missing_docs)]
#![recursion_limit = "1024"]

/// Contains the break-frequency scoring.
pub mod breaks;
/// Contains the consequence-of-failure scoring.
pub mod cof;
/// Contains the error types used by this crate.
pub mod error;
/// Contains the combined likelihood-of-failure score.
pub mod lof;
/// Contains the near-distance computation.
pub mod near;
/// Contains the service-life scoring.
pub mod service_life;
/// Contains the CSV table readers and writers.
pub mod tables;
