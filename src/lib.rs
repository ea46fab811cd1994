//! Sales metrics dashboard: a query-driven chart pipeline.
//!
//! Five flat tables load once into an embedded SQL engine; eighteen
//! report definitions, each a parameterized aggregation template plus a
//! chart strategy, turn a single region filter into declarative chart
//! specifications. Rendering to pixels is someone else's job.

pub mod charts;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod loader;
pub mod logging;
pub mod reports;
pub mod schema;

#[cfg(test)]
pub(crate) mod testdata;
