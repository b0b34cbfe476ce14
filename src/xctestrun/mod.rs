//! The xctestrun document and its generator.
//!
//! - [`store`]: field access and patching for an existing document ([`XctestRun`]).
//! - [`factory`]: generation of a document from a prebuilt app and test bundle ([`XctestRunFactory`]).
//! - [`pipelines`]: one generation pipeline per test type.
//! - [`portable`]: the final `__TESTROOT__` substitution.

pub mod factory;
pub mod pipelines;
pub mod portable;
pub mod store;

pub use factory::{WorkDir, XctestRunFactory};
pub use store::XctestRun;
