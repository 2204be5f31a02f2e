//! Override tracking core: domain model and pure services for computing and
//! maintaining the appendix.

pub mod domain;
pub mod services;
