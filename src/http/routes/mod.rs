//! Route handlers, one module per area.

pub mod agreements;
pub mod health;
pub mod maintenance;
pub mod prediction;
pub mod properties;
pub mod verification;
