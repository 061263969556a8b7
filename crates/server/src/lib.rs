//! HTTP surface of the customers and people services.

pub mod errors;
pub mod openapi;
pub mod routes;
pub mod startup;

pub use startup::{run_customers, run_people};
