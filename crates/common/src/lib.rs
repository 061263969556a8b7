//! Shared building blocks for the petclinic services: health payloads,
//! logging initialisation, metrics encoding and shutdown handling.

pub mod types;
pub mod utils;
pub mod metrics;
pub mod shutdown;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_type_ok() {
        let h = types::Health::ok();
        assert_eq!(h.status, "ok");
    }
}
