// Domain layer: DTOs and ports. No transport or XML details here.

pub mod model;
pub mod ports;
