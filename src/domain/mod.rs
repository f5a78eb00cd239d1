// Domain layer: connector-facing models and ports. No fleet or transport specifics.

pub mod model;
pub mod ports;
