// Domain layer: recording models and the ports the adapters implement.

pub mod model;
pub mod ports;
