// Domain layer: player records, score windows and the store port.

pub mod model;
pub mod ports;
