// Domain layer: payload model and the agent port. No I/O here.

pub mod model;
pub mod ports;
