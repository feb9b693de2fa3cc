// Domain layer: service descriptors, per-candidate outcomes and the ports the checker talks through.

pub mod model;
pub mod ports;
