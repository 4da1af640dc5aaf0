// Domain layer: data model and ports (interfaces). No external dependencies beyond std/serde when needed.

pub mod model;
pub mod ports;
