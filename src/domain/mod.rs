// Domain layer: ISBN rules, models and ports. No I/O here.

pub mod isbn;
pub mod model;
pub mod ports;
