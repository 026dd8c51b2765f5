// Domain layer: core models and ports (interfaces) for the site directory.

pub mod model;
pub mod ports;
