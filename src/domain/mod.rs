// Domain layer: request/record models, prompts and ports (interfaces).

pub mod model;
pub mod ports;
pub mod prompts;
