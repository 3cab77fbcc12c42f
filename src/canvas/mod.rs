/// Canvas module - the drawable-surface abstraction

pub mod canvas;

pub use canvas::*;
