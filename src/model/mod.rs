pub mod properties;
pub mod term;
