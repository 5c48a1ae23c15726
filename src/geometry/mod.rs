pub mod arc;
pub mod measure;
