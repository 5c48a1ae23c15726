pub mod model;
pub mod substitute;
