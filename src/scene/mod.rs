pub mod canvas;
pub mod model;
pub(crate) mod order;
pub mod stops;
