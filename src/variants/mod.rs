pub mod matcher;
pub mod normalize;
