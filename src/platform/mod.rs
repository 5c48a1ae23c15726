pub mod assets;
pub mod commerce;
pub mod images;
pub mod shopify;
