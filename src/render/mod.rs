pub mod fonts;
pub mod headless;
pub mod raster;
pub mod sandbox;
pub mod svg;
pub mod thumbnails;
