pub mod composer;
pub mod placement;
pub mod raster;
