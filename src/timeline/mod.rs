pub mod allocate;
pub mod audio;
pub mod composer;
pub mod model;
pub mod overlay;
pub mod reading;
