pub mod caption;
pub mod key_points;
pub mod quotes;
