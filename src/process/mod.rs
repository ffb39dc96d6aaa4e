pub mod date;
pub mod encode;
pub mod normalize;
