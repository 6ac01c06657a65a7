pub mod fast;
pub mod portion;
pub mod source;
