pub mod detector;
pub mod message;
