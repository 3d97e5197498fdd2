pub mod addr;
pub mod flags;
pub mod message;
pub mod routing;
