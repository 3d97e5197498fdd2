pub mod dump;
pub mod kernel_handle;
pub mod link;
pub mod routing;
