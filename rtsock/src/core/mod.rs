#[cfg(target_os = "macos")]
pub mod darwin;
pub mod kernel;
pub mod message;
#[cfg(test)]
pub mod mock;
#[cfg(target_os = "macos")]
pub mod socket;
