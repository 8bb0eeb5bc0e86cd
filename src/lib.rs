pub mod config;
pub mod diagram;
pub mod studio;
pub mod surface;
#[doc(hidden)]
pub mod test_support;
pub mod tracker;
