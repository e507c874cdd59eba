pub mod cache;
pub mod hosting;
pub mod readme;
pub mod registry;
pub mod service;

pub use service::ConanCenterService;
