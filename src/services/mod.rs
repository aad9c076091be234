pub mod catalog_service;
pub mod order_detail_service;
pub mod order_service;

pub use catalog_service::*;
pub use order_detail_service::*;
pub use order_service::*;
