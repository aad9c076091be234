pub mod order;
pub mod order_detail;

pub use order::order_config;
pub use order_detail::order_detail_config;
