pub mod order;
pub mod order_detail;

pub use order::*;
pub use order_detail::*;
