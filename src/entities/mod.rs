pub mod order_details;
pub mod orders;
pub mod products;
pub mod users;

pub use order_details as order_detail_entity;
pub use orders as order_entity;
pub use orders::OrderStatus;
pub use products as product_entity;
pub use users as user_entity;
