pub mod inventory;
pub mod session;
pub mod shop;

pub use inventory::Inventory;
pub use session::Session;
pub use shop::ShopStock;
