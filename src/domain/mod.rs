pub mod cart;
pub mod catalog;
pub mod errors;
pub mod identity;
pub mod order;
pub mod ports;
