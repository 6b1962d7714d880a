pub mod store;
pub mod views;
