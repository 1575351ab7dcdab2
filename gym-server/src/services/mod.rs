//! Services - 核心业务服务

pub mod photo_store;

pub use photo_store::PhotoStore;
