pub mod formula;
pub mod loader;
pub mod publisher;
pub mod selector;
pub mod store;
