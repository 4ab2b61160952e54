pub mod session;
pub mod taxonomy;
