pub mod carts;
pub mod managers;
pub mod session;
