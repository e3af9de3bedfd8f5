pub mod activation;
pub mod products;
pub mod returns;
pub mod system;
pub mod verify;
