mod routes;
mod structs;

pub mod db;
pub mod form;
pub mod guess;
pub mod store;
pub mod upload;

pub use routes::*;
pub use structs::*;
