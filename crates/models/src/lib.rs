pub mod errors;
pub mod db;
pub mod owner;
pub mod person;
pub mod pets;
pub mod validate;
