pub mod rest;

pub use rest::RestGateway;
