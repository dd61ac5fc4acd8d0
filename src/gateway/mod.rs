//! Gateway implementations

mod rest;

pub use rest::{RestGateway, SessionEvent};
