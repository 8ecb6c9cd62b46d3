//! Catalog integration tests: id allocation and service scenarios.

mod support;
mod service;
