//! Calendar sync flow: ports, helpers and orchestration

pub mod channels;
pub mod operations;
pub mod ports;
pub mod service;
