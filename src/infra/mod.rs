pub mod db;
pub mod document;
pub mod error;
pub mod http;
pub(crate) mod lock;
pub mod memory;
pub mod telemetry;
