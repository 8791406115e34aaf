//! URL popularity index library.

pub mod config;
pub mod http;
pub mod index;
pub mod ingest;
pub mod lifecycle;
pub mod observability;
pub mod search;

pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use index::SharedIndex;
pub use lifecycle::Shutdown;
