//! Storage infrastructure: loading the service configuration file.
//!
//! The server reads its configuration once, at startup, and never writes it
//! back.  Everything file-format specific stays in `config`, so the rest of
//! the server only ever sees a [`config::ServiceConfig`].

pub mod config;
