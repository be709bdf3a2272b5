//! Library half of `shardline-node`, split out so integration tests can
//! drive the server in-process.

pub mod cli;
pub mod logging;
pub mod server;
