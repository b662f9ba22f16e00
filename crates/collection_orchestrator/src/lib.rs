mod collection_orchestrator;
pub mod domain;
pub mod eliona;
pub mod fds;
#[cfg(test)]
mod test_server;

pub use collection_orchestrator::*;
