mod fds_authenticator;
mod fds_client;

pub use fds_authenticator::*;
pub use fds_client::*;
