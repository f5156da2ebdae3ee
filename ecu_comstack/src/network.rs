//! Network state machines.

pub mod canfd;
pub mod state;

pub use canfd::{CanNetwork, RegistryLink, UpstreamLink};
