//! CAN-FD wire types.

pub mod frame;
