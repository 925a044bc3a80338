//! Comms subsystem: external I/O channels. The only channel is the axum HTTP
//! server.

pub mod axum_channel;
