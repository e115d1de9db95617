mod connect_params;
mod engine;
mod frame_writer;
mod plain_tcp_client;

pub use connect_params::ConnectParams;

pub(crate) use engine::ConnectionEngine;
pub(crate) use frame_writer::FrameWriter;
pub(crate) use plain_tcp_client::PlainTcpClient;
