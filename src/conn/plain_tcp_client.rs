use crate::conn::ConnectParams;
use std::{net::TcpStream, time::Instant};

// A plain blocking tcp connection with separated reader and writer halves.
// The receive loop keeps the reader; the writer half moves into the shared
// FrameWriter.
#[derive(Debug)]
pub(crate) struct PlainTcpClient {
    params: ConnectParams,
    reader: TcpStream,
    writer: TcpStream,
}

impl PlainTcpClient {
    // Returns an initialized plain tcp connection
    pub fn try_new(params: ConnectParams) -> std::io::Result<Self> {
        let start = Instant::now();
        trace!("TcpClient: Connecting to {:?}", params.addr());

        let tcpstream = TcpStream::connect(params.addr())?;

        trace!(
            "Connection is initialized ({} µs)",
            Instant::now().duration_since(start).as_micros(),
        );
        Ok(Self {
            params,
            writer: tcpstream.try_clone()?,
            reader: tcpstream,
        })
    }

    pub fn into_parts(self) -> (ConnectParams, TcpStream, TcpStream) {
        (self.params, self.reader, self.writer)
    }
}
