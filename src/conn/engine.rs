use crate::{
    conn::{ConnectParams, FrameWriter, PlainTcpClient},
    dispatch::RequestDispatcher,
    protocol::{
        parts::Registration, util_sync, Action, CalcFailure, FrameHeader, PING_BODY_LEN,
    },
    registry::CalcRegistry,
    ProviderError, ProviderResult,
};
use std::{io::BufReader, net::TcpStream, sync::Arc};

// Owns the connection to the supervisor.
//
// The reader half belongs exclusively to the receive loop; everything
// outbound goes through the shared FrameWriter. Pings and function requests
// are handled on their own threads so the loop is back in read_exact
// immediately.
#[derive(Debug)]
pub(crate) struct ConnectionEngine {
    params: ConnectParams,
    reader: BufReader<TcpStream>,
    writer: Arc<FrameWriter>,
    dispatcher: RequestDispatcher,
}

impl ConnectionEngine {
    pub fn connect(params: ConnectParams, registry: Arc<CalcRegistry>) -> ProviderResult<Self> {
        info!("Connecting to supervisor at {}", params.addr());
        let client = PlainTcpClient::try_new(params)?;
        let (params, reader, writer_stream) = client.into_parts();
        debug!("Connecting to supervisor...done");

        let writer = Arc::new(FrameWriter::new(writer_stream));
        let dispatcher = RequestDispatcher::new(registry, Arc::clone(&writer));
        Ok(Self {
            params,
            reader: BufReader::new(reader),
            writer,
            dispatcher,
        })
    }

    pub fn register(&self) -> ProviderResult<()> {
        debug!("Registering with pid \"{}\"", self.params.pid());
        let body = Registration::new(self.params.pid()).to_body()?;
        self.writer.write_frame(Action::Register, &body)?;
        debug!("Registering...done");
        Ok(())
    }

    // The receive loop. Leaves only with a fatal error.
    #[allow(clippy::cast_possible_truncation)]
    pub fn run(mut self) -> ProviderResult<()> {
        debug!("Entering the receive loop");
        loop {
            let header = FrameHeader::parse(&mut self.reader)?;
            trace!(
                "Received header: action = {}, length = {}",
                header.action,
                header.length
            );
            let body = util_sync::parse_bytes(header.length as usize, &mut self.reader)?;

            match header.action {
                Action::Function => {
                    debug!("Received function message ({} body bytes)", body.len());
                    if let Err(error) = self.dispatcher.dispatch(body) {
                        if matches!(error, ProviderError::ProtocolViolation(_)) {
                            // the supervisor broke the one-request-at-a-time
                            // contract: report, then tear down the connection
                            let failure =
                                CalcFailure::new("ProtocolViolation", error.to_string());
                            self.writer
                                .write_frame(Action::Failure, &failure.to_body()?)?;
                        }
                        return Err(error);
                    }
                }
                Action::Ping => {
                    if body.len() != PING_BODY_LEN {
                        return Err(ProviderError::ProtocolViolationDetailed(format!(
                            "ping body must be {PING_BODY_LEN} bytes, got {}",
                            body.len()
                        )));
                    }
                    debug!("Received ping message");
                    let writer = Arc::clone(&self.writer);
                    let _detached = std::thread::Builder::new()
                        .name("ping-worker".to_string())
                        .spawn(move || {
                            if let Err(e) = writer.write_frame(Action::Pong, &body) {
                                error!("Answering a ping failed: {e}");
                            } else {
                                trace!("Pong written");
                            }
                        })?;
                }
                inbound => {
                    return Err(ProviderError::ProtocolViolationDetailed(format!(
                        "inbound {inbound} frames are not part of the provider protocol"
                    )));
                }
            }
        }
    }
}
