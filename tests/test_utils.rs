// advisable because not all test modules use all functions of this module:
#![allow(dead_code)]

use flexi_logger::{opt_format, Logger, LoggerHandle};
use std::{
    io::{Read, Write},
    net::TcpStream,
};
use thinknode_provider::{
    CalcFailure, CalcRegistry, CalcValue, Capabilities, ConnectParams, Provider, ProviderError,
    Timestamp, TypeDesc,
};

pub const PID: &str = "abcdefghijklmnopqrstuvwxyz012345";

// Returns a logger that prints out all info, warn and error messages.
pub fn init_logger() -> LoggerHandle {
    Logger::try_with_env_or_str("info")
        .unwrap()
        .format(opt_format)
        .start()
        .unwrap_or_else(|e| panic!("Logger initialization failed with {e}"))
}

// The calculations used across the integration tests.
pub fn sample_registry() -> CalcRegistry {
    let mut registry = CalcRegistry::new();
    registry
        .register(
            "Add",
            vec![TypeDesc::Integer, TypeDesc::Integer],
            TypeDesc::Integer,
            Capabilities::None,
            |args, _ctx| match (&args[0], &args[1]) {
                (CalcValue::Integer(a), CalcValue::Integer(b)) => Ok(CalcValue::Integer(a + b)),
                _ => Err(CalcFailure::new("BadArgs", "expected two integers")),
            },
        )
        .unwrap();
    registry
        .register(
            "Stepper",
            vec![],
            TypeDesc::Integer,
            Capabilities::Progress,
            |_args, ctx| {
                let progress = ctx.progress().expect("registered with progress capability");
                progress.report(0.25, "q").ok();
                progress.report(0.75, "q").ok();
                Ok(CalcValue::Integer(7))
            },
        )
        .unwrap();
    registry
        .register(
            "Exploder",
            vec![],
            TypeDesc::Integer,
            Capabilities::ProgressFailure,
            |_args, ctx| {
                ctx.failure()
                    .expect("registered with failure capability")
                    .report("E", "boom")
                    .ok();
                // both of these must be swallowed by the cancellation
                ctx.progress()
                    .expect("registered with progress capability")
                    .report(0.9, "late")
                    .ok();
                Ok(CalcValue::Integer(0))
            },
        )
        .unwrap();
    registry
        .register(
            "Panicky",
            vec![],
            TypeDesc::Integer,
            Capabilities::None,
            |_args, _ctx| panic!("boom"),
        )
        .unwrap();
    registry
        .register(
            "NextDay",
            vec![TypeDesc::Timestamp],
            TypeDesc::Timestamp,
            Capabilities::None,
            |args, _ctx| match &args[0] {
                CalcValue::Timestamp(ts) => Ok(CalcValue::Timestamp(
                    Timestamp::from_epoch_millis(ts.epoch_millis() + 86_400_000),
                )),
                _ => Err(CalcFailure::new("BadArgs", "expected a timestamp")),
            },
        )
        .unwrap();
    registry
        .register(
            "Greet",
            vec![TypeDesc::record([("name", TypeDesc::Text)])],
            TypeDesc::Text,
            Capabilities::None,
            |args, _ctx| match &args[0] {
                CalcValue::Record(fields) => match fields.first() {
                    Some((_, CalcValue::Text(name))) => {
                        Ok(CalcValue::Text(format!("Hello, {name}")))
                    }
                    _ => Err(CalcFailure::new("BadArgs", "expected a name field")),
                },
                _ => Err(CalcFailure::new("BadArgs", "expected a record")),
            },
        )
        .unwrap();
    registry
        .register(
            "Sleepy",
            vec![],
            TypeDesc::Integer,
            Capabilities::None,
            |_args, _ctx| {
                std::thread::sleep(std::time::Duration::from_millis(300));
                Ok(CalcValue::Integer(42))
            },
        )
        .unwrap();
    registry
}

// Runs a provider against the given local port; the thread ends with the
// fatal error that terminated the receive loop.
pub fn spawn_provider(port: u16) -> std::thread::JoinHandle<ProviderError> {
    std::thread::spawn(move || {
        let provider = Provider::new(sample_registry());
        let params = ConnectParams::new("127.0.0.1", port, PID).unwrap();
        provider
            .start_with(params)
            .expect_err("the receive loop only returns with an error")
    })
}

// ---------------------------------------------------------------------
// Supervisor-side wire helpers, deliberately written against the raw byte
// layout rather than the crate's own codecs.

pub fn send_frame(stream: &mut TcpStream, action: u8, body: &[u8]) {
    let mut frame = vec![1, 0, action, 0];
    frame.extend_from_slice(&u32::try_from(body.len()).unwrap().to_be_bytes());
    frame.extend_from_slice(body);
    stream.write_all(&frame).unwrap();
    stream.flush().unwrap();
}

pub fn read_frame(stream: &mut TcpStream) -> (u8, Vec<u8>) {
    let mut header = [0_u8; 8];
    stream.read_exact(&mut header).unwrap();
    assert_eq!(header[0], 1, "outbound frames must carry version 1");
    assert_eq!(header[1], 0, "reserved byte 1 must be written as 0");
    assert_eq!(header[3], 0, "reserved byte 3 must be written as 0");
    let length = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);
    let mut body = vec![0_u8; length as usize];
    stream.read_exact(&mut body).unwrap();
    (header[2], body)
}

pub fn expect_register(stream: &mut TcpStream) {
    let (action, body) = read_frame(stream);
    assert_eq!(action, 0, "the first outbound frame must be Register");
    assert_eq!(body.len(), 34);
    assert_eq!(body[..2], [0, 0]);
    assert_eq!(&body[2..], PID.as_bytes());
}

pub fn function_body(name: &str, args: &[&[u8]]) -> Vec<u8> {
    let mut body = vec![u8::try_from(name.len()).unwrap()];
    body.extend_from_slice(name.as_bytes());
    body.extend_from_slice(&u16::try_from(args.len()).unwrap().to_be_bytes());
    for arg in args {
        body.extend_from_slice(&u32::try_from(arg.len()).unwrap().to_be_bytes());
        body.extend_from_slice(arg);
    }
    body
}

pub fn parse_failure_body(body: &[u8]) -> (String, String) {
    let code_len = body[0] as usize;
    let code = String::from_utf8(body[1..=code_len].to_vec()).unwrap();
    let message_len = u16::from_be_bytes([body[1 + code_len], body[2 + code_len]]) as usize;
    let message =
        String::from_utf8(body[3 + code_len..3 + code_len + message_len].to_vec()).unwrap();
    assert_eq!(body.len(), 3 + code_len + message_len);
    (code, message)
}

// The request slot is released by the worker thread right after the final
// frame of a request is written; give it a moment before the next request.
pub fn settle() {
    std::thread::sleep(std::time::Duration::from_millis(20));
}
