mod test_utils;

use log::*;
use std::{
    io::Write,
    net::{Shutdown, TcpListener, TcpStream},
};
use thinknode_provider::ProviderError;

// Each scenario drives one provider into its fatal-error path and checks
// the error the receive loop terminates with.
#[test]
fn test_020_protocol_errors() {
    let _log_handle = test_utils::init_logger();
    second_function_while_running();
    unknown_action();
    inbound_result_frame();
    undersized_ping();
    wrong_version();
    truncated_body();
}

fn run_broken_session(drive: impl FnOnce(&mut TcpStream)) -> ProviderError {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let provider_thread = test_utils::spawn_provider(port);
    let (mut supervisor, _) = listener.accept().unwrap();
    test_utils::expect_register(&mut supervisor);
    drive(&mut supervisor);
    provider_thread.join().unwrap()
}

fn second_function_while_running() {
    info!("a second function request mid-flight closes the connection");
    let error = run_broken_session(|supervisor| {
        test_utils::send_frame(supervisor, 1, &test_utils::function_body("Sleepy", &[]));
        test_utils::send_frame(
            supervisor,
            1,
            &test_utils::function_body("Add", &[&[0x02], &[0x03]]),
        );
        // the provider reports the violation before tearing down
        let (action, body) = test_utils::read_frame(supervisor);
        assert_eq!(action, 4);
        let (code, _message) = test_utils::parse_failure_body(&body);
        assert_eq!(code, "ProtocolViolation");
    });
    assert!(matches!(error, ProviderError::ProtocolViolation(_)));
}

fn unknown_action() {
    info!("an unknown action byte is fatal");
    let error = run_broken_session(|supervisor| {
        test_utils::send_frame(supervisor, 9, &[]);
    });
    assert!(matches!(error, ProviderError::UnknownAction(9)));
}

fn inbound_result_frame() {
    info!("a Result frame must never arrive at a provider");
    let error = run_broken_session(|supervisor| {
        test_utils::send_frame(supervisor, 3, &[0x05]);
    });
    assert!(matches!(error, ProviderError::ProtocolViolationDetailed(_)));
}

fn undersized_ping() {
    info!("a ping body must be exactly 32 bytes");
    let error = run_broken_session(|supervisor| {
        test_utils::send_frame(supervisor, 5, &[0xAA; 16]);
    });
    assert!(matches!(error, ProviderError::ProtocolViolationDetailed(_)));
}

fn wrong_version() {
    info!("an inbound frame with version != 1 is fatal");
    let error = run_broken_session(|supervisor| {
        supervisor
            .write_all(&[2, 0, 5, 0, 0, 0, 0, 0])
            .and_then(|()| supervisor.flush())
            .unwrap();
    });
    assert!(matches!(error, ProviderError::UnsupportedVersion(2)));
}

fn truncated_body() {
    info!("a connection closed inside a frame body is a truncation");
    let error = run_broken_session(|supervisor| {
        // header announces 10 body bytes, only 3 follow
        supervisor
            .write_all(&[1, 0, 5, 0, 0, 0, 0, 10, 0xAA, 0xBB, 0xCC])
            .and_then(|()| supervisor.flush())
            .unwrap();
        supervisor.shutdown(Shutdown::Write).unwrap();
    });
    assert!(matches!(error, ProviderError::Truncated));
}
