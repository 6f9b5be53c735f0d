//! Unit tests for transport configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use clap::Parser;

use super::transport::{
    DEFAULT_HOST, DEFAULT_PORT, Transport, TransportArgs, TransportMode, parse_mode_for_test,
};

#[derive(Parser, Debug)]
struct TestCli {
    #[command(flatten)]
    transport: TransportArgs,
}

#[test]
fn test_transport_default_is_stdio() {
    let transport = Transport::default();
    assert!(transport.is_stdio());
    assert!(!transport.is_http());
    assert!(!transport.is_sse());
    assert_eq!(transport.port(), None);
    assert_eq!(transport.bind_addr(), None);
}

#[test]
fn test_transport_http_constructor() {
    let transport = Transport::http(3000);
    assert!(transport.is_http());
    assert!(!transport.is_stdio());
    assert_eq!(transport.port(), Some(3000));
    assert_eq!(transport.to_string(), "http (127.0.0.1:3000)");
}

#[test]
fn test_transport_sse_constructor() {
    let transport = Transport::sse(8080);
    assert!(transport.is_sse());
    assert_eq!(transport.port(), Some(8080));
    assert_eq!(transport.to_string(), "sse (127.0.0.1:8080)");
}

#[test]
fn test_transport_args_default() {
    let args = TransportArgs::default();
    assert_eq!(args.transport, TransportMode::Stdio);
    assert_eq!(args.host, DEFAULT_HOST);
    assert_eq!(args.port, DEFAULT_PORT);
    assert!(args.into_transport().is_stdio(), "Default transport should be stdio");
}

#[test]
fn test_transport_args_into_transport_stdio_ignores_port() {
    let args = TransportArgs {
        transport: TransportMode::Stdio,
        host: DEFAULT_HOST,
        port: 9000,
    };
    let transport = args.into_transport();
    assert!(transport.is_stdio());
    assert_eq!(transport.port(), None);
}

#[test]
fn test_transport_args_into_transport_http_uses_host() {
    let host = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
    let args = TransportArgs {
        transport: TransportMode::Http,
        host,
        port: 3000,
    };
    let transport = args.into_transport();
    assert!(transport.is_http());
    assert_eq!(transport.bind_addr(), Some(SocketAddr::new(host, 3000)));
}

#[test]
fn test_transport_args_into_transport_sse() {
    let args = TransportArgs {
        transport: TransportMode::Sse,
        host: DEFAULT_HOST,
        port: 4000,
    };
    let transport = args.into_transport();
    assert!(transport.is_sse());
    assert_eq!(transport.port(), Some(4000));
}

#[test]
fn test_transport_equality() {
    assert_eq!(Transport::Stdio, Transport::Stdio);
    assert_eq!(Transport::http(8080), Transport::http(8080));
    assert_ne!(Transport::Stdio, Transport::http(8080));
    assert_ne!(Transport::http(8080), Transport::sse(8080));
    assert_ne!(Transport::http(8080), Transport::http(9000));
}

#[test]
fn test_parse_transport_mode_is_case_insensitive() {
    assert_eq!(parse_mode_for_test("HTTP"), Ok(TransportMode::Http));
    assert_eq!(parse_mode_for_test("Sse"), Ok(TransportMode::Sse));
    assert_eq!(parse_mode_for_test("stdio"), Ok(TransportMode::Stdio));
}

#[test]
fn test_parse_transport_mode_rejects_unknown() {
    let err = parse_mode_for_test("websocket").unwrap_err();
    assert!(err.contains("websocket"));
    assert!(err.contains("stdio, http, sse"));
}

#[test]
fn test_cli_parses_network_flags() {
    let cli = TestCli::try_parse_from([
        "server",
        "--transport",
        "http",
        "--host",
        "0.0.0.0",
        "--port",
        "9100",
    ])
    .unwrap();
    let transport = cli.transport.into_transport();
    assert_eq!(
        transport.bind_addr(),
        Some(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 9100))
    );
}

#[test]
fn test_cli_rejects_invalid_host() {
    let result = TestCli::try_parse_from(["server", "--host", "not-an-ip"]);
    assert!(result.is_err());
}
