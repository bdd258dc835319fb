use axum_test::TestServer;
use ledger_node::{router, AppState, NodeConfig};
use std::{net::SocketAddr, time::Duration};
use tokio::net::TcpListener;

pub fn test_config(node_id: &str) -> NodeConfig {
    NodeConfig {
        node_id: node_id.to_string(),
        peer_timeout: Duration::from_secs(2),
        ..NodeConfig::default()
    }
}

pub fn test_server(node_id: &str) -> (TestServer, AppState) {
    let state = AppState::new(&test_config(node_id)).expect("build state");
    let server = TestServer::new(router(state.clone())).expect("start test server");
    (server, state)
}

/// Serve `state` on an ephemeral local port and return its `host:port`.
pub async fn spawn_node(state: AppState) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    addr
}
