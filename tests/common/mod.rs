//! Shared utilities for integration and load testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use barcode_server::config::ServerConfig;
use barcode_server::http::{HttpServer, ServerError};
use barcode_server::lifecycle::Shutdown;
use barcode_server::routing::RouteTable;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A server running on an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), ServerError>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) -> Result<(), ServerError> {
        self.shutdown.trigger();
        self.handle.await.unwrap()
    }
}

/// Start the service with the default route table.
pub async fn start_server(config: ServerConfig) -> TestServer {
    let server = HttpServer::new(config).unwrap();
    spawn(server).await
}

/// Start the service dispatching over a custom route table.
pub async fn start_server_with_table(config: ServerConfig, table: RouteTable) -> TestServer {
    spawn(HttpServer::with_table(config, table)).await
}

async fn spawn(server: HttpServer) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, receiver).await });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
