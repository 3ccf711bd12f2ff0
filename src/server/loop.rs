// Server loop module
// Accepts connections until shutdown, then drains the ones in flight

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use super::connection::accept_connection;
use super::signal::shutdown_signal;
use crate::config::AppState;

/// Run the server until SIGINT/SIGTERM
pub async fn run(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    run_until(listener, state, shutdown_signal()).await
}

/// Run the accept loop until `shutdown` resolves
///
/// In-flight connections get up to the configured write timeout to finish.
pub async fn run_until(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let graceful = GracefulShutdown::new();

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(
                            stream,
                            peer_addr,
                            &state,
                            &active_connections,
                            &graceful,
                        );
                    }
                    Err(e) => error!(error = %e, "failed to accept connection"),
                }
            }

            () = &mut shutdown => break,
        }
    }

    // Stop accepting before draining
    drop(listener);

    let in_flight = active_connections.load(Ordering::SeqCst);
    info!(connections = in_flight, "draining connections");

    let drain_timeout = Duration::from_secs(state.config.performance.write_timeout.max(1));
    tokio::select! {
        () = graceful.shutdown() => info!("all connections closed"),
        () = tokio::time::sleep(drain_timeout) => {
            warn!(
                connections = active_connections.load(Ordering::SeqCst),
                "drain timed out, closing remaining connections"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_reusable_listener;
    use crate::storage::{Blob, MemoryStore};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn test_serves_over_tcp_until_shutdown() {
        let store = MemoryStore::new();
        store.put("site", "index.html", Blob::new("<h1>home</h1>", "text/html"));
        let config = Config::load_from("definitely/not/a/config/file").unwrap();
        let state = Arc::new(AppState::new(config, Arc::new(store)));

        let listener = create_reusable_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let server = tokio::spawn(run_until(listener, state, async {
            let _ = stop_rx.await;
        }));

        let response = raw_request(
            addr,
            "GET /site HTTP/1.1\r\nHost: example.test\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 301"), "{response}");
        assert!(response.contains("location: http://example.test/site/"), "{response}");

        let response = raw_request(
            addr,
            "GET /site/ HTTP/1.1\r\nHost: example.test\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        assert!(response.ends_with("<h1>home</h1>"), "{response}");

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
