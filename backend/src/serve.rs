use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use if_addrs::get_if_addrs;
use tokio::net::TcpListener;

/// Binds all interfaces on `port`.
pub async fn bind(port: u16) -> std::io::Result<TcpListener> {
    TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await
}

/// Serves `router` until Ctrl+C or SIGTERM.
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    match listener.local_addr() {
        Ok(addr) => {
            log::info!("Server listening on port {}", addr.port());
            for url in listener_urls(addr) {
                log::info!("➜  {}", url);
            }
        }
        Err(err) => log::warn!("Could not determine the listening address: {}", err),
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

/// Human-friendly URLs for a bound address, expanding unspecified addresses
/// to every local interface of the same family.
pub fn listener_urls(addr: SocketAddr) -> Vec<String> {
    let port = addr.port();
    let ips = if addr.ip().is_unspecified() {
        interface_ips(addr.is_ipv6())
    } else {
        vec![addr.ip()]
    };

    ips.into_iter().map(|ip| url_for(ip, port)).collect()
}

fn interface_ips(ipv6: bool) -> Vec<IpAddr> {
    get_if_addrs()
        .into_iter()
        .flatten()
        .map(|i| i.ip())
        .filter(|ip| ip.is_ipv6() == ipv6)
        .collect()
}

fn url_for(ip: IpAddr, port: u16) -> String {
    match ip {
        _ if ip.is_loopback() => format!("Local:   http://localhost:{port}"),
        IpAddr::V4(_) => format!("Network: http://{ip}:{port}"),
        // Enclose IPv6 addresses in square brackets
        IpAddr::V6(_) => format!("Network: http://[{ip}]:{port}"),
    }
}

pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::info!("Shutdown signal received");
}
