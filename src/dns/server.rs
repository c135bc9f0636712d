use crate::config::Config;
use crate::dns::handlers::Handler;
use crate::resolver::Resolver;
use tokio::net::{TcpListener, UdpSocket};
use trust_dns_server::ServerFuture;

/// Bind the configured UDP socket (and TCP listener, if any) and serve `resolver` on them.
///
/// # Errors
///
/// Returns an error if a listen address can't be bound.
pub async fn new(config: &Config, resolver: Resolver) -> anyhow::Result<ServerFuture<Handler>> {
    let mut dns_server = with_socket(resolver, UdpSocket::bind(config.dns_udp_bind_addr).await?);
    if let Some(tcp_addr) = config.dns_tcp_bind_addr {
        dns_server.register_listener(TcpListener::bind(tcp_addr).await?, config.dns_tcp_timeout);
    }
    Ok(dns_server)
}

/// Serve `resolver` on an already bound UDP socket.
#[must_use]
pub fn with_socket(resolver: Resolver, socket: UdpSocket) -> ServerFuture<Handler> {
    let mut dns_server = ServerFuture::new(Handler::new(resolver));
    dns_server.register_socket(socket);
    dns_server
}
