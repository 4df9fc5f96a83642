//! Internal utilities.

use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Receive buffer requested for client sockets. Large GETBULK responses can
/// arrive back to back after a retransmission.
const RECV_BUFFER_SIZE: usize = 256 * 1024;

/// Bind an ephemeral UDP socket suitable for talking to `peer`.
///
/// The local address is the unspecified address of the peer's family. IPv6
/// sockets are left dual-stack so IPv4-mapped peers work as well.
pub(crate) fn bind_ephemeral_udp(peer: SocketAddr) -> io::Result<UdpSocket> {
    let (domain, local) = if peer.is_ipv6() {
        (Domain::IPV6, IpAddr::V6(Ipv6Addr::UNSPECIFIED))
    } else {
        (Domain::IPV4, IpAddr::V4(Ipv4Addr::UNSPECIFIED))
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    if peer.is_ipv6() {
        socket.set_only_v6(false)?;
    }

    // Kernel caps this at rmem_max; a smaller buffer is not fatal.
    let _ = socket.set_recv_buffer_size(RECV_BUFFER_SIZE);

    socket.set_nonblocking(true)?;
    socket.bind(&SocketAddr::new(local, 0).into())?;

    UdpSocket::from_std(socket.into())
}
