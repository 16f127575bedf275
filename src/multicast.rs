/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
******************************************************************************/
//! UDP multicast egress, spec §6 "Multicast egress": "UDP datagrams to a
//! configured multicast group; one snapshot per datagram; datagram size
//! ≤ 64 KiB."
//!
//! No direct teacher precedent (the teacher crate has no UDP egress at all);
//! authored fresh atop `tokio::net::UdpSocket`, following the teacher's
//! general async-IO idiom elsewhere (`manager.rs`'s `tokio::spawn`'d tasks)
//! and this repo's own [`crate::wire`] framing for the datagram payload.

use crate::book::snapshot::Snapshot;
use crate::wire::{self, WireError};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;

/// A UDP multicast publisher: one snapshot per datagram, spec §6.
pub struct MulticastPublisher {
    socket: UdpSocket,
    target: SocketAddr,
}

impl MulticastPublisher {
    /// Binds a sending socket on `bind_addr` and joins `group:port` for
    /// publishing. `bind_addr` is the local interface to send from, not a
    /// receiving address.
    pub async fn bind(
        bind_addr: Ipv4Addr,
        group: Ipv4Addr,
        port: u16,
    ) -> Result<Self, WireError> {
        let socket = UdpSocket::bind((bind_addr, 0)).await?;
        socket.set_multicast_loop_v4(true)?;
        socket.set_multicast_ttl_v4(1)?;
        let target = SocketAddr::V4(SocketAddrV4::new(group, port));
        Ok(Self { socket, target })
    }

    /// Encodes `snapshot` as a single length-delimited frame and sends it as
    /// one datagram to the configured multicast group.
    ///
    /// Fails with [`WireError::FrameTooLarge`] rather than fragmenting —
    /// spec §6 bounds datagram size at 64 KiB, so an oversized snapshot
    /// (pathologically large `depth`) is a configuration error, not
    /// something to silently truncate or split.
    pub async fn publish(&self, snapshot: &Snapshot) -> Result<(), WireError> {
        let frame = wire::encode_frame(snapshot)?;
        self.socket.send_to(&frame, self.target).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::snapshot::SnapshotLevel;

    fn sample() -> Snapshot {
        Snapshot {
            symbol_id: 1,
            bids: vec![SnapshotLevel { price: 10, volume: 1 }],
            asks: vec![],
            last_executed_price: 0,
            best_bid: 10,
            best_ask: u64::MAX,
            spread: None,
            timestamp_ns: 1,
        }
    }

    #[tokio::test]
    async fn loopback_round_trip_via_127_0_0_1() {
        // Exercise the codec path over a real (non-multicast) UDP socket
        // pair on loopback, since binding a multicast group address in a
        // sandboxed test environment is unreliable.
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let recv_addr = receiver.local_addr().unwrap();

        let sender = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let frame = wire::encode_frame(&sample()).unwrap();
        sender.send_to(&frame, recv_addr).await.unwrap();

        let mut buf = [0u8; 65536];
        let (n, _) = receiver.recv_from(&mut buf).await.unwrap();
        let mut cursor = std::io::Cursor::new(&buf[..n]);
        let decoded = wire::read_frame(&mut cursor).unwrap().unwrap();
        assert_eq!(decoded, sample());
    }
}
