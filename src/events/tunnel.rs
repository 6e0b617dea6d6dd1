//! Tunnel payloads: endpoint, network configuration and lifecycle transitions.
//!
//! These are plain values. Nothing here validates addresses, routes or the
//! MTU; the tunnel layer that consumes a [`TunnelConfig`] is the one that
//! rejects it.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::ParseTransportProtocolError;

/// Transport layer protocol of a tunnel endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportProtocol {
    Tcp,
    Udp,
}

impl FromStr for TransportProtocol {
    type Err = ParseTransportProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(TransportProtocol::Tcp),
            "udp" => Ok(TransportProtocol::Udp),
            other => Err(ParseTransportProtocolError {
                input: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for TransportProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportProtocol::Tcp => f.write_str("TCP"),
            TransportProtocol::Udp => f.write_str("UDP"),
        }
    }
}

/// Tunnel protocol family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TunnelType {
    #[serde(rename = "openvpn")]
    OpenVpn,
    #[serde(rename = "wireguard")]
    WireGuard,
}

impl fmt::Display for TunnelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelType::OpenVpn => f.write_str("OpenVPN"),
            TunnelType::WireGuard => f.write_str("WireGuard"),
        }
    }
}

/// Remote side of a tunnel: socket address plus transport protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelEndpoint {
    pub address: SocketAddr,
    pub protocol: TransportProtocol,
}

impl TunnelEndpoint {
    /// Builds an endpoint from its parts.
    pub fn new(ip: impl Into<IpAddr>, port: u16, protocol: TransportProtocol) -> Self {
        Self {
            address: SocketAddr::new(ip.into(), port),
            protocol,
        }
    }
}

impl fmt::Display for TunnelEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.protocol)
    }
}

/// Network configuration pushed to the platform tunnel interface.
///
/// ### Notes
/// - All lists keep caller order and may contain duplicates.
/// - `mtu` is carried as-is; a non-positive value is representable and is
///   left for the tunnel layer to reject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TunnelConfig {
    /// Addresses assigned to the tunnel interface.
    pub addresses: Vec<IpAddr>,
    /// DNS servers to use while the tunnel is up.
    pub dns_servers: Vec<IpAddr>,
    /// Networks routed through the tunnel.
    pub routes: Vec<IpNet>,
    /// Maximum transmission unit of the tunnel interface.
    pub mtu: i32,
}

impl fmt::Display for TunnelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "addresses={:?} dns={:?} routes=[",
            self.addresses, self.dns_servers
        )?;
        for (i, route) in self.routes.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{route}")?;
        }
        write!(f, "] mtu={}", self.mtu)
    }
}

/// What the tunnel does once it has finished disconnecting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionAfterDisconnect {
    #[default]
    Nothing,
    Block,
    Reconnect,
}

/// Tunnel lifecycle transition reported by the tunnel-management layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TunnelStateTransition {
    /// No tunnel is running.
    Disconnected,
    /// Negotiating a tunnel towards `endpoint`.
    Connecting {
        endpoint: TunnelEndpoint,
        tunnel_type: TunnelType,
    },
    /// Tunnel is up.
    Connected {
        endpoint: TunnelEndpoint,
        tunnel_type: TunnelType,
    },
    /// Tearing the tunnel down.
    Disconnecting { after: ActionAfterDisconnect },
    /// The tunnel layer gave up; `cause` is its own description.
    Error { cause: String },
}

impl TunnelStateTransition {
    /// Endpoint of a connecting or connected tunnel.
    pub fn endpoint(&self) -> Option<&TunnelEndpoint> {
        match self {
            TunnelStateTransition::Connecting { endpoint, .. }
            | TunnelStateTransition::Connected { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    #[inline]
    pub fn is_connected(&self) -> bool {
        matches!(self, TunnelStateTransition::Connected { .. })
    }
}

impl fmt::Display for TunnelStateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunnelStateTransition::Disconnected => f.write_str("disconnected"),
            TunnelStateTransition::Connecting {
                endpoint,
                tunnel_type,
            } => write!(f, "connecting {tunnel_type} - {endpoint}"),
            TunnelStateTransition::Connected {
                endpoint,
                tunnel_type,
            } => write!(f, "connected {tunnel_type} - {endpoint}"),
            TunnelStateTransition::Disconnecting { after } => {
                write!(f, "disconnecting (then {after:?})")
            }
            TunnelStateTransition::Error { cause } => write!(f, "error: {cause}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_transport_protocol_parse() {
        assert_eq!("udp".parse::<TransportProtocol>(), Ok(TransportProtocol::Udp));
        assert_eq!("tcp".parse::<TransportProtocol>(), Ok(TransportProtocol::Tcp));

        let err = "quic".parse::<TransportProtocol>().unwrap_err();
        assert_eq!(err.input, "quic");
        assert_eq!(err.as_label(), "invalid_transport_protocol");
    }

    #[test]
    fn test_endpoint_display() {
        let ep = TunnelEndpoint::new(Ipv4Addr::new(185, 65, 134, 1), 51820, TransportProtocol::Udp);
        assert_eq!(ep.to_string(), "185.65.134.1:51820/UDP");
        assert_eq!(ep.address.port(), 51820);
    }

    #[test]
    fn test_config_keeps_duplicates_and_order() {
        let dns: IpAddr = "1.1.1.1".parse().unwrap();
        let cfg = TunnelConfig {
            addresses: vec!["10.0.0.2".parse().unwrap(), "10.0.0.1".parse().unwrap()],
            dns_servers: vec![dns, dns],
            routes: vec!["0.0.0.0/0".parse().unwrap()],
            mtu: 0,
        };

        assert_eq!(cfg.dns_servers, vec![dns, dns]);
        assert_eq!(cfg.addresses[0].to_string(), "10.0.0.2");
        assert_eq!(cfg.mtu, 0);
        assert_eq!(
            cfg.to_string(),
            "addresses=[10.0.0.2, 10.0.0.1] dns=[1.1.1.1, 1.1.1.1] routes=[0.0.0.0/0] mtu=0"
        );
    }

    #[test]
    fn test_transition_endpoint_and_display() {
        let endpoint = TunnelEndpoint::new(Ipv4Addr::LOCALHOST, 1194, TransportProtocol::Tcp);
        let connected = TunnelStateTransition::Connected {
            endpoint,
            tunnel_type: TunnelType::OpenVpn,
        };

        assert!(connected.is_connected());
        assert_eq!(connected.endpoint(), Some(&endpoint));
        assert_eq!(connected.to_string(), "connected OpenVPN - 127.0.0.1:1194/TCP");

        let down = TunnelStateTransition::Disconnecting {
            after: ActionAfterDisconnect::Reconnect,
        };
        assert_eq!(down.endpoint(), None);
        assert_eq!(down.to_string(), "disconnecting (then Reconnect)");
    }

    #[test]
    fn test_transition_serde_tagging() {
        let ev = TunnelStateTransition::Connecting {
            endpoint: TunnelEndpoint::new(Ipv4Addr::new(10, 0, 0, 1), 443, TransportProtocol::Tcp),
            tunnel_type: TunnelType::WireGuard,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["state"], "connecting");
        assert_eq!(json["tunnel_type"], "wireguard");
        assert_eq!(json["endpoint"]["protocol"], "tcp");

        let back: TunnelStateTransition = serde_json::from_value(json).unwrap();
        assert_eq!(back, ev);
    }
}
