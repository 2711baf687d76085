// net.rs -- network address type and the pure address helpers
//
// Sockets live in the engine. The menus only need to parse what the user
// typed, print addresses back and compare them.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};

/// Address family. Declaration order is the sort order used by `NetAdr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum NetAdrType {
    #[default]
    Loopback,
    Ip,
    Ip6,
}

/// A network endpoint. Ordering compares the raw bytes field by field:
/// family, IPv4 octets, IPv6 octets, scope, then port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NetAdr {
    pub adr_type: NetAdrType,
    pub ip: [u8; 4],
    pub ip6: [u8; 16],
    /// IPv6 scope ID for link-local addresses
    pub scope_id: u32,
    /// Host byte order.
    pub port: u16,
}

impl NetAdr {
    pub fn loopback() -> Self {
        Self::default()
    }

    pub fn ipv4(ip: [u8; 4], port: u16) -> Self {
        Self { adr_type: NetAdrType::Ip, ip, port, ..Default::default() }
    }

    pub fn ipv6(ip6: [u8; 16], port: u16, scope_id: u32) -> Self {
        Self { adr_type: NetAdrType::Ip6, ip6, port, scope_id, ..Default::default() }
    }

    fn from_socket_addr(addr: SocketAddr, port: u16) -> Self {
        match addr {
            SocketAddr::V4(v4) => Self::ipv4(v4.ip().octets(), port),
            SocketAddr::V6(v6) => Self::ipv6(v6.ip().octets(), port, v6.scope_id()),
        }
    }
}

impl fmt::Display for NetAdr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.adr_type {
            NetAdrType::Loopback => write!(f, "loopback"),
            NetAdrType::Ip => write!(f, "{}:{}", Ipv4Addr::from(self.ip), self.port),
            NetAdrType::Ip6 => {
                let ip = Ipv6Addr::from(self.ip6);
                if self.scope_id != 0 {
                    write!(f, "[{}%{}]:{}", ip, self.scope_id, self.port)
                } else {
                    write!(f, "[{}]:{}", ip, self.port)
                }
            }
        }
    }
}

// =============================================================================
// Address utility functions
// =============================================================================

/// Compare two net addresses including port.
pub fn net_compare_adr(a: &NetAdr, b: &NetAdr) -> bool {
    if a.adr_type != b.adr_type {
        return false;
    }

    match a.adr_type {
        NetAdrType::Loopback => true,
        NetAdrType::Ip => a.ip == b.ip && a.port == b.port,
        NetAdrType::Ip6 => a.ip6 == b.ip6 && a.port == b.port && a.scope_id == b.scope_id,
    }
}

/// Convert a NetAdr to the text form used in commands and list files.
pub fn net_adr_to_string(a: &NetAdr) -> String {
    a.to_string()
}

/// Parse a string into a NetAdr.
///
/// Supports:
/// - "localhost" -> Loopback
/// - "1.2.3.4" or "1.2.3.4:27015" -> IPv4
/// - "[::1]" or "[::1]:27015" -> IPv6, optionally "[fe80::1%2]:27015"
/// - "hostname" or "hostname:27015" -> name resolution
///
/// A missing port is left as 0.
pub fn net_string_to_adr(s: &str) -> Option<NetAdr> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.eq_ignore_ascii_case("localhost") {
        return Some(NetAdr::loopback());
    }

    if s.starts_with('[') {
        return parse_ipv6_bracketed(s);
    }

    if s.matches(':').count() > 1 {
        // bare IPv6, no port
        let ip: Ipv6Addr = s.parse().ok()?;
        return Some(NetAdr::ipv6(ip.octets(), 0, 0));
    }

    let (host, port) = match s.rsplit_once(':') {
        Some((host, port_str)) => (host, port_str.parse::<u16>().ok()?),
        None => (s, 0),
    };

    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Some(NetAdr::ipv4(ip.octets(), port));
    }

    if !is_valid_hostname(host) {
        return None;
    }

    let addr = (host, 0).to_socket_addrs().ok()?.next()?;
    Some(NetAdr::from_socket_addr(addr, port))
}

fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host.len() <= 253
        && host.bytes().all(|c| c.is_ascii_alphanumeric() || c == b'-' || c == b'.')
        && host.bytes().any(|c| c.is_ascii_alphabetic())
}

/// Parse "[address]:port" or "[address%scope]:port".
fn parse_ipv6_bracketed(s: &str) -> Option<NetAdr> {
    let close_bracket = s.find(']')?;
    let addr_part = &s[1..close_bracket];

    let (addr_str, scope_id) = match addr_part.split_once('%') {
        Some((addr, scope)) => (addr, scope.parse::<u32>().unwrap_or(0)),
        None => (addr_part, 0),
    };

    let port = match &s[close_bracket + 1..] {
        "" => 0,
        rest => rest.strip_prefix(':')?.parse::<u16>().ok()?,
    };

    match addr_str.parse::<IpAddr>().ok()? {
        IpAddr::V6(ip) => Some(NetAdr::ipv6(ip.octets(), port, scope_id)),
        IpAddr::V4(_) => None,
    }
}

// =============================================================================
// Tests
// =============================================================================
