//! Connection-tracking records.
//!
//! Data model for entries read out of the kernel connection-tracking table:
//! the original and reply 4-tuples of a flow plus its NAT status. The
//! subscription that produces these records lives outside this crate; it is
//! consumed through the [`FlowWalker`] contract.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::{Error, Result};

/// One direction of a flow: source and destination address/port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlowTuple {
    pub src: IpAddr,
    pub src_port: u16,
    pub dst: IpAddr,
    pub dst_port: u16,
}

impl FlowTuple {
    /// Creates a new flow tuple.
    pub fn new(src: IpAddr, src_port: u16, dst: IpAddr, dst_port: u16) -> Self {
        Self {
            src,
            src_port,
            dst,
            dst_port,
        }
    }

    /// Creates the reverse tuple (swap source and destination).
    pub fn reverse(&self) -> Self {
        Self {
            src: self.dst,
            src_port: self.dst_port,
            dst: self.src,
            dst_port: self.src_port,
        }
    }
}

impl fmt::Display for FlowTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}",
            SocketAddr::new(self.src, self.src_port),
            SocketAddr::new(self.dst, self.dst_port)
        )
    }
}

impl FromStr for FlowTuple {
    type Err = Error;

    /// Parses `"src:port->dst:port"`, IPv6 addresses bracketed as in
    /// `"[2001:db8::1]:443"`.
    fn from_str(s: &str) -> Result<Self> {
        let (src, dst) = s
            .split_once("->")
            .ok_or_else(|| Error::Parse(format!("flow tuple missing '->': {s}")))?;
        let src: SocketAddr = src
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("bad endpoint: {src}")))?;
        let dst: SocketAddr = dst
            .trim()
            .parse()
            .map_err(|_| Error::Parse(format!("bad endpoint: {dst}")))?;
        Ok(Self::new(src.ip(), src.port(), dst.ip(), dst.port()))
    }
}

/// NAT status of a tracked connection.
///
/// Both flags may be set (e.g. a node-port flow rewrites both sides), either
/// alone, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NatStatus {
    /// The source address/port was rewritten.
    pub src_nat: bool,
    /// The destination address/port was rewritten.
    pub dst_nat: bool,
}

impl NatStatus {
    /// Kernel status bit for source NAT (netfilter `IPS_SRC_NAT`).
    pub const IPS_SRC_NAT: u32 = 1 << 4;
    /// Kernel status bit for destination NAT (netfilter `IPS_DST_NAT`).
    pub const IPS_DST_NAT: u32 = 1 << 5;

    pub const NONE: Self = Self {
        src_nat: false,
        dst_nat: false,
    };
    pub const SRC_NAT: Self = Self {
        src_nat: true,
        dst_nat: false,
    };
    pub const DST_NAT: Self = Self {
        src_nat: false,
        dst_nat: true,
    };
    pub const SRC_AND_DST_NAT: Self = Self {
        src_nat: true,
        dst_nat: true,
    };

    /// Extracts the NAT flags from a raw kernel status mask. Other bits
    /// (seen-reply, assured, confirmed, ...) are ignored.
    pub fn from_bits(bits: u32) -> Self {
        Self {
            src_nat: bits & Self::IPS_SRC_NAT != 0,
            dst_nat: bits & Self::IPS_DST_NAT != 0,
        }
    }

    /// Whether either side of the connection was rewritten.
    pub fn is_natted(&self) -> bool {
        self.src_nat || self.dst_nat
    }
}

/// One entry from the connection-tracking table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flow {
    /// Kernel flow identifier. Carried for diagnostics, unused by rewriting.
    pub id: u32,
    /// IP protocol number. Carried for diagnostics, unused by rewriting.
    pub protocol: u8,
    /// The flow as seen before any NAT rewrite.
    pub original: FlowTuple,
    /// The return path, from the reply direction's perspective.
    pub reply: FlowTuple,
    pub status: NatStatus,
}

impl Flow {
    /// Creates a flow record with no metadata.
    pub fn new(original: FlowTuple, reply: FlowTuple, status: NatStatus) -> Self {
        Self {
            id: 0,
            protocol: 6,
            original,
            reply,
            status,
        }
    }
}

/// A source of connection-tracking records.
///
/// Implementations call the callback once per currently known entry,
/// sequentially; no concurrent callbacks are ever in flight.
pub trait FlowWalker {
    fn walk_flows(&self, f: &mut dyn FnMut(&Flow));
}

/// An in-memory record source over a snapshot of flows.
///
/// Used by tests and by callers that buffer the kernel table elsewhere and
/// hand a consistent snapshot to each reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct BufferedFlowWalker {
    flows: Vec<Flow>,
}

impl BufferedFlowWalker {
    pub fn new(flows: Vec<Flow>) -> Self {
        Self { flows }
    }

    pub fn push(&mut self, flow: Flow) {
        self.flows.push(flow);
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }
}

impl FlowWalker for BufferedFlowWalker {
    fn walk_flows(&self, f: &mut dyn FnMut(&Flow)) {
        for flow in &self.flows {
            f(flow);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tuple_reverse() {
        let tuple: FlowTuple = "10.32.0.16:47600->10.105.173.176:5432".parse().unwrap();
        let reply = tuple.reverse();

        assert_eq!(reply.src, tuple.dst);
        assert_eq!(reply.src_port, tuple.dst_port);
        assert_eq!(reply.dst, tuple.src);
        assert_eq!(reply.dst_port, tuple.src_port);
    }

    #[test]
    fn test_tuple_parse_roundtrip() {
        let text = "10.32.0.7:80->37.157.33.76:13488";
        let tuple: FlowTuple = text.parse().unwrap();
        assert_eq!(tuple.to_string(), text);
    }

    #[test]
    fn test_tuple_parse_ipv6() {
        let tuple: FlowTuple = "[2001:db8::1]:443->[2001:db8::2]:9000".parse().unwrap();
        assert_eq!(tuple.src_port, 443);
        assert_eq!(tuple.dst.to_string(), "2001:db8::2");
    }

    #[test]
    fn test_tuple_parse_rejects_garbage() {
        assert!("10.0.0.1:80".parse::<FlowTuple>().is_err());
        assert!("a->b".parse::<FlowTuple>().is_err());
    }

    #[test]
    fn test_status_from_bits() {
        assert_eq!(NatStatus::from_bits(0), NatStatus::NONE);
        assert_eq!(NatStatus::from_bits(NatStatus::IPS_SRC_NAT), NatStatus::SRC_NAT);
        assert_eq!(NatStatus::from_bits(NatStatus::IPS_DST_NAT), NatStatus::DST_NAT);
        assert_eq!(
            NatStatus::from_bits(NatStatus::IPS_SRC_NAT | NatStatus::IPS_DST_NAT),
            NatStatus::SRC_AND_DST_NAT
        );
        // unrelated kernel bits are ignored
        assert_eq!(NatStatus::from_bits(0b1110), NatStatus::NONE);
    }

    #[test]
    fn test_buffered_walker_yields_in_order() {
        let a = Flow::new(
            "10.0.0.1:1->10.0.0.2:2".parse().unwrap(),
            "10.0.0.2:2->10.0.0.1:1".parse().unwrap(),
            NatStatus::NONE,
        );
        let mut b = a.clone();
        b.id = 7;

        let walker = BufferedFlowWalker::new(vec![a, b]);
        let mut seen = Vec::new();
        walker.walk_flows(&mut |flow| seen.push(flow.id));
        assert_eq!(seen, vec![0, 7]);
    }
}
