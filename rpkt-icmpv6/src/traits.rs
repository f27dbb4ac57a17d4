use std::any::Any;
use std::net::Ipv6Addr;

use crate::error::{Error, Result};
use crate::icmpv6::Icmpv6Message;

enum_sim! {
    /// An enum-like type for representing the next header value in IPv6.
    pub struct IpProtocol (u8) {
        /// IP packet payload is TCP protocol.
        TCP = 6,

        /// IP packet payload is UDP protocol.
        UDP = 17,

        /// IP packet payload is ICMPv6 protocol.
        ICMPV6 = 58,
    }
}

enum_sim! {
    /// Tags the kind of a payload for the packet construction dispatcher.
    pub struct PduType (u16) {
        /// The payload is an ICMPv6 message.
        ICMPV6 = 1,
    }
}

impl PduType {
    /// Map an IPv6 next header value to the payload tag that decodes it.
    pub fn from_ip_protocol(proto: IpProtocol) -> Option<PduType> {
        match proto {
            IpProtocol::ICMPV6 => Some(PduType::ICMPV6),
            _ => None,
        }
    }
}

/// Decides whether serialization recomputes the checksum.
///
/// The policy only takes effect when the enclosing layer supplies a
/// [`PduParent`], since the checksum covers the IPv6 pseudo-header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChecksumPolicy {
    /// Always write a freshly computed checksum.
    Always,
    /// Compute the checksum only when the stored one is zero.
    IfZero,
    /// Write the stored checksum verbatim.
    Never,
}

impl ChecksumPolicy {
    /// Whether a message whose stored checksum is `stored` gets a new one.
    #[inline]
    pub fn should_compute(&self, stored: u16) -> bool {
        match self {
            ChecksumPolicy::Always => true,
            ChecksumPolicy::IfZero => stored == 0,
            ChecksumPolicy::Never => false,
        }
    }
}

/// Addressing supplied by the enclosing IPv6 packet when a payload is
/// serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PduParent {
    /// Source address of the enclosing IPv6 header.
    pub src_addr: Ipv6Addr,
    /// Destination address of the enclosing IPv6 header.
    pub dst_addr: Ipv6Addr,
    /// Checksum recomputation policy, [`ChecksumPolicy::Always`] by default.
    pub checksum_policy: ChecksumPolicy,
}

impl PduParent {
    /// Create a parent context that always recomputes the checksum.
    pub fn new(src_addr: Ipv6Addr, dst_addr: Ipv6Addr) -> Self {
        Self {
            src_addr,
            dst_addr,
            checksum_policy: ChecksumPolicy::Always,
        }
    }

    /// Replace the checksum recomputation policy.
    pub fn with_checksum_policy(mut self, policy: ChecksumPolicy) -> Self {
        self.checksum_policy = policy;
        self
    }
}

/// The contract between a payload and the packet structure that owns it.
pub trait Pdu: std::fmt::Debug {
    /// The tag identifying this payload kind.
    fn pdu_type(&self) -> PduType;

    /// Number of bytes the payload occupies on the wire.
    fn header_size(&self) -> usize;

    /// Serialize the payload into the start of `buf`.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`Pdu::header_size`].
    fn write_serialization(&self, buf: &mut [u8], parent: Option<&PduParent>);

    /// An independent deep copy of the payload.
    fn clone_pdu(&self) -> Box<dyn Pdu>;

    /// Access the concrete payload type.
    fn as_any(&self) -> &dyn Any;
}

/// Build the typed payload tagged by `pdu_type` from captured bytes.
pub fn parse_pdu(pdu_type: PduType, buf: &[u8]) -> Result<Box<dyn Pdu>> {
    match pdu_type {
        PduType::ICMPV6 => Ok(Box::new(Icmpv6Message::parse(buf)?)),
        _ => Err(Error::UnsupportedPdu(pdu_type)),
    }
}
