use std::any::Any;
use std::net::Ipv6Addr;

use bytes::{Buf, BufMut};

use super::header::{Icmpv6Header, VariantFields, ICMPV6_HEADER_LEN, ICMPV6_HEADER_TEMPLATE};
use super::ndp::{
    padded_payload, redirected_hdr_payload, NdpOptionAdvertInterval, NdpOptionHomeAgentInfo,
    NdpOptionLinkAddr, NdpOptionMtu, NdpOptionPrefixInfo, NdpOptionRedirectedHdr,
    NdpOptionShortcutLimit, HomeAgentInfo, PrefixInfo, LINK_ADDR_PAYLOAD_LEN,
    REDIRECTED_HDR_RESERVED_LEN, SHORT_PAYLOAD_LEN,
};
use super::option::{Icmpv6Option, Icmpv6Options};
use super::{Icmpv6Type, NdpOptionType};
use crate::checksum_utils::{self, Ipv6PseudoHeader};
use crate::error::{Error, Result};
use crate::ether::EtherAddr;
use crate::traits::{IpProtocol, Pdu, PduParent, PduType};

/// Length of the target and destination address fields.
pub const ICMPV6_ADDR_LEN: usize = 16;

/// Length of the reachable time and retransmit timer pair of a router
/// advertisement.
pub const ICMPV6_RA_TIMERS_LEN: usize = 8;

/// An owned ICMPv6 message.
///
/// The wire layout is the fixed header, the target address, the destination
/// address, the router advertisement timers and the option chain, where the
/// three middle parts are present only for the message types that carry
/// them. Every field has storage regardless of the type; the type only
/// decides what is written and read on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Icmpv6Message {
    header: Icmpv6Header<[u8; ICMPV6_HEADER_LEN]>,
    target_addr: Ipv6Addr,
    dest_addr: Ipv6Addr,
    reachable_time: u32,
    retransmit_timer: u32,
    options: Icmpv6Options,
}

impl Default for Icmpv6Message {
    fn default() -> Self {
        Self::new(Icmpv6Type::ECHO_REQUEST)
    }
}

impl Icmpv6Message {
    /// The tag identifying ICMPv6 payloads to the packet dispatcher.
    pub const PDU_TYPE: PduType = PduType::ICMPV6;

    /// Create a message of the given type with every other field zeroed.
    pub fn new(msg_type: Icmpv6Type) -> Self {
        let mut header = ICMPV6_HEADER_TEMPLATE;
        header.set_msg_type(msg_type);
        Self {
            header,
            target_addr: Ipv6Addr::UNSPECIFIED,
            dest_addr: Ipv6Addr::UNSPECIFIED,
            reachable_time: 0,
            retransmit_timer: 0,
            options: Icmpv6Options::new(),
        }
    }

    /// Decode a message that spans every remaining byte of `buf`.
    pub fn parse<B: Buf>(mut buf: B) -> Result<Self> {
        let total_len = buf.remaining();

        ensure_remaining(&buf, ICMPV6_HEADER_LEN, total_len)?;
        let mut header = [0; ICMPV6_HEADER_LEN];
        buf.copy_to_slice(&mut header[..]);

        let mut msg = Self {
            header: Icmpv6Header::new_unchecked(header),
            ..Self::default()
        };

        if msg.has_target_addr() {
            ensure_remaining(&buf, ICMPV6_ADDR_LEN, total_len)?;
            msg.target_addr = Ipv6Addr::from(buf.get_u128());
        }
        if msg.has_dest_addr() {
            ensure_remaining(&buf, ICMPV6_ADDR_LEN, total_len)?;
            msg.dest_addr = Ipv6Addr::from(buf.get_u128());
        }
        if msg.has_router_advert_timers() {
            ensure_remaining(&buf, ICMPV6_RA_TIMERS_LEN, total_len)?;
            msg.reachable_time = buf.get_u32();
            msg.retransmit_timer = buf.get_u32();
        }

        let offset = total_len - buf.remaining();
        msg.options = Icmpv6Options::parse(&mut buf, offset)?;

        log::trace!(
            "parsed icmpv6 {} message: {} bytes, {} option(s)",
            msg.msg_type(),
            total_len,
            msg.options.len()
        );
        Ok(msg)
    }

    /// The fixed 8-byte header.
    #[inline]
    pub fn header(&self) -> &Icmpv6Header<[u8; ICMPV6_HEADER_LEN]> {
        &self.header
    }

    #[inline]
    pub fn msg_type(&self) -> Icmpv6Type {
        self.header.msg_type()
    }

    /// Change the type. The slot bits are kept and reinterpreted.
    #[inline]
    pub fn set_msg_type(&mut self, value: Icmpv6Type) {
        self.header.set_msg_type(value);
    }

    #[inline]
    pub fn code(&self) -> u8 {
        self.header.code()
    }

    #[inline]
    pub fn set_code(&mut self, value: u8) {
        self.header.set_code(value);
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        self.header.checksum()
    }

    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        self.header.set_checksum(value);
    }

    // The slot accessors below operate on their own bits whatever the
    // current type is. Use `variant` and `try_set_variant` for type-checked
    // access.

    #[inline]
    pub fn identifier(&self) -> u16 {
        self.header.identifier()
    }

    #[inline]
    pub fn set_identifier(&mut self, value: u16) {
        self.header.set_identifier(value);
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        self.header.sequence()
    }

    #[inline]
    pub fn set_sequence(&mut self, value: u16) {
        self.header.set_sequence(value);
    }

    #[inline]
    pub fn router(&self) -> bool {
        self.header.router()
    }

    #[inline]
    pub fn set_router(&mut self, value: bool) {
        self.header.set_router(value);
    }

    #[inline]
    pub fn solicited(&self) -> bool {
        self.header.solicited()
    }

    #[inline]
    pub fn set_solicited(&mut self, value: bool) {
        self.header.set_solicited(value);
    }

    #[inline]
    pub fn override_(&self) -> bool {
        self.header.override_()
    }

    #[inline]
    pub fn set_override(&mut self, value: bool) {
        self.header.set_override(value);
    }

    #[inline]
    pub fn hop_limit(&self) -> u8 {
        self.header.hop_limit()
    }

    #[inline]
    pub fn set_hop_limit(&mut self, value: u8) {
        self.header.set_hop_limit(value);
    }

    #[inline]
    pub fn managed(&self) -> bool {
        self.header.managed()
    }

    #[inline]
    pub fn set_managed(&mut self, value: bool) {
        self.header.set_managed(value);
    }

    #[inline]
    pub fn other(&self) -> bool {
        self.header.other()
    }

    #[inline]
    pub fn set_other(&mut self, value: bool) {
        self.header.set_other(value);
    }

    #[inline]
    pub fn home_agent(&self) -> bool {
        self.header.home_agent()
    }

    #[inline]
    pub fn set_home_agent(&mut self, value: bool) {
        self.header.set_home_agent(value);
    }

    #[inline]
    pub fn router_pref(&self) -> u8 {
        self.header.router_pref()
    }

    /// # Panics
    /// Panics if `value` does not fit in 2 bits.
    #[inline]
    pub fn set_router_pref(&mut self, value: u8) {
        self.header.set_router_pref(value);
    }

    #[inline]
    pub fn router_lifetime(&self) -> u16 {
        self.header.router_lifetime()
    }

    #[inline]
    pub fn set_router_lifetime(&mut self, value: u16) {
        self.header.set_router_lifetime(value);
    }

    /// The slot decoded according to the current type.
    #[inline]
    pub fn variant(&self) -> VariantFields {
        self.header.variant()
    }

    /// Write a tagged slot value, failing if it does not belong to the
    /// current type.
    pub fn try_set_variant(&mut self, value: VariantFields) -> Result<()> {
        if !value.matches(self.msg_type()) {
            log::debug!(
                "refusing {} slot fields for icmpv6 {} message",
                value.name(),
                self.msg_type()
            );
            return Err(Error::InvalidFieldAccess {
                msg_type: self.msg_type(),
                field: value.name(),
            });
        }
        self.header.set_variant(value);
        Ok(())
    }

    /// Whether the target address is on the wire for the current type.
    #[inline]
    pub fn has_target_addr(&self) -> bool {
        matches!(
            self.msg_type(),
            Icmpv6Type::NEIGHBOR_SOLICIT | Icmpv6Type::NEIGHBOR_ADVERT | Icmpv6Type::REDIRECT
        )
    }

    /// Whether the destination address is on the wire for the current type.
    #[inline]
    pub fn has_dest_addr(&self) -> bool {
        self.msg_type() == Icmpv6Type::REDIRECT
    }

    /// Whether the reachable time and retransmit timer are on the wire.
    #[inline]
    pub fn has_router_advert_timers(&self) -> bool {
        self.msg_type() == Icmpv6Type::ROUTER_ADVERT
    }

    #[inline]
    pub fn target_addr(&self) -> Ipv6Addr {
        self.target_addr
    }

    #[inline]
    pub fn set_target_addr(&mut self, value: Ipv6Addr) {
        self.target_addr = value;
    }

    #[inline]
    pub fn dest_addr(&self) -> Ipv6Addr {
        self.dest_addr
    }

    #[inline]
    pub fn set_dest_addr(&mut self, value: Ipv6Addr) {
        self.dest_addr = value;
    }

    #[inline]
    pub fn reachable_time(&self) -> u32 {
        self.reachable_time
    }

    #[inline]
    pub fn set_reachable_time(&mut self, value: u32) {
        self.reachable_time = value;
    }

    #[inline]
    pub fn retransmit_timer(&self) -> u32 {
        self.retransmit_timer
    }

    #[inline]
    pub fn set_retransmit_timer(&mut self, value: u32) {
        self.retransmit_timer = value;
    }

    /// Append an option to the option chain.
    pub fn add_option(&mut self, option: Icmpv6Option) {
        self.options.push(option);
    }

    /// The first option with the given id.
    pub fn search_option(&self, id: NdpOptionType) -> Option<&Icmpv6Option> {
        self.options.search(id)
    }

    #[inline]
    pub fn options(&self) -> &Icmpv6Options {
        &self.options
    }

    /// Number of bytes the message occupies on the wire.
    pub fn header_size(&self) -> usize {
        self.fixed_size() + self.options.encoded_len()
    }

    // Everything in front of the option chain.
    fn fixed_size(&self) -> usize {
        let mut size = ICMPV6_HEADER_LEN;
        if self.has_target_addr() {
            size += ICMPV6_ADDR_LEN;
        }
        if self.has_dest_addr() {
            size += ICMPV6_ADDR_LEN;
        }
        if self.has_router_advert_timers() {
            size += ICMPV6_RA_TIMERS_LEN;
        }
        size
    }

    /// Serialize the message into the start of `buf`.
    ///
    /// The stored checksum is written verbatim unless `parent` is given and
    /// its [`ChecksumPolicy`](crate::ChecksumPolicy) asks for a new one, in
    /// which case the computed checksum goes into `buf` only. The message
    /// itself is left untouched.
    ///
    /// # Panics
    /// Panics if `buf` is shorter than [`Icmpv6Message::header_size`].
    pub fn write_serialization(&self, buf: &mut [u8], parent: Option<&PduParent>) {
        let size = self.header_size();
        assert!(buf.len() >= size);
        let out = &mut buf[..size];

        {
            let mut cursor = &mut out[..];
            cursor.put_slice(self.header.as_bytes());
            if self.has_target_addr() {
                cursor.put_slice(&self.target_addr.octets()[..]);
            }
            if self.has_dest_addr() {
                cursor.put_slice(&self.dest_addr.octets()[..]);
            }
            if self.has_router_advert_timers() {
                cursor.put_u32(self.reachable_time);
                cursor.put_u32(self.retransmit_timer);
            }
            self.options.write_to(&mut cursor);
        }

        if let Some(parent) = parent {
            if parent.checksum_policy.should_compute(self.checksum()) {
                (&mut out[2..4]).fill(0);
                let cksum = checksum_of(out, parent.src_addr, parent.dst_addr);
                (&mut out[2..4]).copy_from_slice(&cksum.to_be_bytes()[..]);
                log::trace!(
                    "icmpv6 checksum recomputed as {:#06x} ({:?})",
                    cksum,
                    parent.checksum_policy
                );
            }
        }
    }

    /// Serialize the message into a freshly allocated buffer.
    pub fn to_bytes(&self, parent: Option<&PduParent>) -> Vec<u8> {
        let mut buf = vec![0; self.header_size()];
        self.write_serialization(&mut buf[..], parent);
        buf
    }

    /// Compute the checksum for the given pseudo-header addresses, ignoring
    /// the stored checksum.
    pub fn calc_checksum(&self, src_addr: Ipv6Addr, dst_addr: Ipv6Addr) -> u16 {
        let mut bytes = self.to_bytes(None);
        (&mut bytes[2..4]).fill(0);
        checksum_of(&bytes[..], src_addr, dst_addr)
    }

    /// Store the checksum computed for the given pseudo-header addresses.
    pub fn adjust_checksum(&mut self, src_addr: Ipv6Addr, dst_addr: Ipv6Addr) {
        let cksum = self.calc_checksum(src_addr, dst_addr);
        self.set_checksum(cksum);
    }

    /// Check the stored checksum against the given pseudo-header addresses.
    pub fn verify_checksum(&self, src_addr: Ipv6Addr, dst_addr: Ipv6Addr) -> bool {
        let bytes = self.to_bytes(None);
        let phdr = Ipv6PseudoHeader::new(src_addr, dst_addr, IpProtocol::ICMPV6, bytes.len() as u32);
        checksum_utils::combine(&[phdr.calc_checksum(), checksum_utils::from_slice(&bytes[..])])
            == !0
    }

    // Locate the first option with `id`, along with its offset in the message.
    fn typed_payload(&self, id: NdpOptionType) -> Result<(usize, &[u8])> {
        let mut offset = self.fixed_size();
        for opt in self.options.iter() {
            if opt.id() == id {
                return Ok((offset, opt.payload()));
            }
            offset += opt.encoded_len();
        }
        Err(Error::OptionNotFound(id))
    }

    /// Append a source link-layer address option.
    pub fn set_source_link_layer_addr(&mut self, addr: EtherAddr) {
        self.add_link_addr(NdpOptionType::SRC_LINK_ADDR, addr);
    }

    pub fn source_link_layer_addr(&self) -> Result<EtherAddr> {
        self.link_addr(NdpOptionType::SRC_LINK_ADDR)
    }

    /// Append a target link-layer address option.
    pub fn set_target_link_layer_addr(&mut self, addr: EtherAddr) {
        self.add_link_addr(NdpOptionType::DST_LINK_ADDR, addr);
    }

    pub fn target_link_layer_addr(&self) -> Result<EtherAddr> {
        self.link_addr(NdpOptionType::DST_LINK_ADDR)
    }

    fn add_link_addr(&mut self, id: NdpOptionType, addr: EtherAddr) {
        let mut payload = padded_payload(LINK_ADDR_PAYLOAD_LEN);
        NdpOptionLinkAddr::new_unchecked(&mut payload[..]).set_link_addr(addr);
        self.add_option(Icmpv6Option::new(id, payload));
    }

    fn link_addr(&self, id: NdpOptionType) -> Result<EtherAddr> {
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionLinkAddr::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(view.link_addr())
    }

    /// Append a prefix information option.
    pub fn set_prefix_info(&mut self, info: PrefixInfo) {
        self.add_option(Icmpv6Option::new(NdpOptionType::PREFIX_INFO, info.to_payload()));
    }

    pub fn prefix_info(&self) -> Result<PrefixInfo> {
        let id = NdpOptionType::PREFIX_INFO;
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionPrefixInfo::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(PrefixInfo::from(view))
    }

    /// Append a redirected header option carrying `data`.
    ///
    /// # Panics
    /// Panics if `data` does not fit in a single option.
    pub fn set_redirect_header(&mut self, data: &[u8]) {
        self.add_option(Icmpv6Option::new(
            NdpOptionType::REDIRECTED_HDR,
            redirected_hdr_payload(data),
        ));
    }

    /// The redirected packet bytes, including any trailing padding.
    pub fn redirect_header(&self) -> Result<&[u8]> {
        let id = NdpOptionType::REDIRECTED_HDR;
        let (offset, payload) = self.typed_payload(id)?;
        NdpOptionRedirectedHdr::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(&payload[REDIRECTED_HDR_RESERVED_LEN..])
    }

    /// Append an MTU option.
    pub fn set_mtu(&mut self, value: u32) {
        let mut payload = padded_payload(SHORT_PAYLOAD_LEN);
        NdpOptionMtu::new_unchecked(&mut payload[..]).set_mtu(value);
        self.add_option(Icmpv6Option::new(NdpOptionType::MTU, payload));
    }

    pub fn mtu(&self) -> Result<u32> {
        let id = NdpOptionType::MTU;
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionMtu::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(view.mtu())
    }

    /// Append an NBMA shortcut limit option.
    pub fn set_shortcut_limit(&mut self, value: u8) {
        let mut payload = padded_payload(SHORT_PAYLOAD_LEN);
        NdpOptionShortcutLimit::new_unchecked(&mut payload[..]).set_shortcut_limit(value);
        self.add_option(Icmpv6Option::new(NdpOptionType::NBMA_SHORTCUT_LIMIT, payload));
    }

    pub fn shortcut_limit(&self) -> Result<u8> {
        let id = NdpOptionType::NBMA_SHORTCUT_LIMIT;
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionShortcutLimit::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(view.shortcut_limit())
    }

    /// Append an advertisement interval option.
    pub fn set_advert_interval(&mut self, value: u32) {
        let mut payload = padded_payload(SHORT_PAYLOAD_LEN);
        NdpOptionAdvertInterval::new_unchecked(&mut payload[..]).set_interval(value);
        self.add_option(Icmpv6Option::new(NdpOptionType::ADVERT_INTERVAL, payload));
    }

    pub fn advert_interval(&self) -> Result<u32> {
        let id = NdpOptionType::ADVERT_INTERVAL;
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionAdvertInterval::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(view.interval())
    }

    /// Append a home agent information option.
    pub fn set_home_agent_info(&mut self, info: HomeAgentInfo) {
        let mut payload = padded_payload(SHORT_PAYLOAD_LEN);
        let mut view = NdpOptionHomeAgentInfo::new_unchecked(&mut payload[..]);
        view.set_preference(info.preference);
        view.set_lifetime(info.lifetime);
        self.add_option(Icmpv6Option::new(NdpOptionType::HOME_AGENT_INFO, payload));
    }

    pub fn home_agent_info(&self) -> Result<HomeAgentInfo> {
        let id = NdpOptionType::HOME_AGENT_INFO;
        let (offset, payload) = self.typed_payload(id)?;
        let view = NdpOptionHomeAgentInfo::new(payload).map_err(|_| short_payload(id, offset))?;
        Ok(HomeAgentInfo {
            preference: view.preference(),
            lifetime: view.lifetime(),
        })
    }
}

impl Pdu for Icmpv6Message {
    fn pdu_type(&self) -> PduType {
        Self::PDU_TYPE
    }

    fn header_size(&self) -> usize {
        Icmpv6Message::header_size(self)
    }

    fn write_serialization(&self, buf: &mut [u8], parent: Option<&PduParent>) {
        Icmpv6Message::write_serialization(self, buf, parent)
    }

    fn clone_pdu(&self) -> Box<dyn Pdu> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn ensure_remaining<B: Buf>(buf: &B, needed: usize, total_len: usize) -> Result<()> {
    if buf.remaining() < needed {
        log::debug!(
            "icmpv6 message truncated at offset {}: {} bytes needed, {} remaining",
            total_len - buf.remaining(),
            needed,
            buf.remaining()
        );
        return Err(Error::TruncatedInput {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

fn short_payload(id: NdpOptionType, offset: usize) -> Error {
    log::debug!("icmpv6 option {} at offset {} is shorter than its layout", id, offset);
    Error::MalformedOption {
        offset,
        reason: "option payload is shorter than its fixed layout",
    }
}

// `bytes` must already hold a zeroed checksum field.
fn checksum_of(bytes: &[u8], src_addr: Ipv6Addr, dst_addr: Ipv6Addr) -> u16 {
    let phdr = Ipv6PseudoHeader::new(src_addr, dst_addr, IpProtocol::ICMPV6, bytes.len() as u32);
    !checksum_utils::combine(&[phdr.calc_checksum(), checksum_utils::from_slice(bytes)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_is_zeroed() {
        let msg = Icmpv6Message::new(Icmpv6Type::NEIGHBOR_SOLICIT);
        assert_eq!(msg.msg_type(), Icmpv6Type::NEIGHBOR_SOLICIT);
        assert_eq!(msg.code(), 0);
        assert_eq!(msg.checksum(), 0);
        assert_eq!(msg.header().slot(), [0; 4]);
        assert_eq!(msg.target_addr(), Ipv6Addr::UNSPECIFIED);
        assert!(msg.options().is_empty());
        assert_eq!(Icmpv6Message::default().msg_type(), Icmpv6Type::ECHO_REQUEST);
    }

    #[test]
    fn presence_follows_type() {
        for raw in 0..=255u8 {
            let msg = Icmpv6Message::new(Icmpv6Type::from(raw));
            assert_eq!(msg.has_target_addr(), raw == 135 || raw == 136 || raw == 137);
            assert_eq!(msg.has_dest_addr(), raw == 137);
            assert_eq!(msg.has_router_advert_timers(), raw == 134);
        }
    }

    #[test]
    fn header_size_per_type() {
        assert_eq!(Icmpv6Message::new(Icmpv6Type::ECHO_REQUEST).header_size(), 8);
        assert_eq!(Icmpv6Message::new(Icmpv6Type::ROUTER_SOLICIT).header_size(), 8);
        assert_eq!(Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT).header_size(), 16);
        assert_eq!(Icmpv6Message::new(Icmpv6Type::NEIGHBOR_SOLICIT).header_size(), 24);
        assert_eq!(Icmpv6Message::new(Icmpv6Type::NEIGHBOR_ADVERT).header_size(), 24);
        assert_eq!(Icmpv6Message::new(Icmpv6Type::REDIRECT).header_size(), 40);

        let mut msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        msg.set_mtu(1500);
        msg.set_source_link_layer_addr(EtherAddr([1, 2, 3, 4, 5, 6]));
        assert_eq!(msg.header_size(), 32);
    }

    #[test]
    fn addresses_are_stored_regardless_of_type() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ECHO_REPLY);
        let addr: Ipv6Addr = "2001:db8::1".parse().unwrap();
        msg.set_target_addr(addr);
        msg.set_dest_addr(addr);
        msg.set_reachable_time(7);
        assert_eq!(msg.target_addr(), addr);
        assert_eq!(msg.dest_addr(), addr);
        assert_eq!(msg.reachable_time(), 7);
        // None of them are on the wire for an echo reply.
        assert_eq!(msg.to_bytes(None).len(), 8);
    }

    #[test]
    fn try_set_variant_checks_type() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ECHO_REQUEST);
        let ra = VariantFields::RouterAdvert {
            hop_limit: 64,
            managed: false,
            other: false,
            home_agent: false,
            router_pref: 0,
            router_lifetime: 0,
        };
        assert_eq!(
            msg.try_set_variant(ra),
            Err(Error::InvalidFieldAccess {
                msg_type: Icmpv6Type::ECHO_REQUEST,
                field: "router_advert"
            })
        );
        assert_eq!(msg.header().slot(), [0; 4]);

        let echo = VariantFields::Echo {
            identifier: 7,
            sequence: 9,
        };
        assert!(msg.try_set_variant(echo).is_ok());
        assert_eq!(msg.variant(), echo);
    }

    #[test]
    fn typed_getter_missing_option() {
        let msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        assert_eq!(msg.mtu(), Err(Error::OptionNotFound(NdpOptionType::MTU)));
        assert_eq!(
            msg.prefix_info(),
            Err(Error::OptionNotFound(NdpOptionType::PREFIX_INFO))
        );
        assert!(msg.search_option(NdpOptionType::MTU).is_none());
    }

    #[test]
    fn typed_getter_short_payload() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        msg.set_shortcut_limit(3);
        msg.add_option(Icmpv6Option::new(NdpOptionType::PREFIX_INFO, vec![64; 6]));
        assert_eq!(
            msg.prefix_info(),
            Err(Error::MalformedOption {
                offset: 24,
                reason: "option payload is shorter than its fixed layout"
            })
        );
    }

    #[test]
    fn typed_setters_append() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        msg.set_mtu(1280);
        msg.set_mtu(1500);
        assert_eq!(msg.options().len(), 2);
        assert_eq!(msg.mtu(), Ok(1280));
    }

    #[test]
    fn typed_options_round_trip() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        let lladdr = EtherAddr([0x00, 0x1b, 0x21, 0x3a, 0x4c, 0xff]);
        let info = HomeAgentInfo {
            preference: 10,
            lifetime: 1800,
        };
        msg.set_source_link_layer_addr(lladdr);
        msg.set_target_link_layer_addr(EtherAddr::BROADCAST);
        msg.set_shortcut_limit(9);
        msg.set_advert_interval(600_000);
        msg.set_home_agent_info(info);

        let parsed = Icmpv6Message::parse(&msg.to_bytes(None)[..]).unwrap();
        assert_eq!(parsed, msg);
        assert_eq!(parsed.source_link_layer_addr(), Ok(lladdr));
        assert_eq!(parsed.target_link_layer_addr(), Ok(EtherAddr::BROADCAST));
        assert_eq!(parsed.shortcut_limit(), Ok(9));
        assert_eq!(parsed.advert_interval(), Ok(600_000));
        assert_eq!(parsed.home_agent_info(), Ok(info));
    }

    #[test]
    fn checksum_policy_gates_recomputation() {
        use crate::traits::ChecksumPolicy;

        let src: Ipv6Addr = "fe80::1".parse().unwrap();
        let dst: Ipv6Addr = "fe80::2".parse().unwrap();
        let mut msg = Icmpv6Message::new(Icmpv6Type::ECHO_REQUEST);
        msg.set_identifier(0x1234);
        msg.set_sequence(1);
        let expected = msg.calc_checksum(src, dst);

        let never = PduParent::new(src, dst).with_checksum_policy(ChecksumPolicy::Never);
        assert_eq!(&msg.to_bytes(Some(&never))[2..4], &[0, 0]);

        let if_zero = PduParent::new(src, dst).with_checksum_policy(ChecksumPolicy::IfZero);
        assert_eq!(&msg.to_bytes(Some(&if_zero))[2..4], &expected.to_be_bytes()[..]);

        let always = PduParent::new(src, dst);
        msg.set_checksum(0xbeef);
        assert_eq!(&msg.to_bytes(Some(&if_zero))[2..4], &[0xbe, 0xef]);
        assert_eq!(&msg.to_bytes(Some(&always))[2..4], &expected.to_be_bytes()[..]);
        // Serialization never writes back into the message.
        assert_eq!(msg.checksum(), 0xbeef);

        msg.adjust_checksum(src, dst);
        assert_eq!(msg.checksum(), expected);
        assert!(msg.verify_checksum(src, dst));
        assert!(!msg.verify_checksum(dst, dst));
    }

    #[test]
    fn clone_is_independent() {
        let mut msg = Icmpv6Message::new(Icmpv6Type::ROUTER_ADVERT);
        msg.set_mtu(1500);
        let copy = msg.clone();
        msg.set_mtu(9000);
        msg.set_hop_limit(1);
        assert_eq!(copy.options().len(), 1);
        assert_eq!(copy.hop_limit(), 0);

        let boxed = Pdu::clone_pdu(&msg);
        let inner = boxed.as_any().downcast_ref::<Icmpv6Message>().unwrap();
        assert_eq!(inner, &msg);
        assert_eq!(boxed.pdu_type(), PduType::ICMPV6);
    }
}
