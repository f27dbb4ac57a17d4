//! Fixed-layout views over the payloads of the well-known neighbor discovery
//! options. Every view wraps the option payload, i.e. the bytes following the
//! id and length bytes.

use std::net::Ipv6Addr;

use byteorder::{ByteOrder, NetworkEndian};

use super::option::{OPTION_HEADER_LEN, OPTION_UNIT_LEN};
use crate::ether::EtherAddr;

/// Allocate a zeroed payload of at least `len` bytes, grown so that the
/// encoded option ends on an 8-byte boundary.
pub(crate) fn padded_payload(len: usize) -> Vec<u8> {
    let encoded = (OPTION_HEADER_LEN + len + OPTION_UNIT_LEN - 1) / OPTION_UNIT_LEN * OPTION_UNIT_LEN;
    vec![0; encoded - OPTION_HEADER_LEN]
}

macro_rules! payload_view_ctor {
    ($name: ident, $min_len: expr) => {
        impl<T: AsRef<[u8]>> $name<T> {
            #[inline]
            pub fn new(buf: T) -> Result<Self, T> {
                if buf.as_ref().len() >= $min_len {
                    Ok(Self { buf })
                } else {
                    Err(buf)
                }
            }

            #[inline]
            pub fn new_unchecked(buf: T) -> Self {
                Self { buf }
            }

            #[inline]
            pub fn buf(&self) -> &T {
                &self.buf
            }
        }
    };
}

/// Payload length of the source/target link-layer address options.
pub const LINK_ADDR_PAYLOAD_LEN: usize = 6;

/// Payload length of the prefix information option.
pub const PREFIX_INFO_PAYLOAD_LEN: usize = 30;

/// Reserved bytes in front of the redirected packet.
pub const REDIRECTED_HDR_RESERVED_LEN: usize = 6;

/// Payload length of the MTU, shortcut limit, advertisement interval and
/// home agent information options.
pub const SHORT_PAYLOAD_LEN: usize = 6;

#[derive(Debug)]
pub struct NdpOptionLinkAddr<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionLinkAddr, LINK_ADDR_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionLinkAddr<T> {
    #[inline]
    pub fn link_addr(&self) -> EtherAddr {
        EtherAddr::from_bytes(&self.buf.as_ref()[0..6])
    }
}

impl<T: AsMut<[u8]>> NdpOptionLinkAddr<T> {
    #[inline]
    pub fn set_link_addr(&mut self, addr: EtherAddr) {
        (&mut self.buf.as_mut()[0..6]).copy_from_slice(addr.as_bytes());
    }
}

#[derive(Debug)]
pub struct NdpOptionPrefixInfo<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionPrefixInfo, PREFIX_INFO_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionPrefixInfo<T> {
    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.buf.as_ref()[0]
    }

    #[inline]
    pub fn l_flag(&self) -> bool {
        self.buf.as_ref()[1] >> 7 == 1
    }

    #[inline]
    pub fn a_flag(&self) -> bool {
        (self.buf.as_ref()[1] >> 6) & 1 == 1
    }

    #[inline]
    pub fn check_reserved1(&self) -> bool {
        self.buf.as_ref()[1] & 0x3f == 0
    }

    #[inline]
    pub fn valid_lifetime(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.as_ref()[2..6])
    }

    #[inline]
    pub fn preferred_lifetime(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.as_ref()[6..10])
    }

    #[inline]
    pub fn check_reserved2(&self) -> bool {
        self.buf.as_ref()[10..14] == [0, 0, 0, 0][..]
    }

    #[inline]
    pub fn prefix(&self) -> Ipv6Addr {
        let mut octets = [0; 16];
        octets.copy_from_slice(&self.buf.as_ref()[14..30]);
        Ipv6Addr::from(octets)
    }
}

impl<T: AsMut<[u8]>> NdpOptionPrefixInfo<T> {
    #[inline]
    pub fn set_prefix_len(&mut self, value: u8) {
        self.buf.as_mut()[0] = value;
    }

    #[inline]
    pub fn set_l_flag(&mut self, value: bool) {
        if value {
            self.buf.as_mut()[1] |= 1 << 7;
        } else {
            self.buf.as_mut()[1] &= 0x7f;
        }
    }

    #[inline]
    pub fn set_a_flag(&mut self, value: bool) {
        if value {
            self.buf.as_mut()[1] |= 1 << 6;
        } else {
            self.buf.as_mut()[1] &= 0xbf;
        }
    }

    #[inline]
    pub fn set_valid_lifetime(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.buf.as_mut()[2..6], value);
    }

    #[inline]
    pub fn set_preferred_lifetime(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.buf.as_mut()[6..10], value);
    }

    #[inline]
    pub fn adjust_reserved2(&mut self) {
        (&mut self.buf.as_mut()[10..14]).fill(0);
    }

    #[inline]
    pub fn set_prefix(&mut self, value: Ipv6Addr) {
        (&mut self.buf.as_mut()[14..30]).copy_from_slice(&value.octets()[..]);
    }
}

/// The decoded prefix information option (RFC 4861, 4.6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrefixInfo {
    pub prefix_len: u8,
    /// Autonomous address-configuration flag.
    pub a_flag: bool,
    /// On-link flag.
    pub l_flag: bool,
    pub valid_lifetime: u32,
    pub preferred_lifetime: u32,
    pub prefix: Ipv6Addr,
}

impl Default for PrefixInfo {
    fn default() -> Self {
        Self {
            prefix_len: 0,
            a_flag: false,
            l_flag: false,
            valid_lifetime: 0,
            preferred_lifetime: 0,
            prefix: Ipv6Addr::UNSPECIFIED,
        }
    }
}

impl PrefixInfo {
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = padded_payload(PREFIX_INFO_PAYLOAD_LEN);
        let mut view = NdpOptionPrefixInfo::new_unchecked(&mut payload[..]);
        view.set_prefix_len(self.prefix_len);
        view.set_l_flag(self.l_flag);
        view.set_a_flag(self.a_flag);
        view.set_valid_lifetime(self.valid_lifetime);
        view.set_preferred_lifetime(self.preferred_lifetime);
        view.adjust_reserved2();
        view.set_prefix(self.prefix);
        payload
    }
}

impl<T: AsRef<[u8]>> From<NdpOptionPrefixInfo<T>> for PrefixInfo {
    fn from(view: NdpOptionPrefixInfo<T>) -> Self {
        Self {
            prefix_len: view.prefix_len(),
            a_flag: view.a_flag(),
            l_flag: view.l_flag(),
            valid_lifetime: view.valid_lifetime(),
            preferred_lifetime: view.preferred_lifetime(),
            prefix: view.prefix(),
        }
    }
}

#[derive(Debug)]
pub struct NdpOptionRedirectedHdr<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionRedirectedHdr, REDIRECTED_HDR_RESERVED_LEN);

impl<T: AsRef<[u8]>> NdpOptionRedirectedHdr<T> {
    #[inline]
    pub fn check_reserved(&self) -> bool {
        self.buf.as_ref()[0..6] == [0, 0, 0, 0, 0, 0][..]
    }

    /// The redirected packet, followed by whatever padding the option carries.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.buf.as_ref()[REDIRECTED_HDR_RESERVED_LEN..]
    }
}

impl<T: AsMut<[u8]>> NdpOptionRedirectedHdr<T> {
    #[inline]
    pub fn adjust_reserved(&mut self) {
        (&mut self.buf.as_mut()[0..6]).fill(0);
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf.as_mut()[REDIRECTED_HDR_RESERVED_LEN..]
    }
}

/// Build a redirected header payload: 6 reserved bytes, `data`, then padding.
pub fn redirected_hdr_payload(data: &[u8]) -> Vec<u8> {
    let mut payload = padded_payload(REDIRECTED_HDR_RESERVED_LEN + data.len());
    let mut view = NdpOptionRedirectedHdr::new_unchecked(&mut payload[..]);
    (&mut view.data_mut()[..data.len()]).copy_from_slice(data);
    payload
}

#[derive(Debug)]
pub struct NdpOptionMtu<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionMtu, SHORT_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionMtu<T> {
    #[inline]
    pub fn check_reserved(&self) -> bool {
        self.buf.as_ref()[0..2] == [0, 0][..]
    }

    #[inline]
    pub fn mtu(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.as_ref()[2..6])
    }
}

impl<T: AsMut<[u8]>> NdpOptionMtu<T> {
    #[inline]
    pub fn adjust_reserved(&mut self) {
        (&mut self.buf.as_mut()[0..2]).fill(0);
    }

    #[inline]
    pub fn set_mtu(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.buf.as_mut()[2..6], value);
    }
}

/// NBMA shortcut limit option (RFC 2491).
#[derive(Debug)]
pub struct NdpOptionShortcutLimit<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionShortcutLimit, SHORT_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionShortcutLimit<T> {
    #[inline]
    pub fn shortcut_limit(&self) -> u8 {
        self.buf.as_ref()[0]
    }

    #[inline]
    pub fn check_reserved(&self) -> bool {
        self.buf.as_ref()[1..6] == [0, 0, 0, 0, 0][..]
    }
}

impl<T: AsMut<[u8]>> NdpOptionShortcutLimit<T> {
    #[inline]
    pub fn set_shortcut_limit(&mut self, value: u8) {
        self.buf.as_mut()[0] = value;
    }

    #[inline]
    pub fn adjust_reserved(&mut self) {
        (&mut self.buf.as_mut()[1..6]).fill(0);
    }
}

/// Advertisement interval option (RFC 6275, 7.3), in milliseconds.
#[derive(Debug)]
pub struct NdpOptionAdvertInterval<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionAdvertInterval, SHORT_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionAdvertInterval<T> {
    #[inline]
    pub fn check_reserved(&self) -> bool {
        self.buf.as_ref()[0..2] == [0, 0][..]
    }

    #[inline]
    pub fn interval(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.as_ref()[2..6])
    }
}

impl<T: AsMut<[u8]>> NdpOptionAdvertInterval<T> {
    #[inline]
    pub fn adjust_reserved(&mut self) {
        (&mut self.buf.as_mut()[0..2]).fill(0);
    }

    #[inline]
    pub fn set_interval(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.buf.as_mut()[2..6], value);
    }
}

/// Home agent information option (RFC 6275, 7.4).
#[derive(Debug)]
pub struct NdpOptionHomeAgentInfo<T> {
    buf: T,
}

payload_view_ctor!(NdpOptionHomeAgentInfo, SHORT_PAYLOAD_LEN);

impl<T: AsRef<[u8]>> NdpOptionHomeAgentInfo<T> {
    #[inline]
    pub fn check_reserved(&self) -> bool {
        self.buf.as_ref()[0..2] == [0, 0][..]
    }

    #[inline]
    pub fn preference(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.as_ref()[2..4])
    }

    #[inline]
    pub fn lifetime(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.as_ref()[4..6])
    }
}

impl<T: AsMut<[u8]>> NdpOptionHomeAgentInfo<T> {
    #[inline]
    pub fn adjust_reserved(&mut self) {
        (&mut self.buf.as_mut()[0..2]).fill(0);
    }

    #[inline]
    pub fn set_preference(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.buf.as_mut()[2..4], value);
    }

    #[inline]
    pub fn set_lifetime(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.buf.as_mut()[4..6], value);
    }
}

/// The decoded home agent information option.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct HomeAgentInfo {
    pub preference: u16,
    pub lifetime: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn padding_reaches_option_boundary() {
        assert_eq!(padded_payload(0).len(), 6);
        assert_eq!(padded_payload(6).len(), 6);
        assert_eq!(padded_payload(7).len(), 14);
        assert_eq!(padded_payload(16).len(), 22);
        assert_eq!(padded_payload(30).len(), 30);
    }

    #[test]
    fn prefix_info_layout() {
        let info = PrefixInfo {
            prefix_len: 64,
            a_flag: true,
            l_flag: false,
            valid_lifetime: 100,
            preferred_lifetime: 50,
            prefix: "2001:db8::".parse().unwrap(),
        };
        let payload = info.to_payload();
        assert_eq!(payload.len(), PREFIX_INFO_PAYLOAD_LEN);
        assert_eq!(&payload[0..2], &[64, 0x40]);
        assert_eq!(&payload[2..6], &[0, 0, 0, 100]);
        assert_eq!(&payload[6..10], &[0, 0, 0, 50]);
        assert_eq!(&payload[10..14], &[0, 0, 0, 0]);
        assert_eq!(&payload[14..16], &[0x20, 0x01]);

        let view = NdpOptionPrefixInfo::new(&payload[..]).unwrap();
        assert!(view.check_reserved1());
        assert!(view.check_reserved2());
        assert_eq!(PrefixInfo::from(view), info);
    }

    #[test]
    fn prefix_info_flag_order() {
        let mut payload = [0u8; PREFIX_INFO_PAYLOAD_LEN];
        let mut view = NdpOptionPrefixInfo::new_unchecked(&mut payload[..]);
        view.set_l_flag(true);
        assert_eq!(view.buf()[1], 0x80);
        view.set_a_flag(true);
        view.set_l_flag(false);
        assert_eq!(view.buf()[1], 0x40);
    }

    #[test]
    fn short_views_reject_short_payloads() {
        assert!(NdpOptionMtu::new(&[0u8, 0, 0, 0, 5][..]).is_err());
        assert!(NdpOptionLinkAddr::new(&[0u8; 5][..]).is_err());
        assert!(NdpOptionPrefixInfo::new(&[0u8; 29][..]).is_err());
        assert!(NdpOptionRedirectedHdr::new(&[0u8; 5][..]).is_err());
    }

    #[test]
    fn redirected_hdr_payload_layout() {
        let data = [0xaa; 10];
        let payload = redirected_hdr_payload(&data[..]);
        // 2 + 6 + 10 = 18 encoded bytes, padded to 24.
        assert_eq!(payload.len(), 22);
        assert_eq!(&payload[0..6], &[0; 6]);
        assert_eq!(&payload[6..16], &data[..]);
        assert_eq!(&payload[16..], &[0; 6]);

        let view = NdpOptionRedirectedHdr::new(&payload[..]).unwrap();
        assert!(view.check_reserved());
        assert_eq!(&view.data()[..10], &data[..]);
    }

    #[test]
    fn home_agent_info_layout() {
        let mut payload = padded_payload(SHORT_PAYLOAD_LEN);
        let mut view = NdpOptionHomeAgentInfo::new_unchecked(&mut payload[..]);
        view.set_preference(0x0102);
        view.set_lifetime(0x0304);
        assert_eq!(payload, [0, 0, 1, 2, 3, 4]);
    }
}
