use bytes::{Buf, BufMut};

use super::NdpOptionType;
use crate::error::{Error, Result};

/// Options are sized in units of 8 bytes.
pub const OPTION_UNIT_LEN: usize = 8;

/// The id and length bytes in front of every option payload.
pub const OPTION_HEADER_LEN: usize = 2;

/// The largest payload whose encoded size still fits in a one-byte length.
pub const OPTION_MAX_PAYLOAD_LEN: usize = 255 * OPTION_UNIT_LEN - OPTION_HEADER_LEN;

/// A single TLV option: an id and an opaque payload.
///
/// The payload is written verbatim and zero-padded on the wire up to the next
/// multiple of 8 bytes. A parsed option keeps that padding in its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Icmpv6Option {
    id: NdpOptionType,
    payload: Vec<u8>,
}

impl Icmpv6Option {
    /// # Panics
    /// Panics if the payload is longer than [`OPTION_MAX_PAYLOAD_LEN`].
    pub fn new(id: NdpOptionType, payload: Vec<u8>) -> Self {
        assert!(payload.len() <= OPTION_MAX_PAYLOAD_LEN);
        Self { id, payload }
    }

    #[inline]
    pub fn id(&self) -> NdpOptionType {
        self.id
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload[..]
    }

    #[inline]
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// The value of the length byte: encoded size in units of 8 bytes.
    #[inline]
    pub fn length_units(&self) -> u8 {
        let units = (OPTION_HEADER_LEN + self.payload.len() + OPTION_UNIT_LEN - 1) / OPTION_UNIT_LEN;
        units as u8
    }

    /// Number of bytes the option occupies on the wire, padding included.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        usize::from(self.length_units()) * OPTION_UNIT_LEN
    }

    /// Encode the option followed by its zero padding.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        let padding = self.encoded_len() - OPTION_HEADER_LEN - self.payload.len();
        buf.put_u8(self.id.into());
        buf.put_u8(self.length_units());
        buf.put_slice(&self.payload[..]);
        buf.put_bytes(0, padding);
    }
}

/// The ordered option chain trailing an ICMPv6 message.
///
/// Insertion order is the wire order. Options sharing an id are all kept, and
/// [`Icmpv6Options::search`] resolves to the first one inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Icmpv6Options {
    options: Vec<Icmpv6Option>,
    options_size: usize,
}

impl Icmpv6Options {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an option to the end of the chain.
    pub fn push(&mut self, option: Icmpv6Option) {
        self.options_size += option.encoded_len();
        self.options.push(option);
    }

    /// The first option with the given id.
    pub fn search(&self, id: NdpOptionType) -> Option<&Icmpv6Option> {
        self.options.iter().find(|opt| opt.id() == id)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Icmpv6Option> {
        self.options.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Total encoded size of the chain.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        self.options_size
    }

    /// Encode every option in insertion order.
    pub fn write_to<B: BufMut>(&self, buf: &mut B) {
        for opt in self.options.iter() {
            opt.write_to(buf);
        }
    }

    /// Decode options until `buf` is exhausted.
    ///
    /// `offset` is the position of the first option inside the enclosing
    /// message and is only used to report where a malformed option starts.
    pub fn parse<B: Buf>(buf: &mut B, offset: usize) -> Result<Self> {
        let mut chain = Self::new();
        let mut cursor = offset;

        while buf.has_remaining() {
            if buf.remaining() < OPTION_HEADER_LEN {
                log::debug!(
                    "icmpv6 option chain ends with {} stray byte(s) at offset {}",
                    buf.remaining(),
                    cursor
                );
                return Err(Error::MalformedOption {
                    offset: cursor,
                    reason: "option stream does not end on an option boundary",
                });
            }

            let id = NdpOptionType::from(buf.get_u8());
            let units = buf.get_u8();
            if units == 0 {
                log::debug!("icmpv6 option {} at offset {} has zero length", id, cursor);
                return Err(Error::MalformedOption {
                    offset: cursor,
                    reason: "option length is zero",
                });
            }

            let payload_len = usize::from(units) * OPTION_UNIT_LEN - OPTION_HEADER_LEN;
            if buf.remaining() < payload_len {
                log::debug!(
                    "icmpv6 option {} at offset {} declares {} payload bytes, {} remain",
                    id,
                    cursor,
                    payload_len,
                    buf.remaining()
                );
                return Err(Error::TruncatedInput {
                    needed: payload_len,
                    remaining: buf.remaining(),
                });
            }

            let mut payload = vec![0; payload_len];
            buf.copy_to_slice(&mut payload[..]);
            cursor += usize::from(units) * OPTION_UNIT_LEN;

            chain.push(Icmpv6Option { id, payload });
        }

        Ok(chain)
    }
}

impl<'a> IntoIterator for &'a Icmpv6Options {
    type Item = &'a Icmpv6Option;
    type IntoIter = std::slice::Iter<'a, Icmpv6Option>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(chain: &Icmpv6Options) -> Vec<u8> {
        let mut out = Vec::new();
        chain.write_to(&mut out);
        out
    }

    #[test]
    fn length_units_round_up() {
        let cases = [(0, 1), (6, 1), (7, 2), (14, 2), (15, 3), (30, 4)];
        for (payload_len, units) in cases {
            let opt = Icmpv6Option::new(NdpOptionType::MTU, vec![0xab; payload_len]);
            assert_eq!(opt.length_units(), units);
            assert_eq!(opt.encoded_len(), usize::from(units) * 8);
        }
    }

    #[test]
    fn write_pads_with_zeros() {
        let opt = Icmpv6Option::new(NdpOptionType::from(200), vec![1, 2, 3]);
        let mut out = Vec::new();
        opt.write_to(&mut out);
        assert_eq!(out, [200, 1, 1, 2, 3, 0, 0, 0]);
    }

    #[test]
    #[should_panic]
    fn oversized_payload() {
        Icmpv6Option::new(NdpOptionType::REDIRECTED_HDR, vec![0; OPTION_MAX_PAYLOAD_LEN + 1]);
    }

    #[test]
    fn push_tracks_size() {
        let mut chain = Icmpv6Options::new();
        chain.push(Icmpv6Option::new(NdpOptionType::SRC_LINK_ADDR, vec![0; 6]));
        chain.push(Icmpv6Option::new(NdpOptionType::PREFIX_INFO, vec![0; 30]));
        assert_eq!(chain.len(), 2);
        assert_eq!(chain.encoded_len(), 40);
        assert_eq!(encode(&chain).len(), 40);
    }

    #[test]
    fn search_returns_first_match() {
        let mut chain = Icmpv6Options::new();
        chain.push(Icmpv6Option::new(NdpOptionType::MTU, vec![0, 0, 0, 0, 5, 220]));
        chain.push(Icmpv6Option::new(NdpOptionType::MTU, vec![0, 0, 0, 0, 0, 1]));
        let found = chain.search(NdpOptionType::MTU).unwrap();
        assert_eq!(found.payload(), &[0, 0, 0, 0, 5, 220]);
        assert!(chain.search(NdpOptionType::PREFIX_INFO).is_none());
    }

    #[test]
    fn parse_keeps_order_and_padding() {
        let bytes = [
            1, 1, 0x00, 0x1b, 0x21, 0x3a, 0x4c, 0xff, // source link-layer address
            99, 2, 1, 2, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // unknown id, padded
        ];
        let mut buf = &bytes[..];
        let chain = Icmpv6Options::parse(&mut buf, 0).unwrap();
        let opts: Vec<_> = chain.iter().collect();
        assert_eq!(opts.len(), 2);
        assert_eq!(opts[0].id(), NdpOptionType::SRC_LINK_ADDR);
        assert_eq!(opts[0].payload(), &bytes[2..8]);
        assert_eq!(opts[1].id(), NdpOptionType::from(99));
        assert_eq!(opts[1].payload().len(), 14);
        assert_eq!(chain.encoded_len(), bytes.len());
        assert_eq!(encode(&chain), bytes);
    }

    #[test]
    fn parse_empty() {
        let mut buf = &[][..];
        let chain = Icmpv6Options::parse(&mut buf, 0).unwrap();
        assert!(chain.is_empty());
        assert_eq!(chain.encoded_len(), 0);
    }

    #[test]
    fn parse_zero_length() {
        let bytes = [1, 1, 0, 0, 0, 0, 0, 0, 5, 0, 0, 0, 0, 0, 0, 0];
        let mut buf = &bytes[..];
        assert_eq!(
            Icmpv6Options::parse(&mut buf, 24),
            Err(Error::MalformedOption {
                offset: 32,
                reason: "option length is zero"
            })
        );
    }

    #[test]
    fn parse_truncated_payload() {
        let bytes = [3, 4, 64, 0xc0, 0, 0, 0, 100];
        let mut buf = &bytes[..];
        assert_eq!(
            Icmpv6Options::parse(&mut buf, 0),
            Err(Error::TruncatedInput {
                needed: 30,
                remaining: 6
            })
        );
    }

    #[test]
    fn parse_stray_byte() {
        let bytes = [5, 1, 0, 0, 0, 0, 5, 220, 7];
        let mut buf = &bytes[..];
        assert!(matches!(
            Icmpv6Options::parse(&mut buf, 0),
            Err(Error::MalformedOption { offset: 8, .. })
        ));
    }
}
