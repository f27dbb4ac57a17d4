use byteorder::{ByteOrder, NetworkEndian};

use super::Icmpv6Type;

header_field_val_accessors! {
    (type_, type_mut, 0),
    (code, code_mut, 1),
    (slot_fst_byte, slot_fst_byte_mut, 4),
    (slot_snd_byte, slot_snd_byte_mut, 5),
}

header_field_range_accessors! {
    (checksum, checksum_mut, 2..4),
    (slot, slot_mut, 4..8),
    (fst_half, fst_half_mut, 4..6),
    (snd_half, snd_half_mut, 6..8),
}

/// Length of the fixed ICMPv6 header.
pub const ICMPV6_HEADER_LEN: usize = 8;

/// An echo request header with every other field zeroed.
pub const ICMPV6_HEADER_TEMPLATE: Icmpv6Header<[u8; ICMPV6_HEADER_LEN]> = Icmpv6Header {
    buf: [0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
};

// Bit positions inside the first slot byte of a neighbor advertisement.
const NA_ROUTER_SHIFT: u8 = 7;
const NA_SOLICITED_SHIFT: u8 = 6;
const NA_OVERRIDE_SHIFT: u8 = 5;

// Bit positions inside the second slot byte of a router advertisement.
const RA_MANAGED_SHIFT: u8 = 7;
const RA_OTHER_SHIFT: u8 = 6;
const RA_HOME_AGENT_SHIFT: u8 = 5;
const RA_PREF_SHIFT: u8 = 3;
const RA_PREF_MASK: u8 = 0b11;

#[inline]
fn read_bit(byte: u8, shift: u8) -> bool {
    (byte >> shift) & 1 == 1
}

#[inline]
fn write_bit(byte: &mut u8, shift: u8, value: bool) {
    if value {
        *byte |= 1 << shift;
    } else {
        *byte &= !(1 << shift);
    }
}

/// The fixed 8-byte ICMPv6 header: type, code, checksum and the 4-byte slot
/// whose meaning depends on the type.
///
/// Slot accessors read and write their own bits of the canonical big-endian
/// bytes, whatever the current type is. [`Icmpv6Header::variant`] gives the
/// tagged view selected by the type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Icmpv6Header<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> Icmpv6Header<T> {
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= ICMPV6_HEADER_LEN {
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
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[0..ICMPV6_HEADER_LEN]
    }

    #[inline]
    pub fn to_owned(&self) -> Icmpv6Header<[u8; ICMPV6_HEADER_LEN]> {
        let mut buf = [0; ICMPV6_HEADER_LEN];
        buf.copy_from_slice(self.as_bytes());
        Icmpv6Header { buf }
    }

    #[inline]
    pub fn msg_type(&self) -> Icmpv6Type {
        Icmpv6Type::from(*type_(self.buf.as_ref()))
    }

    #[inline]
    pub fn code(&self) -> u8 {
        *code(self.buf.as_ref())
    }

    #[inline]
    pub fn checksum(&self) -> u16 {
        NetworkEndian::read_u16(checksum(self.buf.as_ref()))
    }

    /// The raw type-dependent slot.
    #[inline]
    pub fn slot(&self) -> [u8; 4] {
        let mut data = [0; 4];
        data.copy_from_slice(slot(self.buf.as_ref()));
        data
    }

    #[inline]
    pub fn identifier(&self) -> u16 {
        NetworkEndian::read_u16(fst_half(self.buf.as_ref()))
    }

    #[inline]
    pub fn sequence(&self) -> u16 {
        NetworkEndian::read_u16(snd_half(self.buf.as_ref()))
    }

    #[inline]
    pub fn router(&self) -> bool {
        read_bit(*slot_fst_byte(self.buf.as_ref()), NA_ROUTER_SHIFT)
    }

    #[inline]
    pub fn solicited(&self) -> bool {
        read_bit(*slot_fst_byte(self.buf.as_ref()), NA_SOLICITED_SHIFT)
    }

    #[inline]
    pub fn override_(&self) -> bool {
        read_bit(*slot_fst_byte(self.buf.as_ref()), NA_OVERRIDE_SHIFT)
    }

    #[inline]
    pub fn hop_limit(&self) -> u8 {
        *slot_fst_byte(self.buf.as_ref())
    }

    #[inline]
    pub fn managed(&self) -> bool {
        read_bit(*slot_snd_byte(self.buf.as_ref()), RA_MANAGED_SHIFT)
    }

    #[inline]
    pub fn other(&self) -> bool {
        read_bit(*slot_snd_byte(self.buf.as_ref()), RA_OTHER_SHIFT)
    }

    #[inline]
    pub fn home_agent(&self) -> bool {
        read_bit(*slot_snd_byte(self.buf.as_ref()), RA_HOME_AGENT_SHIFT)
    }

    #[inline]
    pub fn router_pref(&self) -> u8 {
        (*slot_snd_byte(self.buf.as_ref()) >> RA_PREF_SHIFT) & RA_PREF_MASK
    }

    #[inline]
    pub fn router_lifetime(&self) -> u16 {
        NetworkEndian::read_u16(snd_half(self.buf.as_ref()))
    }

    /// Decode the slot according to the message type.
    pub fn variant(&self) -> VariantFields {
        match self.msg_type() {
            Icmpv6Type::ECHO_REQUEST | Icmpv6Type::ECHO_REPLY => VariantFields::Echo {
                identifier: self.identifier(),
                sequence: self.sequence(),
            },
            Icmpv6Type::NEIGHBOR_ADVERT => VariantFields::NeighborAdvert {
                router: self.router(),
                solicited: self.solicited(),
                override_: self.override_(),
            },
            Icmpv6Type::ROUTER_ADVERT => VariantFields::RouterAdvert {
                hop_limit: self.hop_limit(),
                managed: self.managed(),
                other: self.other(),
                home_agent: self.home_agent(),
                router_pref: self.router_pref(),
                router_lifetime: self.router_lifetime(),
            },
            _ => VariantFields::Reserved(NetworkEndian::read_u32(slot(self.buf.as_ref()))),
        }
    }
}

impl<T: AsMut<[u8]>> Icmpv6Header<T> {
    #[inline]
    pub fn set_msg_type(&mut self, value: Icmpv6Type) {
        *type_mut(self.buf.as_mut()) = value.into();
    }

    #[inline]
    pub fn set_code(&mut self, value: u8) {
        *code_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn set_checksum(&mut self, value: u16) {
        NetworkEndian::write_u16(checksum_mut(self.buf.as_mut()), value);
    }

    #[inline]
    pub fn set_slot(&mut self, value: [u8; 4]) {
        slot_mut(self.buf.as_mut()).copy_from_slice(&value[..]);
    }

    #[inline]
    pub fn set_identifier(&mut self, value: u16) {
        NetworkEndian::write_u16(fst_half_mut(self.buf.as_mut()), value);
    }

    #[inline]
    pub fn set_sequence(&mut self, value: u16) {
        NetworkEndian::write_u16(snd_half_mut(self.buf.as_mut()), value);
    }

    #[inline]
    pub fn set_router(&mut self, value: bool) {
        write_bit(slot_fst_byte_mut(self.buf.as_mut()), NA_ROUTER_SHIFT, value);
    }

    #[inline]
    pub fn set_solicited(&mut self, value: bool) {
        write_bit(slot_fst_byte_mut(self.buf.as_mut()), NA_SOLICITED_SHIFT, value);
    }

    #[inline]
    pub fn set_override(&mut self, value: bool) {
        write_bit(slot_fst_byte_mut(self.buf.as_mut()), NA_OVERRIDE_SHIFT, value);
    }

    #[inline]
    pub fn set_hop_limit(&mut self, value: u8) {
        *slot_fst_byte_mut(self.buf.as_mut()) = value;
    }

    #[inline]
    pub fn set_managed(&mut self, value: bool) {
        write_bit(slot_snd_byte_mut(self.buf.as_mut()), RA_MANAGED_SHIFT, value);
    }

    #[inline]
    pub fn set_other(&mut self, value: bool) {
        write_bit(slot_snd_byte_mut(self.buf.as_mut()), RA_OTHER_SHIFT, value);
    }

    #[inline]
    pub fn set_home_agent(&mut self, value: bool) {
        write_bit(slot_snd_byte_mut(self.buf.as_mut()), RA_HOME_AGENT_SHIFT, value);
    }

    /// # Panics
    /// Panics if `value` does not fit in 2 bits.
    #[inline]
    pub fn set_router_pref(&mut self, value: u8) {
        assert!(value <= RA_PREF_MASK);
        let byte = slot_snd_byte_mut(self.buf.as_mut());
        *byte = (*byte & !(RA_PREF_MASK << RA_PREF_SHIFT)) | (value << RA_PREF_SHIFT);
    }

    #[inline]
    pub fn set_router_lifetime(&mut self, value: u16) {
        NetworkEndian::write_u16(snd_half_mut(self.buf.as_mut()), value);
    }

    /// Write every field of a tagged slot value. Reserved bits outside the
    /// tagged fields keep their current value.
    pub fn set_variant(&mut self, value: VariantFields) {
        match value {
            VariantFields::Echo {
                identifier,
                sequence,
            } => {
                self.set_identifier(identifier);
                self.set_sequence(sequence);
            }
            VariantFields::NeighborAdvert {
                router,
                solicited,
                override_,
            } => {
                self.set_router(router);
                self.set_solicited(solicited);
                self.set_override(override_);
            }
            VariantFields::RouterAdvert {
                hop_limit,
                managed,
                other,
                home_agent,
                router_pref,
                router_lifetime,
            } => {
                self.set_hop_limit(hop_limit);
                self.set_managed(managed);
                self.set_other(other);
                self.set_home_agent(home_agent);
                self.set_router_pref(router_pref);
                self.set_router_lifetime(router_lifetime);
            }
            VariantFields::Reserved(raw) => {
                NetworkEndian::write_u32(slot_mut(self.buf.as_mut()), raw);
            }
        }
    }
}

/// The tagged interpretation of the 4-byte slot following the checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantFields {
    /// Echo request and reply.
    Echo { identifier: u16, sequence: u16 },
    /// Neighbor advertisement flags.
    NeighborAdvert {
        router: bool,
        solicited: bool,
        override_: bool,
    },
    /// Router advertisement parameters.
    RouterAdvert {
        hop_limit: u8,
        managed: bool,
        other: bool,
        home_agent: bool,
        router_pref: u8,
        router_lifetime: u16,
    },
    /// Any other message type: the slot as a big-endian word.
    Reserved(u32),
}

impl VariantFields {
    /// Whether this interpretation is the one selected by `msg_type`.
    pub fn matches(&self, msg_type: Icmpv6Type) -> bool {
        match self {
            VariantFields::Echo { .. } => {
                msg_type == Icmpv6Type::ECHO_REQUEST || msg_type == Icmpv6Type::ECHO_REPLY
            }
            VariantFields::NeighborAdvert { .. } => msg_type == Icmpv6Type::NEIGHBOR_ADVERT,
            VariantFields::RouterAdvert { .. } => msg_type == Icmpv6Type::ROUTER_ADVERT,
            VariantFields::Reserved(_) => !matches!(
                msg_type,
                Icmpv6Type::ECHO_REQUEST
                    | Icmpv6Type::ECHO_REPLY
                    | Icmpv6Type::NEIGHBOR_ADVERT
                    | Icmpv6Type::ROUTER_ADVERT
            ),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            VariantFields::Echo { .. } => "echo",
            VariantFields::NeighborAdvert { .. } => "neighbor_advert",
            VariantFields::RouterAdvert { .. } => "router_advert",
            VariantFields::Reserved(_) => "reserved",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(bytes: [u8; 8]) -> Icmpv6Header<[u8; 8]> {
        Icmpv6Header::new_unchecked(bytes)
    }

    #[test]
    fn echo_fields_are_big_endian() {
        let mut hdr = ICMPV6_HEADER_TEMPLATE;
        hdr.set_identifier(0x1234);
        hdr.set_sequence(0x0001);
        assert_eq!(hdr.as_bytes(), &[0x80, 0, 0, 0, 0x12, 0x34, 0x00, 0x01]);
        assert_eq!(
            hdr.variant(),
            VariantFields::Echo {
                identifier: 0x1234,
                sequence: 1
            }
        );
    }

    #[test]
    fn neighbor_advert_flags_are_msb_first() {
        let mut hdr = header([136, 0, 0, 0, 0, 0, 0, 0]);
        hdr.set_router(true);
        assert_eq!(hdr.slot(), [0x80, 0, 0, 0]);
        hdr.set_solicited(true);
        assert_eq!(hdr.slot(), [0xc0, 0, 0, 0]);
        hdr.set_override(true);
        assert_eq!(hdr.slot(), [0xe0, 0, 0, 0]);
        hdr.set_router(false);
        assert_eq!(hdr.slot(), [0x60, 0, 0, 0]);

        // Bits at the low end of the byte belong to the reserved field.
        let hdr = header([136, 0, 0, 0, 0x07, 0xff, 0xff, 0xff]);
        assert!(!hdr.router());
        assert!(!hdr.solicited());
        assert!(!hdr.override_());

        let hdr = header([136, 0, 0, 0, 0x20, 0, 0, 0]);
        assert_eq!(
            hdr.variant(),
            VariantFields::NeighborAdvert {
                router: false,
                solicited: false,
                override_: true
            }
        );
    }

    #[test]
    fn router_advert_fields() {
        let mut hdr = header([134, 0, 0, 0, 0, 0, 0, 0]);
        hdr.set_hop_limit(64);
        hdr.set_managed(true);
        assert_eq!(hdr.slot(), [64, 0x80, 0, 0]);
        hdr.set_other(true);
        hdr.set_home_agent(true);
        assert_eq!(hdr.slot(), [64, 0xe0, 0, 0]);
        hdr.set_router_pref(0b11);
        assert_eq!(hdr.slot(), [64, 0xf8, 0, 0]);
        hdr.set_router_pref(0b01);
        assert_eq!(hdr.slot(), [64, 0xe8, 0, 0]);
        hdr.set_router_lifetime(1800);
        assert_eq!(hdr.slot(), [64, 0xe8, 0x07, 0x08]);

        assert_eq!(
            hdr.variant(),
            VariantFields::RouterAdvert {
                hop_limit: 64,
                managed: true,
                other: true,
                home_agent: true,
                router_pref: 1,
                router_lifetime: 1800,
            }
        );

        // The reserved low bits never leak into the flags.
        let hdr = header([134, 0, 0, 0, 0, 0x07, 0, 0]);
        assert_eq!(hdr.router_pref(), 0);
        assert!(!hdr.managed() && !hdr.other() && !hdr.home_agent());
    }

    #[test]
    #[should_panic]
    fn router_pref_is_two_bits() {
        let mut hdr = header([134, 0, 0, 0, 0, 0, 0, 0]);
        hdr.set_router_pref(4);
    }

    #[test]
    fn mismatched_accessors_read_raw_bits() {
        // An echo slot read through the router advertisement view.
        let hdr = header([128, 0, 0, 0, 0x40, 0x80, 0x00, 0x10]);
        assert_eq!(hdr.hop_limit(), 0x40);
        assert!(hdr.managed());
        assert_eq!(hdr.router_lifetime(), 0x10);
        assert_eq!(hdr.identifier(), 0x4080);
        assert!(!hdr.router());
        assert!(hdr.solicited());
    }

    #[test]
    fn set_variant_keeps_reserved_bits() {
        let mut hdr = header([136, 0, 0, 0, 0x1f, 0xaa, 0xbb, 0xcc]);
        hdr.set_variant(VariantFields::NeighborAdvert {
            router: true,
            solicited: false,
            override_: true,
        });
        assert_eq!(hdr.slot(), [0xbf, 0xaa, 0xbb, 0xcc]);

        hdr.set_variant(VariantFields::Reserved(0x01020304));
        assert_eq!(hdr.slot(), [1, 2, 3, 4]);
    }

    #[test]
    fn variant_matches_type() {
        let echo = VariantFields::Echo {
            identifier: 0,
            sequence: 0,
        };
        assert!(echo.matches(Icmpv6Type::ECHO_REQUEST));
        assert!(echo.matches(Icmpv6Type::ECHO_REPLY));
        assert!(!echo.matches(Icmpv6Type::ROUTER_ADVERT));
        assert!(VariantFields::Reserved(0).matches(Icmpv6Type::NEIGHBOR_SOLICIT));
        assert!(!VariantFields::Reserved(0).matches(Icmpv6Type::NEIGHBOR_ADVERT));
    }
}
