//! Provide utilitiy functions for calculating packet checksums.

// The checksum computing functions are taken directly from smol-tcp.
use std::net::Ipv6Addr;

use byteorder::{ByteOrder, NetworkEndian};

use crate::traits::IpProtocol;

/// Compute an RFC 1071 compliant checksum (without the final complement).
///
/// This function is copied from smoltcp::wire::ip::checksum::data function and
/// renamed to from_slice.
pub fn from_slice(mut data: &[u8]) -> u16 {
    let mut accum = 0;

    // For each 32-byte chunk...
    const CHUNK_SIZE: usize = 32;
    while data.len() >= CHUNK_SIZE {
        let mut d = &data[..CHUNK_SIZE];
        // ... take by 2 bytes and sum them.
        while d.len() >= 2 {
            accum += NetworkEndian::read_u16(d) as u32;
            d = &d[2..];
        }

        data = &data[CHUNK_SIZE..];
    }

    // Sum the rest that does not fit the last 32-byte chunk,
    // taking by 2 bytes.
    while data.len() >= 2 {
        accum += NetworkEndian::read_u16(data) as u32;
        data = &data[2..];
    }

    // Add the last remaining odd byte, if any.
    if let Some(&value) = data.first() {
        accum += (value as u32) << 8;
    }

    propagate_carries(accum)
}

/// Combine several RFC 1071 compliant checksums.
pub fn combine(checksums: &[u16]) -> u16 {
    let mut accum: u32 = 0;
    for &word in checksums {
        accum += word as u32;
    }
    propagate_carries(accum)
}

fn propagate_carries(word: u32) -> u16 {
    let sum = (word >> 16) + (word & 0xffff);
    ((sum >> 16) as u16) + (sum as u16)
}

/// The IPv6 pseudo-header covered by upper-layer checksums (RFC 8200, 8.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6PseudoHeader {
    src_ip: Ipv6Addr,
    dst_ip: Ipv6Addr,
    len_proto: [u8; 8],
}

impl Ipv6PseudoHeader {
    /// Build the pseudo-header for an upper-layer message of `upper_len` bytes.
    pub fn new(src_ip: Ipv6Addr, dst_ip: Ipv6Addr, proto: IpProtocol, upper_len: u32) -> Self {
        let mut len_proto = [0u8; 8];
        NetworkEndian::write_u32(&mut len_proto[0..4], upper_len);
        len_proto[7] = proto.into();

        Self {
            src_ip,
            dst_ip,
            len_proto,
        }
    }

    /// The uncomplemented sum of the pseudo-header.
    pub fn calc_checksum(&self) -> u16 {
        combine(&[
            from_slice(&self.src_ip.octets()[..]),
            from_slice(&self.dst_ip.octets()[..]),
            from_slice(&self.len_proto[..]),
        ])
    }
}
