#![warn(missing_debug_implementations, rust_2018_idioms)]

//! Parse and construct ICMPv6 messages, including the neighbor discovery
//! messages and their option chains.

#[macro_use]
mod macros;

pub mod error;
pub use error::{Error, Result};

mod traits;
pub use traits::{parse_pdu, ChecksumPolicy, IpProtocol, Pdu, PduParent, PduType};

pub use bytes::Buf;

pub mod checksum_utils;
pub mod ether;
pub mod icmpv6;
