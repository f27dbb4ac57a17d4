use crate::icmpv6::{Icmpv6Type, NdpOptionType};
use crate::traits::PduType;

/// Errors raised while decoding a message or reading its typed fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Fewer bytes remain than the current decoding step requires.
    #[error("truncated input: {needed} bytes needed, {remaining} remaining")]
    TruncatedInput { needed: usize, remaining: usize },

    /// The option stream is not a valid sequence of 8-byte aligned TLVs.
    #[error("malformed option at offset {offset}: {reason}")]
    MalformedOption { offset: usize, reason: &'static str },

    /// A typed option getter found no option with the requested id.
    #[error("option {0} not found")]
    OptionNotFound(NdpOptionType),

    /// A tagged slot value does not match the message type.
    #[error("field {field} is not valid for message type {msg_type}")]
    InvalidFieldAccess {
        msg_type: Icmpv6Type,
        field: &'static str,
    },

    /// The dispatcher has no decoder for the payload tag.
    #[error("unsupported pdu type {0:?}")]
    UnsupportedPdu(PduType),
}

/// The result type used across the crate.
pub type Result<T> = core::result::Result<T, Error>;
