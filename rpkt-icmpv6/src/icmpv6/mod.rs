//! ICMPv6 (RFC 4443) and neighbor discovery (RFC 4861) messages.

enum_sim! {
    /// See https://www.iana.org/assignments/icmpv6-parameters
    pub struct Icmpv6Type (u8) {
        // general icmp messages
        DST_UNREACHABLE = 1,
        PKT_TOO_BIG = 2,
        TIME_EXCEEDED = 3,
        PARAM_PROBLEM = 4,
        ECHO_REQUEST = 128,
        ECHO_REPLY = 129,
        // multicast listener messages
        MGM_QUERY = 130,
        MGM_REPORT = 131,
        MGM_REDUCTION = 132,
        // ndp messages
        ROUTER_SOLICIT = 133,
        ROUTER_ADVERT = 134,
        NEIGHBOR_SOLICIT = 135,
        NEIGHBOR_ADVERT = 136,
        REDIRECT = 137,
        ROUTER_RENUMBER = 138,
        // node information
        NI_QUERY = 139,
        NI_REPLY = 140,
        MLD2_REPORT = 143,
        // mobile ipv6
        DHAAD_REQUEST = 144,
        DHAAD_REPLY = 145,
        MOBILE_PREFIX_SOL = 146,
        MOBILE_PREFIX_ADV = 147,
    }
}

enum_sim! {
    /// Option ids carried in the option chain of neighbor discovery messages.
    pub struct NdpOptionType (u8) {
        SRC_LINK_ADDR = 1,
        DST_LINK_ADDR = 2,
        PREFIX_INFO = 3,
        REDIRECTED_HDR = 4,
        MTU = 5,
        NBMA_SHORTCUT_LIMIT = 6,
        ADVERT_INTERVAL = 7,
        HOME_AGENT_INFO = 8,
        SRC_ADDR_LIST = 9,
        DST_ADDR_LIST = 10,
        CGA = 11,
        RSA_SIGN = 12,
        TIMESTAMP = 13,
        NONCE = 14,
        TRUST_ANCHOR = 15,
        CERTIFICATE = 16,
        IP_PREFIX = 17,
        NEW_ROUTER_PREFIX = 18,
        LINK_ADDR = 19,
        NEIGHBOR_ADVERT_ACK = 20,
        MAP = 23,
        ROUTE_INFO = 24,
        RECURSIVE_DNS_SERVER = 25,
        RA_FLAGS_EXT = 26,
        HANDOVER_KEY_REQ = 27,
        HANDOVER_KEY_REPLY = 28,
        HANDOVER_ASSIST_INFO = 29,
        MOBILE_NODE_ID = 30,
        DNS_SEARCH_LIST = 31,
        PROXY_SIGNATURE = 32,
        ADDR_REG = 33,
        SIXLOWPAN_CONTEXT = 34,
        AUTH_BORDER_ROUTER = 35,
        CARD_REQUEST = 138,
        CARD_REPLY = 139,
    }
}

mod header;
pub use header::{Icmpv6Header, VariantFields, ICMPV6_HEADER_LEN, ICMPV6_HEADER_TEMPLATE};

mod option;
pub use option::{
    Icmpv6Option, Icmpv6Options, OPTION_HEADER_LEN, OPTION_MAX_PAYLOAD_LEN, OPTION_UNIT_LEN,
};

pub mod ndp;
pub use ndp::{HomeAgentInfo, PrefixInfo};

mod message;
pub use message::{Icmpv6Message, ICMPV6_ADDR_LEN, ICMPV6_RA_TIMERS_LEN};
