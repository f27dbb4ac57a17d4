use std::net::Ipv6Addr;

/// Decode a hex dump such as `"8700 9ef0"` into bytes. Whitespace is ignored.
pub fn hex_to_packet(content: &str) -> Vec<u8> {
    let content: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    assert!(content.len() % 2 == 0);

    let mut res = Vec::new();
    let mut start_idx = 0;
    while start_idx < content.len() {
        res.push(u8::from_str_radix(&content[start_idx..start_idx + 2], 16).unwrap());
        start_idx += 2;
    }

    res
}

#[allow(dead_code)]
pub fn addr(s: &str) -> Ipv6Addr {
    s.parse().unwrap()
}

#[allow(dead_code)]
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
