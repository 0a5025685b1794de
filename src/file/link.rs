//! Share link identifiers.

/// Length of a link id in hex characters.
pub const LINK_ID_LEN: usize = 32;

/// Generate a new link id: 128 random bits as lowercase hex.
pub fn generate_link_id() -> String {
    format!("{:032x}", rand::random::<u128>())
}

/// Whether `token` has the shape of a link id.
pub fn is_link_id(token: &str) -> bool {
    token.len() == LINK_ID_LEN
        && token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
