//! Decoding of packed `HEXADDR:HEXPORT` endpoints.

use std::net::Ipv4Addr;

use crate::error::DecodeError;

/// Decode a `/proc/net/tcp` endpoint such as `0100007F:1F90` into
/// `("127.0.0.1", 8080)`.
///
/// The kernel prints the address as a native-endian 32-bit word, so on the
/// little-endian hosts that produce these tables the least significant byte
/// is the first octet. The port is printed in plain hexadecimal and is not
/// narrowed to 16 bits here.
pub fn decode_address_port(token: &str) -> Result<(String, u32), DecodeError> {
    let mut parts = token.split(':');
    let (Some(addr_hex), Some(port_hex), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(DecodeError::Format);
    };

    let addr = u32::from_str_radix(addr_hex, 16).map_err(DecodeError::Address)?;
    let port = u32::from_str_radix(port_hex, 16).map_err(DecodeError::Port)?;

    Ok((Ipv4Addr::from(addr.to_le_bytes()).to_string(), port))
}
