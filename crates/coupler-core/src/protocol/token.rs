//! Control tokens and protocol constants.
//!
//! Every payload on the wire is preceded by exactly one token, sent as a
//! 4-byte signed integer, declaring the direction and kind of what follows.
//! The token values are shared with the simulation binary and must never be
//! renumbered.

// ── Protocol constants ────────────────────────────────────────────────────────

/// Protocol version the engine expects the model to declare.
pub const PROTOCOL_VERSION: i32 = 2;

/// Default TCP port the controller listens on.
pub const DEFAULT_PORT: u16 = 2224;

/// Single byte the controller sends as soon as the connection is accepted.
pub const READY_BYTE: u8 = b'1';

/// Fixed-point scale applied when decoding 16-bit coordinate values.
pub const COORDINATE_SCALE: f32 = 0.01;

// ── Tokens ────────────────────────────────────────────────────────────────────

/// Control tokens framing every exchange on the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Token {
    /// The model requests input values; the controller must supply them.
    GetData = 0,
    /// The model sends output values; the controller must consume them.
    PutData = 1,
    /// Handshake: negotiate an input channel's band count.
    GetDataSize = 2,
    /// Handshake: declare an output channel's band/step/datatype metadata.
    PutDataSize = 3,
    /// Terminate the session cleanly.
    EndData = 4,
}

impl Token {
    /// Wire name of the token as it appears in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Token::GetData => "GET_DATA",
            Token::PutData => "PUT_DATA",
            Token::GetDataSize => "GET_DATA_SIZE",
            Token::PutDataSize => "PUT_DATA_SIZE",
            Token::EndData => "END_DATA",
        }
    }
}

impl TryFrom<i32> for Token {
    type Error = ();

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Token::GetData),
            1 => Ok(Token::PutData),
            2 => Ok(Token::GetDataSize),
            3 => Ok(Token::PutDataSize),
            4 => Ok(Token::EndData),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_values_match_wire_numbering() {
        assert_eq!(Token::GetData as i32, 0);
        assert_eq!(Token::PutData as i32, 1);
        assert_eq!(Token::GetDataSize as i32, 2);
        assert_eq!(Token::PutDataSize as i32, 3);
        assert_eq!(Token::EndData as i32, 4);
    }

    #[test]
    fn test_try_from_round_trips_every_token() {
        for token in [
            Token::GetData,
            Token::PutData,
            Token::GetDataSize,
            Token::PutDataSize,
            Token::EndData,
        ] {
            assert_eq!(Token::try_from(token as i32), Ok(token));
        }
    }

    #[test]
    fn test_try_from_rejects_out_of_range_values() {
        assert_eq!(Token::try_from(-1), Err(()));
        assert_eq!(Token::try_from(5), Err(()));
        assert_eq!(Token::try_from(i32::MAX), Err(()));
    }

    #[test]
    fn test_display_uses_wire_names() {
        assert_eq!(Token::EndData.to_string(), "END_DATA");
        assert_eq!(Token::GetDataSize.to_string(), "GET_DATA_SIZE");
    }

    #[test]
    fn test_ready_byte_is_ascii_one() {
        assert_eq!(READY_BYTE, 0x31);
    }
}
