// src/core/securitytxt/signed_message.rs

//! Detection and unwrapping of OpenPGP cleartext-signed bodies (RFC 4880,
//! section 7). Only the armor structure is checked; the signature itself is
//! never verified.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::core::errors::EnvelopeError;

const BEGIN_SIGNED_MESSAGE: &str = "-----BEGIN PGP SIGNED MESSAGE-----";
const BEGIN_SIGNATURE: &str = "-----BEGIN PGP SIGNATURE-----";
const END_SIGNATURE: &str = "-----END PGP SIGNATURE-----";

/// OpenPGP packet tag of a signature packet.
const SIGNATURE_PACKET_TAG: u8 = 2;

const CRC24_INIT: u32 = 0x00B7_04CE;
const CRC24_POLY: u32 = 0x0186_4CFB;

/// A body with its clearsign armor (if any) removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedMessage {
    message: String,
    signed: bool,
}

impl SignedMessage {
    /// Splits `input` into message text and signature.
    ///
    /// Without a `BEGIN PGP SIGNED MESSAGE` line the whole input is the
    /// message. With one, the armor must be complete: header block, message,
    /// and a decodable signature block, otherwise the body is rejected.
    pub fn decode(input: &[u8]) -> Result<Self, EnvelopeError> {
        let text = String::from_utf8_lossy(input);
        let mut lines = text.lines();

        if !lines.by_ref().any(|line| line.trim_end() == BEGIN_SIGNED_MESSAGE) {
            return Ok(Self { message: text.into_owned(), signed: false });
        }

        // Armor headers ("Hash: SHA256") end at the first blank line.
        if !lines.by_ref().any(|line| line.trim().is_empty()) {
            return Err(EnvelopeError::MissingHeaderSeparator);
        }

        let mut message = Vec::new();
        let mut found_signature = false;
        for line in lines.by_ref() {
            if line.trim_end() == BEGIN_SIGNATURE {
                found_signature = true;
                break;
            }
            // Dash-escaped text lines start with "- ".
            message.push(line.strip_prefix("- ").unwrap_or(line));
        }
        if !found_signature {
            return Err(EnvelopeError::MissingSignature);
        }

        read_signature_block(&mut lines)?;
        debug!(lines = message.len(), "unwrapped clearsigned message");

        Ok(Self { message: message.join("\n"), signed: true })
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_signed(&self) -> bool {
        self.signed
    }
}

/// Reads the armored signature up to the END line and checks it decodes to a
/// signature packet.
fn read_signature_block<'a>(lines: &mut impl Iterator<Item = &'a str>) -> Result<(), EnvelopeError> {
    let mut in_headers = true;
    let mut body = String::new();
    let mut checksum = None;
    let mut terminated = false;

    for line in lines {
        let line = line.trim();
        if line == END_SIGNATURE {
            terminated = true;
            break;
        }
        if in_headers {
            if line.is_empty() {
                in_headers = false;
            } else if !line.contains(": ") {
                return Err(EnvelopeError::MissingHeaderSeparator);
            }
            continue;
        }
        if let Some(crc) = line.strip_prefix('=') {
            checksum = Some(crc.to_string());
        } else {
            body.push_str(line);
        }
    }

    if !terminated {
        return Err(EnvelopeError::UnterminatedSignature);
    }

    let packet = STANDARD.decode(body.as_bytes())?;
    let Some(&tag_byte) = packet.first() else {
        return Err(EnvelopeError::EmptySignature);
    };
    if packet_tag(tag_byte) != Some(SIGNATURE_PACKET_TAG) {
        return Err(EnvelopeError::NotASignaturePacket(tag_byte));
    }

    if let Some(checksum) = checksum {
        verify_checksum(&checksum, &packet)?;
    }
    Ok(())
}

/// Tag of an OpenPGP packet header byte, for both old and new formats.
fn packet_tag(header: u8) -> Option<u8> {
    if header & 0x80 == 0 {
        return None;
    }
    if header & 0x40 != 0 {
        Some(header & 0x3f)
    } else {
        Some((header >> 2) & 0x0f)
    }
}

fn verify_checksum(encoded: &str, data: &[u8]) -> Result<(), EnvelopeError> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .ok()
        .filter(|b| b.len() == 3)
        .ok_or_else(|| EnvelopeError::InvalidChecksum(encoded.to_string()))?;
    let expected = u32::from(bytes[0]) << 16 | u32::from(bytes[1]) << 8 | u32::from(bytes[2]);
    let actual = crc24(data);
    if expected != actual {
        return Err(EnvelopeError::ChecksumMismatch { expected, actual });
    }
    Ok(())
}

fn crc24(data: &[u8]) -> u32 {
    let mut crc = CRC24_INIT;
    for &byte in data {
        crc ^= u32::from(byte) << 16;
        for _ in 0..8 {
            crc <<= 1;
            if crc & 0x0100_0000 != 0 {
                crc ^= CRC24_POLY;
            }
        }
    }
    crc & 0x00FF_FFFF
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal v4 signature packet header: new-format tag 2, length 3.
    pub(crate) const FAKE_SIGNATURE: &[u8] = &[0xC2, 0x03, 0x04, 0x01, 0x08];

    pub(crate) fn armor(message: &str, signature: &[u8], with_checksum: bool) -> String {
        let mut out = format!("{BEGIN_SIGNED_MESSAGE}\nHash: SHA256\n\n{message}\n{BEGIN_SIGNATURE}\n\n");
        out.push_str(&STANDARD.encode(signature));
        out.push('\n');
        if with_checksum {
            let crc = crc24(signature).to_be_bytes();
            out.push('=');
            out.push_str(&STANDARD.encode(&crc[1..]));
            out.push('\n');
        }
        out.push_str(END_SIGNATURE);
        out.push('\n');
        out
    }

    #[test]
    fn test_unsigned_input_passes_through() {
        let input = b"Contact: mailto:security@example.com\n";
        let msg = SignedMessage::decode(input).unwrap();
        assert!(!msg.is_signed());
        assert_eq!(msg.message(), "Contact: mailto:security@example.com\n");
    }

    #[test]
    fn test_clearsigned_message_is_unwrapped() {
        let body = "Contact: mailto:security@example.com\n- -----not armor\nExpires: 2999-01-01T00:00:00Z";
        let input = armor(body, FAKE_SIGNATURE, true);
        let msg = SignedMessage::decode(input.as_bytes()).unwrap();
        assert!(msg.is_signed());
        assert_eq!(
            msg.message(),
            "Contact: mailto:security@example.com\n-----not armor\nExpires: 2999-01-01T00:00:00Z"
        );
    }

    #[test]
    fn test_crlf_armor_is_accepted() {
        let input = armor("Contact: mailto:a@example.com", FAKE_SIGNATURE, false).replace('\n', "\r\n");
        let msg = SignedMessage::decode(input.as_bytes()).unwrap();
        assert!(msg.is_signed());
        assert_eq!(msg.message(), "Contact: mailto:a@example.com");
    }

    #[test]
    fn test_missing_signature_block() {
        let input = format!("{BEGIN_SIGNED_MESSAGE}\nHash: SHA256\n\nContact: mailto:a@example.com\n");
        assert_eq!(SignedMessage::decode(input.as_bytes()), Err(EnvelopeError::MissingSignature));
    }

    #[test]
    fn test_unterminated_signature_block() {
        let input = armor("Contact: x", FAKE_SIGNATURE, false).replace(END_SIGNATURE, "");
        assert_eq!(SignedMessage::decode(input.as_bytes()), Err(EnvelopeError::UnterminatedSignature));
    }

    #[test]
    fn test_garbage_signature_is_rejected() {
        let input = format!(
            "{BEGIN_SIGNED_MESSAGE}\nHash: SHA256\n\nContact: x\n{BEGIN_SIGNATURE}\n\n!!!not base64!!!\n{END_SIGNATURE}\n"
        );
        assert!(matches!(
            SignedMessage::decode(input.as_bytes()),
            Err(EnvelopeError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_non_signature_packet_is_rejected() {
        // New-format tag 11 (literal data).
        let input = armor("Contact: x", &[0xCB, 0x01, 0x00], false);
        assert_eq!(
            SignedMessage::decode(input.as_bytes()),
            Err(EnvelopeError::NotASignaturePacket(0xCB))
        );
    }

    #[test]
    fn test_checksum_mismatch_is_rejected() {
        let good = armor("Contact: x", FAKE_SIGNATURE, true);
        let checksum_line = good.lines().find(|l| l.starts_with('=')).unwrap().to_string();
        let bad = good.replace(&checksum_line, "=AAAA");
        assert!(matches!(
            SignedMessage::decode(bad.as_bytes()),
            Err(EnvelopeError::ChecksumMismatch { expected: 0, .. })
        ));
    }

    #[test]
    fn test_crc24_known_value() {
        // CRC-24 of the empty input is the initial register value.
        assert_eq!(crc24(&[]), CRC24_INIT);
        assert_eq!(packet_tag(0x88), Some(2));
        assert_eq!(packet_tag(0x02), None);
    }
}
