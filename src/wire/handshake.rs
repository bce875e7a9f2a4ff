//! Session handshake with the telemetry host.
//!
//! Executed exactly once, before any line streaming. The host speaks first:
//! one burst of newline-separated text carrying its low-level stream tag,
//! its high-level application tag and (optionally) its username. The client
//! replies with the same two tags, its own username and a password digest,
//! NUL-terminated. No acknowledgement is awaited; the session is considered
//! established as soon as the host's burst is non-empty.

use crc::{CRC_64_ECMA_182, Crc};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::{AcmiError, Result};

/// Low-level stream protocol tag advertised by Tacview hosts.
pub const LOW_LEVEL_PROTOCOL: &str = "XtraLib.Stream.0";
/// High-level real-time telemetry protocol tag.
pub const HIGH_LEVEL_PROTOCOL: &str = "Tacview.RealTimeTelemetry.0";

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_ECMA_182);

/// Tags and username advertised by the host during the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostGreeting {
    pub low_level: String,
    pub high_level: String,
    /// Informational only; present when the host sent a third line.
    pub username: Option<String>,
}

/// Computes the password digest the host expects.
///
/// With no password the digest is the literal `"0"`. Otherwise it is the
/// CRC-64/ECMA-182 of the UTF-16LE encoding of the password, with the
/// big-endian digest bytes re-read as UTF-8 text. That re-encoding is lossy
/// (invalid sequences become U+FFFD) but reproduces byte-for-byte what the
/// reference host implementation compares against, so it must not be
/// "fixed" into hex or base64.
pub fn password_digest(password: Option<&str>) -> String {
    match password {
        None | Some("") => "0".to_string(),
        Some(password) => {
            let utf16le: Vec<u8> =
                password.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect();
            let hash = CRC64.checksum(&utf16le);
            String::from_utf8_lossy(&hash.to_be_bytes()).into_owned()
        }
    }
}

/// Builds the reply burst: `"<low>\n<high>\n<username>\n<digest>\0"`.
///
/// Note the trailing NUL terminator and the absence of a trailing newline.
pub fn reply_bytes(greeting: &HostGreeting, username: &str, password: Option<&str>) -> Vec<u8> {
    let digest = password_digest(password);
    let mut reply = format!(
        "{}\n{}\n{}\n{}",
        greeting.low_level, greeting.high_level, username, digest
    )
    .into_bytes();
    reply.push(0);
    reply
}

/// Splits a handshake burst into its greeting lines.
///
/// Lines are trimmed and empties dropped; an empty burst means the host
/// rejected the connection.
pub fn parse_greeting(burst: &str) -> Result<HostGreeting> {
    let lines: Vec<&str> =
        burst.split('\n').map(str::trim).filter(|l| !l.is_empty()).collect();

    if lines.is_empty() {
        return Err(AcmiError::handshake_failed("no handshake lines received"));
    }

    Ok(HostGreeting {
        low_level: lines[0].to_string(),
        high_level: lines.get(1).copied().unwrap_or_default().to_string(),
        username: lines.get(2).map(|l| l.to_string()),
    })
}

/// Runs the handshake over an open stream.
///
/// Reads one inbound burst, parses the greeting and writes the reply. The
/// stream is left positioned at the start of the telemetry line feed.
pub async fn negotiate<S>(
    stream: &mut S,
    username: &str,
    password: Option<&str>,
) -> Result<HostGreeting>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buffer = [0u8; 8192];
    let received = stream
        .read(&mut buffer)
        .await
        .map_err(|e| AcmiError::transport("handshake read", e))?;
    if received == 0 {
        return Err(AcmiError::handshake_failed("host closed connection before handshake"));
    }

    let burst = String::from_utf8_lossy(&buffer[..received]);
    let greeting = parse_greeting(&burst)?;
    debug!(
        low_level = %greeting.low_level,
        high_level = %greeting.high_level,
        host_user = greeting.username.as_deref().unwrap_or("<none>"),
        "host greeting received"
    );

    let reply = reply_bytes(&greeting, username, password);
    stream
        .write_all(&reply)
        .await
        .map_err(|e| AcmiError::transport("handshake reply", e))?;
    stream.flush().await.map_err(|e| AcmiError::transport("handshake flush", e))?;

    info!(username, "handshake complete");
    Ok(greeting)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_burst_is_rejected() {
        assert!(matches!(parse_greeting(""), Err(AcmiError::Handshake { .. })));
        assert!(matches!(parse_greeting("\n\n  \n"), Err(AcmiError::Handshake { .. })));
    }

    #[test]
    fn greeting_lines_are_trimmed_in_order() {
        let greeting =
            parse_greeting("XtraLib.Stream.0\r\nTacview.RealTimeTelemetry.0\r\nHostUser\r\n")
                .unwrap();
        assert_eq!(greeting.low_level, LOW_LEVEL_PROTOCOL);
        assert_eq!(greeting.high_level, HIGH_LEVEL_PROTOCOL);
        assert_eq!(greeting.username.as_deref(), Some("HostUser"));
    }

    #[test]
    fn third_line_is_optional() {
        let greeting = parse_greeting("low\nhigh").unwrap();
        assert_eq!(greeting.username, None);
    }

    #[test]
    fn no_password_digest_is_literal_zero() {
        assert_eq!(password_digest(None), "0");
        assert_eq!(password_digest(Some("")), "0");
    }

    #[test]
    fn password_digest_is_deterministic_and_eight_ish_bytes() {
        let a = password_digest(Some("secret"));
        let b = password_digest(Some("secret"));
        assert_eq!(a, b);
        assert_ne!(a, "0");
        // Lossy re-encoding can expand each raw byte to a 3-byte U+FFFD.
        assert!(!a.is_empty() && a.len() <= 24);
    }

    #[test]
    fn digest_matches_known_crc64() {
        // CRC-64/ECMA-182 over the UTF-16LE bytes, big-endian, read as UTF-8.
        let utf16le: Vec<u8> = "secret".encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let expected = Crc::<u64>::new(&CRC_64_ECMA_182).checksum(&utf16le);
        let digest = password_digest(Some("secret"));
        assert_eq!(digest, String::from_utf8_lossy(&expected.to_be_bytes()));
    }

    #[test]
    fn reply_is_nul_terminated_without_trailing_newline() {
        let greeting = HostGreeting {
            low_level: LOW_LEVEL_PROTOCOL.to_string(),
            high_level: HIGH_LEVEL_PROTOCOL.to_string(),
            username: None,
        };
        let reply = reply_bytes(&greeting, "Viewer", None);
        assert_eq!(
            reply,
            b"XtraLib.Stream.0\nTacview.RealTimeTelemetry.0\nViewer\n0\0".to_vec()
        );
        assert_eq!(reply.last(), Some(&0u8));
        assert_ne!(reply[reply.len() - 2], b'\n');
    }

    #[tokio::test]
    async fn negotiate_round_trip() {
        let (mut host, mut client) = tokio::io::duplex(1024);
        let host_task = tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            host.write_all(b"XtraLib.Stream.0\nTacview.RealTimeTelemetry.0\nHost\n")
                .await
                .unwrap();
            let mut reply = Vec::new();
            let mut byte = [0u8; 1];
            loop {
                host.read_exact(&mut byte).await.unwrap();
                if byte[0] == 0 {
                    break;
                }
                reply.push(byte[0]);
            }
            reply
        });

        let greeting = negotiate(&mut client, "Viewer", None).await.unwrap();
        assert_eq!(greeting.username.as_deref(), Some("Host"));

        let reply = host_task.await.unwrap();
        let text = String::from_utf8_lossy(&reply);
        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines[0], LOW_LEVEL_PROTOCOL);
        assert_eq!(lines[1], HIGH_LEVEL_PROTOCOL);
        assert_eq!(lines[2], "Viewer");
        assert_eq!(lines[3], "0");
    }
}
