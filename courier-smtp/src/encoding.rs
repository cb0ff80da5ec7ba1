//! Escaping of subject and body text for a 7-bit transport.
//!
//! This is **not** RFC 2045 quoted-printable even though the message headers
//! advertise it as such: every byte is escaped as `=XX`, including printable
//! ASCII. A carriage return becomes a bare `\n`, a line feed is dropped, and
//! the body variant inserts a soft break (`=\n`) once 75 or more escaped
//! characters have accumulated on the current line.

use std::fmt::Write as _;

use encoding_rs::ISO_8859_15;

/// Character set the text is transcoded to before escaping.
pub const CHARSET: &str = "ISO-8859-15";

/// Name of the transfer encoding advertised for the body.
pub const TRANSFER_ENCODING: &str = "quoted-printable";

/// Inserted in place of every carriage return.
const LINE_BREAK: &str = "\n";

/// Escaped characters allowed on one body line before a soft break.
const SOFT_BREAK_THRESHOLD: usize = 75;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Characters without an ISO-8859-15 mapping come out as HTML numeric
/// character references, which is what `encoding_rs` substitutes.
fn to_single_byte(text: &str) -> Vec<u8> {
    let (bytes, _, _) = ISO_8859_15.encode(text);
    bytes.into_owned()
}

fn escape(bytes: &[u8], soft_break_at: Option<usize>) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    let mut line_len = 0;

    for &byte in bytes {
        match byte {
            CR => out.push_str(LINE_BREAK),
            LF => {}
            _ => {
                let _ = write!(out, "={byte:02X}");

                if let Some(threshold) = soft_break_at {
                    line_len += 3;
                    if line_len >= threshold {
                        out.push('=');
                        out.push_str(LINE_BREAK);
                        line_len = 0;
                    }
                }
            }
        }
    }

    out
}

/// Escape text for use inside an encoded-word in the `Subject` header.
pub fn encode_header(text: &str) -> String {
    escape(&to_single_byte(text), None)
}

/// Escape the message body, wrapping with soft line breaks.
///
/// The line counter is only advanced by escaped bytes; a carriage return
/// starts a new output line but leaves the counter untouched.
pub fn encode_body(text: &str) -> String {
    escape(&to_single_byte(text), Some(SOFT_BREAK_THRESHOLD))
}
