use std::io;

use serde::Serialize;
use serde_json::ser::Formatter;

use crate::errors::{Result, SerializationError};

/// Compact JSON formatter that escapes DEL and every non-ASCII character as
/// a lowercase `\uXXXX` sequence, splitting astral characters into UTF-16
/// surrogate pairs. Only printable ASCII is written raw.
#[derive(Debug, Default, Clone, Copy)]
pub struct AsciiFormatter;

const DEL: u8 = 0x7f;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if fragment.bytes().all(|b| b < DEL) {
            return writer.write_all(fragment.as_bytes());
        }

        let mut units = [0u16; 2];
        for c in fragment.chars() {
            if (c as u32) < DEL as u32 {
                writer.write_all(&[c as u8])?;
            } else {
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{:04x}", unit)?;
                }
            }
        }
        Ok(())
    }
}

/// Encodes a response body. The output is always pure ASCII.
pub fn encode_body<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let mut buf = Vec::with_capacity(64);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| {
        SerializationError::Json {
            reason: e.to_string(),
        }
        .into()
    })
}
