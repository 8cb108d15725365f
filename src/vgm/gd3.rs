//! GD3 metadata tag
//!
//! An optional trailer holding track, game, system, and author names in
//! English and Japanese, plus release date, ripper, and notes. Strings
//! are null-terminated UTF-16LE; this player keeps the English variants,
//! truncates to 64 characters, and narrows to the low byte as a
//! best-effort ASCII rendering.

use crate::reader::ByteReader;

/// "Gd3 " identification word
const GD3_IDENT: u32 = 0x2033_6447;

/// Only tag version published
const GD3_VERSION: u32 = 0x0000_0100;

/// Longest string retained, in characters
pub const GD3_STR_MAX_LEN: usize = 64;

/// Track metadata from a GD3 tag
///
/// Absent or empty fields are `None`. A file without a (valid) tag
/// yields the all-`None` default.
#[derive(Debug, Clone, Default)]
pub struct Gd3 {
    pub track_name: Option<String>,
    pub game_name: Option<String>,
    pub system_name: Option<String>,
    pub author_name: Option<String>,
    pub release_date: Option<String>,
    pub creator: Option<String>,
    pub notes: Option<String>,
}

impl Gd3 {
    /// Parse the tag at an absolute file offset
    ///
    /// Any validation failure yields the empty default; metadata is
    /// never fatal to playback.
    pub fn parse(reader: &mut dyn ByteReader, offset: u32) -> Self {
        let mut gd3 = Self::default();
        let mut pos = offset;

        let Some(ident) = read_u32(reader, pos) else {
            return gd3;
        };
        if ident != GD3_IDENT {
            return gd3;
        }
        pos += 4;
        let Some(version) = read_u32(reader, pos) else {
            return gd3;
        };
        if version != GD3_VERSION {
            return gd3;
        }
        pos += 4;
        let Some(len) = read_u32(reader, pos) else {
            return gd3;
        };
        if len == 0 {
            return gd3;
        }
        pos += 4;
        let end = pos + len;

        gd3.track_name = read_string(reader, &mut pos, end);
        skip_string(reader, &mut pos, end); // Japanese track name
        gd3.game_name = read_string(reader, &mut pos, end);
        skip_string(reader, &mut pos, end); // Japanese game name
        gd3.system_name = read_string(reader, &mut pos, end);
        skip_string(reader, &mut pos, end); // Japanese system name
        gd3.author_name = read_string(reader, &mut pos, end);
        skip_string(reader, &mut pos, end); // Japanese author name
        gd3.release_date = read_string(reader, &mut pos, end);
        gd3.creator = read_string(reader, &mut pos, end);
        gd3.notes = read_string(reader, &mut pos, end);
        gd3
    }
}

fn read_u32(reader: &mut dyn ByteReader, offset: u32) -> Option<u32> {
    let mut raw = [0u8; 4];
    if reader.read(&mut raw, offset as u64) != 4 {
        return None;
    }
    Some(u32::from_le_bytes(raw))
}

/// Read one null-terminated UTF-16LE string, advancing `pos` past the
/// terminator. Returns `None` for an empty string.
fn read_string(reader: &mut dyn ByteReader, pos: &mut u32, end: u32) -> Option<String> {
    let mut out = String::new();
    let mut chars = 0;
    while *pos < end {
        let mut raw = [0u8; 2];
        if reader.read(&mut raw, *pos as u64) != 2 {
            break;
        }
        *pos += 2;
        let unit = u16::from_le_bytes(raw);
        if unit == 0 {
            break;
        }
        if chars < GD3_STR_MAX_LEN {
            out.push((unit & 0xFF) as u8 as char);
            chars += 1;
        }
    }
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

fn skip_string(reader: &mut dyn ByteReader, pos: &mut u32, end: u32) {
    let _ = read_string(reader, pos, end);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SliceReader;

    fn utf16(s: &str) -> Vec<u8> {
        let mut out = Vec::new();
        for unit in s.encode_utf16() {
            out.extend_from_slice(&unit.to_le_bytes());
        }
        out.extend_from_slice(&[0, 0]);
        out
    }

    fn tag(strings: &[&str]) -> Vec<u8> {
        let mut body = Vec::new();
        for s in strings {
            body.extend_from_slice(&utf16(s));
        }
        let mut raw = Vec::new();
        raw.extend_from_slice(&GD3_IDENT.to_le_bytes());
        raw.extend_from_slice(&GD3_VERSION.to_le_bytes());
        raw.extend_from_slice(&(body.len() as u32).to_le_bytes());
        raw.extend_from_slice(&body);
        raw
    }

    #[test]
    fn test_parse_keeps_english_fields() {
        let raw = tag(&[
            "Track", "トラック", "Game", "ゲーム", "System", "システム", "Author", "著者",
            "1987", "Ripper", "Notes",
        ]);
        let mut reader = SliceReader::new(&raw);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert_eq!(gd3.track_name.as_deref(), Some("Track"));
        assert_eq!(gd3.game_name.as_deref(), Some("Game"));
        assert_eq!(gd3.system_name.as_deref(), Some("System"));
        assert_eq!(gd3.author_name.as_deref(), Some("Author"));
        assert_eq!(gd3.release_date.as_deref(), Some("1987"));
        assert_eq!(gd3.creator.as_deref(), Some("Ripper"));
        assert_eq!(gd3.notes.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_empty_strings_become_none() {
        let raw = tag(&["Track", "", "", "", "", "", "", "", "", "", ""]);
        let mut reader = SliceReader::new(&raw);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert_eq!(gd3.track_name.as_deref(), Some("Track"));
        assert!(gd3.game_name.is_none());
        assert!(gd3.notes.is_none());
    }

    #[test]
    fn test_bad_ident_yields_default() {
        let mut raw = tag(&["Track"]);
        raw[0] = b'X';
        let mut reader = SliceReader::new(&raw);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert!(gd3.track_name.is_none());
    }

    #[test]
    fn test_long_string_is_truncated() {
        let long: String = "x".repeat(200);
        let raw = tag(&[&long]);
        let mut reader = SliceReader::new(&raw);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert_eq!(gd3.track_name.unwrap().len(), GD3_STR_MAX_LEN);
    }

    #[test]
    fn test_non_ascii_narrows_to_low_byte() {
        // U+00E9 (e acute) narrows to 0xE9; U+30C8 narrows to 0xC8
        let raw = tag(&["é"]);
        let mut reader = SliceReader::new(&raw);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert_eq!(gd3.track_name.as_deref(), Some("\u{e9}"));
    }

    #[test]
    fn test_truncated_tag_stops_cleanly() {
        let raw = tag(&["Track", "", "Game"]);
        let cut = &raw[..raw.len() - 4];
        let mut reader = SliceReader::new(cut);
        let gd3 = Gd3::parse(&mut reader, 0);
        assert_eq!(gd3.track_name.as_deref(), Some("Track"));
    }
}
