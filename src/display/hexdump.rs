//! Hex dump rendering with an ASCII sidebar

use crate::common::Result;
use std::fmt::Write;

/// Render a full buffer, 16 bytes per row with an extra gap after byte
/// 8 and the printable bytes repeated between pipes.
///
/// # Errors
///
/// Propagates formatting failures.
pub fn hex_dump(data: &[u8]) -> Result<String> {
    let mut out = String::new();
    for row_start in (0..data.len()).step_by(16) {
        let row = &data[row_start..(row_start + 16).min(data.len())];
        write!(out, "{row_start:08x}: ")?;
        for j in 0..16 {
            if j == 8 {
                out.push(' ');
            }
            match row.get(j) {
                Some(b) => write!(out, "{b:02x}")?,
                None => out.push_str("  "),
            }
            if j < 15 {
                out.push(' ');
            }
        }
        out.push_str("  |");
        for &b in row {
            out.push(ascii_or_dot(b));
        }
        out.push_str("|\n");
    }
    Ok(out)
}

/// Render an indented hex block for a tuple's data slice; offsets are
/// absolute page offsets so rows line up with the full-page dump.
///
/// # Errors
///
/// Propagates formatting failures.
pub fn hex_block(data: &[u8], base_offset: usize, indent: &str) -> Result<String> {
    let mut out = String::new();
    for row_start in (0..data.len()).step_by(16) {
        let row = &data[row_start..(row_start + 16).min(data.len())];
        write!(out, "{indent}{:08x}: ", base_offset + row_start)?;
        for j in 0..16 {
            if j == 8 {
                out.push(' ');
            }
            match row.get(j) {
                Some(b) => write!(out, "{b:02x} ")?,
                None => out.push_str("   "),
            }
        }
        out.push_str(" |");
        for &b in row {
            out.push(ascii_or_dot(b));
        }
        out.push_str("|\n");
    }
    Ok(out)
}

fn ascii_or_dot(b: u8) -> char {
    if (0x20..=0x7E).contains(&b) {
        b as char
    } else {
        '.'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_dump_row_shape() {
        let data: Vec<u8> = (0u8..32).collect();
        let dump = hex_dump(&data).unwrap();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("00000000: 00 01 02 03 04 05 06 07  08 09"));
        assert!(lines[1].starts_with("00000010:"));
        assert!(lines[0].ends_with('|'));
    }

    #[test]
    fn test_hex_dump_ascii_sidebar() {
        let dump = hex_dump(b"ABCDEFGHIJKLMNOP").unwrap();
        assert!(dump.contains("|ABCDEFGHIJKLMNOP|"));

        let dump = hex_dump(&[0u8; 16]).unwrap();
        assert!(dump.contains("|................|"));
    }

    #[test]
    fn test_hex_block_partial_row() {
        let out = hex_block(&[0xAB, 0xCD, 0xEF], 8160, "  ").unwrap();
        assert!(out.starts_with("  00001fe0: ab cd ef"));
        assert!(out.trim_end().ends_with("|...|"));
    }

    #[test]
    fn test_hex_block_base_offset() {
        let out = hex_block(&[0x41; 16], 0x100, "").unwrap();
        assert!(out.starts_with("00000100:"));
        assert!(out.contains("|AAAAAAAAAAAAAAAA|"));
    }
}
