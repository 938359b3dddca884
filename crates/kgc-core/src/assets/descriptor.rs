//! Sprite descriptor (`.asset`) parsing.
//!
//! Exported sprite descriptors are YAML-ish text. Only the rectangle block is of
//! interest: a `m_Rect:` (or `rect:`) line followed by indented `x`, `y`, `width`
//! and `height` keys. Everything else in the file is ignored.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// How many lines after a rect marker are scanned for its fields.
const RECT_LOOKAHEAD: usize = 9;

/// Pixel rectangle inside an atlas texture, in engine (bottom-up) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

pub fn parse_asset_file(asset_content: &str) -> Result<CropRect> {
    log::debug!(
        "[Asset] Parsing asset file, content length: {}",
        asset_content.len()
    );

    let lines: Vec<&str> = asset_content.lines().collect();
    let mut rect = CropRect {
        x: 0,
        y: 0,
        width: 0,
        height: 0,
    };

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if !(trimmed.contains("m_Rect:") || trimmed.contains("rect:")) {
            continue;
        }

        for next_line in lines.iter().skip(index + 1).take(RECT_LOOKAHEAD) {
            let next_line = next_line.trim();

            if next_line.starts_with("x:") {
                rect.x = parse_field(next_line);
            } else if next_line.starts_with("y:") {
                rect.y = parse_field(next_line);
            } else if next_line.starts_with("width:") {
                rect.width = parse_field(next_line);
            } else if next_line.starts_with("height:") {
                rect.height = parse_field(next_line);
                break;
            }
        }
    }

    if rect.width == 0 || rect.height == 0 {
        return Err(CoreError::Descriptor);
    }

    log::debug!(
        "[Asset] Parsed rect - x:{}, y:{}, width:{}, height:{}",
        rect.x,
        rect.y,
        rect.width,
        rect.height
    );
    Ok(rect)
}

// "x: 123.456" -> 123
fn parse_field(line: &str) -> u32 {
    line.split(':')
        .nth(1)
        .and_then(|value| value.trim().parse::<f32>().ok())
        .map(|value| value as u32)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPRITE: &str = "\
--- !u!213 &21300000
Sprite:
  m_Name: Avatar_01
  m_Rect:
    serializedVersion: 2
    x: 128.5
    y: 256
    width: 96
    height: 96.9
  m_Offset: {x: 0, y: 0}
";

    #[test]
    fn parses_rect_block() {
        let rect = parse_asset_file(SPRITE).unwrap();
        assert_eq!(
            rect,
            CropRect {
                x: 128,
                y: 256,
                width: 96,
                height: 96
            }
        );
    }

    #[test]
    fn accepts_lowercase_rect_marker() {
        let content = "rect:\n  x: 1\n  y: 2\n  width: 3\n  height: 4\n";
        let rect = parse_asset_file(content).unwrap();
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (1, 2, 3, 4));
    }

    #[test]
    fn missing_dimensions_is_an_error() {
        let content = "m_Rect:\n  x: 10\n  y: 20\n";
        assert!(matches!(
            parse_asset_file(content),
            Err(CoreError::Descriptor)
        ));
    }

    #[test]
    fn fields_beyond_lookahead_are_ignored() {
        let mut content = String::from("m_Rect:\n");
        for _ in 0..RECT_LOOKAHEAD {
            content.push_str("  filler: 0\n");
        }
        content.push_str("  width: 10\n  height: 10\n");
        assert!(parse_asset_file(&content).is_err());
    }

    #[test]
    fn garbage_values_parse_as_zero() {
        let content = "m_Rect:\n  x: abc\n  y: 5\n  width: 8\n  height: 8\n";
        let rect = parse_asset_file(content).unwrap();
        assert_eq!(rect.x, 0);
        assert_eq!(rect.y, 5);
    }
}
