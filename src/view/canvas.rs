use std::io::{self, Write};

use cellrs::{pos, Pos};
use termion::color::{Bg, Fg, Rgb};

/// rgb components of a terminal color.
pub type Color = (u8, u8, u8);

const FALLBACK_BG: Color = (0, 0, 0);
const FALLBACK_FG: Color = (238, 238, 238);

/// Parses `#rrggbb`, `#rgb` and a few color names.
pub fn parse_color(color: &str) -> Option<Color> {
    let color = color.trim();
    if let Some(hex) = color.strip_prefix('#') {
        let digits = hex
            .chars()
            .map(|c| c.to_digit(16).map(|d| d as u8))
            .collect::<Option<Vec<_>>>()?;
        return match digits[..] {
            [r, g, b] => Some((r * 17, g * 17, b * 17)),
            [r1, r2, g1, g2, b1, b2] => Some((r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2)),
            _ => None,
        };
    }
    let rgb = match color.to_ascii_lowercase().as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "gray" | "grey" => (128, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub glyph: char,
    pub fg: Color,
    pub bg: Color,
}

impl Tile {
    pub fn new(glyph: char, fg: &str, bg: &str) -> Self {
        Self {
            glyph,
            fg: parse_color(fg).unwrap_or(FALLBACK_FG),
            bg: parse_color(bg).unwrap_or(FALLBACK_BG),
        }
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self {
            glyph: ' ',
            fg: FALLBACK_FG,
            bg: FALLBACK_BG,
        }
    }
}

pub struct Canvas {
    lines: Vec<Vec<Tile>>,
    width: usize,
    height: usize,
}

impl Canvas {
    /// a canvas covering the terminal, minus the status line.
    pub fn from_screen() -> io::Result<Self> {
        let (width, height) = termion::terminal_size()?;
        Ok(Self::new(width as usize, height.saturating_sub(1) as usize))
    }

    pub fn new(width: usize, height: usize) -> Self {
        let lines = vec![vec![Tile::default(); width]; height];
        Self {
            height,
            lines,
            width,
        }
    }

    pub fn layer(&mut self, f: impl Fn(Pos) -> Option<Tile>) {
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(tile) = f(pos!(x as i32, y as i32)) {
                    self.lines[y][x] = tile;
                }
            }
        }
    }

    pub fn render(&self, status: &str) -> String {
        let mut result = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            let goto = termion::cursor::Goto(1, index as u16 + 1);
            result += &format!("{goto}");
            for tile in line {
                let (br, bg, bb) = tile.bg;
                let (fr, fg, fb) = tile.fg;
                result += &format!("{}{}{}", Bg(Rgb(br, bg, bb)), Fg(Rgb(fr, fg, fb)), tile.glyph);
            }
        }
        let goto = termion::cursor::Goto(1, self.height as u16 + 1);
        let reset = termion::style::Reset;
        let status: String = status.chars().take(self.width).collect();
        result += &format!("{goto}{reset}{status}{}", termion::clear::UntilNewline);
        result
    }

    pub fn display(&self, out: &mut impl Write, status: &str) -> io::Result<()> {
        write!(out, "{}", self.render(status))?;
        out.flush()
    }
}

#[test]
fn test_parse_color() {
    assert_eq!(parse_color("#ffd700"), Some((255, 215, 0)));
    assert_eq!(parse_color("#eee"), Some((238, 238, 238)));
    assert_eq!(parse_color("Black"), Some((0, 0, 0)));
    assert_eq!(parse_color("#ffd70"), None);
    assert_eq!(parse_color("#gggggg"), None);
    assert_eq!(parse_color("teal-ish"), None);
}

#[test]
fn test_layer() {
    let mut canvas = Canvas::new(3, 2);
    canvas.layer(|p| (p.x == p.y).then(|| Tile::new('l', "#011627", "#ffd700")));
    assert_eq!(canvas.lines[0][0].glyph, 'l');
    assert_eq!(canvas.lines[1][1].bg, (255, 215, 0));
    assert_eq!(canvas.lines[0][1], Tile::default());

    let screen = canvas.render("generation 3 and a long tail");
    assert!(screen.contains("gen"));
    assert!(!screen.contains("long tail"));
}
