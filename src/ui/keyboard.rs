use std::collections::HashSet;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};
use triads::catalog::Pitch;

const LOWEST_MIDI: u16 = 60;
const OCTAVES: u16 = 2;
const WHITE_WIDTH: u16 = 4;
const WHITE_SEMITONES: [u16; 7] = [0, 2, 4, 5, 7, 9, 11];
// white keys (by index within the octave) followed by a black key
const HAS_SHARP: [bool; 7] = [true, true, false, true, true, true, false];

const WHITE: Color = Color::White;
const BLACK: Color = Color::Black;
const LIT_WHITE: Color = Color::Green;
const LIT_BLACK: Color = Color::LightGreen;

/// Two octaves starting at middle C with the given notes lit. Notes outside
/// the range are folded into it by octave.
pub struct Keyboard {
    lit: HashSet<u16>,
}

impl Keyboard {
    pub fn new(notes: &[String]) -> Self {
        let span = 12 * OCTAVES;
        let lit = notes
            .iter()
            .filter_map(|n| Pitch::parse(n))
            .map(|p| {
                let offset = (i32::from(p.midi()) - i32::from(LOWEST_MIDI)).rem_euclid(i32::from(span));
                LOWEST_MIDI + offset as u16
            })
            .collect();
        Self { lit }
    }

    pub fn width() -> u16 {
        7 * OCTAVES * WHITE_WIDTH + 1
    }

    fn is_lit(&self, midi: u16) -> bool {
        self.lit.contains(&midi)
    }
}

fn paint(buf: &mut Buffer, area: Rect, x: u16, y: u16, symbol: &str, style: Style) {
    if x >= area.right() || y >= area.bottom() {
        return;
    }
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_symbol(symbol).set_style(style);
    }
}

impl Widget for Keyboard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 {
            return;
        }
        let left = area.x + area.width.saturating_sub(Self::width()) / 2;
        let black_rows = (area.height * 2 / 3).max(1);
        let border = Style::default().fg(Color::DarkGray).bg(WHITE);

        for octave in 0..OCTAVES {
            for (i, semitone) in WHITE_SEMITONES.iter().enumerate() {
                let midi = LOWEST_MIDI + octave * 12 + semitone;
                let x0 = left + (octave * 7 + i as u16) * WHITE_WIDTH;
                let fill = Style::default().bg(if self.is_lit(midi) { LIT_WHITE } else { WHITE });

                for y in area.top()..area.bottom() {
                    paint(buf, area, x0, y, "│", border);
                    for dx in 1..WHITE_WIDTH {
                        paint(buf, area, x0 + dx, y, " ", fill);
                    }
                }
            }
        }
        paint_closing_border(buf, area, left + Self::width() - 1, border);

        // black keys straddle the border to the right of their white key
        for octave in 0..OCTAVES {
            for (i, semitone) in WHITE_SEMITONES.iter().enumerate() {
                if !HAS_SHARP[i] {
                    continue;
                }
                let midi = LOWEST_MIDI + octave * 12 + semitone + 1;
                let x0 = left + (octave * 7 + i as u16) * WHITE_WIDTH + WHITE_WIDTH - 1;
                let fill = Style::default().bg(if self.is_lit(midi) { LIT_BLACK } else { BLACK });

                for y in area.top()..area.top() + black_rows {
                    for dx in 0..3 {
                        paint(buf, area, x0 + dx, y, " ", fill);
                    }
                }
            }
        }
    }
}

fn paint_closing_border(buf: &mut Buffer, area: Rect, x: u16, style: Style) {
    for y in area.top()..area.bottom() {
        paint(buf, area, x, y, "│", style);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(notes: &[&str]) -> Buffer {
        let notes: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
        let area = Rect::new(0, 0, Keyboard::width(), 6);
        let mut buf = Buffer::empty(area);
        Keyboard::new(&notes).render(area, &mut buf);
        buf
    }

    fn bg(buf: &Buffer, x: u16, y: u16) -> Option<Color> {
        buf.cell((x, y)).map(|c| c.bg)
    }

    #[test]
    fn test_unlit_keyboard() {
        let buf = render(&[]);

        // C4 bottom row, C#4 top row
        assert_eq!(bg(&buf, 1, 5), Some(WHITE));
        assert_eq!(bg(&buf, 3, 0), Some(BLACK));
        // no black key between E and F
        assert_eq!(bg(&buf, 12, 0), Some(WHITE));
        assert_eq!(buf.cell((0, 0)).map(|c| c.symbol().to_string()), Some("│".into()));
    }

    #[test]
    fn test_c_major_lights_white_keys() {
        let buf = render(&["C4", "E4", "G4"]);

        assert_eq!(bg(&buf, 1, 5), Some(LIT_WHITE)); // C4
        assert_eq!(bg(&buf, 5, 5), Some(WHITE)); // D4
        assert_eq!(bg(&buf, 9, 5), Some(LIT_WHITE)); // E4
        assert_eq!(bg(&buf, 17, 5), Some(LIT_WHITE)); // G4
    }

    #[test]
    fn test_sharps_and_flats_light_black_keys() {
        let sharp = render(&["D#4"]);
        let flat = render(&["Eb4"]);

        assert_eq!(bg(&sharp, 7, 0), Some(LIT_BLACK));
        assert_eq!(bg(&flat, 7, 0), Some(LIT_BLACK));
        assert_eq!(bg(&sharp, 3, 0), Some(BLACK));
    }

    #[test]
    fn test_notes_outside_range_fold_in() {
        let buf = render(&["C3", "C6"]);

        assert_eq!(bg(&buf, 1, 5), Some(LIT_WHITE)); // C6 -> C4
        assert_eq!(bg(&buf, 29, 5), Some(LIT_WHITE)); // C3 -> C5
    }

    #[test]
    fn test_narrow_area_does_not_panic() {
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);
        Keyboard::new(&["B5".to_string()]).render(area, &mut buf);
    }
}
