// THEORY:
// Presentation is the last, display-only step of a pass. Each `RankedEntry` becomes
// a `PresentationRecord`: the text a swatch shows, the swatch's background color,
// and a label color chosen so the text stays legible on top of it.
//
// The label rule is a fixed brightness heuristic, not a contrast-ratio computation:
// black text only when red, green and blue are all above 200, white otherwise.

use std::fmt;

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::ranking::RankedEntry;

/// Text color for a swatch label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LabelColor {
    Black,
    White,
}

impl LabelColor {
    pub fn for_background(background: Pixel) -> Self {
        if background.is_near_white() {
            LabelColor::Black
        } else {
            LabelColor::White
        }
    }

    pub fn to_pixel(self) -> Pixel {
        match self {
            LabelColor::Black => Pixel::BLACK,
            LabelColor::White => Pixel::WHITE,
        }
    }
}

/// A display-ready swatch for one ranked color.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PresentationRecord {
    /// Percentage and channel breakdown, e.g. `"50.00%\nR:255 G:0 B:0"`.
    pub text: String,
    pub background: Pixel,
    pub text_color: LabelColor,
}

impl From<&RankedEntry> for PresentationRecord {
    fn from(entry: &RankedEntry) -> Self {
        let color = entry.color;
        Self {
            text: format!(
                "{}%\nR:{} G:{} B:{}",
                entry.percentage_text(),
                color.red(),
                color.green(),
                color.blue()
            ),
            background: color,
            text_color: LabelColor::for_background(color),
        }
    }
}

impl fmt::Display for PresentationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{} on {:?}] {}",
            self.background,
            self.text_color,
            self.text.replace('\n', " ")
        )
    }
}

/// Converts a ranked list into swatches, preserving order.
pub fn present(entries: &[RankedEntry]) -> Vec<PresentationRecord> {
    entries.iter().map(PresentationRecord::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::histogram::FrequencyMap;
    use crate::core_modules::ranking::{TOP_K, rank_colors};

    #[test]
    fn white_gets_black_label_and_black_gets_white() {
        assert_eq!(LabelColor::for_background(Pixel::WHITE), LabelColor::Black);
        assert_eq!(LabelColor::for_background(Pixel::BLACK), LabelColor::White);
        assert_eq!(
            LabelColor::for_background(Pixel::rgb(200, 255, 255)),
            LabelColor::White
        );
        assert_eq!(LabelColor::Black.to_pixel(), Pixel::BLACK);
    }

    #[test]
    fn record_text_lists_percentage_and_true_channels() {
        let map: FrequencyMap = std::iter::repeat_n(Pixel::rgb(12, 34, 56), 3)
            .chain(std::iter::once(Pixel::rgb(250, 240, 230)))
            .collect();
        let ranked = rank_colors(&map, 4, TOP_K).unwrap();
        let records = present(&ranked);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text, "75.00%\nR:12 G:34 B:56");
        assert_eq!(records[0].background, Pixel::rgb(12, 34, 56));
        assert_eq!(records[0].text_color, LabelColor::White);
        assert_eq!(records[1].text, "25.00%\nR:250 G:240 B:230");
        assert_eq!(records[1].text_color, LabelColor::Black);
    }

    #[test]
    fn display_is_single_line() {
        let map: FrequencyMap = std::iter::once(Pixel::rgb(255, 0, 0)).collect();
        let ranked = rank_colors(&map, 1, TOP_K).unwrap();
        let line = present(&ranked)[0].to_string();
        assert_eq!(line, "[#FFFF0000 on White] 100.00% R:255 G:0 B:0");
    }
}
