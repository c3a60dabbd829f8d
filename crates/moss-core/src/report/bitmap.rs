use super::document::Element;
use crate::error::Error;
use regex::Regex;
use std::sync::OnceLock;

/// Match colours, indexed by the position the server encodes in bitmap file names.
pub const PALETTE: [&str; 5] = ["#f00", "#0f0", "#00f", "#0ff", "#f0f"];

const BAR_WIDTH_PX: u32 = 60;
const BAR_HEIGHT_PX: u32 = 12;

fn bitmap_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"bitmaps/tm_(\d+)_(\d+)\.gif$").expect("bitmap pattern is valid")
    })
}

/// Proportional bar that stands in for a `bitmaps/tm_<color>_<percentage>.gif` image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimilarityBar {
    color_index: usize,
    percentage: u8,
}

impl SimilarityBar {
    pub fn from_bitmap_src(src: &str) -> Result<Self, Error> {
        let malformed = |reason: &str| {
            Error::MalformedBitmapReference(format!("{}: {}", src, reason))
        };

        let captures = bitmap_pattern()
            .captures(src)
            .ok_or_else(|| malformed("expected bitmaps/tm_<color>_<percentage>.gif"))?;

        let color_index: usize = captures[1]
            .parse()
            .map_err(|_| malformed("color index out of range"))?;
        if color_index >= PALETTE.len() {
            return Err(malformed("color index out of range"));
        }

        let percentage: u8 = captures[2]
            .parse()
            .ok()
            .filter(|pct| *pct <= 100)
            .ok_or_else(|| malformed("percentage out of range"))?;

        Ok(Self {
            color_index,
            percentage,
        })
    }

    pub fn color_index(&self) -> usize {
        self.color_index
    }

    pub fn color(&self) -> &'static str {
        PALETTE[self.color_index]
    }

    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    pub fn style(&self) -> String {
        let color = self.color();
        let pct = self.percentage;
        format!(
            "background-image: linear-gradient(to right, {color} {pct}%,#fff {pct}%); \
             border: 1px solid {color}; width: {BAR_WIDTH_PX}px; height: {BAR_HEIGHT_PX}px;"
        )
    }

    /// Turn an `img` element into the equivalent styled `div`.
    pub fn apply(&self, element: &mut Element) {
        element.set_tag("div");
        for attr in ["src", "alt", "border"] {
            element.remove_attribute(attr);
        }
        element.set_attribute("style", self.style());
    }
}
