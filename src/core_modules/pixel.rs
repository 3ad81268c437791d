// THEORY:
// The `Pixel` module is the most fundamental unit of the analyzer. A `Pixel` is a
// single packed color value: four 8-bit channels folded into one `u32` in ARGB
// order (alpha in the high byte, blue in the low byte). That is the same layout
// most capture stacks hand over, and it makes the value cheap to hash, compare and
// copy, which is exactly what an exact-match histogram needs.
//
// Key principles:
// 1.  **Exact identity**: Two pixels are the same color only if every bit matches.
//     There is no tolerance and no distance metric. A pixel one unit off in a single
//     channel is a different color, and alpha takes part in equality.
// 2.  **Total order**: The packed value gives colors a natural numeric order. The
//     ranking layer uses it as the tie-break when two colors cover the same number
//     of pixels, so results never depend on hash iteration order.
// 3.  **Single-pixel heuristics only**: Anything computed here (channel extraction,
//     the near-white test used for label contrast) looks at one pixel in isolation.

pub mod pixel {
    use std::fmt;

    pub type Byte = u8;
    pub type Channel = Byte;
    pub type Packed = u32;

    /// Number of bytes per pixel in an RGBA8 frame buffer.
    pub const CHANNELS: usize = 4;

    /// Every channel must be strictly above this for a color to count as near-white.
    pub const LABEL_BRIGHTNESS_THRESHOLD: Channel = 200;

    /// A packed ARGB color value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Pixel(Packed);

    impl Pixel {
        pub const BLACK: Pixel = Pixel::rgb(0, 0, 0);
        pub const WHITE: Pixel = Pixel::rgb(255, 255, 255);

        pub const fn new(red: Channel, green: Channel, blue: Channel, alpha: Channel) -> Self {
            Pixel(
                (alpha as Packed) << 24
                    | (red as Packed) << 16
                    | (green as Packed) << 8
                    | blue as Packed,
            )
        }

        /// An opaque color.
        pub const fn rgb(red: Channel, green: Channel, blue: Channel) -> Self {
            Self::new(red, green, blue, 0xFF)
        }

        pub const fn from_packed(argb: Packed) -> Self {
            Pixel(argb)
        }

        pub const fn packed(self) -> Packed {
            self.0
        }

        pub const fn red(self) -> Channel {
            (self.0 >> 16) as Channel
        }

        pub const fn green(self) -> Channel {
            (self.0 >> 8) as Channel
        }

        pub const fn blue(self) -> Channel {
            self.0 as Channel
        }

        pub const fn alpha(self) -> Channel {
            (self.0 >> 24) as Channel
        }

        /// True when red, green and blue all exceed the shared threshold of 200.
        /// Alpha is ignored.
        pub fn is_near_white(self) -> bool {
            self.red() > LABEL_BRIGHTNESS_THRESHOLD
                && self.green() > LABEL_BRIGHTNESS_THRESHOLD
                && self.blue() > LABEL_BRIGHTNESS_THRESHOLD
        }
    }

    /// Reads one RGBA8 pixel.
    impl From<[Byte; CHANNELS]> for Pixel {
        fn from([red, green, blue, alpha]: [Byte; CHANNELS]) -> Self {
            Pixel::new(red, green, blue, alpha)
        }
    }

    impl From<(Channel, Channel, Channel)> for Pixel {
        fn from((red, green, blue): (Channel, Channel, Channel)) -> Self {
            Pixel::rgb(red, green, blue)
        }
    }

    impl From<image::Rgba<u8>> for Pixel {
        fn from(rgba: image::Rgba<u8>) -> Self {
            let [red, green, blue, alpha] = rgba.0;
            Pixel::new(red, green, blue, alpha)
        }
    }

    impl fmt::Display for Pixel {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "#{:08X}", self.0)
        }
    }
}
