//! Display timing description and scan-out configuration.
//!
//! A [`DviTiming`] value fully describes one video mode: the horizontal and
//! vertical porch/sync/active spans plus the sync polarities. The command
//! tables and the frame sequencer are both generated from it at
//! initialisation, so adding a mode is a matter of writing a new constant,
//! not of recompiling a different set of tables.

// -----------------------------------------------------------------------------
// Licence Statement
// -----------------------------------------------------------------------------
// Copyright (c) The pico-dvi-hstx developers, 2026
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, either version 3 of the License, or (at your option) any later
// version.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.
// -----------------------------------------------------------------------------

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// Describes the polarity of a sync pulse.
///
/// Some pulses are positive (active-high), some are negative (active-low).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SyncPolarity {
    /// An active-high pulse
    Positive,
    /// An active-low pulse
    Negative,
}

impl SyncPolarity {
    /// The pin level during the sync pulse.
    pub const fn asserted_level(self) -> bool {
        match self {
            SyncPolarity::Positive => true,
            SyncPolarity::Negative => false,
        }
    }

    /// The pin level outside the sync pulse.
    pub const fn idle_level(self) -> bool {
        !self.asserted_level()
    }
}

/// One axis of a raster: porches, sync pulse and active span, in pixels for
/// the horizontal axis and in scanlines for the vertical axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SyncSpan {
    /// Blanking before the sync pulse
    pub front_porch: u16,
    /// Length of the sync pulse
    pub sync_width: u16,
    /// Blanking after the sync pulse
    pub back_porch: u16,
    /// The visible span
    pub active: u16,
}

impl SyncSpan {
    /// Porches plus sync pulse; the part of the axis that carries no pixels.
    pub const fn blanking(&self) -> u16 {
        self.front_porch + self.sync_width + self.back_porch
    }

    /// The whole axis.
    pub const fn total(&self) -> u16 {
        self.blanking() + self.active
    }
}

/// Timing for one video mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DviTiming {
    /// Horizontal spans, in pixel clocks
    pub h: SyncSpan,
    /// Vertical spans, in scanlines
    pub v: SyncSpan,
    /// H-Sync polarity
    pub hsync: SyncPolarity,
    /// V-Sync polarity
    pub vsync: SyncPolarity,
}

/// How the framebuffer packs a pixel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PixelFormat {
    /// One byte per pixel: 3-bit red, 3-bit green, 2-bit blue
    Rgb332,
    /// Two bytes per pixel: 5-bit red, 6-bit green, 5-bit blue
    Rgb565,
}

impl PixelFormat {
    pub const fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb332 => 1,
            PixelFormat::Rgb565 => 2,
        }
    }

    /// How many 32-bit transfer words one visible line occupies.
    pub const fn words_per_line(self, active_pixels: u16) -> u32 {
        (active_pixels as u32 * self.bytes_per_pixel()) / 4
    }
}

/// Everything the scan-out needs to know at initialisation time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ScanoutConfig {
    pub timing: DviTiming,
    pub format: PixelFormat,
    /// Height of the pixel source in rows. When this is smaller than the
    /// active region, visible rows wrap back into the source (vertical
    /// duplication).
    pub source_lines: u16,
}

impl ScanoutConfig {
    /// How many 32-bit words a single pixel-row transfer carries.
    pub const fn words_per_row(&self) -> u32 {
        self.format.words_per_line(self.timing.h.active)
    }
}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Industry standard 640x480 @ 60 Hz, both sync pulses active-low.
///
/// 25.2 MHz pixel clock against the 25.175 MHz spec, i.e. 0.1% fast, the
/// same liberty every 25.2 MHz VGA generator takes.
pub const VGA_640X480: DviTiming = DviTiming {
    h: SyncSpan {
        front_porch: 16,
        sync_width: 96,
        back_porch: 48,
        active: 640,
    },
    v: SyncSpan {
        front_porch: 10,
        sync_width: 2,
        back_porch: 33,
        active: 480,
    },
    hsync: SyncPolarity::Negative,
    vsync: SyncPolarity::Negative,
};

/// System clocks per pixel clock.
///
/// The serializer shifts two TMDS bits per HSTX clock and each pixel is ten
/// bits per lane, so the expander consumes one pixel every five clocks. We
/// run `clk_sys` = `clk_hstx`, which makes this the conversion factor
/// between handler cycles and pixel time.
pub const CLOCKS_PER_PIXEL: u32 = 5;

/// Worst-case completion-handler execution, in system clocks.
///
/// Budget: completion acknowledge and ping/pong bookkeeping plus the
/// sequencer decision (~150 clocks), and staging one 160-word RGB332 row
/// through the line buffer (~3 clocks per word once the copy settles into
/// load/store pairs). Rounded up hard.
pub const WORST_CASE_HANDLER_CLOCKS: u32 = 640;

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// The tightest re-arm window any table leaves us, in pixel clocks.
///
/// A blank-line table spans a whole scanline, but the active-line prologue
/// is fully consumed once the expander reaches the visible span: the next
/// descriptor (the pixel row) must be armed within the horizontal blanking
/// alone. The completion handler has to fit inside this window:
///
/// `min_drain_pixels * CLOCKS_PER_PIXEL > WORST_CASE_HANDLER_CLOCKS`
pub const fn min_drain_pixels(timing: &DviTiming) -> u32 {
    timing.h.blanking() as u32
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;

    #[test]
    fn reference_mode_totals() {
        assert_eq!(VGA_640X480.h.total(), 800);
        assert_eq!(VGA_640X480.v.total(), 525);
        assert_eq!(VGA_640X480.v.blanking(), 45);
    }

    #[test]
    fn words_per_line_by_format() {
        assert_eq!(PixelFormat::Rgb332.words_per_line(640), 160);
        assert_eq!(PixelFormat::Rgb565.words_per_line(640), 320);
    }

    #[test]
    fn handler_fits_inside_the_narrowest_drain_window() {
        // The hard real-time contract: the handler (decision plus row
        // staging) must complete before the in-flight table drains.
        let window_clocks = min_drain_pixels(&VGA_640X480) * CLOCKS_PER_PIXEL;
        assert!(
            window_clocks > WORST_CASE_HANDLER_CLOCKS,
            "re-arm window of {} clocks cannot absorb a {}-clock handler",
            window_clocks,
            WORST_CASE_HANDLER_CLOCKS
        );
    }

    #[test]
    fn polarity_levels() {
        assert!(!SyncPolarity::Negative.asserted_level());
        assert!(SyncPolarity::Negative.idle_level());
        assert!(SyncPolarity::Positive.asserted_level());
    }
}
