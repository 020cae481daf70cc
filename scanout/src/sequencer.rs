//! The per-scanline state machine.
//!
//! The DMA completion handler calls [`FrameSequencer::next_transfer`] once
//! per completed transfer and gets told what the freed channel must carry
//! next. The sequencer owns the frame position and the active-line
//! sub-phase; it is deliberately free of hardware so the whole decision
//! surface can be exercised on the host.

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
// Imports
// -----------------------------------------------------------------------------

use crate::timing::ScanoutConfig;

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// What the next DMA transfer must carry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinePlan {
    /// Blank-line table with v-sync asserted
    VsyncOn,
    /// Blank-line table with v-sync idle (front or back porch)
    VsyncOff,
    /// Timing prologue of a visible line, ending in a pixel request
    ActivePrologue,
    /// The pixel words for source row `row`
    ActiveRow {
        /// Row index into the external pixel source, duplication already
        /// applied
        row: u16,
    },
}

/// Tracks where in the frame the scan-out is, one transfer at a time.
///
/// A visible scanline takes two transfers (prologue, then pixels), so the
/// line counter only advances on the pixel half; the `pixels_pending` flag
/// distinguishes the two.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    /// First scanline of the v-sync pulse
    sync_start: u16,
    /// One past the last scanline of the v-sync pulse
    sync_end: u16,
    /// One past the last blanking scanline; visible lines start here
    blanking_end: u16,
    /// Scanlines per frame
    total_lines: u16,
    /// Rows available in the external pixel source
    source_rows: u16,
    /// Current scanline, `0..total_lines`
    line: u16,
    /// A prologue has been posted for the current line and its pixel row
    /// has not
    pixels_pending: bool,
}

impl FrameSequencer {
    pub fn new(config: &ScanoutConfig) -> FrameSequencer {
        let v = &config.timing.v;
        debug_assert!(config.source_lines > 0);
        debug_assert!(config.source_lines <= v.active);
        FrameSequencer {
            sync_start: v.front_porch,
            sync_end: v.front_porch + v.sync_width,
            blanking_end: v.blanking(),
            total_lines: v.total(),
            source_rows: config.source_lines,
            line: 0,
            pixels_pending: false,
        }
    }

    /// The scanline the next transfer belongs to.
    pub fn line(&self) -> u16 {
        self.line
    }

    /// Decide what the just-freed channel must carry, and step the frame
    /// position.
    ///
    /// First match wins: the v-sync band, then either porch, then the two
    /// halves of a visible line. Every line lands in exactly one arm, and
    /// the position wraps modulo the frame, so there is no failure case.
    pub fn next_transfer(&mut self) -> LinePlan {
        debug_assert!(self.line < self.total_lines);
        if self.line >= self.sync_start && self.line < self.sync_end {
            self.advance();
            LinePlan::VsyncOn
        } else if self.line < self.blanking_end {
            self.advance();
            LinePlan::VsyncOff
        } else if !self.pixels_pending {
            self.pixels_pending = true;
            LinePlan::ActivePrologue
        } else {
            let visible = self.line - self.blanking_end;
            let row = self.source_row(visible);
            self.pixels_pending = false;
            self.advance();
            LinePlan::ActiveRow { row }
        }
    }

    fn advance(&mut self) {
        self.line += 1;
        if self.line == self.total_lines {
            self.line = 0;
        }
    }

    /// Map a visible row onto the pixel source.
    ///
    /// With a full-height source this is the identity. A shorter source
    /// repeats vertically: row `r` reads source row `r % source_rows`,
    /// which for a half-height source is exactly "subtract half the active
    /// height" on the lower half.
    fn source_row(&self, visible: u16) -> u16 {
        visible % self.source_rows
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::timing::{PixelFormat, ScanoutConfig, VGA_640X480};

    fn config(source_lines: u16) -> ScanoutConfig {
        ScanoutConfig {
            timing: VGA_640X480,
            format: PixelFormat::Rgb332,
            source_lines,
        }
    }

    /// Transfers in one whole frame: one per blanking line, two per visible
    /// line.
    const TRANSFERS_PER_FRAME: usize = 45 + 480 * 2;

    fn one_frame(seq: &mut FrameSequencer) -> Vec<LinePlan> {
        (0..TRANSFERS_PER_FRAME)
            .map(|_| seq.next_transfer())
            .collect()
    }

    #[test]
    fn frame_emits_categories_in_order() {
        let mut seq = FrameSequencer::new(&config(480));
        let plans = one_frame(&mut seq);

        // Front porch, sync pulse, back porch.
        assert!(plans[0..10].iter().all(|p| *p == LinePlan::VsyncOff));
        assert!(plans[10..12].iter().all(|p| *p == LinePlan::VsyncOn));
        assert!(plans[12..45].iter().all(|p| *p == LinePlan::VsyncOff));

        // Then 480 prologue/pixel pairs.
        for (i, pair) in plans[45..].chunks(2).enumerate() {
            assert_eq!(pair[0], LinePlan::ActivePrologue, "line {i}");
            assert_eq!(pair[1], LinePlan::ActiveRow { row: i as u16 }, "line {i}");
        }

        // And the next frame starts over at the front porch.
        assert_eq!(seq.line(), 0);
        assert_eq!(seq.next_transfer(), LinePlan::VsyncOff);
    }

    #[test]
    fn category_counts_cover_every_band_exactly_once() {
        let mut seq = FrameSequencer::new(&config(480));
        let plans = one_frame(&mut seq);

        let count = |want: fn(&LinePlan) -> bool| plans.iter().filter(|p| want(p)).count();
        assert_eq!(count(|p| *p == LinePlan::VsyncOn), 2);
        assert_eq!(count(|p| *p == LinePlan::VsyncOff), 43);
        assert_eq!(count(|p| *p == LinePlan::ActivePrologue), 480);
        assert_eq!(count(|p| matches!(p, LinePlan::ActiveRow { .. })), 480);
    }

    #[test]
    fn visible_row_recovers_line_minus_blanking() {
        let mut seq = FrameSequencer::new(&config(480));
        for _ in 0..45 {
            seq.next_transfer();
        }
        for line in 45..525u16 {
            assert_eq!(seq.line(), line);
            assert_eq!(seq.next_transfer(), LinePlan::ActivePrologue);
            assert_eq!(
                seq.next_transfer(),
                LinePlan::ActiveRow { row: line - 45 }
            );
        }
    }

    #[test]
    fn first_visible_line_takes_two_transfers_then_advances() {
        let mut seq = FrameSequencer::new(&config(480));
        for _ in 0..45 {
            seq.next_transfer();
        }
        // Line 45: prologue posted, position holds.
        assert_eq!(seq.line(), 45);
        assert_eq!(seq.next_transfer(), LinePlan::ActivePrologue);
        assert_eq!(seq.line(), 45);
        // Same line again: pixel row 0, then the position moves on.
        assert_eq!(seq.next_transfer(), LinePlan::ActiveRow { row: 0 });
        assert_eq!(seq.line(), 46);
    }

    #[test]
    fn half_height_source_duplicates_vertically() {
        let mut seq = FrameSequencer::new(&config(240));
        for _ in 0..45 {
            seq.next_transfer();
        }
        for visible in 0..480u16 {
            seq.next_transfer(); // prologue
            let LinePlan::ActiveRow { row } = seq.next_transfer() else {
                panic!("expected a pixel row for visible line {visible}");
            };
            // Upper half maps straight through, lower half wraps back by
            // half the active height; either way the source is never
            // overrun.
            let expected = if visible < 240 { visible } else { visible - 240 };
            assert_eq!(row, expected);
            assert!(row < 240);
        }
    }

    #[test]
    fn position_wraps_across_frames() {
        let mut seq = FrameSequencer::new(&config(480));
        for frame in 0..3 {
            let plans = one_frame(&mut seq);
            assert_eq!(plans.len(), TRANSFERS_PER_FRAME, "frame {frame}");
            assert_eq!(seq.line(), 0, "frame {frame}");
        }
    }
}
