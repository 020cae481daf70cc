//! # Scanline scheduling for the RP2350 HSTX DVI scan-out.
//!
//! Everything in this crate is plain arithmetic over a display timing
//! description: the HSTX command words that signal one scanline's worth of
//! sync and blanking, and the frame sequencer that decides, transfer by
//! transfer, what the DMA must carry next. Nothing here touches hardware,
//! so the whole crate builds and tests on the host.
//!
//! The firmware crate owns the registers; it feeds completion events into a
//! [`FrameSequencer`] and turns the returned [`LinePlan`] into a DMA
//! descriptor.

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

#![no_std]

pub mod sequencer;
pub mod table;
pub mod timing;

pub use sequencer::{FrameSequencer, LinePlan};
pub use table::LineTable;
pub use timing::{DviTiming, PixelFormat, ScanoutConfig, SyncPolarity, SyncSpan, VGA_640X480};
