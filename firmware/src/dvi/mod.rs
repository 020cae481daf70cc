//! # DVI scan-out driver for the RP2350 HSTX.
//!
//! Generates 640x480@60Hz DVI video through the HSTX command expander and
//! TMDS encoder. Two DMA channels feed the HSTX FIFO in a ping/pong
//! arrangement: each is chained to the other, so when one drains its
//! sibling takes over with no gap in the bitstream, and the completion
//! interrupt only has to reload the drained channel before the sibling
//! finishes in turn. What each transfer carries - a blanking table, an
//! active-line prologue, or a row of pixels - is decided by the
//! [`scanout::FrameSequencer`].
//!
//! The serializer shifts two TMDS bits per HSTX clock, so with `clk_sys` =
//! `clk_hstx` = 126 MHz the output runs at exactly 252 Mbps, the 480p bit
//! clock. All of the timing budget maths relies on this assumption!
//!
//! The DMA arrangement follows the `dvi_out_hstx_encoder` example from
//! pico-examples.

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
// Sub-modules
// -----------------------------------------------------------------------------

mod dma;
mod hstx;
mod rgb;

// -----------------------------------------------------------------------------
// Imports
// -----------------------------------------------------------------------------

use core::cell::UnsafeCell;
use core::mem::MaybeUninit;

use rp235x_hal::pac::{self, interrupt};

use dma::{ChannelId, ChannelPair, Descriptor};
use scanout::{FrameSequencer, LinePlan, LineTable, ScanoutConfig};

pub use rgb::{Rgb332, Rgb565};

// -----------------------------------------------------------------------------
// Types
// -----------------------------------------------------------------------------

/// The row-addressable pixel buffer the scan-out reads from.
///
/// The scan-out does not own or mutate this memory; it only computes row
/// addresses into it. The rows must stay valid and stable for as long as
/// the pipeline runs - anything updating them must do so between rows, as
/// a row is read by DMA for a whole scanline after it is armed.
pub struct PixelSource {
    base: *const u32,
    words_per_row: u32,
    stage_rows: bool,
}

impl PixelSource {
    /// `base` must point at `rows * words_per_row` valid 32-bit words,
    /// where `rows` matches the `source_lines` the sequencer was
    /// configured with. With `stage_rows` set, each row is copied into a
    /// RAM line buffer before its transfer is armed, for sources living
    /// in memory the DMA should not stream from directly.
    pub fn new(base: *const u32, words_per_row: u32, stage_rows: bool) -> PixelSource {
        PixelSource {
            base,
            words_per_row,
            stage_rows,
        }
    }

    /// Build the transfer for one source row, staging it if required.
    #[link_section = ".data"]
    fn descriptor_for_row(&self, row: u16) -> Descriptor {
        let words = self.words_per_row;
        let row_start = unsafe { self.base.add(row as usize * words as usize) };
        if self.stage_rows {
            // Nothing is reading the staging buffer at this point: the
            // transfer that last used it completed two completions ago,
            // and the sibling channel in flight right now carries the
            // prologue table.
            let staging = ROW_STAGING.as_mut_ptr();
            unsafe {
                core::ptr::copy_nonoverlapping(row_start, staging, words as usize);
            }
            Descriptor {
                read_addr: staging as u32,
                word_count: words,
            }
        } else {
            Descriptor {
                read_addr: row_start as u32,
                word_count: words,
            }
        }
    }
}

/// One scanline's worth of staged pixel words.
///
/// Sized for the widest row we can transfer (640 pixels of RGB565).
#[repr(C, align(4))]
struct StagingBuffer {
    words: UnsafeCell<[u32; MAX_ROW_WORDS]>,
}

unsafe impl Sync for StagingBuffer {}

impl StagingBuffer {
    const fn new() -> StagingBuffer {
        StagingBuffer {
            words: UnsafeCell::new([0; MAX_ROW_WORDS]),
        }
    }

    fn as_mut_ptr(&self) -> *mut u32 {
        self.words.get() as *mut u32
    }
}

/// The three line tables, generated once from the timing configuration.
struct LineTables {
    /// Blank line with v-sync asserted
    vsync_on: LineTable,
    /// Blank line during the vertical porches
    vsync_off: LineTable,
    /// Sync prologue of a visible line, ending in the pixel request
    active_prologue: LineTable,
}

/// Everything the completion handler owns.
///
/// Built by [`init`] before the interrupt is unmasked; touched only by
/// `DMA_IRQ_0` (on core 1) afterwards. The single-writer rule is what
/// makes the lock-free arrangement sound.
struct Scanout {
    channels: ChannelPair,
    sequencer: FrameSequencer,
    tables: LineTables,
    source: PixelSource,
    /// Which channel the next completion belongs to. Ping finishes first;
    /// then they alternate for as long as the pipeline runs.
    pong: bool,
}

impl Scanout {
    /// Ask the sequencer what comes next and turn it into a transfer.
    #[link_section = ".data"]
    fn next_descriptor(&mut self) -> Descriptor {
        match self.sequencer.next_transfer() {
            LinePlan::VsyncOn => table_descriptor(&self.tables.vsync_on),
            LinePlan::VsyncOff => table_descriptor(&self.tables.vsync_off),
            LinePlan::ActivePrologue => table_descriptor(&self.tables.active_prologue),
            LinePlan::ActiveRow { row } => self.source.descriptor_for_row(row),
        }
    }

    /// Service one completion: acknowledge the drained channel and hand
    /// it the next transfer while its sibling keeps the output fed.
    ///
    /// Must return before the sibling drains; there is no detection and
    /// no recovery if it does not, the frame just tears.
    #[link_section = ".data"]
    fn on_transfer_complete(&mut self) {
        let finished = if self.pong {
            ChannelId::Pong
        } else {
            ChannelId::Ping
        };
        self.pong = !self.pong;

        if !self.channels.acknowledge(finished) {
            // The toggle no longer matches which channel actually
            // completed. Frame position and hardware state now disagree,
            // and a running frame cannot be re-synchronised.
            defmt::panic!("completion for unexpected DMA channel {}", finished);
        }

        let descriptor = self.next_descriptor();
        self.channels.arm(finished, &descriptor);
    }
}

struct ScanoutCell(UnsafeCell<MaybeUninit<Scanout>>);

// Safety: written once by `init` before DMA_IRQ_0 is unmasked; only the
// handler touches it afterwards.
unsafe impl Sync for ScanoutCell {}

// -----------------------------------------------------------------------------
// Static and Const Data
// -----------------------------------------------------------------------------

/// Widest pixel-row transfer: 640 pixels at two bytes each.
const MAX_ROW_WORDS: usize = 320;

static SCANOUT: ScanoutCell = ScanoutCell(UnsafeCell::new(MaybeUninit::uninit()));

static ROW_STAGING: StagingBuffer = StagingBuffer::new();

// -----------------------------------------------------------------------------
// Functions
// -----------------------------------------------------------------------------

/// Set up the whole scan-out pipeline, stopped.
///
/// Configures the serializer for the chosen pixel format, the DMA channel
/// pair, and the line tables, then pre-arms both channels with the first
/// two transfers of the frame. Call once, before [`core1_main`] runs.
pub fn init(
    resets: &mut pac::RESETS,
    dma: pac::DMA,
    hstx_ctrl: pac::HSTX_CTRL,
    hstx_fifo: pac::HSTX_FIFO,
    config: ScanoutConfig,
    source: PixelSource,
) {
    hstx::configure(resets, &hstx_ctrl, config.format);

    let fifo_addr = hstx_fifo.fifo().as_ptr() as u32;
    let channels = ChannelPair::new(dma, resets, fifo_addr);

    let timing = &config.timing;
    let scanout = Scanout {
        channels,
        sequencer: FrameSequencer::new(&config),
        tables: LineTables {
            vsync_on: LineTable::blank_line(timing, true),
            vsync_off: LineTable::blank_line(timing, false),
            active_prologue: LineTable::active_prologue(timing),
        },
        source,
        pong: false,
    };

    // Move the context into its final home before taking any table
    // addresses - the DMA reads the tables from where they land here.
    //
    // Safety: the interrupt that aliases this is not unmasked yet.
    let scanout = unsafe { (*SCANOUT.0.get()).write(scanout) };

    // A ping and a pong are cued up before anything moves, so the first
    // completion re-arms ping with the frame's third transfer while pong
    // is already draining the second.
    let first = scanout.next_descriptor();
    scanout.channels.arm(ChannelId::Ping, &first);
    let second = scanout.next_descriptor();
    scanout.channels.arm(ChannelId::Pong, &second);
}

/// Entry point for core 1: start the pipeline, then sleep forever.
///
/// [`init`] must have completed first. This never returns; from here on
/// the pipeline is entirely interrupt-driven and this core only wakes to
/// service completions.
pub fn core1_main() -> ! {
    // Unmask before the first transfer is triggered so the first
    // completion cannot be missed. The interrupt runs on this core.
    unsafe {
        cortex_m::peripheral::NVIC::unpend(pac::Interrupt::DMA_IRQ_0);
        cortex_m::peripheral::NVIC::unmask(pac::Interrupt::DMA_IRQ_0);
    }

    // Safety: init has completed, and the interrupt cannot fire until the
    // first transfer is started below.
    let scanout = unsafe { &mut *(*SCANOUT.0.get()).as_mut_ptr() };
    scanout.channels.start(ChannelId::Ping);

    loop {
        cortex_m::asm::wfi();
    }
}

#[link_section = ".data"]
fn table_descriptor(table: &LineTable) -> Descriptor {
    Descriptor {
        read_addr: table.as_ptr() as u32,
        word_count: table.len() as u32,
    }
}

/// One transfer has drained; reload that channel.
///
/// Registered as the sole DMA_IRQ_0 handler, never called from user code.
#[link_section = ".data"]
#[interrupt]
fn DMA_IRQ_0() {
    // Safety: `init` ran before this interrupt was unmasked, and this
    // handler is the only code that touches the context afterwards.
    let scanout = unsafe { &mut *(*SCANOUT.0.get()).as_mut_ptr() };
    scanout.on_transfer_complete();
}

// End of file
