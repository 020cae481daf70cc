//! The ping/pong transfer channel pair.
//!
//! Two DMA channels are set up identically: read incrementing from a
//! table or pixel row, write to the HSTX FIFO, paced by the HSTX DREQ,
//! and chained to each other. The chain keeps the output gap-free even if
//! the completion interrupt is serviced late; the interrupt only has to
//! reload the drained channel before the *other* one finishes.

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

use rp235x_hal::pac;

/// The HSTX FIFO's DMA pacing request number.
const DREQ_HSTX: u8 = 52;

/// One of the two scan-out channels.
#[derive(Debug, Copy, Clone, PartialEq, Eq, defmt::Format)]
pub enum ChannelId {
    Ping = 0,
    Pong = 1,
}

impl ChannelId {
    const fn index(self) -> usize {
        self as usize
    }

    const fn sibling(self) -> ChannelId {
        match self {
            ChannelId::Ping => ChannelId::Pong,
            ChannelId::Pong => ChannelId::Ping,
        }
    }

    const fn mask(self) -> u32 {
        1 << self.index()
    }
}

/// One queued transfer: where to read and how many 32-bit words.
pub struct Descriptor {
    pub read_addr: u32,
    pub word_count: u32,
}

/// Owns the DMA block; exposes just the operations the scan-out needs.
pub struct ChannelPair {
    dma: pac::DMA,
}

impl ChannelPair {
    /// Configure both channels, pointed at the HSTX FIFO. Neither starts
    /// until [`ChannelPair::start`].
    pub fn new(dma: pac::DMA, resets: &mut pac::RESETS, fifo_addr: u32) -> ChannelPair {
        // Reset the DMA Peripheral.
        resets.reset().modify(|_r, w| w.dma().set_bit());
        unsafe {
            core::arch::asm!("nop");
        }
        resets.reset().modify(|_r, w| w.dma().clear_bit());
        while resets.reset_done().read().dma().bit_is_clear() {}

        for ch in [ChannelId::Ping, ChannelId::Pong] {
            let regs = dma.ch(ch.index());
            regs.ch_write_addr().write(|w| unsafe { w.bits(fifo_addr) });
            // Control goes through the non-triggering alias; the channel
            // must stay idle until it has a descriptor.
            regs.ch_al1_ctrl().write(|w| {
                w.data_size().size_word();
                w.incr_read().set_bit();
                w.incr_write().clear_bit();
                unsafe { w.treq_sel().bits(DREQ_HSTX) };
                unsafe { w.chain_to().bits(ch.sibling().index() as u8) };
                unsafe { w.ring_size().bits(0) };
                w.irq_quiet().clear_bit();
                w.en().set_bit();
                w
            });
        }

        let both = ChannelId::Ping.mask() | ChannelId::Pong.mask();
        // Clear anything stale, then route both completions to IRQ 0.
        dma.ints0().write(|w| unsafe { w.bits(both) });
        dma.inte0().write(|w| unsafe { w.bits(both) });

        ChannelPair { dma }
    }

    /// Load a new descriptor into `ch`.
    ///
    /// Only legal while `ch` is idle: from the completion handler after
    /// that channel drained, or during start-up before [`ChannelPair::start`].
    /// Writing these registers mid-transfer corrupts the in-flight output,
    /// and nothing here can detect that.
    pub fn arm(&self, ch: ChannelId, descriptor: &Descriptor) {
        let regs = self.dma.ch(ch.index());
        regs.ch_read_addr()
            .write(|w| unsafe { w.bits(descriptor.read_addr) });
        regs.ch_trans_count()
            .write(|w| unsafe { w.bits(descriptor.word_count) });
    }

    /// Begin the very first transfer of the pipeline. Everything after
    /// this is driven by chaining and the completion interrupt.
    pub fn start(&self, ch: ChannelId) {
        self.dma
            .multi_chan_trigger()
            .write(|w| unsafe { w.bits(ch.mask()) });
    }

    /// Clear `ch`'s completion flag. Returns whether it was actually
    /// pending, so the caller can notice its bookkeeping drifting from the
    /// hardware.
    pub fn acknowledge(&self, ch: ChannelId) -> bool {
        let pending = self.dma.ints0().read().bits() & ch.mask() != 0;
        self.dma.ints0().write(|w| unsafe { w.bits(ch.mask()) });
        pending
    }
}

// End of file
