//! One-time HSTX serializer configuration.
//!
//! Programs the command expander for the chosen pixel format, the shift
//! schedule, and the TMDS lane to output-bit routing for the Pico DVI Sock
//! pinout. Runs once before the first transfer; the scan-out core never
//! touches these registers again.

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
use scanout::PixelFormat;

/// Which HSTX output bit carries each TMDS lane on the Pico DVI Sock.
///
/// HSTX output bits 0-7 appear on GPIO 12-19. The Sock routes D0 to
/// GPIO 12/13, the clock to GPIO 14/15, D2 to GPIO 16/17 and D1 to
/// GPIO 18/19, so lanes D0/D1/D2 sit on output bits 0, 6 and 4.
const LANE_TO_OUTPUT_BIT: [usize; 3] = [0, 6, 4];

/// HSTX output bit carrying the positive leg of the TMDS clock pair.
const CLOCK_OUTPUT_BIT: usize = 2;

pub fn configure(resets: &mut pac::RESETS, hstx: &pac::HSTX_CTRL, format: PixelFormat) {
    // Bring the HSTX block out of reset.
    resets.reset().modify(|_r, w| w.hstx().clear_bit());
    while resets.reset_done().read().hstx().bit_is_clear() {}

    // Configure the TMDS encoder's colour-channel taps for the pixel
    // format. Lane 2 is red, lane 1 green, lane 0 blue; the rotations
    // line each channel's most significant bits up with the encoder's
    // 8-bit input window.
    match format {
        PixelFormat::Rgb332 => {
            hstx.expand_tmds().write(|w| unsafe {
                w.l2_nbits().bits(2);
                w.l2_rot().bits(0);
                w.l1_nbits().bits(2);
                w.l1_rot().bits(29);
                w.l0_nbits().bits(1);
                w.l0_rot().bits(26);
                w
            });
            // Pixels come in four 8-bit chunks per transfer word.
            hstx.expand_shift().write(|w| unsafe {
                w.enc_n_shifts().bits(4);
                w.enc_shift().bits(8);
                w.raw_n_shifts().bits(1);
                w.raw_shift().bits(0);
                w
            });
        }
        PixelFormat::Rgb565 => {
            hstx.expand_tmds().write(|w| unsafe {
                w.l2_nbits().bits(5);
                w.l2_rot().bits(0);
                w.l1_nbits().bits(6);
                w.l1_rot().bits(29);
                w.l0_nbits().bits(5);
                w.l0_rot().bits(26);
                w
            });
            // Pixels come in two 16-bit chunks per transfer word.
            hstx.expand_shift().write(|w| unsafe {
                w.enc_n_shifts().bits(2);
                w.enc_shift().bits(16);
                w.raw_n_shifts().bits(1);
                w.raw_shift().bits(0);
                w
            });
        }
    }

    // Control symbols (RAW) are consumed as one whole 32-bit word either
    // way, hence the single raw shift of zero above.

    // Serial output: expander pops every 5 clocks, the output shift
    // register advances by 2 bits per clock. Ten TMDS bits per pixel per
    // lane, so one pixel per five HSTX clocks - the pixel clock is
    // clk_hstx / 5.
    hstx.csr().write(|w| unsafe { w.bits(0) });
    hstx.csr().write(|w| unsafe {
        w.expand_en().set_bit();
        w.clkdiv().bits(5);
        w.n_shifts().bits(5);
        w.shift().bits(2);
        w.en().set_bit();
        w
    });

    // Assign the clock pair to two neighbouring pins; the negative leg is
    // the same signal inverted.
    hstx.bit(CLOCK_OUTPUT_BIT).write(|w| w.clk().set_bit());
    hstx.bit(CLOCK_OUTPUT_BIT + 1)
        .write(|w| w.clk().set_bit().inv().set_bit());

    for (lane, &bit) in LANE_TO_OUTPUT_BIT.iter().enumerate() {
        // Even shift-register bits go out during the first half of each
        // clock cycle, odd bits during the second half; the shifter
        // advances by two bits per cycle.
        let sel_p = (lane * 10) as u8;
        let sel_n = (lane * 10 + 1) as u8;
        hstx.bit(bit).write(|w| unsafe {
            w.sel_p().bits(sel_p);
            w.sel_n().bits(sel_n);
            w
        });
        // The two halves of each pair carry identical data, one pin
        // inverted.
        hstx.bit(bit + 1).write(|w| unsafe {
            w.sel_p().bits(sel_p);
            w.sel_n().bits(sel_n);
            w.inv().set_bit();
            w
        });
    }
}

// End of file
