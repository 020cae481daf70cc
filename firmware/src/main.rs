//! # pico-dvi-hstx
//!
//! RP2350 firmware that generates 640x480@60Hz DVI video using the HSTX
//! command expander and TMDS encoder, wired for the Pico DVI Sock board.
//!
//! Core 0 brings up the clocks and pins, paints a test card into the
//! framebuffer and starts core 1. Core 1 owns the scan-out pipeline: two
//! DMA channels feed the HSTX FIFO in a ping/pong arrangement, and the
//! completion interrupt re-arms whichever channel just drained. After
//! start-up core 0 only runs a heartbeat.

#![no_std]
#![no_main]

mod dvi;
mod hw;
mod pattern;

use defmt::info;
use defmt_rtt as _;
use embedded_hal::digital::StatefulOutputPin;
use panic_probe as _;
use rp235x_hal as hal;

use scanout::{PixelFormat, ScanoutConfig, VGA_640X480};

/// Tell the Boot ROM about our application
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: hal::block::ImageDef = hal::block::ImageDef::secure_exe();

/// Program metadata for `picotool info`
#[link_section = ".bi_entries"]
#[used]
pub static PICOTOOL_ENTRIES: [hal::binary_info::EntryAddr; 4] = [
    hal::binary_info::rp_program_name!(c"pico-dvi-hstx"),
    hal::binary_info::rp_cargo_version!(),
    hal::binary_info::rp_program_description!(c"640x480 DVI output over HSTX"),
    hal::binary_info::rp_program_build_attribute!(),
];

#[hal::entry]
fn main() -> ! {
    info!(
        "Firmware {} {} starting up",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    let periph = hal::pac::Peripherals::take().unwrap();
    let cm = hal::pac::CorePeripherals::take().unwrap();

    // 640x480 RGB332 from a full-height source. For the wide-colour
    // variant use `Rgb565` with `source_lines: 240`; the half-height
    // source is then repeated onto the lower half of the screen.
    let config = ScanoutConfig {
        timing: VGA_640X480,
        format: PixelFormat::Rgb332,
        source_lines: VGA_640X480.v.active,
    };
    let source = pattern::test_card(&config);

    let mut hw = hw::init(periph, config, source);

    info!("DVI pipeline running on core 1");

    // Core 1 never comes back; all that is left for this core is an
    // unrelated background task, here a heartbeat.
    let mut delay = cortex_m::delay::Delay::new(cm.SYST, hw.system_clock_hz);
    let mut seconds = 0u32;
    loop {
        delay.delay_ms(1000);
        seconds += 1;
        hw.led.toggle().unwrap();
        info!("Core 0 heartbeat: {=u32} s", seconds);
    }
}

// End of file
