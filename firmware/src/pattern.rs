//! The framebuffer asset: a static buffer painted with a test card.
//!
//! The scan-out treats this as an opaque, externally supplied pixel
//! source; it is filled once on core 0 before the pipeline starts and
//! never written again.

use core::cell::UnsafeCell;

use crate::dvi::{PixelSource, Rgb332, Rgb565};
use scanout::{PixelFormat, ScanoutConfig};

/// Backing store: 640x480 at one byte per pixel, or 640x240 at two -
/// 300 KiB either way.
const FRAMEBUF_BYTES: usize = 640 * 480;

/// Holds the pixel rows the scan-out streams to the screen.
#[repr(C, align(4))]
pub struct FrameBuffer {
    contents: UnsafeCell<[u8; FRAMEBUF_BYTES]>,
}

impl FrameBuffer {
    const fn new() -> FrameBuffer {
        FrameBuffer {
            contents: UnsafeCell::new([0u8; FRAMEBUF_BYTES]),
        }
    }

    fn get_ptr(&self) -> *mut u8 {
        self.contents.get() as *mut u8
    }
}

unsafe impl Sync for FrameBuffer {}

static FRAMEBUF: FrameBuffer = FrameBuffer::new();

/// The classic eight colour bars, left to right.
const BARS: [(u8, u8, u8); 8] = [
    (0xff, 0xff, 0xff),
    (0xff, 0xff, 0x00),
    (0x00, 0xff, 0xff),
    (0x00, 0xff, 0x00),
    (0xff, 0x00, 0xff),
    (0xff, 0x00, 0x00),
    (0x00, 0x00, 0xff),
    (0x00, 0x00, 0x00),
];

/// Paint colour bars into the framebuffer and describe it as a pixel
/// source for the scan-out.
pub fn test_card(config: &ScanoutConfig) -> PixelSource {
    let width = config.timing.h.active as usize;
    let rows = config.source_lines as usize;
    let bar_width = width / BARS.len();

    match config.format {
        PixelFormat::Rgb332 => {
            let ptr = FRAMEBUF.get_ptr();
            for y in 0..rows {
                for x in 0..width {
                    let (r, g, b) = BARS[(x / bar_width).min(BARS.len() - 1)];
                    let pixel = Rgb332::from_24bit(r, g, b);
                    unsafe {
                        ptr.add(y * width + x).write(pixel.0);
                    }
                }
            }
        }
        PixelFormat::Rgb565 => {
            let ptr = FRAMEBUF.get_ptr() as *mut u16;
            for y in 0..rows {
                for x in 0..width {
                    let (r, g, b) = BARS[(x / bar_width).min(BARS.len() - 1)];
                    let pixel = Rgb565::from_24bit(r, g, b);
                    unsafe {
                        ptr.add(y * width + x).write(pixel.0);
                    }
                }
            }
        }
    }

    // The byte-packed card behaves like a flash-resident asset and is
    // staged through the RAM line buffer; the wide format streams in
    // place.
    let stage_rows = matches!(config.format, PixelFormat::Rgb332);
    PixelSource::new(
        FRAMEBUF.get_ptr() as *const u32,
        config.words_per_row(),
        stage_rows,
    )
}

// End of file
