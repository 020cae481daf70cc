//! Clock, pin and core-1 bring-up.

use fugit::RateExtU32;
use rp235x_hal::{
    clocks,
    gpio::{bank0, FunctionHstx, FunctionSioOutput, Pin, Pins, PullNone},
    multicore, pac, pll, xosc, Clock as _, Sio,
};

use crate::dvi;
use crate::dvi::PixelSource;
use scanout::ScanoutConfig;

/// On-board crystal frequency, in Hz.
const XOSC_CRYSTAL_FREQ: u32 = 12_000_000;

/// The eight HSTX-capable GPIOs, in Pico DVI Sock order.
///
/// Each differential pair drives one TMDS lane (or the TMDS clock); the
/// serializer produces the inverted leg, so these are plain digital
/// outputs from the GPIO matrix's point of view.
pub struct DviPins {
    /// TMDS lane D0, positive leg
    _d0_pos: Pin<bank0::Gpio12, FunctionHstx, PullNone>,
    /// TMDS lane D0, negative leg
    _d0_neg: Pin<bank0::Gpio13, FunctionHstx, PullNone>,
    /// TMDS clock, positive leg
    _clk_pos: Pin<bank0::Gpio14, FunctionHstx, PullNone>,
    /// TMDS clock, negative leg
    _clk_neg: Pin<bank0::Gpio15, FunctionHstx, PullNone>,
    /// TMDS lane D2, positive leg
    _d2_pos: Pin<bank0::Gpio16, FunctionHstx, PullNone>,
    /// TMDS lane D2, negative leg
    _d2_neg: Pin<bank0::Gpio17, FunctionHstx, PullNone>,
    /// TMDS lane D1, positive leg
    _d1_pos: Pin<bank0::Gpio18, FunctionHstx, PullNone>,
    /// TMDS lane D1, negative leg
    _d1_neg: Pin<bank0::Gpio19, FunctionHstx, PullNone>,
}

pub struct Hardware {
    /// Our pins for DVI video output
    ///
    /// These are driven by the HSTX serializer, which core 1 feeds. We
    /// just hand them over to that peripheral and keep hold of the
    /// tokens.
    pub _dvi_pins: DviPins,
    /// Our blinky LED
    pub led: Pin<bank0::Gpio25, FunctionSioOutput, PullNone>,
    /// System clock rate, for delay loops
    pub system_clock_hz: u32,
}

/// Call this once on start-up to initialise the hardware.
///
/// Brings the clocks up for an exact 480p bit rate, routes the HSTX pins,
/// hands the scan-out peripherals to [`dvi::init`] and starts core 1 on
/// the pipeline. When this returns, video is running.
pub fn init(mut periph: pac::Peripherals, config: ScanoutConfig, source: PixelSource) -> Hardware {
    defmt::info!("Configuring clocks...");

    // Run at 126 MHz SYS_PLL. The HSTX clock follows clk_sys and the
    // serializer shifts two TMDS bits per HSTX clock, which gives an
    // output of exactly 252 Mbps, the bit clock for 480p 60Hz - i.e. a
    // 25.2 MHz pixel clock against the 25.175 MHz spec.

    // Step 1. Turn on the crystal.
    let xosc = xosc::setup_xosc_blocking(periph.XOSC, XOSC_CRYSTAL_FREQ.Hz())
        .map_err(|_x| false)
        .unwrap();
    // Step 2. Create a clocks manager.
    let mut clocks = clocks::ClocksManager::new(periph.CLOCKS);
    // Step 3. Set up the system PLL.
    //
    // We take the Crystal Oscillator (=12 MHz) with no divider, and x126
    // to give a FOUTVCO of 1512 MHz. This must be in the range 750 MHz -
    // 1600 MHz, and running the VCO high keeps jitter down.
    //
    // Next we /6 on the first post divider to give 252 MHz.
    //
    // Finally we /2 on the second post divider to give 126 MHz.
    let pll_sys = pll::setup_pll_blocking(
        periph.PLL_SYS,
        xosc.operating_frequency(),
        pll::PLLConfig {
            vco_freq: 1512.MHz(),
            refdiv: 1,
            post_div1: 6,
            post_div2: 2,
        },
        &mut clocks,
        &mut periph.RESETS,
    )
    .map_err(|_x| false)
    .unwrap();
    // Step 4. Set up a 48 MHz PLL for the USB system.
    let pll_usb = pll::setup_pll_blocking(
        periph.PLL_USB,
        xosc.operating_frequency(),
        pll::common_configs::PLL_USB_48MHZ,
        &mut clocks,
        &mut periph.RESETS,
    )
    .map_err(|_x| false)
    .unwrap();
    // Step 5. Set the system to run from the PLLs we just configured.
    clocks
        .init_default(&xosc, &pll_sys, &pll_usb)
        .map_err(|_x| false)
        .unwrap();

    // Step 6. Feed clk_hstx from clk_sys, undivided. The serializer's
    // whole timing budget assumes these two run in lockstep.
    let clocks_regs = unsafe { &*pac::CLOCKS::ptr() };
    clocks_regs.clk_hstx_div().write(|w| unsafe { w.int().bits(1) });
    clocks_regs.clk_hstx_ctrl().write(|w| {
        w.auxsrc().clk_sys();
        w.enable().set_bit();
        w
    });

    defmt::info!("Clocks OK!");

    defmt::info!("Configuring pins...");

    let mut sio = Sio::new(periph.SIO);
    let hal_pins = Pins::new(
        periph.IO_BANK0,
        periph.PADS_BANK0,
        sio.gpio_bank0,
        &mut periph.RESETS,
    );

    let dvi_pins = DviPins {
        _d0_pos: hal_pins.gpio12.reconfigure(),
        _d0_neg: hal_pins.gpio13.reconfigure(),
        _clk_pos: hal_pins.gpio14.reconfigure(),
        _clk_neg: hal_pins.gpio15.reconfigure(),
        _d2_pos: hal_pins.gpio16.reconfigure(),
        _d2_neg: hal_pins.gpio17.reconfigure(),
        _d1_pos: hal_pins.gpio18.reconfigure(),
        _d1_neg: hal_pins.gpio19.reconfigure(),
    };

    // The scan-out DMA must always win bus arbitration; losing a beat to
    // core 0 during the active region shows up on screen.
    periph
        .BUSCTRL
        .bus_priority()
        .write(|w| w.dma_r().set_bit().dma_w().set_bit());

    defmt::info!("Setting up scan-out...");
    dvi::init(
        &mut periph.RESETS,
        periph.DMA,
        periph.HSTX_CTRL,
        periph.HSTX_FIFO,
        config,
        source,
    );

    defmt::info!("Setting up Core 1...");
    start_core1(&mut periph.PSM, &mut periph.PPB, &mut sio.fifo);

    defmt::info!("HW init complete");

    Hardware {
        _dvi_pins: dvi_pins,
        led: hal_pins.gpio25.reconfigure(),
        system_clock_hz: clocks.system_clock.freq().to_Hz(),
    }
}

/// Start the scan-out pipeline on Core 1.
///
/// Core 1 unmasks the DMA completion interrupt for itself, triggers the
/// first transfer and then sleeps forever; everything after that happens
/// in interrupt context.
fn start_core1(psm: &mut pac::PSM, ppb: &mut pac::PPB, fifo: &mut rp235x_hal::sio::SioFifo) {
    static CORE1_STACK: multicore::Stack<4096> = multicore::Stack::new();

    let mut multicore = multicore::Multicore::new(psm, ppb, fifo);
    let core1 = &mut multicore.cores()[1];
    defmt::info!("Spawning Core 1...");
    core1
        .spawn(CORE1_STACK.take().unwrap(), move || dvi::core1_main())
        .expect("Spawning Core 1");
}

// End of file
