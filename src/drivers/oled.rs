//! SSD1306 128×64 OLED over I²C.
//!
//! ## Layers
//!
//! - [`Framebuffer`]: 1 KiB page-ordered buffer implementing the
//!   `embedded-graphics` `DrawTarget`, so text is rasterised with the
//!   stock mono fonts.
//! - [`draw_screen`]: renders a domain [`Screen`] into any binary
//!   `DrawTarget`.  Size 1 text uses 6×10 glyphs, size 2 uses 10×20.
//! - [`Ssd1306`]: command/data framing over any `embedded-hal` I²C bus.
//! - [`OledDisplay`]: the [`DisplayPort`] adapter tying the three together.

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_10X20};
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::app::ports::DisplayPort;
use crate::error::{ActuatorError, Error};
use crate::screen::Screen;

pub const WIDTH: u32 = 128;
pub const HEIGHT: u32 = 64;
const BUFFER_LEN: usize = (WIDTH * HEIGHT / 8) as usize;

// ── Framebuffer ───────────────────────────────────────────────

/// Byte `x + (y / 8) * WIDTH`, bit `y % 8`: the controller's page layout,
/// so the buffer can be streamed out unchanged.
pub struct Framebuffer {
    buf: [u8; BUFFER_LEN],
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self { buf: [0; BUFFER_LEN] }
    }

    pub fn clear_all(&mut self) {
        self.buf.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> bool {
        if x >= WIDTH || y >= HEIGHT {
            return false;
        }
        self.buf[(x + (y / 8) * WIDTH) as usize] & (1 << (y % 8)) != 0
    }

    pub fn lit_pixels(&self) -> u32 {
        self.buf.iter().map(|b| b.count_ones()).sum()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        Size::new(WIDTH, HEIGHT)
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(p.x), u32::try_from(p.y)) else {
                continue;
            };
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let idx = (x + (y / 8) * WIDTH) as usize;
            let bit = 1u8 << (y % 8);
            match color {
                BinaryColor::On => self.buf[idx] |= bit,
                BinaryColor::Off => self.buf[idx] &= !bit,
            }
        }
        Ok(())
    }
}

// ── Screen rendering ──────────────────────────────────────────

pub fn draw_screen<D>(screen: &Screen, target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let small = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
    let large = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
    for line in screen.lines() {
        let style = if line.size >= 2 { large } else { small };
        let origin = Point::new(i32::from(line.column), i32::from(line.row));
        Text::with_baseline(line.text.as_str(), origin, style, Baseline::Top).draw(target)?;
    }
    Ok(())
}

// ── SSD1306 controller ────────────────────────────────────────

const CONTROL_COMMAND: u8 = 0x00;
const CONTROL_DATA: u8 = 0x40;
const DATA_CHUNK: usize = 32;

const INIT_SEQUENCE: [u8; 25] = [
    0xAE, // display off
    0xD5, 0x80, // clock divide
    0xA8, 0x3F, // multiplex 64
    0xD3, 0x00, // display offset
    0x40, // start line 0
    0x8D, 0x14, // charge pump on
    0x20, 0x00, // horizontal addressing
    0xA1, // segment remap
    0xC8, // COM scan descending
    0xDA, 0x12, // COM pins
    0x81, 0xCF, // contrast
    0xD9, 0xF1, // pre-charge
    0xDB, 0x40, // VCOMH deselect
    0xA4, // resume from RAM
    0xA6, // normal (not inverted)
    0xAF, // display on
];

pub struct Ssd1306<I> {
    i2c: I,
    addr: u8,
}

impl<I: I2c> Ssd1306<I> {
    pub fn new(i2c: I, addr: u8) -> Self {
        Self { i2c, addr }
    }

    fn commands(&mut self, cmds: &[u8]) -> Result<(), ActuatorError> {
        let mut frame = [0u8; INIT_SEQUENCE.len() + 1];
        frame[0] = CONTROL_COMMAND;
        frame[1..=cmds.len()].copy_from_slice(cmds);
        self.i2c
            .write(self.addr, &frame[..=cmds.len()])
            .map_err(|_| ActuatorError::BusWriteFailed)
    }

    pub fn init(&mut self) -> Result<(), ActuatorError> {
        self.commands(&INIT_SEQUENCE)?;
        info!("OLED: SSD1306 initialised at 0x{:02X}", self.addr);
        Ok(())
    }

    pub fn flush(&mut self, fb: &Framebuffer) -> Result<(), ActuatorError> {
        self.commands(&[0x21, 0, (WIDTH - 1) as u8, 0x22, 0, (HEIGHT / 8 - 1) as u8])?;
        let mut frame = [0u8; DATA_CHUNK + 1];
        frame[0] = CONTROL_DATA;
        for chunk in fb.as_bytes().chunks(DATA_CHUNK) {
            frame[1..=chunk.len()].copy_from_slice(chunk);
            self.i2c
                .write(self.addr, &frame[..=chunk.len()])
                .map_err(|_| ActuatorError::BusWriteFailed)?;
        }
        Ok(())
    }

    pub fn release(self) -> I {
        self.i2c
    }
}

// ── Display adapter ───────────────────────────────────────────

pub struct OledDisplay<I> {
    panel: Ssd1306<I>,
    fb: Framebuffer,
}

impl<I: I2c> OledDisplay<I> {
    /// Initialise the panel.  Failure here is fatal for the caller.
    pub fn new(i2c: I, addr: u8) -> Result<Self, ActuatorError> {
        let mut panel = Ssd1306::new(i2c, addr);
        panel.init()?;
        let mut display = Self { panel, fb: Framebuffer::new() };
        display.panel.flush(&display.fb)?;
        Ok(display)
    }

    /// Bring the panel up on a freshly created bus.  A bus that could not
    /// be created and a panel that does not answer both come back as one
    /// error, so the caller has a single fatal path.
    pub fn open<E: core::fmt::Debug>(bus: Result<I, E>, addr: u8) -> Result<Self, Error> {
        let i2c = bus.map_err(|e| {
            warn!("OLED: I2C bus init failed: {:?}", e);
            Error::Init("display I2C bus")
        })?;
        Ok(Self::new(i2c, addr)?)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.fb
    }
}

impl<I: I2c> DisplayPort for OledDisplay<I> {
    fn show(&mut self, screen: &Screen) -> Result<(), ActuatorError> {
        self.fb.clear_all();
        let Ok(()) = draw_screen(screen, &mut self.fb);
        self.panel.flush(&self.fb).inspect_err(|e| warn!("OLED: flush failed: {}", e))
    }
}
