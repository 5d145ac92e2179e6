//! Display page rotation.
//!
//! ```text
//!  StartupBanner ──▶ Identification ──▶ Data[i] ──▶ Data[j] ──▶ … ──┐
//!                        ▲    │  (recomputes enabled mask)           │
//!                        │    │                                      │
//!                        └────┼──────────── wrap ◀──────────────────┘
//!                             │
//!                             └─ no enabled page after 2 wraps ──▶ NoPagesEnabled (sticky)
//! ```
//!
//! Each display tick renders the current page and then advances.  Data
//! pages whose quantity no fitted sensor provides are skipped.  The
//! enabled mask is recomputed only when the identification page is shown.
//!
//! Every 128 renders the polarity flips so OLED pixels age evenly.

use core::fmt::{self, Write};

use heapless::String;
use log::{debug, info, warn};

use crate::app::ports::SensorConfig;
use crate::measurement::Quantity;
use crate::snapshot::Snapshot;

/// Text shown instead of a number when a reading is absent.
pub const VALUE_PLACEHOLDER: &str = "-.--";

/// Renders between polarity flips.
pub const INVERT_PERIOD: u32 = 128;

/// Wraps through all data slots without a hit before giving up.
const MAX_EMPTY_WRAPS: u8 = 2;

// ═══════════════════════════════════════════════════════════════
//  Pages
// ═══════════════════════════════════════════════════════════════

/// Sensor data pages, in rotation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataPage {
    Temperature = 0,
    Humidity = 1,
    Pressure = 2,
    Co2 = 3,
    Pm010 = 4,
    Pm025 = 5,
    Pm040 = 6,
    Pm100 = 7,
}

impl DataPage {
    pub const COUNT: usize = 8;

    pub const ALL: [DataPage; Self::COUNT] = [
        Self::Temperature,
        Self::Humidity,
        Self::Pressure,
        Self::Co2,
        Self::Pm010,
        Self::Pm025,
        Self::Pm040,
        Self::Pm100,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn mask(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn quantity(self) -> Quantity {
        match self {
            Self::Temperature => Quantity::Temperature,
            Self::Humidity => Quantity::Humidity,
            Self::Pressure => Quantity::Pressure,
            Self::Co2 => Quantity::Co2,
            Self::Pm010 => Quantity::Pm010,
            Self::Pm025 => Quantity::Pm025,
            Self::Pm040 => Quantity::Pm040,
            Self::Pm100 => Quantity::Pm100,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Temperature => "Temperature",
            Self::Humidity => "Humidity",
            Self::Pressure => "Pressure",
            Self::Co2 => "CO2",
            Self::Pm010 => "PM 1.0",
            Self::Pm025 => "PM 2.5",
            Self::Pm040 => "PM 4.0",
            Self::Pm100 => "PM 10",
        }
    }

    /// Decimal places shown for this page's value.
    const fn precision(self) -> usize {
        match self {
            Self::Co2 => 0,
            _ => 1,
        }
    }
}

/// What the display currently shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Shown once after boot.
    StartupBanner,
    /// Build and network identity; refreshes the enabled mask.
    Identification,
    Data(DataPage),
    /// Informational: nothing to rotate through.
    NoPagesEnabled,
}

/// Identity shown on the banner and identification pages.
#[derive(Debug, Clone)]
pub struct Identity {
    pub hostname: String<24>,
    pub version: &'static str,
}

/// Fully derived text for one render.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub page: Page,
    pub title: String<24>,
    pub value: String<24>,
    pub unit: &'static str,
    pub inverted: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Rotation state machine
// ═══════════════════════════════════════════════════════════════

pub struct DisplayRotation {
    current: Page,
    /// Bit `i` set = `DataPage::ALL[i]` is shown.
    enabled_mask: u8,
    inverted: bool,
    renders: u32,
    /// Full passes over the data slots that found nothing enabled.
    empty_wraps: u8,
}

impl DisplayRotation {
    pub fn new() -> Self {
        Self {
            current: Page::StartupBanner,
            enabled_mask: 0,
            inverted: false,
            renders: 0,
            empty_wraps: 0,
        }
    }

    /// Page that the next [`step`](Self::step) renders.
    pub fn current(&self) -> Page {
        self.current
    }

    pub fn enabled_mask(&self) -> u8 {
        self.enabled_mask
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub fn empty_wraps(&self) -> u8 {
        self.empty_wraps
    }

    /// Build the view for the current page, then advance to the next one.
    pub fn step(
        &mut self,
        snapshot: &Snapshot,
        sensors: &impl SensorConfig,
        identity: &Identity,
    ) -> PageView {
        if self.current == Page::Identification {
            self.refresh_mask(sensors);
        }

        self.renders = self.renders.wrapping_add(1);
        if self.renders % INVERT_PERIOD == 0 {
            self.inverted = !self.inverted;
        }

        let view = self.view(snapshot, identity);
        self.current = self.next_page();
        view
    }

    /// Leave the sticky error page and start over at identification.
    pub fn return_to_identification(&mut self) {
        info!("display: returning to identification page");
        self.current = Page::Identification;
        self.empty_wraps = 0;
    }

    // ── Internal ──────────────────────────────────────────────

    fn refresh_mask(&mut self, sensors: &impl SensorConfig) {
        self.enabled_mask = DataPage::ALL
            .iter()
            .filter(|p| sensors.quantity_available(p.quantity()))
            .fold(0, |mask, p| mask | p.mask());
    }

    fn is_enabled(&self, idx: usize) -> bool {
        self.enabled_mask & (1 << idx) != 0
    }

    fn next_page(&mut self) -> Page {
        match self.current {
            Page::StartupBanner => Page::Identification,
            Page::Identification => self.first_enabled_page(),
            Page::Data(page) => (page.index() + 1..DataPage::COUNT)
                .find(|&i| self.is_enabled(i))
                .map_or(Page::Identification, |i| Page::Data(DataPage::ALL[i])),
            Page::NoPagesEnabled => Page::NoPagesEnabled,
        }
    }

    /// Scan the data slots from the start, wrapping at most
    /// [`MAX_EMPTY_WRAPS`] times.
    fn first_enabled_page(&mut self) -> Page {
        let mut idx = 0;
        self.empty_wraps = 0;
        loop {
            if idx >= DataPage::COUNT {
                self.empty_wraps += 1;
                if self.empty_wraps >= MAX_EMPTY_WRAPS {
                    warn!("display: no pages enabled");
                    return Page::NoPagesEnabled;
                }
                idx = 0;
            }
            if self.is_enabled(idx) {
                return Page::Data(DataPage::ALL[idx]);
            }
            idx += 1;
        }
    }

    fn view(&self, snapshot: &Snapshot, identity: &Identity) -> PageView {
        let mut unit = "";
        let (title, value) = match self.current {
            Page::StartupBanner => (
                clipped(format_args!("EnvStation")),
                clipped(format_args!("v{}", identity.version)),
            ),
            Page::Identification => (
                clipped(format_args!("{}", identity.hostname)),
                clipped(format_args!("v{}", identity.version)),
            ),
            Page::Data(page) => {
                unit = page.quantity().unit();
                let value = match snapshot.get(page.quantity()) {
                    Some(v) => clipped(format_args!("{:.*}", page.precision(), v)),
                    None => clipped(format_args!("{VALUE_PLACEHOLDER}")),
                };
                (clipped(format_args!("{}", page.title())), value)
            }
            Page::NoPagesEnabled => (
                clipped(format_args!("No pages")),
                clipped(format_args!("enabled")),
            ),
        };

        PageView {
            page: self.current,
            title,
            value,
            unit,
            inverted: self.inverted,
        }
    }
}

/// Fixed-capacity writer that keeps whole characters up to capacity and
/// drops the rest.
struct Clip<'a, const N: usize> {
    buf: &'a mut String<N>,
    clipped: bool,
}

impl<const N: usize> Write for Clip<'_, N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.clipped || self.buf.push(c).is_err() {
                self.clipped = true;
                break;
            }
        }
        Ok(())
    }
}

/// Render `args` into at most `N` bytes, cutting at a character boundary.
fn clipped<const N: usize>(args: fmt::Arguments<'_>) -> String<N> {
    let mut buf = String::new();
    let mut w = Clip {
        buf: &mut buf,
        clipped: false,
    };
    if w.write_fmt(args).is_err() || w.clipped {
        debug!("display: text clipped to {} bytes", N);
    }
    buf
}

impl Default for DisplayRotation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SensorEnables, SystemConfig};
    use crate::measurement::SensorId;

    fn identity() -> Identity {
        Identity {
            hostname: String::try_from("station-1").unwrap(),
            version: "0.3.0",
        }
    }

    fn config_with(sensors: &[SensorId]) -> SystemConfig {
        let mut c = SystemConfig {
            sensors: SensorEnables::NONE,
            ..Default::default()
        };
        for s in sensors {
            c.sensors.set(*s, true);
        }
        c
    }

    #[test]
    fn boot_sequence_starts_with_banner_then_identification() {
        let mut d = DisplayRotation::new();
        let cfg = config_with(&[SensorId::Sht4x]);
        let snap = Snapshot::empty();

        let v = d.step(&snap, &cfg, &identity());
        assert_eq!(v.page, Page::StartupBanner);
        let v = d.step(&snap, &cfg, &identity());
        assert_eq!(v.page, Page::Identification);
        assert_eq!(v.title.as_str(), "station-1");
        assert_eq!(v.value.as_str(), "v0.3.0");
    }

    #[test]
    fn mask_is_computed_on_identification_only() {
        let mut d = DisplayRotation::new();
        let mut cfg = config_with(&[SensorId::Lps35hw]);
        let snap = Snapshot::empty();

        d.step(&snap, &cfg, &identity()); // banner
        assert_eq!(d.enabled_mask(), 0);
        d.step(&snap, &cfg, &identity()); // identification
        assert_eq!(d.enabled_mask(), DataPage::Pressure.mask());

        // Reconfiguring mid-rotation has no effect until identification.
        cfg.sensors.set(SensorId::Sen50, true);
        assert_eq!(d.current(), Page::Data(DataPage::Pressure));
        d.step(&snap, &cfg, &identity());
        assert_eq!(d.enabled_mask(), DataPage::Pressure.mask());
        assert_eq!(d.current(), Page::Identification);
        d.step(&snap, &cfg, &identity());
        assert_eq!(d.enabled_mask().count_ones(), 5);
    }

    #[test]
    fn missing_value_renders_placeholder() {
        let mut d = DisplayRotation::new();
        let cfg = config_with(&[SensorId::Lps35hw]);
        let snap = Snapshot::empty();
        d.step(&snap, &cfg, &identity());
        d.step(&snap, &cfg, &identity());
        let v = d.step(&snap, &cfg, &identity());
        assert_eq!(v.page, Page::Data(DataPage::Pressure));
        assert_eq!(v.value.as_str(), VALUE_PLACEHOLDER);
        assert_eq!(v.unit, "hPa");
    }

    #[test]
    fn values_are_formatted_per_page() {
        let mut d = DisplayRotation::new();
        let cfg = config_with(&[SensorId::Scd41]);
        let mut snap = Snapshot::empty();
        snap.set(Quantity::Temperature, 21.46);
        snap.set(Quantity::Co2, 655.0);

        d.step(&snap, &cfg, &identity());
        d.step(&snap, &cfg, &identity());
        let t = d.step(&snap, &cfg, &identity());
        assert_eq!(t.page, Page::Data(DataPage::Temperature));
        assert_eq!(t.value.as_str(), "21.5");
        let h = d.step(&snap, &cfg, &identity());
        assert_eq!(h.page, Page::Data(DataPage::Humidity));
        assert_eq!(h.value.as_str(), VALUE_PLACEHOLDER);
        let c = d.step(&snap, &cfg, &identity());
        assert_eq!(c.page, Page::Data(DataPage::Co2));
        assert_eq!(c.value.as_str(), "655");
    }

    #[test]
    fn polarity_flips_every_period() {
        let mut d = DisplayRotation::new();
        let cfg = config_with(&[SensorId::Sht4x]);
        let snap = Snapshot::empty();
        for _ in 0..INVERT_PERIOD - 1 {
            assert!(!d.step(&snap, &cfg, &identity()).inverted);
        }
        assert!(d.step(&snap, &cfg, &identity()).inverted);
        for _ in 0..INVERT_PERIOD - 1 {
            assert!(d.is_inverted());
            d.step(&snap, &cfg, &identity());
        }
        assert!(!d.step(&snap, &cfg, &identity()).inverted);
    }

    #[test]
    fn no_pages_is_sticky_until_manual_return() {
        let mut d = DisplayRotation::new();
        let mut cfg = config_with(&[]);
        let snap = Snapshot::empty();

        d.step(&snap, &cfg, &identity()); // banner
        d.step(&snap, &cfg, &identity()); // identification
        assert_eq!(d.current(), Page::NoPagesEnabled);
        assert_eq!(d.empty_wraps(), 2);

        cfg.sensors.set(SensorId::Sht4x, true);
        for _ in 0..10 {
            let v = d.step(&snap, &cfg, &identity());
            assert_eq!(v.page, Page::NoPagesEnabled);
        }

        d.return_to_identification();
        d.step(&snap, &cfg, &identity());
        assert_eq!(d.current(), Page::Data(DataPage::Temperature));
    }

    /// Exposes exactly the temperature and pressure pages.
    struct TempAndPressure;

    impl SensorConfig for TempAndPressure {
        fn sensor_enabled(&self, _sensor: SensorId) -> bool {
            true
        }

        fn quantity_available(&self, quantity: Quantity) -> bool {
            matches!(quantity, Quantity::Temperature | Quantity::Pressure)
        }
    }

    #[test]
    fn rotation_cycles_only_enabled_pages() {
        let mut d = DisplayRotation::new();
        let snap = Snapshot::empty();

        let pages: std::vec::Vec<Page> = (0..11)
            .map(|_| d.step(&snap, &TempAndPressure, &identity()).page)
            .collect();
        assert_eq!(
            pages,
            [
                Page::StartupBanner,
                Page::Identification,
                Page::Data(DataPage::Temperature),
                Page::Data(DataPage::Pressure),
                Page::Identification,
                Page::Data(DataPage::Temperature),
                Page::Data(DataPage::Pressure),
                Page::Identification,
                Page::Data(DataPage::Temperature),
                Page::Data(DataPage::Pressure),
                Page::Identification,
            ]
        );
    }

    #[test]
    fn long_identity_is_clipped_at_a_char_boundary() {
        let mut d = DisplayRotation::new();
        let cfg = config_with(&[SensorId::Sht4x]);
        let snap = Snapshot::empty();
        let id = Identity {
            hostname: String::try_from("weatherstation-balkon-01").unwrap(),
            version: "0.3.0-rc.12+g1a2b3c4d5\u{e9}x",
        };

        let banner = d.step(&snap, &cfg, &id);
        // The two-byte character would end at byte 25.
        assert_eq!(banner.value.as_str(), "v0.3.0-rc.12+g1a2b3c4d5");

        let ident = d.step(&snap, &cfg, &id);
        assert_eq!(ident.title.as_str(), "weatherstation-balkon-01");
    }
}
