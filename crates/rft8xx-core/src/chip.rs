//! Chip memory maps and register addresses
//!
//! The FT80x and FT81x generations expose the same registers at different
//! addresses. Rather than hard-coding one generation, every component that
//! touches a register takes a [`ChipMap`] at construction. The two tables
//! shipped here cover the chips this crate has been used with.

/// Value read back from the chip ID register on every FT80x/FT81x part
pub const CHIP_ID: u8 = 0x7C;

/// Memory map and register addresses for one chip generation
///
/// All addresses are 22-bit device addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipMap {
    /// Human readable generation name
    pub name: &'static str,
    /// Expected content of `reg_id`
    pub chip_id: u8,

    // Memory regions
    /// General purpose graphics RAM
    pub ram_g: u32,
    /// Display list RAM
    pub ram_dl: u32,
    /// Size of display list RAM in bytes
    pub ram_dl_size: u32,
    /// Command FIFO window
    pub ram_cmd: u32,
    /// Size of the command FIFO in bytes (power of two)
    pub cmd_fifo_size: u32,

    // Identification
    /// Chip ID register (reads [`CHIP_ID`])
    pub reg_id: u32,
    /// Frame counter
    pub reg_frames: u32,
    /// Coprocessor/touch/audio reset control
    pub reg_cpureset: u32,

    // Display timing
    /// Total line length in pixel clocks
    pub reg_hcycle: u32,
    /// Start of active line
    pub reg_hoffset: u32,
    /// Active width
    pub reg_hsize: u32,
    /// Start of horizontal sync pulse
    pub reg_hsync0: u32,
    /// End of horizontal sync pulse
    pub reg_hsync1: u32,
    /// Total lines per frame
    pub reg_vcycle: u32,
    /// Start of active screen
    pub reg_voffset: u32,
    /// Active height
    pub reg_vsize: u32,
    /// Start of vertical sync pulse
    pub reg_vsync0: u32,
    /// End of vertical sync pulse
    pub reg_vsync1: u32,
    /// Display list swap trigger
    pub reg_dlswap: u32,
    /// RGB output pin order
    pub reg_swizzle: u32,
    /// Pixel clock polarity
    pub reg_pclk_pol: u32,
    /// Pixel clock divisor (0 disables the display output)
    pub reg_pclk: u32,

    // GPIO / backlight
    /// GPIO direction
    pub reg_gpio_dir: u32,
    /// GPIO levels (bit 7 drives DISP on most modules)
    pub reg_gpio: u32,
    /// Backlight PWM frequency
    pub reg_pwm_hz: u32,
    /// Backlight PWM duty cycle (0-128)
    pub reg_pwm_duty: u32,

    // Coprocessor
    /// Command FIFO read pointer (owned by the chip)
    pub reg_cmd_read: u32,
    /// Command FIFO write pointer (published by the host)
    pub reg_cmd_write: u32,
    /// Display list offset the coprocessor is writing to
    pub reg_cmd_dl: u32,

    // Touch
    /// First of six consecutive touch transform registers (A..F)
    pub reg_touch_transform_a: u32,
}

/// FT800 / FT801
pub const FT800: ChipMap = ChipMap {
    name: "FT80x",
    chip_id: CHIP_ID,

    ram_g: 0x00_0000,
    ram_dl: 0x10_0000,
    ram_dl_size: 8 * 1024,
    ram_cmd: 0x10_8000,
    cmd_fifo_size: 4 * 1024,

    reg_id: 0x10_2400,
    reg_frames: 0x10_2404,
    reg_cpureset: 0x10_241C,

    reg_hcycle: 0x10_2428,
    reg_hoffset: 0x10_242C,
    reg_hsize: 0x10_2430,
    reg_hsync0: 0x10_2434,
    reg_hsync1: 0x10_2438,
    reg_vcycle: 0x10_243C,
    reg_voffset: 0x10_2440,
    reg_vsize: 0x10_2444,
    reg_vsync0: 0x10_2448,
    reg_vsync1: 0x10_244C,
    reg_dlswap: 0x10_2450,
    reg_swizzle: 0x10_2460,
    reg_pclk_pol: 0x10_2468,
    reg_pclk: 0x10_246C,

    reg_gpio_dir: 0x10_248C,
    reg_gpio: 0x10_2490,
    reg_pwm_hz: 0x10_24C0,
    reg_pwm_duty: 0x10_24C4,

    reg_cmd_read: 0x10_24E4,
    reg_cmd_write: 0x10_24E8,
    reg_cmd_dl: 0x10_24EC,

    reg_touch_transform_a: 0x10_250C,
};

/// FT810 / FT811 / FT812 / FT813
pub const FT81X: ChipMap = ChipMap {
    name: "FT81x",
    chip_id: CHIP_ID,

    ram_g: 0x00_0000,
    ram_dl: 0x30_0000,
    ram_dl_size: 8 * 1024,
    ram_cmd: 0x30_8000,
    cmd_fifo_size: 4 * 1024,

    reg_id: 0x30_2000,
    reg_frames: 0x30_2004,
    reg_cpureset: 0x30_2020,

    reg_hcycle: 0x30_202C,
    reg_hoffset: 0x30_2030,
    reg_hsize: 0x30_2034,
    reg_hsync0: 0x30_2038,
    reg_hsync1: 0x30_203C,
    reg_vcycle: 0x30_2040,
    reg_voffset: 0x30_2044,
    reg_vsize: 0x30_2048,
    reg_vsync0: 0x30_204C,
    reg_vsync1: 0x30_2050,
    reg_dlswap: 0x30_2054,
    reg_swizzle: 0x30_2064,
    reg_pclk_pol: 0x30_206C,
    reg_pclk: 0x30_2070,

    reg_gpio_dir: 0x30_2090,
    reg_gpio: 0x30_2094,
    reg_pwm_hz: 0x30_20D0,
    reg_pwm_duty: 0x30_20D4,

    reg_cmd_read: 0x30_20F8,
    reg_cmd_write: 0x30_20FC,
    reg_cmd_dl: 0x30_2100,

    reg_touch_transform_a: 0x30_2150,
};

impl ChipMap {
    /// Address of touch transform register `index` (0 = A .. 5 = F)
    pub const fn reg_touch_transform(&self, index: u32) -> u32 {
        self.reg_touch_transform_a + index * 4
    }

    /// Look up a chip generation by name (case-insensitive)
    pub fn by_name(name: &str) -> Option<&'static ChipMap> {
        if name.eq_ignore_ascii_case("ft800")
            || name.eq_ignore_ascii_case("ft801")
            || name.eq_ignore_ascii_case("ft80x")
        {
            Some(&FT800)
        } else if name.eq_ignore_ascii_case("ft81x")
            || name.eq_ignore_ascii_case("ft810")
            || name.eq_ignore_ascii_case("ft811")
            || name.eq_ignore_ascii_case("ft812")
            || name.eq_ignore_ascii_case("ft813")
        {
            Some(&FT81X)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::MAX_ADDRESS;

    fn all_addresses(map: &ChipMap) -> [u32; 27] {
        [
            map.ram_dl,
            map.ram_cmd,
            map.ram_cmd + map.cmd_fifo_size - 1,
            map.reg_id,
            map.reg_frames,
            map.reg_cpureset,
            map.reg_hcycle,
            map.reg_hoffset,
            map.reg_hsize,
            map.reg_hsync0,
            map.reg_hsync1,
            map.reg_vcycle,
            map.reg_voffset,
            map.reg_vsize,
            map.reg_vsync0,
            map.reg_vsync1,
            map.reg_dlswap,
            map.reg_swizzle,
            map.reg_pclk_pol,
            map.reg_pclk,
            map.reg_gpio_dir,
            map.reg_gpio,
            map.reg_pwm_hz,
            map.reg_pwm_duty,
            map.reg_cmd_read,
            map.reg_cmd_write,
            map.reg_touch_transform(5),
        ]
    }

    #[test]
    fn test_maps_fit_address_space() {
        for map in [&FT800, &FT81X] {
            for addr in all_addresses(map) {
                assert!(addr <= MAX_ADDRESS, "{}: 0x{:06X}", map.name, addr);
            }
            assert!(map.cmd_fifo_size.is_power_of_two());
        }
    }

    #[test]
    fn test_touch_transform_layout() {
        assert_eq!(FT800.reg_touch_transform(5), 0x10_2520);
        assert_eq!(FT81X.reg_touch_transform(5), 0x30_2164);
    }

    #[test]
    fn test_by_name() {
        assert_eq!(ChipMap::by_name("FT800"), Some(&FT800));
        assert_eq!(ChipMap::by_name("ft813"), Some(&FT81X));
        assert_eq!(ChipMap::by_name("bt815"), None);
    }
}
