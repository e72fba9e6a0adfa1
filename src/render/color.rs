/// Fill for areas without data.
pub const NO_DATA: &str = "#d1d5db";

// Sequential orange scale: light (#fff5eb) → dark (#7f2704)
const LOW: (u8, u8, u8) = (0xff, 0xf5, 0xeb);
const HIGH: (u8, u8, u8) = (0x7f, 0x27, 0x04);

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8
}

/// Color of `value` on a 0..=`max` scale. Values above `max` saturate.
pub fn scale_color(value: u64, max: u64) -> String {
    let t = if max == 0 { 0.0 } else { (value as f64 / max as f64).clamp(0.0, 1.0) };
    color_at(t)
}

/// Color at position `t` in [0, 1].
pub fn color_at(t: f64) -> String {
    let r = lerp(LOW.0, HIGH.0, t);
    let g = lerp(LOW.1, HIGH.1, t);
    let b = lerp(LOW.2, HIGH.2, t);
    format!("#{r:02x}{g:02x}{b:02x}")
}
