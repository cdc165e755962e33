use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Fixed colours
// ---------------------------------------------------------------------------

/// Line colours of the four trend metrics, in plotting order.
pub const TREND_COLORS: [&str; 4] = [
    "rgb(67,67,67)",
    "rgb(115,115,115)",
    "rgb(49,130,189)",
    "rgb(189,189,189)",
];

/// Colour of the total-cases reference line.
pub const TOTAL_CASES_COLOR: &str = "red";

/// Plot and paper background of every chart.
pub const BACKGROUND: &str = "#D3D3D3";

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct CSS colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            format!(
                "rgb({},{},{})",
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}
