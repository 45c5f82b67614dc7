use palette::{FromColor, Hsv, Srgb};

use super::state::Chromaticity;

/// Coldest color temperature assumed when members don't report a range.
pub const DEFAULT_MIN_MIREDS: u16 = 154;

/// Warmest color temperature assumed when members don't report a range.
pub const DEFAULT_MAX_MIREDS: u16 = 500;

pub fn mired_to_kelvin(mireds: u16) -> f32 {
    1_000_000.0 / f32::from(mireds.max(1))
}

/// Approximates the color of a black body radiator at the given color
/// temperature, clamped to the `[min_mireds, max_mireds]` range.
pub fn temperature_to_chromaticity(mireds: u16, min_mireds: u16, max_mireds: u16) -> Chromaticity {
    let mireds = mireds.min(max_mireds).max(min_mireds);
    let rgb = kelvin_to_rgb(mired_to_kelvin(mireds));
    let hsv: Hsv = Hsv::from_color(rgb);

    Chromaticity {
        hue: hsv.hue.into_positive_degrees(),
        saturation: hsv.saturation * 100.0,
    }
}

/// Tanner Helland's curve fit of the Planckian locus in sRGB, valid from
/// 1000K to 40000K.
fn kelvin_to_rgb(kelvin: f32) -> Srgb {
    let t = kelvin.clamp(1000.0, 40_000.0) / 100.0;

    let red = if t <= 66.0 {
        255.0
    } else {
        329.698_73 * (t - 60.0).powf(-0.133_204_76)
    };

    let green = if t <= 66.0 {
        99.470_8 * t.ln() - 161.119_57
    } else {
        288.122_17 * (t - 60.0).powf(-0.075_514_85)
    };

    let blue = if t >= 66.0 {
        255.0
    } else if t <= 19.0 {
        0.0
    } else {
        138.517_73 * (t - 10.0).ln() - 305.044_8
    };

    Srgb::new(
        red.clamp(0.0, 255.0) / 255.0,
        green.clamp(0.0, 255.0) / 255.0,
        blue.clamp(0.0, 255.0) / 255.0,
    )
}

/// Renders a chromaticity at the given brightness (0 - 255) as 8 bit sRGB.
pub fn chromaticity_to_rgb(chromaticity: Chromaticity, brightness: u8) -> Srgb<u8> {
    let hsv: Hsv = Hsv::new(
        chromaticity.hue,
        (chromaticity.saturation / 100.0).clamp(0.0, 1.0),
        f32::from(brightness) / 255.0,
    );
    let rgb: Srgb = Srgb::from_color(hsv);

    rgb.into_format()
}

/// White channel intensity for an RGBW light: the achromatic part of the
/// requested color, scaled by brightness. Colors at or above the saturation
/// threshold have no usable white component.
pub fn derive_white_value(
    chromaticity: Chromaticity,
    brightness: u8,
    saturation_threshold: f32,
) -> u8 {
    if chromaticity.saturation >= saturation_threshold {
        return 0;
    }

    let rgb = chromaticity_to_rgb(chromaticity, brightness);
    let white = rgb.red.min(rgb.green).min(rgb.blue);
    let scaled = f32::from(white) * f32::from(brightness) / 255.0;

    scaled.round().clamp(0.0, 255.0) as u8
}
