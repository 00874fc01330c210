//! QR code rendering with a centred logo.
//!
//! The generator is synchronous and CPU bound; callers on the async runtime
//! run it through `spawn_blocking`.

use crate::config::GeneratorConfig;
use crate::models::RollNumber;
use image::{imageops, DynamicImage, ImageFormat, Rgba, RgbaImage};
use qrcode::{Color, EcLevel, QrCode};
use std::io::Cursor;
use thiserror::Error;

const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BADGE_COLOR: Rgba<u8> = Rgba([233, 69, 96, 255]);
const BADGE_SIZE: u32 = 256;

#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Failed to load logo from {path}: {source}")]
    Logo {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Turns a roll number into PNG bytes.
pub trait QrGenerator: Send + Sync {
    fn generate(&self, roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError>;
}

/// Black-on-white QR code (error correction H) with a logo over the centre.
pub struct LogoQrGenerator {
    logo: RgbaImage,
    module_size: u32,
    quiet_zone: u32,
    logo_scale: f32,
}

impl LogoQrGenerator {
    pub fn new(logo: RgbaImage, module_size: u32, quiet_zone: u32, logo_scale: f32) -> Self {
        Self {
            logo,
            module_size: module_size.max(1),
            quiet_zone,
            logo_scale,
        }
    }

    /// Build from configuration, loading the logo file if one is configured.
    pub fn from_config(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let logo = match &config.logo_path {
            Some(path) => {
                let logo = image::open(path)
                    .map_err(|source| GeneratorError::Logo {
                        path: path.clone(),
                        source,
                    })?
                    .to_rgba8();
                tracing::info!(
                    path = %path,
                    width = logo.width(),
                    height = logo.height(),
                    "Loaded QR logo"
                );
                logo
            }
            None => {
                tracing::info!("No QR_LOGO_PATH set, using built-in badge");
                default_badge(BADGE_SIZE)
            }
        };

        Ok(Self::new(
            logo,
            config.module_size,
            config.quiet_zone,
            config.logo_scale,
        ))
    }

    fn render_modules(&self, code: &QrCode) -> RgbaImage {
        let width = code.width() as u32;
        let size = (width + 2 * self.quiet_zone) * self.module_size;
        let mut canvas = RgbaImage::from_pixel(size, size, LIGHT);

        for (i, color) in code.to_colors().iter().enumerate() {
            if *color != Color::Dark {
                continue;
            }
            let x = (i as u32 % width + self.quiet_zone) * self.module_size;
            let y = (i as u32 / width + self.quiet_zone) * self.module_size;
            for dy in 0..self.module_size {
                for dx in 0..self.module_size {
                    canvas.put_pixel(x + dx, y + dy, DARK);
                }
            }
        }

        canvas
    }

    fn composite_logo(&self, canvas: &mut RgbaImage) {
        let size = canvas.width();
        let target = ((size as f32) * self.logo_scale).round() as u32;
        if target == 0 || self.logo.width() == 0 || self.logo.height() == 0 {
            return;
        }

        // Fit the logo inside a target x target box, keeping its aspect ratio.
        let longest = self.logo.width().max(self.logo.height()) as f32;
        let ratio = target as f32 / longest;
        let logo_w = ((self.logo.width() as f32 * ratio).round() as u32).max(1);
        let logo_h = ((self.logo.height() as f32 * ratio).round() as u32).max(1);
        let logo = imageops::resize(&self.logo, logo_w, logo_h, imageops::FilterType::Lanczos3);

        // White backing plate one module wider than the logo on each side.
        let pad = self.module_size;
        let plate_w = logo_w + 2 * pad;
        let plate_h = logo_h + 2 * pad;
        let plate = RgbaImage::from_pixel(plate_w, plate_h, LIGHT);
        let plate_x = (size.saturating_sub(plate_w) / 2) as i64;
        let plate_y = (size.saturating_sub(plate_h) / 2) as i64;
        imageops::overlay(canvas, &plate, plate_x, plate_y);

        let logo_x = (size.saturating_sub(logo_w) / 2) as i64;
        let logo_y = (size.saturating_sub(logo_h) / 2) as i64;
        imageops::overlay(canvas, &logo, logo_x, logo_y);
    }
}

impl QrGenerator for LogoQrGenerator {
    fn generate(&self, roll_number: &RollNumber) -> Result<Vec<u8>, GeneratorError> {
        let code = QrCode::with_error_correction_level(roll_number.as_str(), EcLevel::H)?;

        let mut canvas = self.render_modules(&code);
        self.composite_logo(&mut canvas);

        let mut png = Vec::new();
        DynamicImage::ImageRgba8(canvas).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

        tracing::debug!(
            roll_number = %roll_number,
            modules = code.width(),
            bytes = png.len(),
            "Rendered QR code"
        );

        Ok(png)
    }
}

/// Round badge used when no logo file is configured: a filled disc with a
/// white ring and a centre dot.
pub fn default_badge(size: u32) -> RgbaImage {
    let mut badge = RgbaImage::from_pixel(size, size, Rgba([0, 0, 0, 0]));
    let c = (size as f32 - 1.0) / 2.0;
    let outer = size as f32 / 2.0;

    for (x, y, pixel) in badge.enumerate_pixels_mut() {
        let dx = x as f32 - c;
        let dy = y as f32 - c;
        let r = (dx * dx + dy * dy).sqrt() / outer;
        if r > 1.0 {
            continue;
        }
        *pixel = if r < 0.25 || (0.55..0.7).contains(&r) {
            LIGHT
        } else {
            BADGE_COLOR
        };
    }

    badge
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> LogoQrGenerator {
        LogoQrGenerator::from_config(&GeneratorConfig::default()).unwrap()
    }

    fn roll(s: &str) -> RollNumber {
        RollNumber::parse(s).unwrap()
    }

    #[test]
    fn output_is_a_square_png() {
        let png = generator().generate(&roll("21CS101")).unwrap();
        let img = image::load_from_memory_with_format(&png, ImageFormat::Png).unwrap();
        assert_eq!(img.width(), img.height());
        assert_eq!(img.width() % 10, 0);
    }

    #[test]
    fn distinct_roll_numbers_give_distinct_images() {
        let generator = generator();
        let a = generator.generate(&roll("21CS101")).unwrap();
        let b = generator.generate(&roll("21CS102")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn same_roll_number_is_deterministic() {
        let generator = generator();
        let a = generator.generate(&roll("CB.EN.U4CSE21001")).unwrap();
        let b = generator.generate(&roll("CB.EN.U4CSE21001")).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn quiet_zone_is_white() {
        let png = generator().generate(&roll("21CS101")).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(*img.get_pixel(0, 0), LIGHT);
        let last = img.width() - 1;
        assert_eq!(*img.get_pixel(last, last), LIGHT);
    }

    #[test]
    fn finder_pattern_is_dark() {
        let png = generator().generate(&roll("21CS101")).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        // Top-left module of the finder pattern sits right after the quiet zone.
        assert_eq!(*img.get_pixel(40, 40), DARK);
    }

    #[test]
    fn logo_covers_the_centre() {
        let png = generator().generate(&roll("21CS101")).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        let c = img.width() / 2;
        // The badge has a white centre dot surrounded by the badge colour.
        let centre = img.get_pixel(c, c);
        assert!(centre.0.iter().all(|&v| v > 240), "expected white, got {:?}", centre);
        let ring_offset = (img.width() as f32 * 0.2 * 0.4 / 2.0) as u32;
        let p = img.get_pixel(c + ring_offset, c);
        assert!(p.0[0] > 150 && p.0[1] < 150, "expected badge colour, got {:?}", p);
    }

    #[test]
    fn custom_logo_is_composited() {
        let logo = RgbaImage::from_pixel(40, 20, Rgba([0, 0, 255, 255]));
        let generator = LogoQrGenerator::new(logo, 10, 4, 0.2);
        let png = generator.generate(&roll("21CS101")).unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        let c = img.width() / 2;
        let p = img.get_pixel(c, c);
        assert!(p.0[0] < 10 && p.0[1] < 10 && p.0[2] > 245, "expected blue, got {:?}", p);
    }

    #[test]
    fn oversized_payload_is_an_encode_error() {
        let huge = "X".repeat(4000);
        let err = generator().generate(&roll(&huge)).unwrap_err();
        assert!(matches!(err, GeneratorError::Encode(_)));
    }

    #[test]
    fn missing_logo_file_is_reported() {
        let config = GeneratorConfig {
            logo_path: Some("/nonexistent/logo.png".to_string()),
            ..GeneratorConfig::default()
        };
        let err = LogoQrGenerator::from_config(&config).err().unwrap();
        assert!(err.to_string().contains("/nonexistent/logo.png"));
    }
}
