use crate::types::{AppError, PixelClass, RecolorStats};
use crate::utils::{output_format, save_atomically, scale_channel};

use std::path::Path;

use image::io::Reader as ImageReader;
use image::{Pixel, Rgba, RgbaImage};
use indicatif::ProgressBar;
use log::debug;
use rayon::prelude::*;

const ALPHA_SKIP_BELOW: u16 = 10;
const WHITE_ABOVE: u16 = 240;

const RED_MIN: u16 = 150;
const RED_MARGIN: u16 = 30;

const BLUE_MIN: u16 = 100;
const BLUE_OVER_RED: u16 = 20;

pub fn classify(pixel: &Rgba<u8>) -> PixelClass {
    // u16 so that the margin additions cannot wrap.
    let [r, g, b, a] = pixel.0.map(u16::from);

    if a < ALPHA_SKIP_BELOW || (r > WHITE_ABOVE && g > WHITE_ABOVE && b > WHITE_ABOVE) {
        PixelClass::Skip
    } else if r > RED_MIN && r > g + RED_MARGIN && r > b + RED_MARGIN {
        PixelClass::RedDominant
    } else if b > BLUE_MIN && b > r + BLUE_OVER_RED && b > g {
        PixelClass::BlueDominant
    } else {
        PixelClass::Unchanged
    }
}

/// Maps a pixel of the given class to its green counterpart. Alpha is kept.
fn shift_to_green(pixel: Rgba<u8>, class: PixelClass) -> Rgba<u8> {
    let [r, g, b, a] = pixel.0;
    match class {
        PixelClass::RedDominant => Rgba([
            scale_channel(g, 0.3),
            scale_channel(r, 0.8),
            scale_channel(b, 0.3),
            a,
        ]),
        PixelClass::BlueDominant => Rgba([
            scale_channel(r, 0.4),
            scale_channel(b, 0.85),
            scale_channel(g, 0.5),
            a,
        ]),
        PixelClass::Skip | PixelClass::Unchanged => pixel,
    }
}

pub fn recolor_pixel(pixel: Rgba<u8>) -> Rgba<u8> {
    shift_to_green(pixel, classify(&pixel))
}

/// Recolors every pixel of `img` in place.
///
/// Rows are handed out to the rayon pool; every pixel only depends on its
/// own original value so the result matches a plain sequential scan.
pub fn recolor_image(img: &mut RgbaImage) -> RecolorStats {
    let row_len = img.width() as usize * 4;
    if row_len == 0 || img.height() == 0 {
        return RecolorStats::default();
    }

    img.par_chunks_mut(row_len)
        .map(|row| {
            let mut stats = RecolorStats::default();
            for channels in row.chunks_exact_mut(4) {
                let pixel = Rgba::<u8>::from_slice_mut(channels);
                let class = classify(pixel);
                *pixel = shift_to_green(*pixel, class);
                stats.record(class);
            }
            stats
        })
        .reduce(RecolorStats::default, RecolorStats::merge)
}

/// Loads the image at `path`, recolors it and writes it back over itself.
///
/// Nothing is written unless decoding and the whole pixel pass succeed.
pub fn recolor_file(path: &Path, pb: &ProgressBar) -> Result<RecolorStats, AppError> {
    pb.set_message(format!("Recoloring: {}", path.display()));

    let reader = ImageReader::open(path)
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .with_guessed_format()
        .map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let detected = reader.format();

    let mut img = reader
        .decode()
        .map_err(|source| AppError::Decode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    let stats = recolor_image(&mut img);
    debug!(
        "{}: {} red, {} blue, {} skipped, {} untouched",
        path.display(),
        stats.red,
        stats.blue,
        stats.skipped,
        stats.unchanged
    );

    save_atomically(&img, path, output_format(path, detected))?;

    pb.suspend(|| println!("Updated: {}", path.display()));
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::fs;

    fn px(r: u8, g: u8, b: u8, a: u8) -> Rgba<u8> {
        Rgba([r, g, b, a])
    }

    #[test]
    fn red_pixel_turns_dark_green() {
        assert_eq!(recolor_pixel(px(200, 50, 30, 255)), px(15, 160, 9, 255));
    }

    #[test]
    fn blue_pixel_turns_light_green() {
        assert_eq!(recolor_pixel(px(10, 20, 180, 255)), px(4, 153, 10, 255));
    }

    #[test]
    fn near_white_is_left_alone() {
        assert_eq!(classify(&px(250, 250, 250, 255)), PixelClass::Skip);
        assert_eq!(recolor_pixel(px(250, 250, 250, 255)), px(250, 250, 250, 255));
        assert_eq!(recolor_pixel(px(241, 241, 241, 10)), px(241, 241, 241, 10));
    }

    #[test]
    fn transparent_is_left_alone() {
        assert_eq!(recolor_pixel(px(100, 100, 100, 5)), px(100, 100, 100, 5));
        // Would be red-dominant if it were visible.
        assert_eq!(classify(&px(255, 0, 0, 9)), PixelClass::Skip);
        assert_eq!(recolor_pixel(px(255, 0, 0, 9)), px(255, 0, 0, 9));
    }

    #[test]
    fn alpha_ten_is_visible() {
        assert_eq!(classify(&px(255, 0, 0, 10)), PixelClass::RedDominant);
        assert_eq!(recolor_pixel(px(255, 0, 0, 10)), px(0, 204, 0, 10));
    }

    #[test]
    fn white_needs_all_three_channels() {
        assert_eq!(classify(&px(250, 240, 250, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(241, 100, 100, 255)), PixelClass::RedDominant);
    }

    #[test]
    fn red_boundaries() {
        assert_eq!(classify(&px(150, 0, 0, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(151, 0, 0, 255)), PixelClass::RedDominant);
        assert_eq!(classify(&px(200, 170, 0, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(200, 169, 0, 255)), PixelClass::RedDominant);
        assert_eq!(classify(&px(200, 0, 170, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(200, 0, 169, 255)), PixelClass::RedDominant);
    }

    #[test]
    fn blue_boundaries() {
        assert_eq!(classify(&px(0, 0, 100, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(0, 0, 101, 255)), PixelClass::BlueDominant);
        assert_eq!(classify(&px(80, 0, 101, 255)), PixelClass::BlueDominant);
        assert_eq!(classify(&px(81, 0, 101, 255)), PixelClass::Unchanged);
        // No margin against green.
        assert_eq!(classify(&px(0, 150, 150, 255)), PixelClass::Unchanged);
        assert_eq!(classify(&px(0, 149, 150, 255)), PixelClass::BlueDominant);
    }

    #[test]
    fn blue_formula_reads_original_channels() {
        let out = recolor_pixel(px(50, 90, 200, 128));
        assert_eq!(out, px(20, 170, 45, 128));
    }

    #[test]
    fn unmatched_pixels_are_identity() {
        for p in [px(0, 0, 0, 255), px(20, 200, 20, 255), px(128, 128, 128, 200)] {
            assert_eq!(classify(&p), PixelClass::Unchanged);
            assert_eq!(recolor_pixel(p), p);
        }
    }

    #[test]
    fn converted_red_settles() {
        let once = recolor_pixel(px(200, 50, 30, 255));
        assert_eq!(classify(&once), PixelClass::Unchanged);
        assert_eq!(recolor_pixel(once), once);
    }

    #[test]
    fn recolor_image_matches_per_pixel_and_counts() {
        let source = RgbaImage::from_fn(7, 5, |x, y| {
            let v = (x * 37 + y * 53) as u8;
            Rgba([v, v.wrapping_mul(3), v.wrapping_add(90), (y * 60) as u8])
        });
        let mut img = source.clone();
        let stats = recolor_image(&mut img);

        let mut expected = RecolorStats::default();
        for (x, y, p) in source.enumerate_pixels() {
            assert_eq!(*img.get_pixel(x, y), recolor_pixel(*p));
            expected.record(classify(p));
        }
        assert_eq!(stats, expected);
        assert_eq!(
            stats.skipped + stats.red + stats.blue + stats.unchanged,
            35
        );
    }

    #[test]
    fn recolor_image_handles_empty() {
        let mut img = RgbaImage::new(0, 0);
        assert_eq!(recolor_image(&mut img), RecolorStats::default());
    }

    #[test]
    fn recolor_file_rewrites_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ic_launcher.png");
        let mut img = RgbaImage::from_pixel(2, 1, px(200, 50, 30, 255));
        img.put_pixel(1, 0, px(10, 20, 180, 0));
        img.save(&path).unwrap();

        let stats = recolor_file(&path, &ProgressBar::hidden()).unwrap();
        assert_eq!(stats.red, 1);
        assert_eq!(stats.skipped, 1);

        let out = image::open(&path).unwrap().to_rgba8();
        assert_eq!(*out.get_pixel(0, 0), px(15, 160, 9, 255));
        assert_eq!(*out.get_pixel(1, 0), px(10, 20, 180, 0));
    }

    #[test]
    fn recolor_file_adds_opaque_alpha_to_rgb_sources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ic_launcher_round.png");
        RgbImage::from_pixel(1, 1, Rgb([10, 20, 180]))
            .save_with_format(&path, ImageFormat::Png)
            .unwrap();

        recolor_file(&path, &ProgressBar::hidden()).unwrap();

        let out = image::open(&path).unwrap();
        assert!(out.color().has_alpha());
        assert_eq!(*out.to_rgba8().get_pixel(0, 0), px(4, 153, 10, 255));
    }

    #[test]
    fn undecodable_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        fs::write(&path, b"definitely not a png").unwrap();

        let err = recolor_file(&path, &ProgressBar::hidden()).unwrap_err();
        assert!(matches!(err, AppError::Decode { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"definitely not a png");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn recolor_file_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.png");
        let link = dir.path().join("link.png");
        RgbaImage::from_pixel(1, 1, px(200, 50, 30, 255))
            .save(&real)
            .unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        recolor_file(&link, &ProgressBar::hidden()).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let out = image::open(&real).unwrap().to_rgba8();
        assert_eq!(*out.get_pixel(0, 0), px(15, 160, 9, 255));
    }
}
