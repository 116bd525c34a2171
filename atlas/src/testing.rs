use {
    im::{Rgba, RgbaImage},
    std::{fs, path::Path},
};

/// Writes a png sprite whose pixels encode `seed` and their own coordinates.
pub(crate) fn write_sprite(dir: &Path, rel: &str, (w, h): (u32, u32), seed: u8) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(path, im::encode_png(&sprite((w, h), seed)).expect("encode")).expect("write sprite");
}

pub(crate) fn sprite((w, h): (u32, u32), seed: u8) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| Rgba([seed, x as u8, y as u8, 255]))
}
