use {
    crate::{
        plan::Plan,
        scan::Sprite,
        size::{Position, Size},
    },
    serde::Serialize,
    std::collections::BTreeMap,
};

/// The metadata document: sheet key to sheet entry.
pub type Map = BTreeMap<String, Sheet>;

/// Metadata of one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sheet {
    pub sheet_size: Size,
    pub sprite_size: Size,
    pub sprites: BTreeMap<Box<str>, Position>,
}

impl Sheet {
    pub(crate) fn new(plan: &Plan, sprites: &[Sprite]) -> Self {
        let sprites = sprites
            .iter()
            .zip(&plan.positions)
            .map(|(sprite, &pos)| (sprite.name.clone(), pos))
            .collect();

        Self {
            sheet_size: plan.sheet,
            sprite_size: plan.sprite,
            sprites,
        }
    }
}

/// Makes the key of a sheet from its file name and an optional prefix.
///
/// The joined key is cleaned: empty and `.` segments are dropped and `..`
/// removes the segment before it.
pub(crate) fn sheet_key(prefix: Option<&str>, filename: &str) -> String {
    let prefix = prefix.unwrap_or_default();
    let rooted = prefix.starts_with('/');
    let mut parts = Vec::new();
    for part in prefix.split('/').chain([filename]) {
        match part {
            "" | "." => {}
            ".." => match parts.last() {
                Some(&last) if last != ".." => {
                    parts.pop();
                }
                None if rooted => {}
                _ => parts.push(part),
            },
            part => parts.push(part),
        }
    }

    let key = parts.join("/");
    if rooted {
        format!("/{key}")
    } else {
        key
    }
}

/// A sheet in the Pixi.js spritesheet format.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PixiSheet<'a> {
    frames: BTreeMap<&'a str, PixiFrame>,
    meta: PixiMeta<'a>,
}

impl<'a> PixiSheet<'a> {
    pub fn new(key: &'a str, sheet: &'a Sheet) -> Self {
        let Size { w, h } = sheet.sprite_size;
        let frames = sheet
            .sprites
            .iter()
            .map(|(name, &Position { x, y })| {
                let frame = PixiFrame {
                    frame: Rect { x, y, w, h },
                    source_size: sheet.sprite_size,
                    sprite_source_size: Rect { x: 0, y: 0, w, h },
                    rotated: false,
                    trimmed: false,
                };

                (&**name, frame)
            })
            .collect();

        Self {
            frames,
            meta: PixiMeta {
                image: key,
                size: sheet.sheet_size,
                scale: "1",
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PixiFrame {
    frame: Rect,
    source_size: Size,
    sprite_source_size: Rect,
    rotated: bool,
    trimmed: bool,
}

#[derive(Serialize)]
struct PixiMeta<'a> {
    image: &'a str,
    size: Size,
    scale: &'static str,
}

#[derive(Serialize)]
struct Rect {
    x: u32,
    y: u32,
    w: u32,
    h: u32,
}
