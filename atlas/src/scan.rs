use {
    crate::{atlas::Error, size::Size},
    crossbeam::channel,
    im::RgbaImage,
    rayon::ThreadPool,
    std::{
        collections::BTreeMap,
        fs,
        path::{Path, PathBuf},
    },
    tracing::{debug, info},
    walkdir::WalkDir,
};

/// A decoded sprite image.
pub(crate) struct Sprite {
    pub image: RgbaImage,
    pub path: PathBuf,
    pub name: Box<str>,
}

impl Sprite {
    pub fn size(&self) -> Size {
        self.image.dimensions().into()
    }
}

/// Sprites grouped by their exact size, each group sorted by path.
pub(crate) type Groups = BTreeMap<Size, Vec<Sprite>>;

/// Decodes every file under `input` on the `pool` and groups the sprites by size.
pub(crate) fn scan(input: &Path, pool: &ThreadPool) -> Result<Groups, Error> {
    let paths = walk(input)?;
    let n = paths.len();
    info!(files = n, input = %input.display(), "decode sprites");

    let (tx, rx) = channel::bounded(pool.current_num_threads());
    for path in paths {
        let tx = tx.clone();
        pool.spawn(move || {
            // The receiver is gone only if another file already failed
            _ = tx.send(load(path));
        });
    }

    drop(tx);

    let mut groups = Groups::new();
    for _ in 0..n {
        let sprite = rx.recv().map_err(|_| Error::WorkerLost)??;
        groups.entry(sprite.size()).or_default().push(sprite);
    }

    for sprites in groups.values_mut() {
        sprites.sort_unstable_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
        check_names(sprites)?;
    }

    Ok(groups)
}

fn walk(input: &Path) -> Result<Vec<PathBuf>, Error> {
    let mut paths = vec![];
    for entry in WalkDir::new(input) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            paths.push(entry.into_path());
        }
    }

    Ok(paths)
}

fn load(path: PathBuf) -> Result<Sprite, Error> {
    let data = match fs::read(&path) {
        Ok(data) => data,
        Err(err) => return Err(Error::Read { path, err }),
    };

    let image = match im::decode(&data) {
        Ok(image) => image,
        Err(err) => return Err(Error::Decode { path, err }),
    };

    // Everything up to the last dot, so `.png` has an empty name
    let file = path.file_name().unwrap_or_default().to_string_lossy();
    let name = file.rsplit_once('.').map_or(&*file, |(stem, _)| stem).into();

    debug!(path = %path.display(), size = %Size::from(image.dimensions()), "decoded");
    Ok(Sprite { image, path, name })
}

fn check_names(sorted: &[Sprite]) -> Result<(), Error> {
    let mut seen = BTreeMap::new();
    for sprite in sorted {
        if let Some(first) = seen.insert(&*sprite.name, &sprite.path) {
            return Err(Error::DuplicateName {
                name: sprite.name.clone(),
                first: first.clone(),
                second: sprite.path.clone(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::testing::write_sprite,
        rayon::ThreadPoolBuilder,
        tempfile::TempDir,
    };

    fn pool() -> ThreadPool {
        ThreadPoolBuilder::new()
            .num_threads(2)
            .build()
            .expect("build pool")
    }

    #[test]
    fn groups_by_exact_size() {
        let dir = TempDir::new().expect("temp dir");
        write_sprite(dir.path(), "a.png", (8, 8), 1);
        write_sprite(dir.path(), "b.png", (8, 8), 2);
        write_sprite(dir.path(), "nested/c.png", (8, 9), 3);
        write_sprite(dir.path(), "nested/deeper/d", (9, 8), 4);

        let groups = scan(dir.path(), &pool()).expect("scan");
        let sizes: Vec<_> = groups.keys().copied().collect();
        assert_eq!(sizes, [Size::new(8, 8), Size::new(8, 9), Size::new(9, 8)]);

        let names: Vec<_> = groups[&Size::new(8, 8)]
            .iter()
            .map(|sprite| &*sprite.name)
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(&*groups[&Size::new(9, 8)][0].name, "d");

        for (size, sprites) in &groups {
            assert!(sprites.iter().all(|sprite| sprite.size() == *size));
        }
    }

    #[test]
    fn names_drop_the_last_extension() {
        let dir = TempDir::new().expect("temp dir");
        write_sprite(dir.path(), ".png", (2, 2), 0);
        write_sprite(dir.path(), "a.b.png", (2, 2), 1);
        write_sprite(dir.path(), "plain", (2, 2), 2);
        write_sprite(dir.path(), "dot.", (2, 2), 3);

        let groups = scan(dir.path(), &pool()).expect("scan");
        let names: Vec<_> = groups[&Size::new(2, 2)]
            .iter()
            .map(|sprite| &*sprite.name)
            .collect();
        assert_eq!(names, ["", "a.b", "dot", "plain"]);
    }

    #[test]
    fn sorted_by_path() {
        let dir = TempDir::new().expect("temp dir");
        for (seed, rel) in ["z.png", "m/b.png", "a.png", "m/a.png", "k.png"]
            .into_iter()
            .enumerate()
        {
            write_sprite(dir.path(), rel, (4, 4), seed as u8);
        }

        let groups = scan(dir.path(), &pool()).expect("scan");
        let paths: Vec<_> = groups[&Size::new(4, 4)]
            .iter()
            .map(|sprite| sprite.path.strip_prefix(dir.path()).expect("prefix"))
            .map(Path::to_path_buf)
            .collect();

        let expected: Vec<PathBuf> = ["a.png", "k.png", "m/a.png", "m/b.png", "z.png"]
            .into_iter()
            .map(PathBuf::from)
            .collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn corrupt_file_names_the_path() {
        let dir = TempDir::new().expect("temp dir");
        write_sprite(dir.path(), "good.png", (4, 4), 0);
        fs::write(dir.path().join("bad.png"), b"not a png").expect("write");

        let err = scan(dir.path(), &pool()).err().expect("scan should fail");
        match &err {
            Error::Decode { path, .. } => assert!(path.ends_with("bad.png")),
            _ => panic!("unexpected error: {err}"),
        }

        assert!(err.to_string().contains("bad.png"));
    }

    #[test]
    fn missing_input() {
        let dir = TempDir::new().expect("temp dir");
        let err = scan(&dir.path().join("nope"), &pool())
            .err()
            .expect("scan should fail");
        assert!(matches!(err, Error::Walk(_)));
    }

    #[test]
    fn duplicate_names_in_group() {
        let dir = TempDir::new().expect("temp dir");
        write_sprite(dir.path(), "one/hero.png", (4, 4), 0);
        write_sprite(dir.path(), "two/hero.png", (4, 4), 1);
        write_sprite(dir.path(), "three/hero.png", (5, 5), 2);

        let err = scan(dir.path(), &pool()).err().expect("scan should fail");
        match err {
            Error::DuplicateName {
                name,
                first,
                second,
            } => {
                assert_eq!(&*name, "hero");
                assert!(first.ends_with("one/hero.png"));
                assert!(second.ends_with("two/hero.png"));
            }
            err => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn empty_input() {
        let dir = TempDir::new().expect("temp dir");
        let groups = scan(dir.path(), &pool()).expect("scan");
        assert!(groups.is_empty());
    }
}
