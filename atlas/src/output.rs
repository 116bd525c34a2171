use {
    crate::atlas::Error,
    std::{
        ffi::OsString,
        fs::{self, File},
        io::{BufWriter, Write},
        path::{Path, PathBuf},
    },
    tracing::{debug, warn},
};

/// A file written next to its destination and not yet moved there.
///
/// Dropping an uncommitted file removes it.
#[must_use]
pub(crate) struct Staged {
    part: PathBuf,
    dest: PathBuf,
    committed: bool,
}

impl Staged {
    /// Moves the file to its destination.
    pub fn commit(mut self) -> Result<PathBuf, Error> {
        fs::rename(&self.part, &self.dest).map_err(|err| Error::Commit {
            path: self.dest.clone(),
            err,
        })?;

        self.committed = true;
        Ok(self.dest.clone())
    }
}

impl Drop for Staged {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        if let Err(err) = fs::remove_file(&self.part) {
            warn!(path = %self.part.display(), "failed to remove staged file: {err}");
        }
    }
}

/// Writes `data` to a hidden file in the directory of `dest`.
pub(crate) fn stage(dest: PathBuf, data: &[u8]) -> Result<Staged, Error> {
    let part = part_path(&dest);
    let file = File::create(&part).map_err(|err| Error::Write {
        path: part.clone(),
        err,
    })?;

    // From here the file exists, so let the guard clean it up on failure
    let staged = Staged {
        part,
        dest,
        committed: false,
    };

    let mut file = BufWriter::new(file);
    file.write_all(data)
        .and_then(|()| file.flush())
        .map_err(|err| Error::Write {
            path: staged.part.clone(),
            err,
        })?;

    debug!(path = %staged.dest.display(), bytes = data.len(), "staged");
    Ok(staged)
}

/// Commits all staged files in order.
pub(crate) fn commit_all<I>(staged: I) -> Result<Vec<PathBuf>, Error>
where
    I: IntoIterator<Item = Staged>,
{
    staged.into_iter().map(Staged::commit).collect()
}

/// Creates the output directory if it doesn't exist.
pub(crate) fn make_outdir(outdir: &Path) -> Result<(), Error> {
    fs::create_dir_all(outdir).map_err(|err| Error::CreateDir {
        path: outdir.to_owned(),
        err,
    })
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(dest.file_name().unwrap_or_default());
    name.push(".part");
    dest.with_file_name(name)
}
