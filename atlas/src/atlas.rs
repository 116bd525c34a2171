use {
    crate::{
        meta::{self, Map, PixiSheet, Sheet},
        output::{self, Staged},
        padding::{Fill, Layout, Padding},
        plan, raster,
        scan::{self, Sprite},
        size::Size,
    },
    crossbeam::channel,
    im::Error as ImageError,
    rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder},
    serde_json::Error as JsonError,
    std::{fmt, io, path::PathBuf, sync::Arc},
    tracing::{info, warn},
};

/// Settings of one packing run.
#[derive(Clone, Debug)]
pub struct Parameters {
    /// Directory with sprite images.
    pub input: PathBuf,

    /// Directory for sheets and metadata.
    pub outdir: PathBuf,

    /// Base name of the output files.
    pub name: String,

    /// Prefix of sheet keys in the metadata.
    pub key_prefix: Option<String>,

    pub padding: Padding,
    pub fill: Fill,
    pub layout: Layout,

    /// Also write a Pixi.js spritesheet json per sheet.
    pub pixi: bool,

    /// Worker count, `0` means one per cpu.
    pub jobs: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            input: PathBuf::from("images"),
            outdir: PathBuf::from("images_out"),
            name: String::from("textures"),
            key_prefix: None,
            padding: Padding::default(),
            fill: Fill::default(),
            layout: Layout::default(),
            pixi: false,
            jobs: 0,
        }
    }
}

/// What a run has written.
#[derive(Debug)]
pub struct Summary {
    pub sheets: Vec<SheetSummary>,
    pub metadata: PathBuf,
}

#[derive(Debug)]
pub struct SheetSummary {
    pub path: PathBuf,
    pub sheet: Size,
    pub sprite: Size,
    pub sprites: usize,
}

/// Packs all sprites of the input directory into sheets and writes them
/// together with the metadata.
///
/// Nothing is written to the output directory unless every sheet and the
/// metadata were made successfully.
///
/// # Errors
/// See [`Error`] type for details.
pub fn make(params: &Parameters) -> Result<Summary, Error> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(params.jobs)
        .thread_name(|idx| format!("spritepack-{idx}"))
        .build()?;

    let groups = scan::scan(&params.input, &pool)?;
    if groups.is_empty() {
        warn!(input = %params.input.display(), "no sprites found");
    }

    output::make_outdir(&params.outdir)?;
    let made = make_sheets(groups, params, &pool)?;

    let mut map = Map::new();
    let mut staged = Vec::with_capacity(made.len() * 2 + 1);
    let mut sheets = Vec::with_capacity(made.len());
    for sheet in made {
        sheets.push(SheetSummary {
            path: params.outdir.join(&sheet.filename),
            sheet: sheet.meta.sheet_size,
            sprite: sheet.meta.sprite_size,
            sprites: sheet.meta.sprites.len(),
        });

        staged.extend(sheet.staged);
        map.insert(sheet.key, sheet.meta);
    }

    let metadata = params.outdir.join(format!("{}.json", params.name));
    let json = serde_json::to_vec(&map)?;
    staged.push(output::stage(metadata.clone(), &json)?);
    output::commit_all(staged)?;

    sheets.sort_unstable_by(|a, b| a.path.cmp(&b.path));
    for sheet in &sheets {
        info!(
            path = %sheet.path.display(),
            size = %sheet.sheet,
            sprites = sheet.sprites,
            "sheet written"
        );
    }

    info!(path = %metadata.display(), sheets = sheets.len(), "metadata written");
    Ok(Summary { sheets, metadata })
}

/// A finished sheet with its files staged.
struct Made {
    key: String,
    filename: String,
    meta: Sheet,
    staged: Vec<Staged>,
}

fn make_sheets(
    groups: scan::Groups,
    params: &Parameters,
    pool: &ThreadPool,
) -> Result<Vec<Made>, Error> {
    let n = groups.len();
    let params = Arc::new(params.clone());
    let (tx, rx) = channel::bounded(pool.current_num_threads());
    for (size, sprites) in groups {
        let tx = tx.clone();
        let params = Arc::clone(&params);
        pool.spawn(move || {
            _ = tx.send(make_sheet(size, &sprites, &params));
        });
    }

    drop(tx);

    // Drain every result, so no staged file outlives a failed run
    let mut made = Vec::with_capacity(n);
    let mut failure = None;
    for _ in 0..n {
        match rx.recv() {
            Ok(Ok(sheet)) => made.push(sheet),
            Ok(Err(err)) => failure = failure.or(Some(err)),
            Err(_) => {
                failure = failure.or(Some(Error::WorkerLost));
                break;
            }
        }
    }

    match failure {
        Some(err) => Err(err),
        None => Ok(made),
    }
}

fn make_sheet(size: Size, sprites: &[Sprite], params: &Parameters) -> Result<Made, Error> {
    let plan = plan::plan(size, sprites.len(), params.padding, params.layout);
    info!(
        sprite = %size,
        sprites = sprites.len(),
        grid = %Size::new(plan.columns, plan.rows),
        sheet = %plan.sheet,
        "pack sheet"
    );

    let canvas = raster::rasterize(&plan, sprites, params.fill);
    let filename = format!("{}_{size}.png", params.name);
    let png = im::encode_png(&canvas).map_err(|err| Error::Encode {
        file: filename.clone(),
        err,
    })?;

    drop(canvas);
    let key = meta::sheet_key(params.key_prefix.as_deref(), &filename);
    let meta = Sheet::new(&plan, sprites);

    let mut staged = vec![output::stage(params.outdir.join(&filename), &png)?];
    if params.pixi {
        let pixi = PixiSheet::new(&key, &meta);
        let json = serde_json::to_vec(&pixi)?;
        let path = params.outdir.join(format!("{}_{size}.pixi.json", params.name));
        staged.push(output::stage(path, &json)?);
    }

    Ok(Made {
        key,
        filename,
        meta,
        staged,
    })
}

#[derive(Debug)]
pub enum Error {
    Pool(ThreadPoolBuildError),
    Walk(walkdir::Error),
    Read { path: PathBuf, err: io::Error },
    Decode { path: PathBuf, err: ImageError },
    DuplicateName {
        name: Box<str>,
        first: PathBuf,
        second: PathBuf,
    },
    Encode { file: String, err: ImageError },
    CreateDir { path: PathBuf, err: io::Error },
    Write { path: PathBuf, err: io::Error },
    Commit { path: PathBuf, err: io::Error },
    Json(JsonError),
    WorkerLost,
}

impl From<ThreadPoolBuildError> for Error {
    fn from(v: ThreadPoolBuildError) -> Self {
        Self::Pool(v)
    }
}

impl From<walkdir::Error> for Error {
    fn from(v: walkdir::Error) -> Self {
        Self::Walk(v)
    }
}

impl From<JsonError> for Error {
    fn from(v: JsonError) -> Self {
        Self::Json(v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Pool(err) => write!(f, "failed to start workers: {err}"),
            Self::Walk(err) => write!(f, "failed to walk the input directory: {err}"),
            Self::Read { path, err } => write!(f, "failed to read file {path:?}: {err}"),
            Self::Decode { path, err } => write!(f, "{path:?} could not be decoded: {err}"),
            Self::DuplicateName {
                name,
                first,
                second,
            } => write!(
                f,
                "sprite name {name:?} of {second:?} is already taken by {first:?}",
            ),
            Self::Encode { file, err } => write!(f, "failed to encode sheet {file:?}: {err}"),
            Self::CreateDir { path, err } => {
                write!(f, "failed to create the output directory {path:?}: {err}")
            }
            Self::Write { path, err } => write!(f, "failed to write file {path:?}: {err}"),
            Self::Commit { path, err } => write!(f, "failed to move file to {path:?}: {err}"),
            Self::Json(err) => write!(f, "failed to serialize metadata: {err}"),
            Self::WorkerLost => write!(f, "a worker stopped without a result"),
        }
    }
}
