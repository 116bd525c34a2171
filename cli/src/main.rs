use {
    atlas::{Error as AtlasError, Fill, Layout, Padding, Parameters, TooLarge},
    clap::{ArgAction, Parser, ValueEnum},
    std::{fmt, path::PathBuf, process::ExitCode},
    tracing_subscriber::EnvFilter,
};

/// Packs a directory of sprites into sheets, one sheet per sprite size
#[derive(Parser)]
#[command(name = "spritepack", version)]
struct Cli {
    /// Input directory path containing individual sprites
    #[arg(long = "in", default_value = "images")]
    input: PathBuf,

    /// Output directory path for sheets and json
    #[arg(long = "out", default_value = "images_out")]
    outdir: PathBuf,

    /// Base filename to use for output filenames
    #[arg(long, default_value = "textures")]
    name: String,

    /// Base directory path to prepend to json metadata keys
    #[arg(long)]
    path: Option<String>,

    /// Number of pixels to repeat around sprite edges (0 to disable)
    #[arg(long, default_value_t = 8)]
    padding: u32,

    /// How to fill the padding
    #[arg(long, value_enum, default_value_t = FillArg::Extend)]
    fill: FillArg,

    /// Shrink sheet height to the rows holding sprites
    #[arg(long)]
    compact: bool,

    /// Also write a Pixi.js spritesheet json per sheet
    #[arg(long)]
    pixi: bool,

    /// Number of worker threads (one per cpu by default)
    #[arg(short, long, default_value_t = 0)]
    jobs: usize,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FillArg {
    /// Repeat the nearest edge pixel
    Extend,

    /// Leave transparent
    Transparent,
}

impl From<FillArg> for Fill {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Extend => Self::Extend,
            FillArg::Transparent => Self::Transparent,
        }
    }
}

impl Cli {
    fn parameters(self) -> Result<Parameters, Error> {
        Ok(Parameters {
            input: self.input,
            outdir: self.outdir,
            name: self.name,
            key_prefix: self.path.filter(|path| !path.is_empty()),
            padding: Padding::new(self.padding)?,
            fill: self.fill.into(),
            layout: if self.compact {
                Layout::Compact
            } else {
                Layout::Square
            },
            pixi: self.pixi,
            jobs: self.jobs,
        })
    }

    fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }

        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level());

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn run(cli: Cli) -> Result<(), Error> {
    let params = cli.parameters()?;
    let summary = atlas::make(&params)?;
    for sheet in &summary.sheets {
        println!(
            "{} ({} sprites of {}, {})",
            sheet.path.display(),
            sheet.sprites,
            sheet.sprite,
            sheet.sheet,
        );
    }

    println!("{}", summary.metadata.display());
    Ok(())
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug)]
enum Error {
    Padding(TooLarge),
    Atlas(AtlasError),
}

impl From<TooLarge> for Error {
    fn from(v: TooLarge) -> Self {
        Self::Padding(v)
    }
}

impl From<AtlasError> for Error {
    fn from(v: AtlasError) -> Self {
        Self::Atlas(v)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Padding(err) => write!(f, "{err}"),
            Self::Atlas(err) => write!(f, "{err}"),
        }
    }
}
