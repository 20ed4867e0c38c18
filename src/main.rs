use clap::{Parser, Subcommand};
use resizer::imaging::{Dimensions, OutputFormat, RawOptions, Resizer, RustBackend};
use resizer::{batch, config, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "resizer")]
#[command(about = "Resize, crop and letterbox images with phpThumb-style options")]
#[command(long_about = "\
Resize, crop and letterbox images with phpThumb-style options

Options are passed as KEY=VALUE pairs:

  w, h            target width / height (either may be omitted)
  wl hl wp hp ws hs
                  width / height for landscape, portrait or square originals
  scale           multiply the target box (capped at the source size)
  aoe=1           allow output enlargement
  zc=C            cover-crop to exactly w x h, anchored at C
  far=C           fit inside w x h and pad to exactly w x h, anchored at C
  bg=RRGGBB[/N]   background colour, N = opacity percent
  sw sh sx sy     source window (values below 1 are fractions)
  q, qmax         quality, and the ceiling used for undersized JPEG sources
  fltr=usm        sharpen (repeat fltr or use fltr[]= for several filters)
  strip=1         drop embedded metadata

Anchors: c tl t tr l r bl b br (1 = c)

Run 'resizer gen-config' to generate a documented resizer.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = "resizer.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image
    Process {
        input: PathBuf,
        output: PathBuf,
        /// Resize options as KEY=VALUE
        options: Vec<String>,
        /// Record the plan and timing in the report
        #[arg(long)]
        debug: bool,
    },
    /// Print the render plan for an image size as JSON, without touching files
    Plan {
        /// Original size, e.g. 1024x768
        #[arg(long)]
        size: Dimensions,
        /// Output extension, e.g. jpg, png, webp
        #[arg(long, default_value = "jpg")]
        format: String,
        /// Resize options as KEY=VALUE
        options: Vec<String>,
    },
    /// Run every job in a TOML job file in parallel
    Batch { jobs: PathBuf },
    /// Print a stock resizer.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Process {
            input,
            output: output_path,
            options,
            debug,
        } => {
            let config = config::load_config(&cli.config)?;
            let mut settings = config.settings();
            settings.debug |= debug;
            let raw = RawOptions::from_pairs(&options)?;

            let resizer = Resizer::new(RustBackend::new(), settings);
            let outcome = resizer.process_image(&input, &output_path, &raw);
            output::print_outcome(&input, &output_path, &outcome);
            if !outcome.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Plan {
            size,
            format,
            options,
        } => {
            let config = config::load_config(&cli.config)?;
            let format = OutputFormat::from_extension(&format)
                .ok_or_else(|| format!("unsupported output format '{format}'"))?;
            let raw = RawOptions::from_pairs(&options)?;

            let resizer = Resizer::new(RustBackend::new(), config.settings());
            let (plan, warnings) = resizer.plan(size, &raw, format);
            for warning in warnings {
                eprintln!("Warning: {warning}");
            }
            println!("{}", serde_json::to_string_pretty(&plan)?);
        }
        Command::Batch { jobs } => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            let jobs = batch::load_jobs(&jobs)?;

            let resizer = Resizer::new(RustBackend::new(), config.settings());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let results = batch::run_batch(&resizer, jobs, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let summary = batch::BatchSummary::from_results(&results);
            println!("{}", output::format_batch_summary(&summary));
            if summary.declined > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
