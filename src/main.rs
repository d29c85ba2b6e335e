use clap::{Parser, Subcommand};
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vimage::captcha::{verify_code, verify_code_options};
use vimage::output::{self, ImageInfo, SavedImage};
use vimage::{Anchor, Config, Image, ImageMime};

#[derive(Parser)]
#[command(name = "vimage")]
#[command(about = "Fluent image toolkit: inspect, convert, thumbnail and generate images")]
#[command(long_about = "\
Fluent image toolkit: inspect, convert, thumbnail and generate images

Reads GIF, JPEG, PNG and WEBP. The output format follows the output file
extension unless --format is given; otherwise the configured default is used.

Examples:

  vimage info photo.jpg
  vimage convert photo.jpg photo.webp --max-width 1600 --quality 80
  vimage thumbnail photo.jpg thumb.jpg --width 200 --height 200 --anchor top
  vimage verify-code code.png --font fonts/Arial.ttf --text a1b2c3

Run 'vimage gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (merged over the stock defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log operations to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Shared output flags.
#[derive(clap::Args, Clone)]
struct OutputArgs {
    /// Output mime type, e.g. image/webp (default: from the output extension)
    #[arg(long, value_parser = parse_mime)]
    format: Option<ImageMime>,

    /// Encoder quality, 0-100 (default: from config)
    #[arg(long)]
    quality: Option<u32>,
}

#[derive(Subcommand)]
enum Command {
    /// Print format, size and EXIF data of an image
    Info {
        input: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Re-encode an image, optionally shrinking it to fit a box
    Convert {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        max_width: Option<u32>,
        #[arg(long)]
        max_height: Option<u32>,
        /// Undo the camera rotation recorded in EXIF first
        #[arg(long)]
        auto_orient: bool,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Resize and crop an image to exactly the given size
    Thumbnail {
        input: PathBuf,
        output: PathBuf,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        /// Which part to keep: center, top, bottom, left, right, top-left, ...
        #[arg(long, default_value = "center")]
        anchor: Anchor,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Generate a verification-code image
    VerifyCode {
        output: PathBuf,
        /// TrueType font for the code
        #[arg(long)]
        font: PathBuf,
        /// Code to draw (default: 6 random letters and digits)
        #[arg(long)]
        text: Option<String>,
        #[arg(long, default_value_t = 100)]
        width: u32,
        #[arg(long, default_value_t = 40)]
        height: u32,
        #[arg(long, default_value = "white")]
        background: String,
        #[arg(long, default_value = "black")]
        noise: String,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn parse_mime(value: &str) -> Result<ImageMime, String> {
    ImageMime::parse(value).ok_or_else(|| format!("unsupported mime type '{value}'"))
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "vimage=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit --format wins, then the output extension, then the config.
fn output_mime(out: &OutputArgs, path: &Path) -> Option<ImageMime> {
    out.format.or_else(|| ImageMime::from_path(path))
}

fn save(
    image: &Image,
    source: &str,
    before: (u32, u32),
    dest: &Path,
    out: &OutputArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let encoded = image.to_file(dest, output_mime(out, dest), out.quality)?;
    output::print_saved(&SavedImage {
        source: source.to_string(),
        destination: dest.display().to_string(),
        before,
        after: (image.width(), image.height()),
        mime: encoded.mime,
        bytes: encoded.data.len(),
    });
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Info { input, json } => {
            let image = Image::load(input.as_path(), config)?;
            let info = ImageInfo::new(&input.display().to_string(), &image);
            if json {
                println!("{}", output::format_info_json(&info)?);
            } else {
                output::print_info(&info);
            }
        }
        Command::Convert {
            input,
            output,
            max_width,
            max_height,
            auto_orient,
            out,
        } => {
            let mut image = Image::load(input.as_path(), config)?;
            let before = (image.width(), image.height());
            if auto_orient {
                image.auto_orient();
            }
            match (max_width, max_height) {
                (Some(w), Some(h)) => {
                    image.best_fit(w, h);
                }
                (Some(w), None) => {
                    image.best_fit(w, image.height());
                }
                (None, Some(h)) => {
                    image.best_fit(image.width(), h);
                }
                (None, None) => {}
            }
            save(&image, &input.display().to_string(), before, &output, &out)?;
        }
        Command::Thumbnail {
            input,
            output,
            width,
            height,
            anchor,
            out,
        } => {
            let mut image = Image::load(input.as_path(), config)?;
            let before = (image.width(), image.height());
            image.auto_orient().thumbnail(width, height, anchor)?;
            save(&image, &input.display().to_string(), before, &output, &out)?;
        }
        Command::VerifyCode {
            output,
            font,
            text,
            width,
            height,
            background,
            noise,
            out,
        } => {
            let mut rng = rand::thread_rng();
            let text = text.unwrap_or_else(|| {
                (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(6)
                    .map(char::from)
                    .collect()
            });
            let options = verify_code_options(font.as_path(), height);
            let image = verify_code(
                &text,
                width,
                height,
                background.as_str(),
                &options,
                noise.as_str(),
                &mut rng,
            )?
            .with_config(config);
            save(&image, &text, (width, height), &output, &out)?;
        }
        Command::GenConfig => {
            print!("{}", vimage::config::stock_config_toml());
        }
    }

    Ok(())
}
