//! Pretty prints a captured HTTP body.
//!
//! ```bash
//! kftray-body response.bin --content-type "application/json" --uri /api/items
//! curl -s https://example.com | kftray-body - -t "text/html"
//! kftray-body payload --content-type application/octet-stream --uri /f.tar.gz --extension-only
//! ```

use std::fs;
use std::io::{
    self,
    Read,
};
use std::path::{
    Path,
    PathBuf,
};

use anyhow::{
    Context,
    Result,
};
use clap::Parser;
use kftray_content_type::{
    BodyFormatter,
    FormatConfig,
    TidyOptions,
    TracingSink,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "kftray-body",
    version,
    about = "Pretty print a captured HTTP body and infer its file extension"
)]
struct Args {
    /// Body file to read, or `-` for stdin
    file: PathBuf,

    /// Raw Content-Type header of the message
    #[arg(short = 't', long, default_value = "")]
    content_type: String,

    /// Request URI, used to infer an extension for binary bodies
    #[arg(short, long, default_value = "")]
    uri: String,

    /// Only print the inferred extension
    #[arg(long)]
    extension_only: bool,

    /// Wrap column for HTML output (0 disables wrapping)
    #[arg(long, default_value_t = kftray_content_type::formatters::tidy::DEFAULT_WRAP_COLUMN)]
    wrap: usize,

    /// Write the formatted body into this directory instead of stdout
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let body = read_body(&args.file)?;

    let mut builder = FormatConfig::builder().tidy_options(TidyOptions {
        wrap: args.wrap,
        ..TidyOptions::default()
    });
    if let Some(output_dir) = &args.output_dir {
        builder = builder.body_dir(output_dir);
    }
    let formatter = BodyFormatter::new(builder.build());

    let formatted = formatter.format(&args.content_type, &body, &args.uri, &TracingSink);
    info!(
        "Classified {} as {}",
        formatted.content_type,
        formatted.category()
    );

    if args.extension_only {
        println!("{}", formatted.extension);
        return Ok(());
    }

    match &args.output_dir {
        Some(_) => {
            let stem = args
                .file
                .file_stem()
                .and_then(|stem| stem.to_str())
                .filter(|stem| *stem != "-")
                .unwrap_or_default();
            let path = formatter.output_path(stem, &formatted);

            fs::create_dir_all(formatter.config().body_dir())
                .context("Failed to create output directory")?;
            fs::write(&path, &formatted.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{}", path.display());
        }
        None => println!("{}", formatted.body),
    }

    Ok(())
}

fn read_body(file: &Path) -> Result<String> {
    if file.as_os_str() == "-" {
        let mut body = String::new();
        io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read body from stdin")?;
        return Ok(body);
    }

    let bytes = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
