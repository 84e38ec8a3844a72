//! Command-line entry point for the embedir bundler.

use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use clap::Parser;

use embedir::asset_paths::asset_identifier;
use embedir::{Bundler, Config};

/// Bundle a directory of files into generated Rust source.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
  /// Directory containing the assets to bundle.
  #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
  input: PathBuf,

  /// Path of the generated Rust source file.
  #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
  output: Option<PathBuf>,

  /// Bundle name recorded in the generated module header.
  #[arg(short, long, default_value = "assets")]
  package: String,

  /// Name of the generated accessor function.
  #[arg(short = 'f', long)]
  entry: Option<String>,

  /// Literal prefix stripped from every asset path.
  #[arg(long)]
  prefix: Option<String>,

  /// Embed asset content without gzip compression.
  #[arg(long)]
  no_compress: bool,

  /// Generate a debug bundle that re-reads assets from disk at call time.
  #[arg(long)]
  debug: bool,

  /// Descend into subdirectories of the input root.
  #[arg(short, long)]
  recursive: bool,

  /// Skip running rustfmt on the generated file.
  #[arg(long)]
  no_fmt: bool,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  let entry = cli.entry.unwrap_or_else(|| {
    let name = cli
      .input
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "assets".to_string());
    let derived = asset_identifier(&name);
    eprintln!("warning: no entry function name specified, using `{derived}`");
    derived
  });

  let output = cli.output.unwrap_or_else(|| {
    let derived = Config::default_output(&cli.input);
    eprintln!("warning: no output file specified, using `{}`", derived.display());
    derived
  });

  let config = Config {
    package: cli.package,
    entry,
    input: cli.input,
    output: Some(output.clone()),
    prefix: cli.prefix,
    compress: !cli.no_compress,
    debug: cli.debug,
    recursive: cli.recursive,
  };

  let artifact = Bundler::new(config).build()?;
  Bundler::write_artifact(&output, &artifact)?;

  if !cli.no_fmt {
    format_artifact(&output);
  }

  println!("bundled {} assets into `{}`", artifact.asset_count, output.display());
  Ok(())
}

/// Run rustfmt over the generated file when it is available on the system.
fn format_artifact(output: &Path) {
  match Command::new("rustfmt").args(["--edition", "2024"]).arg(output).status() {
    Ok(status) if !status.success() => {
      eprintln!("warning: rustfmt exited with {status}");
    }
    Ok(_) => {}
    // rustfmt is not installed; the artifact is left unformatted.
    Err(_) => {}
  }
}
