//! Command-line host. Lists discovered plugins or renders one plugin,
//! optionally to a WAV file.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tutti_host::prelude::*;
use tutti_host::Result;

#[derive(Parser)]
#[command(name = "tutti-host", version, about = "Discover and run Tutti plugins")]
struct Cli {
    /// Bundle search directory (repeatable). Replaces the default paths.
    #[arg(long = "path", short = 'p', global = true)]
    paths: Vec<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every plugin found on the search paths
    List,
    /// Instantiate a plugin and run a test tone through it
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Plugin URI
    uri: String,
    #[arg(long, default_value_t = 48000.0)]
    sample_rate: f64,
    /// Frames to render, in host-sized blocks. Defaults to one block.
    #[arg(long)]
    frames: Option<usize>,
    /// Test tone frequency in Hz
    #[arg(long, default_value_t = 440.0)]
    tone: f32,
    /// Write the audio outputs to this WAV file
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
    /// Feature the host should claim to support (repeatable)
    #[arg(long = "feature")]
    features: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::List => list(&cli.paths),
        Command::Run(args) => run(&cli.paths, args),
    }
}

fn host_builder(paths: &[PathBuf]) -> HostBuilder {
    paths
        .iter()
        .fold(Host::builder(), |builder, path| builder.search_path(path))
}

fn list(paths: &[PathBuf]) -> Result<()> {
    let host = host_builder(paths).build()?;

    for plugin in host.plugins() {
        println!("{}", plugin.uri());
        println!("    name:     {}", plugin.name());
        println!("    bundle:   {}", plugin.bundle().display());
        if let Some(binary) = plugin.binary() {
            println!("    binary:   {}", binary);
        }
        for feature in plugin.required_features() {
            println!("    requires: {}", feature);
        }
        for port in plugin.ports() {
            println!("    port {:>3}  {:<16} {}", port.index(), port.symbol(), port.caps());
        }
    }

    for (path, error) in host.failures() {
        eprintln!("skipped {}: {}", path.display(), error);
    }
    Ok(())
}

fn run(paths: &[PathBuf], args: RunArgs) -> Result<()> {
    let host = host_builder(paths).features(args.features).build()?;
    let options = RenderOptions {
        sample_rate: args.sample_rate,
        frames: args.frames.unwrap_or(host.config().block_size),
        tone_hz: args.tone,
        amplitude: 0.5,
    };
    let rendered = host.render(&args.uri, &options)?;

    println!(
        "{}: ran {} frames at {} Hz",
        rendered.uri, rendered.frames, rendered.sample_rate
    );
    for (symbol, peak) in rendered.peaks() {
        println!("    {:<16} peak {:.6}", symbol, peak);
    }
    for (symbol, value) in &rendered.controls {
        println!("    {:<16} value {:.6}", symbol, value);
    }

    if let Some(output) = &args.output {
        rendered.write_wav(output)?;
        println!("wrote {}", output.display());
    }
    Ok(())
}
