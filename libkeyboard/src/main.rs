use anyhow::{Context, Result};
use clap::Parser;
use libkeyboard::{preset, KeyboardOptions, Session, PRESET_NAMES};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "libkeyboard", about = "Drive virtual keyboards from the terminal")]
struct Args {
    /// Options file (TOML). Overrides --preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Bundled preset: english, hebrew or pinyin
    #[arg(long, default_value = "english")]
    preset: String,

    /// Decorate input with right-to-left marks
    #[arg(long)]
    rtl: bool,

    /// Mirror input between keyboards
    #[arg(long)]
    sync: bool,

    /// Number of keyboards sharing one registry
    #[arg(long, default_value_t = 1)]
    instances: usize,

    /// Log every change (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,
}

fn load_options(args: &Args) -> Result<KeyboardOptions> {
    let mut options = match &args.config {
        Some(path) => KeyboardOptions::load_toml(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => preset(&args.preset).with_context(|| {
            format!(
                "unknown preset {:?} (available: {})",
                args.preset,
                PRESET_NAMES.join(", ")
            )
        })?,
    };
    if args.rtl {
        options.set_rtl(true);
    }
    if args.sync {
        options.set_sync_instance_inputs(true);
    }
    Ok(options)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let options = load_options(&args)?;
    let mut session = Session::new(options, args.instances)?;

    println!("═══════════════════════════════════════════════════");
    println!("  libkeyboard - Interactive Virtual Keyboard");
    println!("═══════════════════════════════════════════════════");
    println!();
    println!("Type text to press its buttons, :help for commands.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line?;
        match session.run_line(&line) {
            Ok(Some(out)) => {
                for l in out {
                    println!("{l}");
                }
            }
            Ok(None) => break,
            Err(e) => eprintln!("error: {e:#}"),
        }
        stdout.flush()?;
    }
    Ok(())
}
