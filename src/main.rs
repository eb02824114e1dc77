mod config;
mod error;
mod owner;
mod pipeline;
mod render;
mod scanner;
mod types;

use clap::Parser;
use colored::Colorize;
use config::Defaults;
use error::LsError;
use owner::SystemOwners;
use pipeline::{Flags, Options};
use render::RenderStyle;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "List down the content of a directory",
    long_about = "Lists the content of the current directory. Directories are shown in blue; \
                  hidden entries, owners, modification times and long details are toggled via flags."
)]
struct Args {
    /// Do not ignore hidden files or directories
    #[arg(long, short = 'a')]
    all: bool,

    /// Show the owning account of each entry
    #[arg(long)]
    author: bool,

    /// Sort by modification time, newest first, and show it
    #[arg(long = "c")]
    c: bool,

    /// Long listing: permissions, owner, size, modification time, name
    #[arg(long, short = 'l')]
    long: bool,

    /// Print sizes in human readable units in the long listing
    #[arg(long, short = 'H')]
    human_readable: bool,

    /// Read defaults from FILE instead of ~/.lsw
    #[arg(long, value_name = "FILE", env = "LSW_CONFIG")]
    config: Option<PathBuf>,

    /// Ignore the defaults file
    #[arg(long)]
    no_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        // --help and --version
        Err(e) if !e.use_stderr() => e.exit(),
        Err(e) => {
            e.print().ok();
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("{} {e}", "error:".red());
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), LsError> {
    let defaults = if args.no_config {
        Defaults::default()
    } else {
        config::config_path(args.config.as_deref())
            .and_then(|path| Defaults::load(&path))
            .unwrap_or_default()
    };

    let flags = Flags {
        all: args.all,
        author: args.author,
        by_time: args.c,
        long: args.long,
    }
    .merge(defaults.flags);
    let options = Options::from_flags(flags);

    let cwd = std::env::current_dir().map_err(LsError::CurrentDir)?;
    let owners = SystemOwners::new();
    let entries = pipeline::run(&cwd, &options, &owners)?;

    let style = RenderStyle {
        color: colored::control::SHOULD_COLORIZE.should_colorize(),
        human_sizes: args.human_readable || defaults.human_readable,
    };
    let table = render::render(&entries, options.layout, &style);

    if !table.is_empty() {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{table}").map_err(LsError::Output)?;
    }

    Ok(())
}
