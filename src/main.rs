use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use env_logger::{Env, Target};
use log::{error, info};
use nix::unistd::daemon;

use gpio_watchd::{
    AppError, DEFAULT_GPIO_BASE, DEFAULT_SCRIPT_DIR, Direction, EdgeDetect, PinWatcher, SysfsGpio,
    WatchConfig,
};

/// Run scripts in response to GPIO edge events.
#[derive(Parser)]
#[command(name = "gpio-watchd", version, about)]
struct Cli {
    /// Pins to watch, as pin[:edge][:debounce_ns]
    #[arg(required = true, value_name = "PINSPEC")]
    pins: Vec<String>,

    /// Directory holding per-pin handler scripts
    #[arg(short = 'D', long, default_value = DEFAULT_SCRIPT_DIR, value_name = "DIR")]
    script_dir: PathBuf,

    /// Edge mode for pins that do not specify one
    #[arg(short = 'e', long, default_value = "both", value_name = "EDGE")]
    default_edge: EdgeDetect,

    /// Root of the sysfs GPIO interface
    #[arg(long, default_value = DEFAULT_GPIO_BASE, value_name = "DIR")]
    gpio_base: PathBuf,

    /// Append logs to this file instead of stderr
    #[arg(short = 'l', long, value_name = "PATH")]
    logfile: Option<PathBuf>,

    /// Detach from the terminal once the pins are configured
    #[arg(short = 'd', long)]
    detach: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.logfile.as_deref());

    if let Err(e) = run(&cli) {
        error!("{e}");
        process::exit(1);
    }
}

fn init_logging(verbose: u8, logfile: Option<&Path>) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(default_level));
    if let Some(path) = logfile {
        match File::options().create(true).append(true).open(path) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(file)));
            }
            Err(e) => {
                eprintln!("error: cannot open logfile {}: {e}", path.display());
                process::exit(1);
            }
        }
    }
    builder.init();
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let config = WatchConfig::from_specs(
        cli.gpio_base.clone(),
        cli.script_dir.clone(),
        &cli.pins,
        cli.default_edge,
    )?;

    let gpio = SysfsGpio::new(&config.gpio_base);
    for pin in &config.pins {
        gpio.export(pin.number)?;
        gpio.set_direction(pin.number, Direction::In)?;
        gpio.set_edge(pin.number, pin.edge)?;
        info!(
            "pin {} configured: edge {}, debounce {:?}",
            pin.number, pin.edge, pin.debounce
        );
    }

    if cli.detach {
        daemon(true, false).map_err(|e| AppError::Config(format!("failed to detach: {e}")))?;
    }

    PinWatcher::new(&config, &gpio)?.run()
}
