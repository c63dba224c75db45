//! # Panelbus CLI
//!
//! Command-line interface for ST7796 SPI panels.
//!
//! ## Usage
//!
//! ```bash
//! # Reset and initialise the controller
//! panelbus init
//!
//! # Fill the screen
//! panelbus fill navy
//! panelbus fill 0xFDA0
//!
//! # Two-band test pattern
//! panelbus bars --top blue --bottom yellow
//!
//! # Show an image (scaled to the panel)
//! panelbus show photo.png
//!
//! # Execute a raw operation stream
//! panelbus --no-init run sequence.bin
//!
//! # Use another board
//! panelbus --config board.json --spi-device /dev/spidev0.0 -vv fill red
//! ```

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use panelbus::{
    PanelConfig, PanelError,
    delay::ThreadDelay,
    panel::St7796,
    pins::GpioLines,
    render::{Framebuffer, Rgb565},
    transport::Spidev,
};

type Panel = St7796<Spidev, GpioLines, ThreadDelay>;

/// Panelbus - SPI display panel utility
#[derive(Parser, Debug)]
#[command(name = "panelbus")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Panel config file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SPI device path (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    spi_device: Option<String>,

    /// GPIO chip path (overrides config)
    #[arg(long, global = true, value_name = "PATH")]
    gpio_chip: Option<String>,

    /// SPI clock in Hz (overrides config)
    #[arg(long, global = true, value_name = "HZ")]
    speed: Option<u32>,

    /// Skip the reset and init sequence before drawing
    #[arg(long, global = true)]
    no_init: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reset the panel and run the init sequence
    Init,

    /// Fill the screen with one color
    Fill {
        /// Color name, 0xRRRR (RGB565) or #rrggbb
        color: Rgb565,
    },

    /// Draw a two-band test pattern
    Bars {
        #[arg(long, default_value = "blue")]
        top: Rgb565,

        #[arg(long, default_value = "yellow")]
        bottom: Rgb565,
    },

    /// Scale an image file to the panel and show it
    Show {
        image: PathBuf,
    },

    /// Toggle display inversion
    Invert {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Switch display and backlight on or off
    Power {
        #[arg(value_enum)]
        state: Switch,
    },

    /// Execute a raw operation stream file
    Run {
        file: PathBuf,
    },

    /// Print the effective panel config as JSON
    Config,

    /// List named colors
    Colors,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        self == Switch::On
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "panelbus=debug",
        _ => "panelbus=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<PanelConfig, PanelError> {
    let mut config = match &cli.config {
        Some(path) => PanelConfig::load(path)?,
        None => PanelConfig::default(),
    };
    if let Some(device) = &cli.spi_device {
        config.spi.device = device.clone();
    }
    if let Some(chip) = &cli.gpio_chip {
        config.gpio.chip = chip.clone();
    }
    if let Some(speed) = cli.speed {
        config.spi.speed_hz = speed;
    }
    config.validate()?;
    Ok(config)
}

fn open_panel(config: &PanelConfig, init: bool) -> Result<Panel, PanelError> {
    let mut panel = St7796::open(config)?;
    if init {
        let report = panel.init()?;
        if !report.is_clean() {
            eprintln!(
                "Warning: init sequence had {} unknown opcode(s)",
                report.unknown.len()
            );
        }
    }
    Ok(panel)
}

fn run(cli: Cli) -> Result<(), PanelError> {
    let config = load_config(&cli)?;
    let width = config.width as usize;
    let height = config.height as usize;

    match cli.command {
        Commands::Config => {
            println!("{}", config.to_json()?);
        }

        Commands::Colors => {
            for (name, color) in Rgb565::NAMED {
                println!("  {:<12} {}", name, color);
            }
        }

        Commands::Init => {
            let panel = open_panel(&config, true)?;
            println!("Initialised {}", config.name);
            panel.shutdown();
        }

        Commands::Fill { color } => {
            let frame = Framebuffer::filled(width, height, config.color_order, color);
            let mut panel = open_panel(&config, !cli.no_init)?;
            panel.push_framebuffer(&frame)?;
            println!("Filled with {}", color);
        }

        Commands::Bars { top, bottom } => {
            let frame = Framebuffer::bars(width, height, config.color_order, top, bottom);
            let mut panel = open_panel(&config, !cli.no_init)?;
            panel.push_framebuffer(&frame)?;
            println!("Drew bars {} / {}", top, bottom);
        }

        Commands::Show { image } => {
            let frame = Framebuffer::open_image(&image, width, height, config.color_order)?;
            let mut panel = open_panel(&config, !cli.no_init)?;
            panel.push_framebuffer(&frame)?;
            println!("Showing {}", image.display());
        }

        Commands::Invert { state } => {
            let mut panel = open_panel(&config, !cli.no_init)?;
            panel.invert(state.is_on())?;
        }

        Commands::Power { state } => {
            let mut panel = open_panel(&config, !cli.no_init)?;
            panel.display_on(state.is_on())?;
            panel.backlight(state.is_on());
        }

        Commands::Run { file } => {
            let stream = fs::read(&file).map_err(|e| {
                PanelError::Config(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let mut panel = open_panel(&config, !cli.no_init)?;
            let report = panel.run(&stream)?;

            println!(
                "Executed {} instruction(s) from {} ({} bytes)",
                report.executed,
                file.display(),
                stream.len()
            );
            for unknown in &report.unknown {
                println!("  skipped: {}", unknown.to_error());
            }
        }
    }

    Ok(())
}
