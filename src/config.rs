// Copyright (c) 2026 rezky_nightky

use std::io::IsTerminal;

use clap::Parser;

use crate::palette::theme;
use crate::reader::DEFAULT_SEED;
use crate::runtime::ColorScheme;
use crate::viewport::CellSize;

pub const DEFAULT_PARAMS_USAGE: &str = "DEFAULT PARAMS USAGE:\n  driptrail --color blood --color-bg theme --fps 60 --speed 0.12 --snap 0.25 --pages 6 --pixel-density 1";

pub fn color_enabled_stdout() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if matches!(std::env::var("CLICOLOR").ok().as_deref(), Some("0")) {
        return false;
    }
    std::io::stdout().is_terminal()
}

fn colorize_help_detail(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 64);
    for chunk in text.split_inclusive('\n') {
        let (line, nl) = chunk
            .strip_suffix('\n')
            .map(|l| (l, "\n"))
            .unwrap_or((chunk, ""));

        let is_heading =
            !line.starts_with(' ') && line.ends_with(':') && line == line.to_ascii_uppercase();

        if is_heading {
            out.push_str("\x1b[1;36m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else if let Some(rest) = line.strip_prefix("  driptrail") {
            out.push_str("  \x1b[1;34mdriptrail\x1b[0m");
            out.push_str(rest);
        } else if line.starts_with("  -") {
            out.push_str("\x1b[33m");
            out.push_str(line);
            out.push_str("\x1b[0m");
        } else {
            out.push_str(line);
        }
        out.push_str(nl);
    }
    out
}

pub fn default_params_usage_for_help() -> String {
    if color_enabled_stdout() {
        colorize_help_detail(DEFAULT_PARAMS_USAGE)
    } else {
        DEFAULT_PARAMS_USAGE.to_string()
    }
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorBg {
    /// Paint the whole screen with the theme's page colour.
    #[value(name = "theme")]
    Theme,
    /// Leave untouched cells on the terminal's own background.
    #[value(name = "default-background")]
    DefaultBackground,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyphs {
    #[value(name = "auto")]
    Auto,
    #[value(name = "half-block")]
    HalfBlock,
    #[value(name = "ascii")]
    Ascii,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "driptrail", version, disable_version_flag = true)]
pub struct Args {
    #[arg(
        short = 'c',
        long = "color",
        default_value = "blood",
        help_heading = "APPEARANCE",
        help = "Color theme (see --list-colors)"
    )]
    pub color: String,

    #[arg(
        long = "color-bg",
        default_value_t = ColorBg::Theme,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Background mode (theme, default-background)"
    )]
    pub color_bg: ColorBg,

    #[arg(
        long = "colormode",
        help_heading = "APPEARANCE",
        help = "Force color mode (allowed: 0,16,8/256,24/32). Default: 24-bit if supported (COLORTERM), else 8-bit"
    )]
    pub colormode: Option<u16>,

    #[arg(
        long = "glyphs",
        default_value_t = Glyphs::Auto,
        value_enum,
        help_heading = "APPEARANCE",
        help = "Cell glyphs: half-block (two dots per cell), ascii, or auto from LANG"
    )]
    pub glyphs: Glyphs,

    #[arg(
        short = 'f',
        long = "fps",
        default_value_t = 60.0,
        help_heading = "ANIMATION",
        help = "Frame rate while animating (min 1 max 240)"
    )]
    pub fps: f64,

    #[arg(
        short = 'S',
        long = "speed",
        default_value_t = 0.12,
        help_heading = "ANIMATION",
        help = "Fraction of the remaining distance covered per frame (min 0.01 max 1)"
    )]
    pub speed: f64,

    #[arg(
        long = "snap",
        default_value_t = 0.25,
        help_heading = "ANIMATION",
        help = "Distance under which the head snaps to its target (min 0.001 max 10)"
    )]
    pub snap: f64,

    #[arg(
        long = "reduced-motion",
        help_heading = "ANIMATION",
        help = "Jump straight to the target (also enabled by REDUCE_MOTION=1)"
    )]
    pub reduced_motion: bool,

    #[arg(
        short = 'p',
        long = "pages",
        default_value_t = 6.0,
        help_heading = "PAGE",
        help = "Page length in screens (min 1 max 100)"
    )]
    pub pages: f64,

    #[arg(
        long = "pixel-density",
        default_value_t = 1.0,
        help_heading = "PAGE",
        help = "Raster pixels per layout unit (min 0.25 max 4)"
    )]
    pub pixel_density: f64,

    #[arg(
        long = "cell-size",
        help_heading = "PAGE",
        help = "Layout units per terminal cell as WxH (default: from the terminal, else 8x16)"
    )]
    pub cell_size: Option<CellSize>,

    #[arg(
        short = 'd',
        long = "demo",
        help_heading = "GENERAL",
        help = "Scroll the page automatically"
    )]
    pub demo: bool,

    #[arg(
        long = "seed",
        default_value_t = DEFAULT_SEED,
        help_heading = "GENERAL",
        help = "Seed for the demo reader"
    )]
    pub seed: u64,

    #[arg(
        short = 's',
        long = "screensaver",
        help_heading = "GENERAL",
        help = "Screensaver mode (exit on keypress)"
    )]
    pub screensaver: bool,

    #[arg(
        long = "duration",
        help_heading = "GENERAL",
        help = "Stop after N seconds (min 0.1 max 86400; <=0 disables)"
    )]
    pub duration: Option<f64>,

    #[arg(
        long = "perf-stats",
        help_heading = "GENERAL",
        help = "Print frame statistics on exit"
    )]
    pub perf_stats: bool,

    #[arg(
        long = "check-bitcolor",
        help_heading = "HELP",
        help = "Print detected terminal color capability and exit"
    )]
    pub check_bitcolor: bool,

    #[arg(
        long = "help-detail",
        help_heading = "HELP",
        help = "Show detailed help and key bindings, then exit"
    )]
    pub help_detail: bool,

    #[arg(
        long = "list-colors",
        help_heading = "HELP",
        help = "List available color themes and exit"
    )]
    pub list_colors: bool,

    #[arg(
        long = "info",
        short = 'i',
        help_heading = "HELP",
        help = "Print version info and exit"
    )]
    pub info: bool,

    #[arg(
        long = "version",
        short = 'v',
        help_heading = "HELP",
        help = "Print version and exit"
    )]
    pub version: bool,
}

/// True when the environment asks for reduced motion.
pub fn reduce_motion_env() -> bool {
    std::env::var("REDUCE_MOTION")
        .map(|v| !matches!(v.trim(), "" | "0"))
        .unwrap_or(false)
}

pub fn print_list_colors() {
    if color_enabled_stdout() {
        println!("\x1b[1;36mAVAILABLE COLOR THEMES:\x1b[0m");
        println!("\x1b[2mNOTE: Use only the VALUE (left side) with --color.\x1b[0m");
    } else {
        println!("AVAILABLE COLOR THEMES:");
        println!("NOTE: Use only the VALUE (left side) with --color.");
    }
    println!();
    println!("VALUE        PAGE           TRAIL");
    for scheme in ColorScheme::ALL {
        let t = theme(scheme);
        let page = format!("{:?}", t.background);
        println!("{:<12} {:<14} {:?} -> {:?}", scheme.name(), page, t.fresh, t.old);
    }
}

pub fn print_help_detail() {
    let block = format!(
        "{}\n\nUSAGE:\n  driptrail [OPTIONS]\n\nKEYS:\n  Up/Down, j/k        scroll one line\n  PageUp/PageDown     scroll one screen (Space also pages down)\n  Home/End            jump to top/bottom\n  mouse wheel         scroll three lines\n  m                   toggle reduced motion\n  c                   next color theme\n  d                   toggle demo reader\n  q, Esc              quit\n\nLIMITS / VALID RANGES:\n  --fps <number>            min 1 max 240\n  --speed <number>          min 0.01 max 1\n  --snap <number>           min 0.001 max 10\n  --pages <number>          min 1 max 100\n  --pixel-density <number>  min 0.25 max 4\n  --cell-size <WxH>         W >= 1, H >= 2\n  --duration <seconds>      min 0.1 max 86400 (<=0 disables)\n  --colormode <0|16|8|24>   allowed values only (8==256, 24==32)\n\nENVIRONMENT:\n  REDUCE_MOTION=1     same as --reduced-motion\n  RUST_LOG=debug      log state changes to stderr\n",
        DEFAULT_PARAMS_USAGE
    );

    if color_enabled_stdout() {
        print!("{}", colorize_help_detail(&block));
    } else {
        print!("{}", block);
    }
    println!();
    print_list_colors();
}
