// Copyright (c) 2026 rezky_nightky

mod animator;
mod cell;
mod config;
mod frame;
mod noise;
mod paint;
mod palette;
mod present;
mod reader;
mod render;
mod runtime;
mod scroll;
mod surface;
mod terminal;
mod trail;
mod viewport;

use std::env;
use std::time::{Duration, Instant};

#[cfg(unix)]
use std::thread;

use clap::builder::styling::{AnsiColor as ClapAnsiColor, Color as ClapColor};
use clap::builder::styling::{Effects as ClapEffects, Style as ClapStyle};
use clap::builder::Styles as ClapStyles;
use clap::{CommandFactory, FromArgMatches};
use crossterm::event::{Event, KeyCode, KeyEventKind, MouseEventKind};
use log::{debug, info, trace};

#[cfg(unix)]
use signal_hook::consts::{SIGHUP, SIGINT, SIGTERM};
#[cfg(unix)]
use signal_hook::iterator::Signals;

use crate::animator::{Easing, FrameScheduler, Phase};
use crate::config::{
    color_enabled_stdout, default_params_usage_for_help, print_help_detail, print_list_colors,
    reduce_motion_env, Args, ColorBg, Glyphs,
};
use crate::frame::Frame;
use crate::palette::theme;
use crate::present::Presenter;
use crate::reader::DemoReader;
use crate::runtime::{ColorMode, ColorScheme, GlyphMode};
use crate::scroll::Page;
use crate::terminal::{restore_terminal_best_effort, Terminal};
use crate::trail::Trail;
use crate::viewport::{CellSize, TerminalViewport, ViewportBinder, DEFAULT_CELL};

const HELP_TEMPLATE_PLAIN: &str = "\
{before-help}{about-with-newline}
USAGE:
  {usage}

{all-args}{after-help}";

const HELP_TEMPLATE_COLOR: &str = "\
{before-help}{about-with-newline}
\x1b[1;36mUSAGE:\x1b[0m
  {usage}

{all-args}{after-help}";

const WHEEL_LINES: f64 = 3.0;

/// Longest blocking wait while nothing is animating.
const IDLE_WAIT: Duration = Duration::from_secs(3600);

fn build_info() -> &'static str {
    env!("DRIPTRAIL_BUILD")
}

fn clap_styles() -> ClapStyles {
    ClapStyles::styled()
        .header(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Cyan))),
        )
        .usage(
            ClapStyle::new()
                .effects(ClapEffects::BOLD)
                .fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Green))),
        )
        .literal(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Yellow))))
        .placeholder(ClapStyle::new().fg_color(Some(ClapColor::Ansi(ClapAnsiColor::Magenta))))
}

fn require_f64_range(name: &str, v: f64, min: f64, max: f64) -> f64 {
    if !v.is_finite() {
        eprintln!("failed to apply {} {} (must be a finite number)", name, v);
        std::process::exit(1);
    }
    if v < min || v > max {
        eprintln!("failed to apply {} {} (min {} max {})", name, v, min, max);
        std::process::exit(1);
    }
    v
}

fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term == "dumb" {
        return ColorMode::Mono;
    }
    if term == "linux" || term.starts_with("vt") {
        return ColorMode::Color16;
    }

    ColorMode::Color256
}

fn detect_color_mode(args: &Args) -> ColorMode {
    if let Some(m) = args.colormode {
        return match m {
            0 => ColorMode::Mono,
            16 => ColorMode::Color16,
            8 | 256 => ColorMode::Color256,
            24 | 32 => ColorMode::TrueColor,
            _ => {
                eprintln!("invalid --colormode: {} (allowed: 0,16,8/256,24/32)", m);
                std::process::exit(1);
            }
        };
    }

    detect_color_mode_auto()
}

/// Frame pacing for the trail: at most one pending frame, due on the next
/// `1/fps` boundary after the previous one.
struct FrameClock {
    period: Duration,
    last_frame: Option<Instant>,
    pending: Option<Instant>,
}

impl FrameClock {
    fn new(fps: f64) -> Self {
        Self {
            period: Duration::from_secs_f64(1.0 / fps),
            last_frame: None,
            pending: None,
        }
    }

    fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    /// Consumes the pending frame if it is due.
    fn take_due(&mut self, now: Instant) -> bool {
        match self.pending {
            Some(at) if at <= now => {
                self.pending = None;
                self.last_frame = Some(now);
                true
            }
            _ => false,
        }
    }
}

impl FrameScheduler for FrameClock {
    fn request_frame(&mut self) {
        if self.pending.is_some() {
            return;
        }
        let now = Instant::now();
        let at = self
            .last_frame
            .map(|t| t + self.period)
            .filter(|&t| t > now)
            .unwrap_or(now);
        self.pending = Some(at);
    }
}

#[derive(Default)]
struct PerfStats {
    ticks: u64,
    running_ticks: u64,
    presents: u64,
    wakeups: u64,
    work_sum_s: f64,
    work_max_s: f64,
}

impl PerfStats {
    fn print(&self, elapsed: Duration, target_fps: f64) {
        let elapsed_s = elapsed.as_secs_f64().max(0.000_001);
        let presents = self.presents.max(1) as f64;
        let ticks = self.ticks.max(1) as f64;
        println!("PERF STATS:");
        println!("  elapsed_s: {:.3}", elapsed_s);
        println!("  target_fps: {:.3}", target_fps);
        println!("  frames: {}", self.ticks);
        println!(
            "  animating_frames: {} ({:.1}%)",
            self.running_ticks,
            self.running_ticks as f64 / ticks * 100.0
        );
        println!("  avg_fps: {:.3}", self.ticks as f64 / elapsed_s);
        println!("  presents: {}", self.presents);
        println!("  wakeups: {}", self.wakeups);
        println!("  avg_work_ms: {:.3}", self.work_sum_s / presents * 1000.0);
        println!("  max_work_ms: {:.3}", self.work_max_s * 1000.0);
    }
}

fn cell_size(args: &Args, term: &Terminal, cols: u16, lines: u16) -> CellSize {
    args.cell_size
        .or_else(|| {
            term.pixel_size()
                .and_then(|(pw, ph)| TerminalViewport::detect_cell(cols, lines, pw, ph))
        })
        .unwrap_or(DEFAULT_CELL)
}

fn main() -> std::io::Result<()> {
    std::panic::set_hook(Box::new(|info| {
        restore_terminal_best_effort();
        eprintln!("{}", info);
    }));

    #[cfg(unix)]
    {
        if let Ok(mut signals) = Signals::new([SIGINT, SIGTERM, SIGHUP]) {
            thread::spawn(move || {
                if let Some(sig) = signals.forever().next() {
                    restore_terminal_best_effort();
                    std::process::exit(128 + sig);
                }
            });
        }
    }

    #[cfg(windows)]
    {
        if let Err(e) = ctrlc::set_handler(|| {
            restore_terminal_best_effort();
            std::process::exit(130);
        }) {
            eprintln!("failed to install Ctrl-C handler: {}", e);
        }
    }

    env_logger::init();

    let mut cmd = Args::command();
    cmd = cmd.styles(clap_styles());
    cmd = cmd.before_help(default_params_usage_for_help());
    let help_template = if color_enabled_stdout() {
        HELP_TEMPLATE_COLOR
    } else {
        HELP_TEMPLATE_PLAIN
    };
    cmd = cmd.help_template(help_template);
    cmd.build();

    if cmd.get_arguments().any(|a| a.get_id().as_str() == "help") {
        cmd = cmd.mut_arg("help", |a| a.help_heading("HELP"));
    }
    cmd.build();

    let matches = cmd.get_matches();
    let args = Args::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    if args.list_colors {
        print_list_colors();
        return Ok(());
    }

    if args.help_detail {
        print_help_detail();
        return Ok(());
    }

    if args.check_bitcolor {
        let colorterm = env::var("COLORTERM").unwrap_or_default();
        let term = env::var("TERM").unwrap_or_default();
        let auto = detect_color_mode_auto();
        let effective = detect_color_mode(&args);

        println!("BITCOLOR CHECK:");
        println!(
            "  COLORTERM: {}",
            if colorterm.is_empty() {
                "(unset)"
            } else {
                &colorterm
            }
        );
        println!(
            "  TERM: {}",
            if term.is_empty() { "(unset)" } else { &term }
        );
        println!("  auto_detected: {}", auto.label());
        if args.colormode.is_some() {
            println!("  forced: {}", effective.label());
        }
        println!("  effective: {}", effective.label());
        return Ok(());
    }

    if args.version {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    if args.info {
        println!("Version: v{}", env!("CARGO_PKG_VERSION"));
        println!("Build: {}", build_info());
        println!("Copyright: (c) 2026 {}", env!("CARGO_PKG_AUTHORS"));
        println!("License: {}", env!("CARGO_PKG_LICENSE"));
        println!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
        return Ok(());
    }

    let color_mode = detect_color_mode(&args);
    let glyph_mode = match args.glyphs {
        Glyphs::HalfBlock => GlyphMode::HalfBlock,
        Glyphs::Ascii => GlyphMode::Ascii,
        Glyphs::Auto if default_to_ascii() => GlyphMode::Ascii,
        Glyphs::Auto => GlyphMode::HalfBlock,
    };

    let target_fps = require_f64_range("--fps", args.fps, 1.0, 240.0);
    let speed = require_f64_range("--speed", args.speed, 0.01, 1.0);
    let snap = require_f64_range("--snap", args.snap, 0.001, 10.0);
    let pages = require_f64_range("--pages", args.pages, 1.0, 100.0);
    let pixel_density = require_f64_range("--pixel-density", args.pixel_density, 0.25, 4.0);
    let duration_s = args.duration.and_then(|s| {
        if !s.is_finite() {
            eprintln!("failed to apply --duration {} (must be a finite number)", s);
            std::process::exit(1);
        }
        (s > 0.0).then(|| require_f64_range("--duration", s, 0.1, 86400.0))
    });

    let mut scheme = match ColorScheme::parse(&args.color) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut reduced_motion = args.reduced_motion || reduce_motion_env();

    info!(
        "theme {} color mode {} glyphs {:?} fps {} speed {} snap {} reduced motion {}",
        scheme.name(),
        color_mode.label(),
        glyph_mode,
        target_fps,
        speed,
        snap,
        reduced_motion
    );

    let mut term = Terminal::new()?;
    let (cols, lines) = term.size()?;
    let mut tv = TerminalViewport::new(
        cols,
        lines,
        cell_size(&args, &term, cols, lines),
        pixel_density,
    );
    info!("{}x{} cells of {}x{} units", tv.cols, tv.lines, tv.cell.w, tv.cell.h);

    let th = theme(scheme);
    let mut presenter = Presenter::new(
        color_mode,
        glyph_mode,
        th.background,
        args.color_bg == ColorBg::DefaultBackground,
    );
    let mut frame = Frame::new(tv.cols, tv.lines, presenter.blank_cell());
    let mut page = Page::new(pages, tv.viewport().height);
    let mut clock = FrameClock::new(target_fps);
    let mut trail = Trail::new(Easing { speed, epsilon: snap }, th.trail_style());
    trail.set_reduced_motion(reduced_motion);

    let start_time = Instant::now();
    let end_time = duration_s.map(|s| start_time + Duration::from_secs_f64(s));
    let mut reader = args.demo.then(|| DemoReader::new(args.seed, start_time));
    let mut perf = PerfStats::default();
    let mut presented: Option<u64> = None;

    trail.on_layout_changed(&tv, &mut clock);
    trail.on_scroll_changed(&mut clock);

    let mut running = true;
    while running {
        let now = Instant::now();
        if end_time.is_some_and(|end| now >= end) {
            break;
        }

        if presented != Some(trail.renders()) {
            let work_start = Instant::now();
            if let Some(surface) = trail.surface() {
                presenter.present(surface, &tv, &mut frame);
            }
            if frame.has_changes() {
                term.draw(&mut frame)?;
            }
            presented = Some(trail.renders());
            let work_s = work_start.elapsed().as_secs_f64();
            perf.presents += 1;
            perf.work_sum_s += work_s;
            perf.work_max_s = perf.work_max_s.max(work_s);
        }

        let deadline = [
            clock.deadline(),
            reader
                .as_ref()
                .map(|r| r.deadline(now, clock.period)),
            end_time,
        ]
        .into_iter()
        .flatten()
        .min();
        let timeout = deadline
            .map(|d| d.saturating_duration_since(now))
            .unwrap_or(IDLE_WAIT);

        let mut pending_resize: Option<(u16, u16)> = None;
        let mut scrolled = false;
        if Terminal::poll_event(timeout)? {
            perf.wakeups += 1;
            loop {
                let line = tv.cell.h as f64;
                let screen = tv.viewport().height;
                match Terminal::read_event()? {
                    Event::Resize(nw, nh) => pending_resize = Some((nw, nh)),
                    Event::Key(k) if k.kind == KeyEventKind::Press => {
                        if args.screensaver {
                            running = false;
                            break;
                        }
                        scrolled |= match k.code {
                            KeyCode::Esc | KeyCode::Char('q') => {
                                running = false;
                                false
                            }
                            KeyCode::Up | KeyCode::Char('k') => page.scroll_by(-line),
                            KeyCode::Down | KeyCode::Char('j') => page.scroll_by(line),
                            KeyCode::PageUp => page.scroll_by(-screen),
                            KeyCode::PageDown | KeyCode::Char(' ') => page.scroll_by(screen),
                            KeyCode::Home => page.scroll_to(0.0),
                            KeyCode::End => page.scroll_to(page.extent()),
                            KeyCode::Char('m') => {
                                reduced_motion = !reduced_motion;
                                debug!("reduced motion {}", reduced_motion);
                                false
                            }
                            KeyCode::Char('c') => {
                                scheme = scheme.next();
                                let th = theme(scheme);
                                debug!("theme {}", scheme.name());
                                presenter.set_background(th.background);
                                frame.reset(presenter.blank_cell());
                                trail.set_style(th.trail_style());
                                false
                            }
                            KeyCode::Char('d') => {
                                reader = match reader {
                                    Some(_) => None,
                                    None => Some(DemoReader::new(args.seed, Instant::now())),
                                };
                                debug!("demo reader {}", reader.is_some());
                                false
                            }
                            _ => false,
                        };
                    }
                    Event::Mouse(m) => {
                        scrolled |= match m.kind {
                            MouseEventKind::ScrollUp => page.scroll_by(-line * WHEEL_LINES),
                            MouseEventKind::ScrollDown => page.scroll_by(line * WHEEL_LINES),
                            _ => false,
                        };
                    }
                    _ => {}
                }
                if !running || !Terminal::poll_event(Duration::from_millis(0))? {
                    break;
                }
            }
        }

        if !running {
            break;
        }

        if let Some((nw, nh)) = pending_resize {
            tv.resize(nw, nh);
            if args.cell_size.is_none() {
                tv.cell = cell_size(&args, &term, tv.cols, tv.lines);
            }
            page.set_viewport_height(tv.viewport().height);
            frame = Frame::new(tv.cols, tv.lines, presenter.blank_cell());
            presented = None;
            trail.on_layout_changed(&tv, &mut clock);
        }

        let now = Instant::now();
        if let Some(r) = reader.as_mut() {
            scrolled |= r.step(now, &mut page, tv.cell.h as f64);
        }
        if scrolled {
            trace!("scroll offset {:.1} of {:.1}", page.offset(), page.extent());
            trail.on_scroll_changed(&mut clock);
        }

        if clock.take_due(now) {
            trail.set_reduced_motion(reduced_motion);
            trail.tick(&page, &mut clock);
            perf.ticks += 1;
            if trail.state().phase() == Phase::Running {
                perf.running_ticks += 1;
            }
        }
    }

    drop(term);
    if args.perf_stats {
        perf.print(start_time.elapsed(), target_fps);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_keeps_a_single_pending_frame() {
        let mut clock = FrameClock::new(60.0);
        assert!(clock.deadline().is_none());
        clock.request_frame();
        let first = clock.deadline();
        clock.request_frame();
        assert_eq!(clock.deadline(), first);
    }

    #[test]
    fn clock_paces_frames_by_period() {
        let mut clock = FrameClock::new(10.0);
        clock.request_frame();
        let now = Instant::now();
        assert!(clock.take_due(now));
        assert!(!clock.take_due(now));

        clock.request_frame();
        let next = clock.deadline().unwrap();
        assert!(next > now);
        assert!(!clock.take_due(now));
        assert!(clock.take_due(next));
    }
}
