// main.rs      gifparse command
//
// Copyright (c) 2019-2024  Douglas Lau
//
#![forbid(unsafe_code)]

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use gifparse::block::{DisposalMethod, GraphicRenderingBlock};
use gifparse::ParsedGif;
use std::error::Error;
use std::ffi::OsStr;
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Crate version
const VERSION: &str = std::env!("CARGO_PKG_VERSION");

/// Main entry point
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder().format_timestamp(None).init();
    let mut out = StandardStream::stdout(ColorChoice::Auto);
    match create_app().get_matches().subcommand() {
        ("show", Some(matches)) => show(&mut out, matches)?,
        ("dump", Some(matches)) => dump(&mut out, matches)?,
        ("comments", Some(matches)) => comments(&mut out, matches)?,
        _ => unreachable!("subcommand required"),
    }
    out.reset()?;
    Ok(())
}

/// Create clap App
fn create_app() -> App<'static, 'static> {
    App::new("gifparse")
        .version(VERSION)
        .setting(AppSettings::GlobalVersion)
        .about("GIF block structure utility")
        .setting(AppSettings::ArgRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("show")
                .about("Show GIF frame table")
                .arg(
                    Arg::with_name("files")
                        .required(true)
                        .min_values(1)
                        .help("input file(s)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("dump")
                .about("Dump every block of a GIF")
                .arg(Arg::with_name("file").required(true).help("input file")),
        )
        .subcommand(
            SubCommand::with_name("comments")
                .about("Print comment extensions of a GIF")
                .arg(Arg::with_name("file").required(true).help("input file")),
        )
}

/// Get the required `file` argument
fn file_arg<'a>(matches: &'a ArgMatches) -> Result<&'a OsStr, Box<dyn Error>> {
    matches.value_of_os("file").ok_or_else(|| "missing file".into())
}

/// Handle show subcommand
fn show(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let values = matches.values_of_os("files").ok_or("missing files")?;
    for path in values {
        show_file(out, path)?;
    }
    Ok(())
}

/// Handle dump subcommand
fn dump(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let gif = gifparse::open(file_arg(matches)?)?;
    write!(out, "{gif}")?;
    Ok(())
}

/// Handle comments subcommand
fn comments(
    out: &mut StandardStream,
    matches: &ArgMatches,
) -> Result<(), Box<dyn Error>> {
    let gif = gifparse::open(file_arg(matches)?)?;
    let mut cyan = ColorSpec::new();
    cyan.set_fg(Some(Color::Cyan)).set_intense(true);
    let mut dflt = ColorSpec::new();
    dflt.set_fg(Some(Color::White));
    for comment in gif.comments() {
        out.set_color(&cyan)?;
        write!(out, "{:#08x}", comment.offset())?;
        out.set_color(&dflt)?;
        writeln!(out, " {}", comment.text())?;
    }
    Ok(())
}

/// Get the trimmed, non-empty comment lines of a GIF
fn comment_lines(gif: &ParsedGif) -> Vec<String> {
    let mut lines = vec![];
    for cmt in gif.comments() {
        for l in cmt.text().split('\n') {
            let l = l.trim();
            if !l.is_empty() {
                lines.push(l.to_string());
            }
        }
    }
    lines
}

/// Show one GIF file
fn show_file(
    out: &mut StandardStream,
    path: &OsStr,
) -> Result<(), Box<dyn Error>> {
    let mut magenta = ColorSpec::new();
    magenta.set_fg(Some(Color::Magenta));
    let mut yellow = ColorSpec::new();
    yellow.set_fg(Some(Color::Yellow)).set_intense(true);
    let mut cyan = ColorSpec::new();
    cyan.set_fg(Some(Color::Cyan)).set_intense(true);
    let mut bold = ColorSpec::new();
    bold.set_fg(Some(Color::White))
        .set_intense(true)
        .set_bold(true);
    let gif = gifparse::open(path)?;
    let frames = gif.frames();
    let frame_digits = digits(frames.len()).max(3);
    let screen = gif.screen_desc();
    let width = screen.screen_width();
    let height = screen.screen_height();
    let size_digits = 4.max(1 + digits(width) + digits(height));
    out.set_color(&magenta)?;
    writeln!(out, "{path:?}")?;
    out.set_color(&bold)?;
    write!(out, "{}, frames: {}", gif.header(), frames.len())?;
    if let Some(c) = gif.loop_count() {
        write!(out, ", repeat: ")?;
        if c == 0 {
            write!(out, "∞")?;
        } else {
            write!(out, "{c}")?;
        }
    }
    writeln!(out)?;
    out.set_color(&cyan)?;
    for c in comment_lines(&gif) {
        writeln!(out, "  # {c}")?;
    }
    out.set_color(&yellow)?;
    write!(out, " {:>w$}", "Fr#", w = frame_digits)?;
    write!(out, "  Delay Disp")?;
    write!(out, " {:>w$}", "Size", w = size_digits)?;
    write!(out, " {:>w$}", "X,Y", w = size_digits)?;
    writeln!(out, " Clrs Trn")?;
    let table = FrameTable {
        width,
        height,
        global_clr: screen.color_table_config().len(),
        frame_digits,
        size_digits,
    };
    for (n, f) in frames.iter().enumerate() {
        table.show_frame(out, f, n)?;
    }
    Ok(())
}

/// Column layout for a frame table
struct FrameTable {
    width: u16,
    height: u16,
    global_clr: usize,
    frame_digits: usize,
    size_digits: usize,
}

impl FrameTable {
    /// Show one frame of a GIF file
    fn show_frame(
        &self,
        out: &mut StandardStream,
        frame: &GraphicRenderingBlock,
        number: usize,
    ) -> Result<(), Box<dyn Error>> {
        let mut dflt = ColorSpec::new();
        dflt.set_fg(Some(Color::White));
        let mut bold = ColorSpec::new();
        bold.set_fg(Some(Color::White))
            .set_intense(true)
            .set_bold(true);
        let mut red = ColorSpec::new();
        red.set_fg(Some(Color::Red)).set_intense(true);
        let desc = &frame.image_desc;
        let gc = frame.graphic_control_ext.as_ref();
        out.set_color(&dflt)?;
        let interlaced = if desc.interlaced() { 'i' } else { ' ' };
        write!(out, "{interlaced}")?;
        out.set_color(&bold)?;
        write!(out, "{:>w$}", number, w = self.frame_digits)?;
        let d = gc.map_or(0, |gc| gc.delay_time_cs());
        if d == 0 {
            out.set_color(&dflt)?;
        }
        write!(out, " {:6.2}", f32::from(d) / 100.0)?;
        let d = match gc.map(|gc| gc.disposal_method()) {
            Some(DisposalMethod::Unspecified) => "none",
            Some(DisposalMethod::DoNotDispose) => "keep",
            Some(DisposalMethod::RestoreBackground) => "bg",
            Some(DisposalMethod::RestorePrevious) => "prev",
            Some(DisposalMethod::Reserved(_)) => "res",
            None => "-",
        };
        out.set_color(match d {
            "none" | "-" => &dflt,
            "res" => &red,
            _ => &bold,
        })?;
        write!(out, " {d:>4}")?;
        if self.width == desc.width() && self.height == desc.height() {
            out.set_color(&dflt)?;
        } else {
            out.set_color(&bold)?;
        }
        write!(
            out,
            " {:>w$}",
            format!("{}x{}", desc.width(), desc.height()),
            w = self.size_digits
        )?;
        if desc.left() == 0 && desc.top() == 0 {
            out.set_color(&dflt)?;
        } else {
            out.set_color(&bold)?;
        }
        write!(
            out,
            " {:>w$}",
            format!("{},{}", desc.left(), desc.top()),
            w = self.size_digits
        )?;
        let c = desc.color_table_config().len();
        if c > 0 {
            out.set_color(&bold)?;
            write!(out, "  {c:3}")?;
        } else {
            out.set_color(&dflt)?;
            write!(out, " {:3}g", self.global_clr)?;
        }
        let tc = match gc.and_then(|gc| gc.transparent_color()) {
            Some(tc) => tc.to_string(),
            None => "-".to_string(),
        };
        if tc == "-" {
            out.set_color(&dflt)?;
        } else {
            out.set_color(&bold)?;
        }
        writeln!(out, " {tc:>3}")?;
        Ok(())
    }
}

/// Calculate digits in a number
fn digits<T: Into<usize>>(v: T) -> usize {
    let v = v.into();
    match v {
        0..=9 => 1,
        10..=99 => 2,
        100..=999 => 3,
        1000..=9999 => 4,
        _ => 5,
    }
}
