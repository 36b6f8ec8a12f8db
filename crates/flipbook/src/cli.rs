use std::process::ExitCode;

use clap::Parser;
use renderer::BufferMode;

/// Exit status for bad or missing arguments.
pub const USAGE_EXIT: u8 = 1;

const USAGE: &str = "flipbook <width> <height> <d|s>";

const PRESETS: &str = "\
Typical sizes:
  640 480      video
  1024 554     half-res film, 1.85:1
  1024 778     half-res film, full aperture
  2048 1107    full-res film, 1.85:1
  2048 1556    full-res film, full aperture
  1828 1371    academy
  1828 685     anamorphic (unsqueezed)

Press Escape in the window to quit.";

#[derive(Parser, Debug)]
#[command(
    name = "flipbook",
    version,
    about = "Flip through striped test frames as fast as possible to expose tearing",
    override_usage = USAGE,
    after_help = PRESETS
)]
pub struct Cli {
    /// Window width in pixels (at least 100).
    #[arg(value_name = "width", value_parser = clap::value_parser!(u32).range(100..))]
    pub width: u32,

    /// Window height in pixels (at least 100).
    #[arg(value_name = "height", value_parser = clap::value_parser!(u32).range(100..))]
    pub height: u32,

    /// `d` for double buffering; anything else draws single-buffered.
    #[arg(value_name = "d|s", value_parser = parse_buffer_mode, allow_hyphen_values = true)]
    pub mode: BufferMode,
}

/// Parses the process arguments. On failure the message has already been
/// printed and the returned code is what the process should exit with.
pub fn parse() -> Result<Cli, ExitCode> {
    Cli::try_parse().map_err(|err| {
        if err.use_stderr() {
            eprint!("{}", usage_report(&err));
            ExitCode::from(USAGE_EXIT)
        } else {
            let _ = err.print();
            ExitCode::SUCCESS
        }
    })
}

/// The clap message, with the usage line appended when clap left it out
/// (value validation errors don't carry one).
pub fn usage_report(err: &clap::Error) -> String {
    let mut report = err.render().to_string();
    if !report.contains("Usage:") {
        if !report.ends_with('\n') {
            report.push('\n');
        }
        report.push_str(&format!("\nUsage: {USAGE}\n"));
    }
    report
}

pub fn parse_buffer_mode(value: &str) -> Result<BufferMode, String> {
    Ok(BufferMode::from_flag(value))
}
