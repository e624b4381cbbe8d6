// Author: Dustin Pilgrim
// License: MIT

use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

use scrim_core::{PixelFormat, Rect};

#[derive(Debug, Parser)]
#[command(name = "scrim", version, about = "scrim - blurred, dimmed backdrops behind popups")]
pub struct Args {
    /// Log to stderr (in addition to the log file)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Override log file path (default: $XDG_STATE_HOME/scrim/scrim.log)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Override config path (default: $XDG_CONFIG_HOME/scrim/scrim.rune)
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Debug, Subcommand)]
pub enum Cmd {
    /// Render the backdrop over a screenshot and write the result
    Render {
        /// Image standing in for the screen
        #[arg(long)]
        screen: PathBuf,

        /// Where to write the composed image
        #[arg(long, short = 'o')]
        out: PathBuf,

        #[command(flatten)]
        anchors: AnchorArgs,

        #[command(flatten)]
        look: LookArgs,
    },

    /// Print the resolved region for a screen size without rendering
    Region {
        /// Screen size, WIDTHxHEIGHT
        #[arg(long, value_parser = parse_size)]
        size: (i32, i32),

        /// Status bar height to keep out of the blur viewport
        #[arg(long)]
        top_inset: Option<i32>,

        #[command(flatten)]
        anchors: AnchorArgs,
    },
}

/// Anchor boxes, each X,Y,W,H in screen pixels.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct AnchorArgs {
    /// Darken right of this box
    #[arg(long, value_parser = parse_box)]
    pub right_of: Option<Rect>,

    /// Darken left of this box
    #[arg(long, value_parser = parse_box)]
    pub left_of: Option<Rect>,

    /// Darken above this box
    #[arg(long, value_parser = parse_box)]
    pub above: Option<Rect>,

    /// Darken below this box
    #[arg(long, value_parser = parse_box)]
    pub below: Option<Rect>,

    /// Darken exactly this box
    #[arg(long, value_parser = parse_box)]
    pub fill: Option<Rect>,
}

/// Overrides for the config file.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct LookArgs {
    /// Blur radius (negative = 0)
    #[arg(long, allow_hyphen_values = true)]
    pub radius: Option<i32>,

    /// Down-scale factor before blurring (below 1.0 = 1.0)
    #[arg(long)]
    pub down_scale: Option<f32>,

    /// Use the accelerated blur instead of the software kernel
    #[arg(long)]
    pub hardware: bool,

    /// Only dim, don't blur
    #[arg(long)]
    pub no_blur: bool,

    /// Darken tint, #RRGGBB or #AARRGGBB
    #[arg(long)]
    pub dark_colour: Option<String>,

    /// Status bar height to keep out of the blur viewport
    #[arg(long)]
    pub top_inset: Option<i32>,

    /// Pixel format the screen is captured in
    #[arg(long, value_enum)]
    pub format: Option<PixelFormat>,

    /// Log blur timings and allocations
    #[arg(long)]
    pub debug: bool,
}

pub fn parse_box(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected X,Y,W,H, got \"{s}\""));
    }

    let mut v = [0i32; 4];
    for (slot, part) in v.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("\"{part}\" is not an integer"))?;
    }

    if v[2] < 0 || v[3] < 0 {
        return Err(format!("negative size in \"{s}\""));
    }

    Ok(Rect::from_xywh(v[0], v[1], v[2], v[3]))
}

pub fn parse_size(s: &str) -> Result<(i32, i32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got \"{s}\""))?;
    let w: i32 = w.trim().parse().map_err(|_| format!("bad width \"{w}\""))?;
    let h: i32 = h.trim().parse().map_err(|_| format!("bad height \"{h}\""))?;
    if w <= 0 || h <= 0 {
        return Err("screen size must be positive".into());
    }
    Ok((w, h))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_boxes() {
        assert_eq!(parse_box("100, 100,200,50"), Ok(Rect::from_xywh(100, 100, 200, 50)));
        assert!(parse_box("1,2,3").is_err());
        assert!(parse_box("1,2,-3,4").is_err());
        assert!(parse_box("a,2,3,4").is_err());
    }

    #[test]
    fn parses_sizes() {
        assert_eq!(parse_size("1080x1920"), Ok((1080, 1920)));
        assert_eq!(parse_size("640X480"), Ok((640, 480)));
        assert!(parse_size("0x10").is_err());
        assert!(parse_size("1080").is_err());
    }

    #[test]
    fn cli_accepts_render() {
        let args = Args::try_parse_from([
            "scrim", "render", "--screen", "in.png", "-o", "out.png", "--below", "0,0,10,10",
            "--radius", "-3", "--format", "rgb8",
        ])
        .unwrap();

        match args.cmd {
            Cmd::Render { anchors, look, .. } => {
                assert_eq!(anchors.below, Some(Rect::from_xywh(0, 0, 10, 10)));
                assert_eq!(look.radius, Some(-3));
                assert_eq!(look.format, Some(PixelFormat::Rgb8));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
