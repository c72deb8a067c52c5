use clap::Parser;

use holobox::gpu::QuiltLayout;
use holobox::input::hand::DEFAULT_HAND_ADDR;
use holobox::scene::DEFAULT_POINT_COUNT;
use holobox::{Demo, RenderMode};

/// Interactive particle box for lenticular displays.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Render a single flat view instead of a stereo quilt.
    #[arg(long)]
    flat: bool,

    /// Number of point bodies in the box.
    #[arg(long, default_value_t = DEFAULT_POINT_COUNT)]
    points: u32,

    /// Address of the hand-tracking bridge.
    #[arg(long, default_value = DEFAULT_HAND_ADDR)]
    hand_addr: String,

    /// Quilt grid as COLSxROWS.
    #[arg(long, default_value = "8x6", value_parser = parse_grid)]
    quilt: (u32, u32),

    /// Horizontal view cone of the quilt in degrees.
    #[arg(long, default_value_t = 40.0)]
    view_cone: f32,
}

fn parse_grid(s: &str) -> Result<(u32, u32), String> {
    let (cols, rows) = s
        .split_once('x')
        .ok_or_else(|| format!("expected COLSxROWS, got {:?}", s))?;
    let cols: u32 = cols.parse().map_err(|_| format!("bad column count {:?}", cols))?;
    let rows: u32 = rows.parse().map_err(|_| format!("bad row count {:?}", rows))?;
    if cols == 0 || rows == 0 {
        return Err("quilt grid must be at least 1x1".to_string());
    }
    Ok((cols, rows))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let render_mode = if args.flat {
        RenderMode::Flat
    } else {
        RenderMode::Quilt(QuiltLayout {
            cols: args.quilt.0,
            rows: args.quilt.1,
            view_cone: args.view_cone.to_radians(),
        })
    };

    let demo = Demo::new()
        .with_point_count(args.points)
        .with_render_mode(render_mode)
        .with_hand_addr(&args.hand_addr);

    if let Err(e) = demo.run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_grid() {
        assert_eq!(parse_grid("8x6"), Ok((8, 6)));
        assert_eq!(parse_grid("1x1"), Ok((1, 1)));
        assert!(parse_grid("8").is_err());
        assert!(parse_grid("0x6").is_err());
        assert!(parse_grid("ax6").is_err());
    }

    #[test]
    fn test_args_parse_defaults() {
        let args = Args::parse_from(["holobox"]);
        assert!(!args.flat);
        assert_eq!(args.points, DEFAULT_POINT_COUNT);
        assert_eq!(args.quilt, (8, 6));
    }
}
