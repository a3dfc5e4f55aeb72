use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fracview",
    author,
    version,
    about = "Interactive GPU fractal explorer",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Formula id to open with (see `--list-formulas`).
    #[arg(value_name = "FORMULA", default_value = "mandelbrot")]
    pub formula: String,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size)]
    pub size: Option<(u32, u32)>,

    /// Render with 2x2 supersampling.
    #[arg(long)]
    pub ssaa: bool,

    /// Iteration budget; formulas may override with their own default.
    #[arg(long, value_name = "COUNT", default_value_t = 250)]
    pub max_iterations: u32,

    /// Starting palette index.
    #[arg(long, value_name = "INDEX", default_value_t = 0)]
    pub palette: usize,

    /// Length of a triggered video capture.
    #[arg(long, value_name = "SECONDS", default_value_t = 5.0)]
    pub capture_seconds: f32,

    /// Base URL of the frame-encoding service.
    #[arg(
        long,
        value_name = "URL",
        env = "FRACVIEW_FRAME_SERVER",
        default_value = "http://localhost:3210"
    )]
    pub frame_server: String,

    /// Spread of the parameter randomizer (R key).
    #[arg(long, value_name = "SPREAD", default_value_t = 0.4)]
    pub randomize_spread: f32,

    /// Print the formula catalog and exit.
    #[arg(long)]
    pub list_formulas: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got `{value}`"))?;
    let width = width
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid width: {err}"))?;
    let height = height
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("invalid height: {err}"))?;
    if width == 0 || height == 0 {
        return Err("window dimensions must be non-zero".to_string());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_parses_both_separators() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size("1920X1080").unwrap(), (1920, 1080));
    }

    #[test]
    fn size_rejects_garbage() {
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn defaults_are_applied() {
        let cli = Cli::parse_from(["fracview"]);
        assert_eq!(cli.formula, "mandelbrot");
        assert_eq!(cli.max_iterations, 250);
        assert!(!cli.ssaa);
    }
}
