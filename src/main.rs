use gpu_frame_analyzer::config::{AnalyzerSettings, ThresholdOverrides};
use gpu_frame_analyzer::{report, Analyzer, FrameCapture, PresetResolver};
use std::path::PathBuf;
use std::{env, fs, process};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: gpu_frame_analyzer <capture.json> [--preset NAME] [--overrides FILE.toml] [--settings FILE.toml] [--json]";

struct CliArgs {
    capture: PathBuf,
    preset: Option<String>,
    overrides: Option<PathBuf>,
    settings: Option<PathBuf>,
    json: bool,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs, String> {
    let mut capture = None;
    let mut preset = None;
    let mut overrides = None;
    let mut settings = None;
    let mut json = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--preset" => preset = Some(args.next().ok_or("--preset needs a value")?),
            "--overrides" => overrides = Some(PathBuf::from(args.next().ok_or("--overrides needs a path")?)),
            "--settings" => settings = Some(PathBuf::from(args.next().ok_or("--settings needs a path")?)),
            "--json" => json = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("--") => return Err(format!("Unknown option '{}'\n{}", flag, USAGE)),
            path if capture.is_none() => capture = Some(PathBuf::from(path)),
            extra => return Err(format!("Unexpected argument '{}'\n{}", extra, USAGE)),
        }
    }

    Ok(CliArgs {
        capture: capture.ok_or(USAGE)?,
        preset,
        overrides,
        settings,
        json,
    })
}

fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => AnalyzerSettings::from_toml_file(path)?,
        None => AnalyzerSettings::default(),
    };
    if let Some(preset) = args.preset {
        settings.preset = Some(preset);
    }
    if let Some(path) = &args.overrides {
        settings.overrides = ThresholdOverrides::from_toml_str(&fs::read_to_string(path)?)?;
    }

    let frame = FrameCapture::from_json_str(&fs::read_to_string(&args.capture)?)?;
    let result = Analyzer::new(settings).analyze(&frame)?;

    if args.json {
        println!("{}", report::to_json(&result)?);
    } else {
        print!("{}", report::render_text(&result, &frame));
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            eprintln!("Available presets: {}", PresetResolver::available_presets().join(", "));
            process::exit(2);
        }
    };

    if let Err(e) = run(args) {
        eprintln!("Analysis failed: {}", e);
        process::exit(1);
    }
}
