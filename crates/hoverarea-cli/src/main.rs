use hoverarea_core::geom::size;
use hoverarea_core::{
    DEFAULT_SELECTOR, FixedMeasurer, OverlayBuilder, OverlayOptions, OverlayReport,
    transform_html_with,
};
use std::io::Read;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Hoverarea(hoverarea_core::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Hoverarea(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<hoverarea_core::Error> for CliError {
    fn from(value: hoverarea_core::Error) -> Self {
        Self::Hoverarea(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

impl CliError {
    /// Bad arguments (including unparsable options or selectors) exit with 2, everything
    /// else with 1.
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) | CliError::Hoverarea(_) => 2,
            CliError::Io(_) | CliError::Json(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ImageSize {
    width: i64,
    height: i64,
}

impl std::str::FromStr for ImageSize {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or(())?;
        let width = w.trim().parse::<i64>().map_err(|_| ())?;
        let height = h.trim().parse::<i64>().map_err(|_| ())?;
        if width < 0 || height < 0 {
            return Err(());
        }
        Ok(Self { width, height })
    }
}

#[derive(Debug, Default)]
struct Args {
    input: Option<String>,
    selector: Option<String>,
    options: Option<String>,
    options_file: Option<String>,
    image_size: Option<ImageSize>,
    report: bool,
    out: Option<String>,
}

fn usage() -> &'static str {
    "hoverarea-cli\n\
\n\
USAGE:\n\
  hoverarea-cli [--selector <css>] [--options <json>] [--options-file <path>] [--image-size <W>x<H>] [--report] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - The selector defaults to 'img[usemap], map'.\n\
  - Options are a JSON5 object; --options and --options-file are mutually exclusive.\n\
  - Without --image-size, wrapper sizes come from the image's width/height attributes or inline style.\n\
  - The transformed HTML is printed to stdout unless --out is given.\n\
  - --report prints a JSON summary of every processed element to stderr.\n\
  - Set RUST_LOG (e.g. RUST_LOG=hoverarea_core=debug) to see why elements were skipped.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--report" => args.report = true,
            "--selector" => {
                let Some(selector) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.selector = Some(selector.clone());
            }
            "--options" => {
                let Some(options) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options = Some(options.clone());
            }
            "--options-file" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.options_file = Some(path.clone());
            }
            "--image-size" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.image_size = Some(
                    raw.parse::<ImageSize>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    if args.options.is_some() && args.options_file.is_some() {
        return Err(CliError::Usage(usage()));
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None | Some("-") => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn write_report(report: &OverlayReport) -> Result<(), CliError> {
    serde_json::to_writer_pretty(std::io::stderr().lock(), report)?;
    eprintln!();
    Ok(())
}

fn load_options(args: &Args) -> Result<OverlayOptions, CliError> {
    let text = match (&args.options, &args.options_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Ok(OverlayOptions::default()),
    };
    Ok(OverlayOptions::from_json_str(&text)?)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run(args: Args) -> Result<(), CliError> {
    let options = load_options(&args)?;
    let html = read_input(args.input.as_deref())?;
    let selector = args.selector.as_deref().unwrap_or(DEFAULT_SELECTOR);

    let builder = OverlayBuilder::new(options);
    let (out, report) = match args.image_size {
        Some(ImageSize { width, height }) => transform_html_with(
            &html,
            selector,
            builder.with_measurer(FixedMeasurer(size(width, height))),
        )?,
        None => transform_html_with(&html, selector, builder)?,
    };
    tracing::info!(
        targets = report.targets.len(),
        overlays = report.overlay_count(),
        "overlay pass finished"
    );

    write_text(&out, args.out.as_deref())?;
    if args.report {
        write_report(&report)?;
    }
    Ok(())
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(err.exit_code());
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("hoverarea-cli")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn parses_all_flags() {
        let args = parse_args(&argv(&[
            "--selector",
            "#demo img",
            "--options",
            "{wrap_image_element: true}",
            "--image-size",
            "300x200",
            "--report",
            "--out",
            "out.html",
            "page.html",
        ]))
        .unwrap();
        assert_eq!(args.selector.as_deref(), Some("#demo img"));
        assert_eq!(args.options.as_deref(), Some("{wrap_image_element: true}"));
        assert_eq!(
            args.image_size,
            Some(ImageSize {
                width: 300,
                height: 200
            })
        );
        assert!(args.report);
        assert_eq!(args.out.as_deref(), Some("out.html"));
        assert_eq!(args.input.as_deref(), Some("page.html"));
    }

    #[test]
    fn rejects_bad_arguments() {
        for bad in [
            &["--image-size", "300"][..],
            &["--image-size", "-1x20"],
            &["--selector"],
            &["--unknown"],
            &["a.html", "b.html"],
            &["--options", "{}", "--options-file", "o.json"],
        ] {
            let err = parse_args(&argv(bad)).unwrap_err();
            assert!(matches!(err, CliError::Usage(_)), "{bad:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn invalid_options_are_a_usage_error() {
        let args = parse_args(&argv(&["--options", "{wrap_image_element: 'yes'}"])).unwrap();
        let err = load_options(&args).unwrap_err();
        assert!(matches!(err, CliError::Hoverarea(_)));
        assert_eq!(err.exit_code(), 2);
    }
}
