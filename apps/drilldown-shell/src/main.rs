mod decode;

use dd_core::DrillError;
use dd_core::DrillResult;
use dd_nav::Location;
use dd_nav::NavigationEvent;
use dd_overlay::NavigationDispatcher;
use dd_overlay::OverlayPolicy;
use dd_svg::SvgParser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_LEVEL: &str = "warn";
const USAGE: &str = "usage: drilldown-shell <file.svg> <url-or-#hash> [--event pageshow|hashchange|popstate] [--marker CLASS]";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ShellArgs {
    svg_path: PathBuf,
    location: String,
    event: NavigationEvent,
    marker: Option<String>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var(EnvFilter::DEFAULT_ENV).ok()))
        .with_writer(std::io::stderr)
        .init();

    match run(std::env::args().skip(1)) {
        Ok(markup) => {
            println!("{markup}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("drilldown-shell error: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Filter from `RUST_LOG` directives; missing or unparsable directives fall back to `warn`.
fn log_filter(directives: Option<String>) -> EnvFilter {
    directives
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

fn run(args: impl Iterator<Item = String>) -> DrillResult<String> {
    let args = parse_args(args)?;

    let mut policy = OverlayPolicy::default();
    if let Some(marker) = args.marker {
        policy.marker_class = marker;
    }
    let dispatcher = NavigationDispatcher::new(policy)?;

    let body = std::fs::read(&args.svg_path).map_err(|error| {
        DrillError::new(
            "shell.read_failed",
            format!("failed to read `{}`: {error}", args.svg_path.display()),
        )
    })?;
    let source = decode::decode_svg_bytes(&body);
    let mut document = SvgParser.parse(&source)?;
    let location = Location::from_input(&args.location)?;

    match dispatcher.dispatch(args.event, &location, &mut document) {
        Some(report) => {
            let hidden: Vec<&str> = report
                .hidden
                .iter()
                .filter_map(|node| document.element(*node))
                .map(|element| element.id.as_deref().unwrap_or(element.tag.as_str()))
                .collect();
            info!(
                event = args.event.as_str(),
                hash = location.hash(),
                hidden = ?hidden,
                skipped = ?report.skipped,
                "overlay resolution finished"
            );
        }
        None => warn!(event = args.event.as_str(), "event ignored by policy"),
    }

    Ok(dd_svg::serialize(&document))
}

fn parse_args(args: impl Iterator<Item = String>) -> DrillResult<ShellArgs> {
    let mut positional = Vec::new();
    let mut event = NavigationEvent::PageShow;
    let mut marker = None;
    let mut args = args;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--event" => {
                let name = args.next().ok_or_else(|| usage_error("missing value after --event"))?;
                event = NavigationEvent::from_event_name(&name).ok_or_else(|| {
                    usage_error(&format!(
                        "unsupported event `{name}` (expected: pageshow|hashchange|popstate)"
                    ))
                })?;
            }
            "--marker" => {
                marker = Some(
                    args.next()
                        .ok_or_else(|| usage_error("missing value after --marker"))?,
                );
            }
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let (Some(svg_path), Some(location), None) =
        (positional.next(), positional.next(), positional.next())
    else {
        return Err(usage_error("expected exactly two positional arguments"));
    };

    Ok(ShellArgs {
        svg_path: PathBuf::from(svg_path),
        location,
        event,
        marker,
    })
}

fn usage_error(detail: &str) -> DrillError {
    DrillError::new("shell.usage", format!("{detail}\n{USAGE}"))
}

#[cfg(test)]
mod tests {
    use super::log_filter;
    use super::parse_args;
    use super::run;
    use crate::decode::decode_svg_bytes;
    use crate::decode::parse_encoding_from_xml_declaration;
    use dd_nav::NavigationEvent;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter()
            .map(|arg| (*arg).to_owned())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn log_filter_falls_back_to_warn() {
        assert_eq!(log_filter(None).to_string(), "warn");
        assert_eq!(log_filter(Some("dd_overlay=loud".to_owned())).to_string(), "warn");
        assert_eq!(log_filter(Some("dd_overlay=debug".to_owned())).to_string(), "dd_overlay=debug");
    }

    #[test]
    fn parses_positional_and_flag_arguments() {
        let parsed = parse_args(args(&["map.svg", "#g2", "--event", "hashchange"]));
        let parsed = match parsed {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(parsed.location, "#g2");
        assert_eq!(parsed.event, NavigationEvent::HashChange);
        assert_eq!(parsed.marker, None);
    }

    #[test]
    fn rejects_bad_arguments() {
        let cases: [&[&str]; 4] = [
            &["map.svg"],
            &["map.svg", "#g", "extra"],
            &["map.svg", "#g", "--event", "load"],
            &["map.svg", "#g", "--marker"],
        ];
        for case in cases {
            let result = parse_args(args(case));
            assert!(
                matches!(result, Err(ref error) if error.code == "shell.usage"),
                "case: {case:?}"
            );
        }
    }

    #[test]
    fn reports_missing_file() {
        let result = run(args(&["/nonexistent/drilldown/map.svg", "#g2"]));
        assert!(matches!(result, Err(error) if error.code == "shell.read_failed"));
    }

    #[test]
    fn runs_end_to_end_on_a_file() {
        let path = std::env::temp_dir().join(format!("drilldown-shell-{}.svg", std::process::id()));
        let source = r#"<svg><g id="g1"><g id="g2"/><a id="z" class="obscures"/></g></svg>"#;
        if let Err(error) = std::fs::write(&path, source) {
            panic!("{error}");
        }

        let path_arg = path.to_string_lossy().into_owned();
        let output = run(args(&[path_arg.as_str(), "https://example.com/map.svg#g2"]));
        let _ = std::fs::remove_file(&path);

        let output = match output {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        };
        assert!(output.contains(r#"<a id="z" class="obscures" style="display:none"/>"#));
    }

    #[test]
    fn reads_encoding_from_xml_declaration() {
        let label = parse_encoding_from_xml_declaration(
            br#"<?xml version="1.0" encoding = 'ISO-8859-1'?><svg/>"#,
        );
        assert_eq!(label.as_deref(), Some("ISO-8859-1"));
        assert_eq!(parse_encoding_from_xml_declaration(b"<svg/>"), None);
    }

    #[test]
    fn decodes_latin1_declared_documents() {
        let body = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><svg><text>caf\xE9</text></svg>";
        let decoded = decode_svg_bytes(body);
        assert!(decoded.contains("caf\u{e9}"));
    }

    #[test]
    fn strips_utf8_bom() {
        let decoded = decode_svg_bytes(b"\xEF\xBB\xBF<svg/>");
        assert_eq!(decoded, "<svg/>");
    }
}
