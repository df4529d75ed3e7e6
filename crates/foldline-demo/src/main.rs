#![forbid(unsafe_code)]

//! Headless scripted session for the foldline accordion.
//!
//! Drives one controller through a typical visit on a simulated clock: the
//! page scrolls into view, the first section auto-opens, the reader finishes
//! each section in turn, then jumps back and closes everything by hand.
//!
//!   cargo run -p foldline-demo -- --viewport 960
//!   cargo run -p foldline-demo -- --config page.toml --json
//!
//! Set `FOLDLINE_LOG=debug` to see every transition on stderr.

use std::process::ExitCode;

use foldline::logging::{self, LogFormat};
use foldline::prelude::*;
use foldline::PageConfig;
use web_time::{Duration, Instant};

struct Args {
    config: Option<String>,
    viewport: i32,
    json: bool,
}

fn flag_value(name: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != name).nth(1)
}

fn parse_args() -> Args {
    Args {
        config: flag_value("--config"),
        viewport: flag_value("--viewport")
            .and_then(|s| s.parse().ok())
            .unwrap_or(960),
        json: std::env::args().any(|a| a == "--json"),
    }
}

fn load_page(path: Option<&str>) -> Result<PageConfig, foldline::ConfigError> {
    match path {
        None => Ok(PageConfig::default()),
        Some(p) if p.ends_with(".json") => PageConfig::from_json_file(p),
        Some(p) => PageConfig::from_toml_file(p),
    }
}

/// One scripted step: what happened, then the resulting state.
fn report(args: &Args, step: &str, ctl: &mut AccordionController) {
    let snapshot = ctl.snapshot();
    let transitions = ctl.drain_transitions();
    if args.json {
        let line = serde_json::json!({
            "step": step,
            "snapshot": snapshot,
            "transitions": transitions,
        });
        println!("{line}");
        return;
    }

    let open = snapshot
        .open_index
        .map_or_else(|| "-".to_owned(), |i| i.to_string());
    let position = snapshot.position.map_or_else(
        || "closed".to_owned(),
        |p| {
            format!(
                "top={} bottom={} avail={}",
                p.top_offset, p.bottom_offset, p.available_height
            )
        },
    );
    println!("{step:<28} open={open:<2} {position}");
    for t in transitions {
        println!("    {:?} -> {:?} ({:?})", t.from, t.to, t.cause);
    }
}

fn main() -> ExitCode {
    let args = parse_args();
    logging::init(if args.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    });

    let page = match load_page(args.config.as_deref()) {
        Ok(page) => page,
        Err(err) => {
            eprintln!("foldline-demo: {err}");
            return ExitCode::FAILURE;
        }
    };

    let registry = page.registry();
    let count = registry.len();
    let settle = page.controller.settle_delay();
    let advance = page.controller.advance_delay();
    let mut ctl = AccordionController::new(registry, page.controller, args.viewport);
    tracing::info!(message = "demo.start", sections = count, viewport = args.viewport);

    let mut now = Instant::now();
    report(&args, "mount", &mut ctl);

    ctl.on_root_bounds(
        ElementBounds {
            top: f64::from(args.viewport) * 0.5,
            height: f64::from(args.viewport),
        },
        f64::from(args.viewport),
        now,
    );
    report(&args, "root visible", &mut ctl);

    now += settle;
    if let Err(err) = ctl.tick(now) {
        eprintln!("foldline-demo: {err}");
        return ExitCode::FAILURE;
    }
    report(&args, "settle elapsed", &mut ctl);

    while let Some(open) = ctl.open_index() {
        if open + 1 >= count {
            break;
        }
        ctl.on_content_scroll(
            ElementId::Content(open),
            ScrollMetrics::new(600.0, 400.0, 1000.0),
            now,
        );
        now += advance;
        if let Err(err) = ctl.tick(now) {
            eprintln!("foldline-demo: {err}");
            return ExitCode::FAILURE;
        }
        report(&args, &format!("read section {open}"), &mut ctl);
    }

    if count > 1 {
        if let Err(err) = ctl.toggle(0) {
            eprintln!("foldline-demo: {err}");
            return ExitCode::FAILURE;
        }
        report(&args, "toggle 0", &mut ctl);
        if let Err(err) = ctl.toggle(0) {
            eprintln!("foldline-demo: {err}");
            return ExitCode::FAILURE;
        }
        report(&args, "toggle 0 again", &mut ctl);
    }

    now += Duration::from_secs(1);
    if let Err(err) = ctl.tick(now) {
        eprintln!("foldline-demo: {err}");
        return ExitCode::FAILURE;
    }
    ctl.unmount();
    report(&args, "unmount", &mut ctl);
    ExitCode::SUCCESS
}
