//! codepane – render an engine dump to a native node list, as JSON.
//!
//! Usage:
//!   codepane <dump.json> [output.json] [--line-numbers] [--virtualized]
//!            [--theme <id>] [--test-id <id>]
//!
//! The input is a JSON dump of the highlighting engine's output
//! (`{rows, stylesheet, variant}`). If `output.json` is omitted the render
//! tree is printed to stdout. This is a debugging/inspection harness; the
//! embedding application drives the library directly.

use std::{env, fs, path::PathBuf, process};

use codepane::pipeline::render_highlighted;
use codepane::{Highlighted, RenderConfig, RenderStrategy, StyleCache, ThemeId};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut line_numbers = false;
    let mut virtualized = false;
    let mut theme_id: Option<String> = None;
    let mut test_id: Option<String> = None;
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--line-numbers" | "-n" => line_numbers = true,
            "--virtualized" | "-v" => virtualized = true,
            "--theme" | "-t" => match iter.next() {
                Some(v) => theme_id = Some(v.clone()),
                None => {
                    eprintln!("--theme requires a value");
                    process::exit(1);
                }
            },
            "--test-id" => test_id = iter.next().cloned(),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                if positional == 0 {
                    input_path = Some(PathBuf::from(path));
                } else if positional == 1 {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let input = match input_path {
        Some(p) => p,
        None => {
            eprintln!("Error: no input dump specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    let doc = match Highlighted::from_json_file(&input) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error loading '{}': {e}", input.display());
            process::exit(1);
        }
    };

    // Default theme id: stem of the input filename.
    let theme = theme_id.unwrap_or_else(|| {
        input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("theme")
            .to_string()
    });

    let config = RenderConfig {
        show_line_numbers: line_numbers,
        strategy: if virtualized {
            RenderStrategy::Virtualized
        } else {
            RenderStrategy::Scrollable
        },
        test_id,
        ..RenderConfig::default()
    };

    let mut cache = StyleCache::new();
    let nodes = render_highlighted(&doc, &config, &ThemeId::new(theme), &mut cache);
    let json = codepane::native::to_json(&nodes);

    match output_path {
        Some(out) => {
            if let Err(e) = fs::write(&out, &json) {
                eprintln!("Error writing '{}': {e}", out.display());
                process::exit(1);
            }
            eprintln!(
                "Wrote '{}' ({} bytes, {} row{})",
                out.display(),
                json.len(),
                doc.rows.len(),
                if doc.rows.len() == 1 { "" } else { "s" }
            );
        }
        None => println!("{json}"),
    }
}

fn print_usage(prog: &str) {
    eprintln!("codepane – engine dump to native render tree");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <dump.json> [output.json] [--line-numbers] [--virtualized] [--theme <id>]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <dump.json>    Engine output dump ({{rows, stylesheet, variant}})");
    eprintln!("  [output.json]  Output path (default: stdout)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --line-numbers, -n  Decorate rows with a 1-based line-number gutter");
    eprintln!("  --virtualized, -v   Emit a virtualized list instead of a scroll container");
    eprintln!("  --theme, -t         Cache id for the dump's stylesheet (default: input stem)");
    eprintln!("  --test-id           Automation identifier forwarded to the container");
    eprintln!("  --help              Print this message");
}
