//! Quill CLI
//!
//! `quill roundtrip <file>` prints the file as rendered from its tree;
//! `quill check <files...>` parses files and lists their diagnostics.

use std::path::PathBuf;

use quill_fmt::{NewlineMode, RenderConfig};
use quill_parse::ParseConfig;
use quillc::commands::{check, roundtrip_file};

fn main() {
    quillc::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        return;
    }

    let mut parse = ParseConfig::default();
    let mut render = RenderConfig::default();
    let mut files = Vec::new();
    for arg in args.iter().skip(2) {
        if let Some(symbol) = arg.strip_prefix("--define=") {
            parse = parse.with_define(symbol);
        } else if arg == "--lf" {
            render = render.with_newline(NewlineMode::Lf);
        } else if arg == "--crlf" {
            render = render.with_newline(NewlineMode::CrLf);
        } else if arg == "--cleanup" {
            parse = parse.with_auto_cleanup(true);
        } else if arg.starts_with('-') {
            eprintln!("error: unknown option '{arg}'");
            std::process::exit(2);
        } else {
            files.push(PathBuf::from(arg));
        }
    }

    match args[1].as_str() {
        "roundtrip" => {
            let [path] = files.as_slice() else {
                eprintln!("Usage: quill roundtrip <file> [--define=SYMBOL] [--lf|--crlf] [--cleanup]");
                std::process::exit(2);
            };
            match roundtrip_file(path, &parse, &render) {
                Ok(result) => {
                    print!("{}", result.output);
                    if !result.unchanged {
                        eprintln!("{}: rendering differs from the source", path.display());
                        std::process::exit(1);
                    }
                }
                Err(err) => {
                    eprintln!("error: {err}");
                    std::process::exit(1);
                }
            }
        }
        "check" => {
            if files.is_empty() {
                eprintln!("Usage: quill check <files...> [--define=SYMBOL]");
                std::process::exit(2);
            }
            let report = check(&files, &parse);
            for line in &report.messages {
                println!("{line}");
            }
            println!(
                "{} file(s): {} error(s), {} warning(s)",
                report.files, report.errors, report.warnings
            );
            if !report.is_clean() {
                std::process::exit(1);
            }
        }
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("error: unknown command '{other}'");
            print_usage();
            std::process::exit(2);
        }
    }
}

fn print_usage() {
    println!("Quill - format-preserving parser and renderer");
    println!();
    println!("Usage: quill <command> [options]");
    println!();
    println!("Commands:");
    println!("  roundtrip <file>    Parse a file and print it rendered back from the tree");
    println!("  check <files...>    Parse files and report their diagnostics");
    println!();
    println!("Options:");
    println!("  --define=SYMBOL     Treat SYMBOL as defined for #if");
    println!("  --lf, --crlf        Line endings of the rendered output");
    println!("  --cleanup           Normalize braces and blank lines while parsing");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=quill_parse=debug) for tracing output.");
}
