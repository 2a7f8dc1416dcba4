//! Ledgergrid - an accounting spreadsheet from the command line

mod config;
mod error;

use anyhow::{Context, anyhow, bail};
use ledgergrid_core::Document;
use ledgergrid_core::storage::markdown_content;
use ledgergrid_core::template::{builtin_templates, find_builtin};
use ledgergrid_engine::engine::{Address, DeclaredType};
use std::env;
use std::path::PathBuf;

fn print_usage() {
    eprintln!("Usage: ledgergrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  [FILE]                    Sheet file to open (.json)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -t, --template <ID>       Start from a built-in template");
    eprintln!("  -s, --set <REF=TEXT>      Set a cell's content (can be repeated)");
    eprintln!("  -f, --format <REF=TYPE>   Set a cell's type: text, number, currency,");
    eprintln!("                            percentage or date (can be repeated)");
    eprintln!("  -c, --command <FORMULA>   Evaluate a formula against the sheet and print it");
    eprintln!("  -o, --output <FILE>       Export to markdown file");
    eprintln!("  -w, --write               Save the sheet back to FILE");
    eprintln!("  --list-templates          List built-in templates");
    eprintln!("  --config <FILE>           Read settings from this TOML file");
    eprintln!("  --no-config               Ignore the user config file");
    eprintln!("  -h, --help                Print help");
}

/// A cell edit from the command line, applied in the order given.
enum Edit {
    Set(String),
    Format(String),
}

#[derive(Default)]
struct Options {
    file_path: Option<PathBuf>,
    template: Option<String>,
    edits: Vec<Edit>,
    command: Option<String>,
    output_file: Option<PathBuf>,
    write: bool,
    config_file: Option<PathBuf>,
    no_config: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    let mut options = Options::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--list-templates" => {
                for template in builtin_templates() {
                    println!("{}\t{}", template.id, template.name);
                }
                return;
            }
            "-t" | "--template" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --template requires a template id");
                    std::process::exit(1);
                }
                options.template = Some(args[i].to_string());
            }
            "-s" | "--set" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --set requires REF=TEXT");
                    std::process::exit(1);
                }
                options.edits.push(Edit::Set(args[i].to_string()));
            }
            "-f" | "--format" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --format requires REF=TYPE");
                    std::process::exit(1);
                }
                options.edits.push(Edit::Format(args[i].to_string()));
            }
            "-c" | "--command" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --command requires a formula");
                    std::process::exit(1);
                }
                options.command = Some(args[i].to_string());
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --output requires a file path");
                    std::process::exit(1);
                }
                options.output_file = Some(PathBuf::from(&args[i]));
            }
            "-w" | "--write" => options.write = true,
            "--config" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Error: --config requires a file path");
                    std::process::exit(1);
                }
                options.config_file = Some(PathBuf::from(&args[i]));
            }
            "--no-config" => options.no_config = true,
            arg if arg.starts_with('-') && arg.len() > 1 => {
                eprintln!("Error: Unknown option: {}", arg);
                print_usage();
                std::process::exit(1);
            }
            _ => {
                if options.file_path.is_none() {
                    options.file_path = Some(PathBuf::from(&args[i]));
                } else {
                    eprintln!("Error: Unexpected argument: {}", args[i]);
                    print_usage();
                    std::process::exit(1);
                }
            }
        }
        i += 1;
    }

    match run(options) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns false when a `--command` result is an error value.
fn run(options: Options) -> anyhow::Result<bool> {
    let (config, warnings) = config::load_config(options.config_file.as_deref(), options.no_config);
    for warning in warnings {
        eprintln!("Warning: {}", warning);
    }

    let mut doc = Document::blank(&config.sheet_name, config.bounds(), config.format_options())
        .with_file(options.file_path.clone())
        .context("Failed to open sheet")?;

    if let Some(id) = &options.template {
        let template = find_builtin(id).ok_or_else(|| anyhow!("Unknown template: {}", id))?;
        doc.load_template(&template)?;
    }

    for edit in &options.edits {
        apply_edit(&mut doc, edit)?;
    }

    let mut ok = true;
    let mut produced_output = false;

    if let Some(formula) = &options.command {
        let value = doc.sheet.evaluate_formula(formula)?;
        println!("{}", value);
        ok = !value.is_error();
        produced_output = true;
    }

    if let Some(output_path) = &options.output_file {
        doc.export_markdown(output_path)?;
        println!("Exported to {}", output_path.display());
        produced_output = true;
    }

    if options.write {
        let path = doc.save_file()?;
        println!("Saved {}", path.display());
        produced_output = true;
    }

    if !produced_output {
        print!("{}", markdown_content(&doc.sheet));
    }

    Ok(ok)
}

fn apply_edit(doc: &mut Document, edit: &Edit) -> anyhow::Result<()> {
    let (arg, flag) = match edit {
        Edit::Set(arg) => (arg, "--set"),
        Edit::Format(arg) => (arg, "--format"),
    };
    let Some((reference, rest)) = arg.split_once('=') else {
        bail!("{} expects REF=VALUE, got {}", flag, arg);
    };
    let addr: Address = doc
        .sheet
        .bounds()
        .resolve(reference.trim())
        .with_context(|| format!("{} {}", flag, arg))?;

    match edit {
        Edit::Set(_) => {
            doc.set_cell(addr, rest)
                .with_context(|| format!("Cannot set {}", addr))?;
        }
        Edit::Format(_) => {
            let declared_type: DeclaredType = rest.parse().map_err(|e: String| anyhow!(e))?;
            doc.set_cell_type(addr, declared_type)?;
        }
    }
    Ok(())
}
