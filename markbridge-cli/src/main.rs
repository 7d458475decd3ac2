// Command-line interface for markbridge
//
// This binary converts documents between markdown, the json tree dump and the treeviz view,
// and lets you inspect the tree a markdown file imports to.
//
// Converting:
//
// The conversion needs a to and from pair. The from is auto-detected from the file extension,
// while being overwrittable by an explicit --from flag.
// Usage:
//  markbridge <input> --to <format> [--from <format>] [--output <file>]          - Convert between formats (default)
//  markbridge convert <input> --to <format> [--from <format>] [--output <file>]  - Same as above (explicit)
//  markbridge inspect <path> [<view>]    - Show the imported tree (defaults to "treeviz")
//  markbridge --list-formats             - List available formats and views
//
// Configuration:
//
// Defaults come from markbridge-config, then ./markbridge.toml if present, then --config,
// then each --set key=value, then --preserve-new-lines.
//
// Extra Parameters:
//
// Format-specific parameters can be passed using --extra-<parameter-name> <value>.
// The CLI layer strips the "extra-" prefix and passes the parameters to the format.
// Example:
//  markbridge notes.md --to json --extra-pretty false

mod transforms;

use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::{debug, info, LevelFilter};
use markbridge::formats::{JsonFormat, TreevizFormat};
use markbridge::{
    ConversionOptions, Extensions, Format, FormatError, FormatParams, FormatRegistry,
    TransformerSet,
};
use markbridge_config::{Loader, MarkbridgeConfig};
use std::collections::HashMap;
use std::fs;

/// Parse extra-* arguments from command line args
/// Returns (cleaned_args_without_extras, extra_params_map)
///
/// Supports both:
/// - `--extra-<key> <value>` (explicit value)
/// - `--extra-<key>` (boolean flag, defaults to "true")
fn parse_extra_args(args: &[String]) -> (Vec<String>, HashMap<String, String>) {
    let mut cleaned_args = Vec::new();
    let mut extra_params = HashMap::new();
    let mut i = 0;

    while i < args.len() {
        let arg = &args[i];

        if let Some(key) = arg.strip_prefix("--extra-") {
            let has_value = args.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if has_value {
                extra_params.insert(key.to_string(), args[i + 1].clone());
                i += 2;
            } else {
                extra_params.insert(key.to_string(), "true".to_string());
                i += 1;
            }
            continue;
        }

        cleaned_args.push(arg.clone());
        i += 1;
    }

    (cleaned_args, extra_params)
}

fn build_cli() -> Command {
    Command::new("markbridge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Convert between markdown and rich document trees")
        .long_about(
            "markbridge imports markdown into a rich-text document tree and exports it back.\n\n\
            Commands:\n  \
            - convert: Transform between document formats (markdown, json, treeviz)\n  \
            - inspect: View the tree a markdown file imports to\n\n\
            Extra Parameters:\n  \
            Use --extra-<name> [value] to pass format-specific options.\n  \
            Boolean flags can omit the value (defaults to 'true').\n\n\
            Examples:\n  \
            markbridge inspect notes.md                  # View tree visualization\n  \
            markbridge notes.md --to json -o notes.json  # Dump the tree as json\n  \
            markbridge notes.json --to markdown          # Back to markdown (stdout)",
        )
        .arg_required_else_help(true)
        .subcommand_required(false)
        .arg(
            Arg::new("list-formats")
                .long("list-formats")
                .help("List available formats and inspect views")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("PATH")
                .help("Path to a markbridge.toml configuration file")
                .value_hint(ValueHint::FilePath)
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override a configuration key, e.g. markdown.extensions.highlight=false")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("preserve-new-lines")
                .long("preserve-new-lines")
                .help("Keep every markdown line as its own block")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log more (repeat for debug and trace output)")
                .action(ArgAction::Count)
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .help("Log less (repeat to silence errors)")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(
            Command::new("inspect")
                .about("Inspect the document tree of a markdown file")
                .long_about(
                    "Import a markdown file and print the resulting document tree.\n\n\
                    Views:\n  \
                    - treeviz:  Tree visualization (default)\n  \
                    - json:     The json tree dump\n\n\
                    Extra Parameters:\n  \
                    --extra-show-formats false   Hide the format of each text run\n  \
                    --extra-pretty false         Compact json\n\n\
                    Examples:\n  \
                    markbridge inspect notes.md           # Tree visualization (default)\n  \
                    markbridge inspect notes.md json      # json tree",
                )
                .arg(
                    Arg::new("path")
                        .help("Path to the markdown file")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("transform")
                        .help("View to print. Defaults to 'treeviz'")
                        .required(false)
                        .value_parser(clap::builder::PossibleValuesParser::new(
                            transforms::AVAILABLE_TRANSFORMS,
                        ))
                        .index(2)
                        .value_hint(ValueHint::Other),
                ),
        )
        .subcommand(
            Command::new("convert")
                .about("Convert between document formats (default command)")
                .long_about(
                    "Convert documents between different formats.\n\n\
                    Supported formats:\n  \
                    - markdown: Markdown (.md, .markdown)\n  \
                    - json:     Document tree as json (.json)\n  \
                    - treeviz:  Tree visualization, output only (.tree)\n\n\
                    The source format is auto-detected from the file extension.\n\
                    Output goes to stdout by default, or use -o to specify a file.\n\n\
                    Examples:\n  \
                    markbridge convert notes.md --to json -o notes.json\n  \
                    markbridge notes.json --to markdown           # 'convert' is optional",
                )
                .arg(
                    Arg::new("input")
                        .help("Input file path")
                        .required(true)
                        .index(1)
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("from")
                        .long("from")
                        .help("Source format (auto-detected from file extension if not specified)")
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .help("Target format (required)")
                        .required(true)
                        .value_hint(ValueHint::Other),
                )
                .arg(
                    Arg::new("output")
                        .long("output")
                        .short('o')
                        .help("Output file path (defaults to stdout)")
                        .value_hint(ValueHint::FilePath),
                ),
        )
}

/// Warn by default; each -v raises the level by one and each -q lowers it.
fn log_level(verbose: u8, quiet: u8) -> LevelFilter {
    const LEVELS: [LevelFilter; 6] = [
        LevelFilter::Off,
        LevelFilter::Error,
        LevelFilter::Warn,
        LevelFilter::Info,
        LevelFilter::Debug,
        LevelFilter::Trace,
    ];
    let index = (2 + i16::from(verbose) - i16::from(quiet)).clamp(0, 5);
    LEVELS[index as usize]
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let (cleaned_args, extra_params) = parse_extra_args(&args);
    let extra_params = FormatParams::from(extra_params);

    let cli = build_cli();
    let matches = match cli.clone().try_get_matches_from(&cleaned_args) {
        Ok(m) => m,
        Err(e) => {
            // A leading file path means the convert subcommand was left out
            if cleaned_args.len() > 1
                && !cleaned_args[1].starts_with('-')
                && !["inspect", "convert", "help"].contains(&cleaned_args[1].as_str())
            {
                let mut new_args = vec![cleaned_args[0].clone(), "convert".to_string()];
                new_args.extend_from_slice(&cleaned_args[1..]);
                match cli.try_get_matches_from(&new_args) {
                    Ok(m) => m,
                    Err(e2) => e2.exit(),
                }
            } else {
                e.exit();
            }
        }
    };

    env_logger::Builder::new()
        .filter_level(log_level(
            matches.get_count("verbose"),
            matches.get_count("quiet"),
        ))
        .format_timestamp(None)
        .init();

    let settings: Vec<String> = matches
        .get_many::<String>("set")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let config = load_cli_config(
        matches.get_one::<String>("config").map(|s| s.as_str()),
        &settings,
        matches.get_flag("preserve-new-lines"),
    )
    .unwrap_or_else(|err| fail(&format!("Failed to load configuration: {err}")));

    if matches.get_flag("list-formats") {
        handle_list_formats_command(&config);
        return;
    }

    match matches.subcommand() {
        Some(("inspect", sub_matches)) => {
            let path = required(sub_matches, "path");
            let transform = sub_matches
                .get_one::<String>("transform")
                .map(|s| s.as_str())
                .unwrap_or("treeviz");
            handle_inspect_command(path, transform, &extra_params, &config);
        }
        Some(("convert", sub_matches)) => {
            let input = required(sub_matches, "input");
            let to = required(sub_matches, "to");
            let registry = build_registry(&config)
                .unwrap_or_else(|e| fail(&format!("Failed to set up formats: {e}")));

            let from = match sub_matches.get_one::<String>("from") {
                Some(f) => f.to_string(),
                None => registry
                    .detect(input)
                    .map(|format| format.name().to_string())
                    .unwrap_or_else(|| {
                        fail(&format!(
                            "Could not detect format from filename '{input}'\n\
                            Please specify --from explicitly"
                        ))
                    }),
            };

            let output = sub_matches.get_one::<String>("output").map(|s| s.as_str());
            handle_convert_command(&registry, input, &from, to, output, &extra_params);
        }
        _ => fail("Unknown subcommand. Use --help for usage information."),
    }
}

fn required<'a>(matches: &'a ArgMatches, name: &str) -> &'a str {
    matches
        .get_one::<String>(name)
        .map(|s| s.as_str())
        .unwrap_or_else(|| fail(&format!("Missing argument '{name}'")))
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

fn write_output(output: Option<&str>, text: &str) {
    match output {
        Some(path) => {
            fs::write(path, text)
                .unwrap_or_else(|e| fail(&format!("Error writing file '{path}': {e}")));
            info!("Wrote {path}");
        }
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
        }
    }
}

/// Handle the inspect command
fn handle_inspect_command(
    path: &str,
    transform: &str,
    extra_params: &FormatParams,
    config: &MarkbridgeConfig,
) {
    let source = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("Error reading file '{path}': {e}")));

    let registry = build_registry(config)
        .unwrap_or_else(|e| fail(&format!("Failed to set up formats: {e}")));
    let output = transforms::execute_transform(&source, transform, &registry, extra_params)
        .unwrap_or_else(|e| fail(&format!("Execution error: {e}")));

    write_output(None, &output);
}

/// Handle the convert command
fn handle_convert_command(
    registry: &FormatRegistry,
    input: &str,
    from: &str,
    to: &str,
    output: Option<&str>,
    extra_params: &FormatParams,
) {
    for name in [from, to] {
        if let Err(e) = registry.get(name) {
            fail(&e.to_string());
        }
    }

    let source = fs::read_to_string(input)
        .unwrap_or_else(|e| fail(&format!("Error reading file '{input}': {e}")));

    debug!("Converting {input}");
    let result = registry
        .convert(&source, from, to, extra_params)
        .unwrap_or_else(|e| fail(&format!("Conversion failed: {e}")));

    write_output(output, &result);
}

/// Handle the list-formats command
fn handle_list_formats_command(config: &MarkbridgeConfig) {
    let registry = build_registry(config)
        .unwrap_or_else(|e| fail(&format!("Failed to set up formats: {e}")));
    println!("Conversion formats:");
    for format in registry.formats() {
        let directions: Vec<String> = format.directions().iter().map(|d| d.to_string()).collect();
        println!(
            "  {:<10} {} ({})",
            format.name(),
            format.description(),
            directions.join(", ")
        );
        for parameter in format.parameters() {
            println!("  {:<10}   --extra-{parameter}", "");
        }
    }

    println!("\nInspect views:");
    for transform_name in transforms::AVAILABLE_TRANSFORMS {
        println!("  {transform_name}");
    }
}

fn load_cli_config(
    explicit_path: Option<&str>,
    settings: &[String],
    preserve_new_lines: bool,
) -> Result<MarkbridgeConfig, String> {
    let loader = Loader::new().with_optional_file("markbridge.toml");
    let mut loader = if let Some(path) = explicit_path {
        loader.with_file(path)
    } else {
        loader
    };

    for setting in settings {
        let (key, value) = setting
            .split_once('=')
            .ok_or_else(|| format!("expected KEY=VALUE, got '{setting}'"))?;
        loader = loader
            .set_override(key.trim(), value.trim())
            .map_err(|e| e.to_string())?;
    }
    if preserve_new_lines {
        loader = loader
            .set_override("markdown.preserve_new_lines", true)
            .map_err(|e| e.to_string())?;
    }

    loader.build().map_err(|e| e.to_string())
}

/// The standard formats, with the markdown rules and the json and treeviz settings taken
/// from `config`
fn build_registry(config: &MarkbridgeConfig) -> Result<FormatRegistry, FormatError> {
    let extensions = Extensions::from(config.markdown.extensions);
    let mut registry = FormatRegistry::standard(
        TransformerSet::standard(&extensions),
        ConversionOptions::from(&config.markdown),
    );
    registry.register(JsonFormat::from(&config.convert.json))?;
    registry.register(TreevizFormat::from(&config.inspect.treeviz))?;
    Ok(registry)
}
