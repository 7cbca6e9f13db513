use catalog_merge::{Catalog, ConversionContext, FormatRegistry, MergeOptions, merge};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

fn cli() -> Command {
    Command::new("catalog-merge")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Merge an existing translation catalog with freshly extracted source strings")
        .arg(
            Arg::new("vernacular")
                .help("Existing translated catalog")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("virgin")
                .help("Catalog produced by source extraction")
                .required(true)
                .index(2),
        )
        .arg(
            Arg::new("alien")
                .long("alien")
                .short('a')
                .help("Additional catalog to take translations from (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Where to write the merged catalog (default: overwrite VERNACULAR, '-' for stdout)"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .help("Catalog file format")
                .default_value("auto"),
        )
        .arg(
            Arg::new("target-language")
                .long("target-language")
                .help("Language of the merged catalog (e.g. de, pt_BR)"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("JSON file with merge options"),
        )
        .arg(
            Arg::new("no-similar-text")
                .long("no-similar-text")
                .help("Disable matching of changed texts by similarity")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-same-text")
                .long("no-same-text")
                .help("Disable reuse of translations for identical texts")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-obsolete")
                .long("no-obsolete")
                .help("Drop messages no longer present in source")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-locations")
                .long("no-locations")
                .help("Append new messages instead of placing them by source location")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Report duplicates in detail and print merge statistics")
                .action(ArgAction::SetTrue),
        )
}

/// Options from `--config`, overridden by command line flags.
fn merge_options(matches: &ArgMatches) -> Result<MergeOptions, Box<dyn std::error::Error>> {
    let mut options = match matches.get_one::<String>("config") {
        Some(path) => MergeOptions::load(Path::new(path))
            .map_err(|e| format!("Failed to read config '{}': {}", path, e))?,
        None => MergeOptions::default(),
    };
    if matches.get_flag("no-similar-text") {
        options.similar_text = false;
    }
    if matches.get_flag("no-same-text") {
        options.same_text = false;
    }
    if matches.get_flag("no-obsolete") {
        options.no_obsolete = true;
    }
    if matches.get_flag("no-locations") {
        options.no_locations = true;
    }
    if matches.get_flag("verbose") {
        options.verbose = true;
    }
    Ok(options)
}

/// Loads a catalog and drops its duplicates, reporting them on stderr.
fn load_catalog(
    registry: &FormatRegistry,
    path: &Path,
    format: &str,
    verbose: bool,
    cd: &mut ConversionContext,
) -> Result<Catalog, Box<dyn std::error::Error>> {
    let mut catalog = registry
        .load(path, format, cd)
        .map_err(|e| format!("Failed to load '{}': {}", path.display(), e))?;
    let dups = catalog.resolve_duplicates();
    eprint!(
        "{}",
        catalog.duplicates_report(&dups, &path.display().to_string(), verbose)
    );
    Ok(catalog)
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let options = merge_options(matches)?;
    let format = matches
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("auto");

    let registry = FormatRegistry::with_builtin_formats();
    let mut cd = ConversionContext::new().with_verbose(options.verbose);

    let vernacular_path = matches
        .get_one::<String>("vernacular")
        .map(PathBuf::from)
        .ok_or("Missing vernacular catalog")?;
    let virgin_path = matches
        .get_one::<String>("virgin")
        .map(PathBuf::from)
        .ok_or("Missing virgin catalog")?;

    let vernacular = load_catalog(&registry, &vernacular_path, format, options.verbose, &mut cd)?;
    let virgin = load_catalog(&registry, &virgin_path, format, options.verbose, &mut cd)?;

    let mut aliens = Vec::new();
    if let Some(paths) = matches.get_many::<String>("alien") {
        for path in paths {
            aliens.push(load_catalog(
                &registry,
                Path::new(path),
                format,
                options.verbose,
                &mut cd,
            )?);
        }
    }

    info!(
        vernacular = vernacular.message_count(),
        virgin = virgin.message_count(),
        aliens = aliens.len(),
        "merging catalogs"
    );
    let (mut merged, summary) = merge(&vernacular, &virgin, &aliens, &options);

    if let Some(language) = matches.get_one::<String>("target-language") {
        merged.set_language_code(language.as_str());
    }
    merged.normalize_translations_for_language(&mut cd);

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or(vernacular_path);
    registry
        .save(&merged, &output, format, &mut cd)
        .map_err(|e| format!("Failed to save '{}': {}", output.display(), e))?;

    if options.verbose {
        eprint!("Updating '{}'...\n{}", output.display(), summary);
    }
    if cd.has_errors() {
        eprint!("{}", cd.error());
    }
    Ok(())
}

fn main() -> ExitCode {
    let matches = cli().get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    let directive = match default_level.parse() {
        Ok(directive) => directive,
        Err(e) => {
            eprintln!("Invalid log directive: {}", e);
            return ExitCode::FAILURE;
        }
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(directive))
        .init();

    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("catalog-merge: {}", e);
            ExitCode::FAILURE
        }
    }
}
