//! Command-line interface for the INI → TOML converter.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use ini2toml::{Result, Translator};

#[derive(Debug, Parser)]
#[command(
    name = "ini2toml",
    version,
    about = "Convert INI/CFG files to TOML, keeping comments and layout"
)]
struct Cli {
    /// Input file ("-" reads from standard input)
    input_file: PathBuf,

    /// Write the TOML here instead of standard output
    #[arg(short = 'o', long)]
    output_file: Option<PathBuf>,

    /// Profile to use; guessed from the input file name when omitted
    #[arg(short = 'p', long)]
    profile: Option<String>,

    /// Enable an augmentation that is off by default (repeatable)
    #[arg(short = 'E', long = "enable", value_name = "AUGMENTATION")]
    enable: Vec<String>,

    /// Disable an augmentation that is on by default (repeatable)
    #[arg(short = 'D', long = "disable", value_name = "AUGMENTATION")]
    disable: Vec<String>,

    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let translator = Translator::with_builtin_plugins()?;

    let ini = read_input(&cli.input_file)?;
    let profile = match &cli.profile {
        Some(profile) => profile.clone(),
        None => guess_profile(&cli.input_file, &translator.profile_names()),
    };
    tracing::info!(%profile, "translating");

    let mut active: HashMap<String, bool> = HashMap::new();
    for name in &cli.enable {
        active.insert(name.clone(), true);
    }
    for name in &cli.disable {
        active.insert(name.clone(), false);
    }

    let toml = translator.translate(&ini, &profile, &active)?;
    write_output(cli.output_file.as_deref(), &toml)
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}

fn write_output(path: Option<&Path>, toml: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, toml)?,
        None => std::io::stdout().write_all(toml.as_bytes())?,
    }
    Ok(())
}

/// Picks the profile for an input path: an exact file-name match first, then
/// a registered name the path ends with (so `sub/setup.cfg` finds a
/// `setup.cfg` profile), falling back to `best_effort`.
fn guess_profile(path: &Path, names: &[String]) -> String {
    if let Some(file_name) = path.file_name().and_then(|name| name.to_str()) {
        if names.iter().any(|name| name == file_name) {
            return file_name.to_string();
        }
    }
    let path_text = path.to_string_lossy();
    for name in names {
        if path_text.ends_with(name.as_str()) {
            return name.clone();
        }
    }
    "best_effort".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["setup.cfg".to_string(), "best_effort".to_string()]
    }

    #[test]
    fn test_guess_profile_by_file_name() {
        assert_eq!(guess_profile(Path::new("proj/setup.cfg"), &names()), "setup.cfg");
    }

    #[test]
    fn test_guess_profile_falls_back() {
        assert_eq!(guess_profile(Path::new("other.ini"), &names()), "best_effort");
        assert_eq!(guess_profile(Path::new("-"), &names()), "best_effort");
    }
}
