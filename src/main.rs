//! shell-tokens: command-line front end.
//!
//! Parse mode (default) reads a command line from stdin and writes its tokens
//! as a JSON array. Quote mode (`--quote`) reads a JSON array of arguments and
//! writes the quoted command line.
//!
//! Options:
//!   --quote             quote a JSON argument array instead of parsing
//!   --escape <c>        escape character (default from config, `\`)
//!   -e NAME=VALUE       define a variable (repeatable)
//!   --env               resolve variables from the process environment
//!   --config <path>     config overlay file (`~` is expanded)
//!   --dump-config       print the effective configuration and exit

use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;

use log::{debug, error};
use shell_tokens::config::{self, Config};
use shell_tokens::{Arg, Options, ProcessEnv, parse_with, quote};

#[derive(Debug, Default)]
struct Cli {
    quote: bool,
    escape: Option<char>,
    vars: HashMap<String, String>,
    process_env: bool,
    config: Option<PathBuf>,
    dump_config: bool,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<Cli, String> {
    let mut cli = Cli::default();
    let mut args = args;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--quote" => cli.quote = true,
            "--env" => cli.process_env = true,
            "--dump-config" => cli.dump_config = true,
            "--escape" => {
                let value = args.next().ok_or("--escape needs a character")?;
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if config::valid_escape(c) => cli.escape = Some(c),
                    _ => return Err(format!("unusable escape character: {value:?}")),
                }
            }
            "-e" => {
                let value = args.next().ok_or("-e needs NAME=VALUE")?;
                let (name, val) = value
                    .split_once('=')
                    .ok_or_else(|| format!("expected NAME=VALUE, got {value:?}"))?;
                cli.vars.insert(name.to_string(), val.to_string());
            }
            "--config" => {
                let value = args.next().ok_or("--config needs a path")?;
                cli.config = Some(PathBuf::from(shellexpand::tilde(&value).into_owned()));
            }
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(cli)
}

fn run_parse(input: &str, cli: &Cli, options: &Options) -> Result<String, String> {
    // A trailing newline from `echo ... |` is not part of the command.
    let command = input.strip_suffix('\n').unwrap_or(input);
    let command = command.strip_suffix('\r').unwrap_or(command);
    let tokens = if cli.process_env {
        parse_with(command, &ProcessEnv, options)
    } else {
        parse_with(command, &cli.vars, options)
    }
    .map_err(|e| e.to_string())?;
    serde_json::to_string(&tokens).map_err(|e| e.to_string())
}

fn run_quote(input: &str) -> Result<String, String> {
    let values: Vec<serde_json::Value> =
        serde_json::from_str(input).map_err(|e| format!("JSON parse error: {e}"))?;
    let args = values
        .into_iter()
        .map(Arg::try_from)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| e.to_string())?;
    Ok(quote(args))
}

// ─── Entry point ─────────────────────────────────────

fn main() {
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("shell-tokens: {e}");
            std::process::exit(2);
        }
    };

    let config = Config::load(cli.config.as_deref());
    shell_tokens::logging::init(config.log_level(), config.log_file().as_deref());

    if cli.dump_config {
        match toml::to_string_pretty(&config) {
            Ok(s) => print!("{s}"),
            Err(e) => {
                eprintln!("shell-tokens: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let mut input = String::new();
    if std::io::stdin().read_to_string(&mut input).is_err() {
        eprintln!("failed to read stdin");
        std::process::exit(1);
    }

    let mut options = config.options();
    if let Some(c) = cli.escape {
        options.escape = c;
    }
    debug!("mode={} escape={:?}", if cli.quote { "quote" } else { "parse" }, options.escape);

    let result = if cli.quote {
        run_quote(&input)
    } else {
        run_parse(&input, &cli, &options)
    };

    match result {
        Ok(output) => println!("{output}"),
        Err(e) => {
            error!("{e}");
            eprintln!("shell-tokens: {e}");
            std::process::exit(1);
        }
    }
}

// ─── Tests ───────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(|s| s.to_string()).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn args_defaults() {
        let cli = parse_args(args(&[])).unwrap();
        assert!(!cli.quote);
        assert!(cli.vars.is_empty());
        assert!(cli.escape.is_none());
    }

    #[test]
    fn args_vars_and_escape() {
        let cli = parse_args(args(&["-e", "X=1=2", "--escape", "^", "--quote"])).unwrap();
        assert_eq!(cli.vars.get("X").map(String::as_str), Some("1=2"));
        assert_eq!(cli.escape, Some('^'));
        assert!(cli.quote);
    }

    #[test]
    fn args_errors() {
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["-e", "NOEQUALS"])).is_err());
        assert!(parse_args(args(&["--escape", "ab"])).is_err());
        assert!(parse_args(args(&["--escape"])).is_err());
    }

    #[test]
    fn parse_mode_outputs_json() {
        let cli = parse_args(args(&["-e", "X=b"])).unwrap();
        let out = run_parse("a $X | c *.rs # done\n", &cli, &Options::default()).unwrap();
        assert_eq!(
            out,
            r#"["a","b",{"op":"|"},"c",{"op":"glob","pattern":"*.rs"},{"comment":"done"}]"#
        );
    }

    #[test]
    fn parse_mode_reports_errors() {
        let cli = Cli::default();
        let err = run_parse("echo 'oops", &cli, &Options::default()).unwrap_err();
        assert!(err.contains("unterminated"));
    }

    #[test]
    fn quote_mode() {
        let out = run_quote(r#"["a", "c d", {"op": "|"}, 1, null]"#).unwrap();
        assert_eq!(out, r"a 'c d' \| 1 null");
    }

    #[test]
    fn quote_mode_rejects_bad_json() {
        assert!(run_quote("not json").is_err());
        assert!(run_quote(r#"[[1]]"#).is_err());
    }
}
