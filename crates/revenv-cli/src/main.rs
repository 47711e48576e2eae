use std::path::PathBuf;

use clap::{value_parser, ArgAction, ArgGroup, Parser};
use color_eyre::{eyre::eyre, Result};
use revenv_core::{
    reinitialize, relocate, CommandStatus, ExecutionOutcome, ReinitRequest, RelocateRequest,
};
use serde_json::Value;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = RevenvCli::parse();
    init_tracing(cli.trace, cli.verbose);

    let mut code = 0;

    if let Some(python) = &cli.substitute_python {
        let outcome = reinitialize(&ReinitRequest {
            root: cli.root.clone(),
            python: python.clone(),
        })
        .map_err(|err| eyre!("{err:?}"))?;
        code = code.max(emit_outcome(&cli, &outcome)?);
    }

    if let Some(prefix) = &cli.update_path {
        let outcome = relocate(&RelocateRequest {
            root: cli.root.clone(),
            new_prefix: prefix.clone(),
        })
        .map_err(|err| eyre!("{err:?}"))?;
        code = code.max(emit_outcome(&cli, &outcome)?);
    }

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(trace: bool, verbose: u8) {
    let level = if trace {
        "trace"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("revenv_core={level},revenv_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_outcome(cli: &RevenvCli, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = match outcome.status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(code);
    }

    if !cli.quiet {
        print_action_lines(&outcome.details);
    }
    if outcome.status != CommandStatus::Ok {
        // The console protocol reports errors on stdout, one line each.
        println!("error: {}", outcome.message);
    }

    Ok(code)
}

fn print_action_lines(details: &Value) {
    let Some(actions) = details.get("actions").and_then(Value::as_array) else {
        return;
    };
    for action in actions {
        let tag = action.get("tag").and_then(Value::as_str);
        let path = action.get("path").and_then(Value::as_str);
        if let (Some(tag), Some(path)) = (tag, path) {
            println!("{tag} {path}");
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Relocate POSIX Python virtualenvs to a new prefix",
    long_about = "Rewrites shebang lines, activation scripts, and the local/ symlink farm \
                  of a moved virtualenv, and drops stale bytecode caches.",
    after_help = "Examples:\n  revenv --update-path /srv/app/venv\n  revenv --root ./venv --substitute-python /usr/bin/python3.11\n"
)]
#[command(group(
    ArgGroup::new("flow")
        .required(true)
        .multiple(true)
        .args(["substitute_python", "update_path"])
))]
struct RevenvCli {
    #[arg(
        long,
        value_name = "PYTHON",
        help = "Reinitialize the virtualenv to use the given interpreter"
    )]
    substitute_python: Option<String>,
    #[arg(
        long,
        value_name = "PREFIX",
        value_parser = value_parser!(PathBuf),
        help = "Rewrite all embedded paths to the new absolute prefix"
    )]
    update_path: Option<PathBuf>,
    #[arg(
        long,
        value_name = "DIR",
        default_value = ".",
        help = "Virtualenv root to operate on"
    )]
    root: PathBuf,
    #[arg(short, long, help = "Suppress per-mutation output (errors still print)")]
    quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase logging (-vv reaches trace)")]
    verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q")]
    trace: bool,
    #[arg(long, help = "Emit {status,message,details} JSON envelopes")]
    json: bool,
}
