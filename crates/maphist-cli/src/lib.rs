//! Command line surface of maphist
//!
//! The `maphist` binary is a thin wrapper: [`cli`] declares the arguments,
//! [`run`] executes the selected subcommand against a history directory and
//! writes its report to the given output.

#![warn(unreachable_pub)]

mod commands;

pub use commands::run;

use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Argument parser of the `maphist` binary
#[must_use]
pub fn cli() -> Command {
    Command::new("maphist")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Versioned name-mapping history with diff propagation")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("dir")
                .long("dir")
                .short('d')
                .global(true)
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("History directory"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .global(true)
                .help("Format name, overriding maphist.toml (flat, tree)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log traversal details"),
        )
        .subcommand(Command::new("validate").about("Load the history and read every file"))
        .subcommand(
            Command::new("propagate")
                .about("Propagate a seed diff file from one version")
                .arg(version_arg())
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Diff file holding the edit"),
                )
                .args(propagation_args()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename or re-document one node and propagate the change")
                .arg(version_arg())
                .args(node_args())
                .arg(
                    Arg::new("from")
                        .long("from")
                        .default_value("")
                        .help("Current value; empty when the node is unnamed"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .required(true)
                        .help("New value; empty to remove"),
                )
                .arg(
                    Arg::new("doc")
                        .long("doc")
                        .action(ArgAction::SetTrue)
                        .help("Edit the documentation instead of the name"),
                )
                .args(propagation_args()),
        )
        .subcommand(
            Command::new("diff")
                .about("Generate the diff between two mappings files")
                .arg(path_arg("a", "Mappings before"))
                .arg(path_arg("b", "Mappings after"))
                .arg(out_arg(false)),
        )
        .subcommand(
            Command::new("apply")
                .about("Apply diff files to a mappings file")
                .arg(path_arg("mappings", "Mappings to patch"))
                .arg(
                    Arg::new("diffs")
                        .required(true)
                        .num_args(1..)
                        .value_parser(value_parser!(PathBuf))
                        .help("Diff files, applied in order"),
                )
                .arg(out_arg(false)),
        )
        .subcommand(
            Command::new("resolve")
                .about("Materialize the full mappings of a version")
                .arg(version_arg())
                .arg(out_arg(true)),
        )
        .subcommand(
            Command::new("history")
                .about("Show the name of a node at every version")
                .args(node_args())
                .arg(
                    Arg::new("changes")
                        .long("changes")
                        .action(ArgAction::SetTrue)
                        .help("Only versions where the name changed"),
                )
                .arg(json_arg()),
        )
}

fn version_arg() -> Arg {
    Arg::new("version")
        .long("version")
        .required(true)
        .help("Version label")
}

fn path_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help(help)
}

fn out_arg(required: bool) -> Arg {
    Arg::new("out")
        .long("out")
        .short('o')
        .required(required)
        .value_parser(value_parser!(PathBuf))
        .help("Output file; the format follows its extension")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn node_args() -> [Arg; 2] {
    [
        Arg::new("class")
            .long("class")
            .required(true)
            .help("Source class name, e.g. a/A$B"),
        Arg::new("member")
            .long("member")
            .help("Field or method as NAME:DESC, e.g. size:I or run:(I)V"),
    ]
}

fn propagation_args() -> [Arg; 4] {
    [
        Arg::new("direction")
            .long("direction")
            .value_parser(["both", "up", "down", "none"])
            .help("Propagation direction, overriding maphist.toml"),
        Arg::new("lenient")
            .long("lenient")
            .action(ArgAction::SetTrue)
            .help("Carry field and method renames to matching overloads"),
        Arg::new("dry-run")
            .long("dry-run")
            .action(ArgAction::SetTrue)
            .help("Report without writing any file"),
        json_arg(),
    ]
}

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` drives the filter, `info` by default; `verbose` forces `debug`.
/// Logs go to stderr so command output stays machine-readable.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
