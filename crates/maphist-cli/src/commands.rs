//! Subcommand handlers

use anyhow::{bail, Context, Result};
use clap::ArgMatches;
use maphist_format::{FormatRegistry, MappingFormat};
use maphist_graph::{
    propagate, Direction, HistoryConfig, NameHistory, PropagationOptions, PropagationReport,
    Store, VersionGraph,
};
use maphist_tree::{apply, generate, Attribute, Diagnostics, Diff, DiffTree, NodeKey, NodePath};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Execute the subcommand selected in `matches`, writing its report to `out`
///
/// # Errors
/// Any fatal error of the selected operation, with context.
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let dir = matches
        .get_one::<PathBuf>("dir")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    match matches.subcommand() {
        Some(("validate", _)) => validate(&dir, matches, out),
        Some(("propagate", args)) => propagate_file(&dir, matches, args, out),
        Some(("rename", args)) => rename(&dir, matches, args, out),
        Some(("diff", args)) => diff(args, out),
        Some(("apply", args)) => apply_files(args, out),
        Some(("resolve", args)) => resolve(&dir, matches, args, out),
        Some(("history", args)) => history(&dir, matches, args, out),
        _ => bail!("no subcommand given, see --help"),
    }
}

fn required<'a, T>(args: &'a ArgMatches, id: &str) -> Result<&'a T>
where
    T: std::any::Any + Clone + Send + Sync + 'static,
{
    args.get_one::<T>(id)
        .with_context(|| format!("missing argument '{id}'"))
}

fn load_config(dir: &Path, matches: &ArgMatches) -> Result<HistoryConfig> {
    let mut config = HistoryConfig::load(dir)
        .with_context(|| format!("loading configuration from {}", dir.display()))?;
    if let Some(format) = matches.get_one::<String>("format") {
        config = config.with_format(format.as_str());
    }
    Ok(config)
}

fn open_graph(dir: &Path, config: &HistoryConfig) -> Result<VersionGraph> {
    VersionGraph::open(dir, config)
        .with_context(|| format!("loading history from {}", dir.display()))
}

fn format_for(path: &Path) -> Result<Arc<dyn MappingFormat>> {
    FormatRegistry::with_defaults()
        .for_path(path)
        .with_context(|| format!("cannot tell the format of {}", path.display()))
}

fn validate(dir: &Path, matches: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let config = load_config(dir, matches)?;
    let graph = open_graph(dir, &config)?;
    let store = Store::from_config(dir, &config)?;

    let mut files = 0;
    let mut diagnostics = Diagnostics::new();
    for version in graph.versions() {
        let label = version.label();
        if version.is_root() {
            diagnostics.extend(store.check_mappings(label)?);
            files += 1;
            writeln!(out, "{:>3}  {label}  (root)", version.depth())?;
        } else {
            for parent in version.parents() {
                diagnostics.extend(store.check_diff(parent, label)?);
                files += 1;
            }
            writeln!(out, "{:>3}  {label}  <- {}", version.depth(), version.parents().join(", "))?;
        }
    }
    for diagnostic in diagnostics.iter() {
        writeln!(out, "warning {diagnostic}")?;
    }
    writeln!(
        out,
        "{} versions, root {}, max depth {}, {files} files read",
        graph.len(),
        graph.root().label(),
        graph.max_depth()
    )?;
    Ok(())
}

fn options(config: &HistoryConfig, args: &ArgMatches) -> Result<PropagationOptions> {
    let mut options = config.propagation;
    if let Some(direction) = args.get_one::<String>("direction") {
        options = options.with_direction(direction.parse::<Direction>()?);
    }
    if args.get_flag("lenient") {
        options = options.with_lenient(true);
    }
    Ok(options)
}

fn propagate_file(dir: &Path, matches: &ArgMatches, args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let seed_path = required::<PathBuf>(args, "seed")?;
    let seed = format_for(seed_path)?
        .read_diff(seed_path)
        .with_context(|| format!("reading seed {}", seed_path.display()))?;
    run_propagation(dir, matches, args, &seed, out)
}

fn rename(dir: &Path, matches: &ArgMatches, args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let path = node_path(args)?;
    let attribute = if args.get_flag("doc") {
        Attribute::Documentation
    } else {
        Attribute::Destination
    };
    let from = required::<String>(args, "from")?;
    let to = required::<String>(args, "to")?;

    let mut seed = DiffTree::new();
    *seed.ensure(&path)?.value_mut().attribute_mut(attribute) = Diff::new(from.as_str(), to.as_str());
    run_propagation(dir, matches, args, &seed, out)
}

fn run_propagation(
    dir: &Path,
    matches: &ArgMatches,
    args: &ArgMatches,
    seed: &DiffTree,
    out: &mut dyn Write,
) -> Result<()> {
    let config = load_config(dir, matches)?;
    let options = options(&config, args)?;
    let version = required::<String>(args, "version")?;
    let mut graph = open_graph(dir, &config)?;

    let report = propagate(&mut graph, version, seed, options)
        .with_context(|| format!("propagating from version '{version}'"))?;
    if !args.get_flag("dry-run") {
        graph.write_dirty().context("writing changed versions")?;
    }
    print_report(&report, args.get_flag("json"), out)
}

fn print_report(report: &PropagationReport, json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }
    for diagnostic in report.diagnostics.iter() {
        writeln!(out, "skipped {diagnostic}")?;
    }
    writeln!(
        out,
        "applied {} change(s) in {} wave(s), {} version(s) changed: {}",
        report.applied,
        report.waves,
        report.dirty.len(),
        report.dirty.join(", ")
    )?;
    Ok(())
}

fn diff(args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let a_path = required::<PathBuf>(args, "a")?;
    let b_path = required::<PathBuf>(args, "b")?;
    let format = format_for(a_path)?;
    let a = format.read_mappings(a_path)?;
    let b = format_for(b_path)?.read_mappings(b_path)?;

    let diff = generate(&a, &b);
    tracing::info!(nodes = diff.len(), "generated diff");
    match args.get_one::<PathBuf>("out") {
        Some(path) => format_for(path)?.write_diff(path, &diff)?,
        None => out.write_all(format.render_diff(&diff).as_bytes())?,
    }
    Ok(())
}

fn apply_files(args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let mappings_path = required::<PathBuf>(args, "mappings")?;
    let format = format_for(mappings_path)?;
    let mut tree = format.read_mappings(mappings_path)?;

    let mut diffs = Vec::new();
    for path in args.get_many::<PathBuf>("diffs").into_iter().flatten() {
        diffs.push(format_for(path)?.read_diff(path)?);
    }
    let refs: Vec<&DiffTree> = diffs.iter().collect();
    let diagnostics = apply(&mut tree, &refs);
    tracing::info!(diffs = refs.len(), skipped = diagnostics.len(), "applied diffs");

    match args.get_one::<PathBuf>("out") {
        Some(path) => {
            format_for(path)?.write_mappings(path, &tree)?;
            for diagnostic in diagnostics.iter() {
                writeln!(out, "skipped {diagnostic}")?;
            }
        }
        None => out.write_all(format.render_mappings(&tree).as_bytes())?,
    }
    Ok(())
}

fn resolve(dir: &Path, matches: &ArgMatches, args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let config = load_config(dir, matches)?;
    let graph = open_graph(dir, &config)?;
    let version = required::<String>(args, "version")?;
    let path = required::<PathBuf>(args, "out")?;

    let (tree, diagnostics) = graph
        .resolve_mappings(version)
        .with_context(|| format!("resolving version '{version}'"))?;
    format_for(path)?.write_mappings(path, &tree)?;
    for diagnostic in diagnostics.iter() {
        writeln!(out, "skipped {diagnostic}")?;
    }
    writeln!(out, "wrote {} node(s) to {}", tree.len(), path.display())?;
    Ok(())
}

fn history(dir: &Path, matches: &ArgMatches, args: &ArgMatches, out: &mut dyn Write) -> Result<()> {
    let config = load_config(dir, matches)?;
    let graph = open_graph(dir, &config)?;
    let path = node_path(args)?;

    let mut entries = NameHistory::collect(path, &graph)?;
    if args.get_flag("changes") {
        entries.retain(|e| e.changed);
    }
    if args.get_flag("json") {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }
    for entry in &entries {
        let marker = if entry.changed { "*" } else { " " };
        let name = if entry.name.is_empty() { "-" } else { entry.name.as_str() };
        writeln!(out, "{:>3} {marker} {:<12} {name}", entry.depth, entry.version)?;
    }
    Ok(())
}

fn node_path(args: &ArgMatches) -> Result<NodePath> {
    let class = required::<String>(args, "class")?;
    let mut path = NodePath::class(class);
    if let Some(member) = args.get_one::<String>("member") {
        path = path.child(parse_member(member)?);
    }
    Ok(path)
}

/// `name:desc`; a descriptor starting with `(` names a method
fn parse_member(spec: &str) -> Result<NodeKey> {
    match spec.split_once(':') {
        Some((name, desc)) if !name.is_empty() && !desc.is_empty() => Ok(if desc.starts_with('(') {
            NodeKey::method(name, desc)
        } else {
            NodeKey::field(name, desc)
        }),
        _ => bail!("member '{spec}' is not NAME:DESC"),
    }
}
