//! CLI layer: argument parsing, command dispatch, and subcommand implementations.

pub mod args;

pub use args::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::{Parser, Subcommand};
use regex::Regex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use methodlink::source::{CompiledCatalog, TypeKind};
use methodlink::{
    GraphConfig, GraphError, GraphView, IndexOptions, JavaIndex, MethodGraph, MethodId, MethodInfo, SourceIndex,
};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Call-graph resolution for Java codebases: dependencies, overrides and recursion for any method
#[derive(Parser, Debug)]
#[command(name = "methodlink", version, long_version = long_version(), about, after_help = "\
Run 'methodlink <COMMAND> --help' for detailed options and examples.\n\
Method identities look like pkg.Outer$Inner#name(java.lang.String,int)")]
pub(crate) struct Cli {
    /// Log level when RUST_LOG is not set: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Resolve the call graph of one or more methods and print it as JSON
    Graph(GraphArgs),

    /// List the canonical identities of source methods
    Methods(MethodsArgs),

    /// List indexed types with their kind and module
    Types(TypesArgs),
}

fn long_version() -> &'static str {
    concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATETIME"), ")")
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_json);

    let result = match cli.command {
        Commands::Graph(args) => cmd_graph(args),
        Commands::Methods(args) => cmd_methods(args),
        Commands::Types(args) => cmd_types(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

// ─── Shared setup ────────────────────────────────────────────────────

pub(crate) fn parse_extensions(ext: &str) -> Vec<String> {
    ext.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

pub(crate) fn index_options(args: &SourceArgs) -> IndexOptions {
    IndexOptions {
        synthesize_accessors: !args.no_accessors,
        extensions: parse_extensions(&args.ext),
        threads: args.threads,
    }
}

fn load_index(args: &SourceArgs) -> Result<JavaIndex, GraphError> {
    let mut catalog = CompiledCatalog::jdk();
    for path in &args.classpath {
        let added = catalog.load_file(Path::new(path))?;
        info!(path = %path, types = added, "Loaded compiled metadata");
    }
    let dirs: Vec<PathBuf> = args.dir.iter().map(PathBuf::from).collect();
    JavaIndex::build(&dirs, &index_options(args), catalog)
}

pub(crate) fn graph_config(args: &GraphArgs) -> GraphConfig {
    let config = GraphConfig::default()
        .with_subtype_strategy(args.subtypes.into())
        .with_heuristic_fallback(!args.no_heuristics)
        .with_excluded_receivers(args.exclude_receiver.iter().cloned());
    if args.include_stdlib { config.with_stdlib() } else { config }
}

// ─── Commands ────────────────────────────────────────────────────────

fn cmd_graph(args: GraphArgs) -> Result<(), GraphError> {
    let start = Instant::now();
    let index = load_index(&args.source)?;
    let graph = MethodGraph::new(index, graph_config(&args));

    let roots = resolve_roots(&graph, &args.method)?;

    let rendered = roots
        .iter()
        .map(|root| {
            if args.view {
                serde_json::to_value(GraphView::from_root(root, graph.index()))
            } else {
                serde_json::to_value(&**root)
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let output = match <[serde_json::Value; 1]>::try_from(rendered) {
        Ok([single]) => single,
        Err(all) => serde_json::Value::Array(all),
    };
    let text = if args.pretty { serde_json::to_string_pretty(&output)? } else { serde_json::to_string(&output)? };
    println!("{}", text);

    info!(
        roots = roots.len(),
        cached = graph.cached_count(),
        elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
        "Graph resolved"
    );
    Ok(())
}

/// Resolves every root on its own thread. Roots share one session, so whatever
/// one thread finishes the others reuse. The first failing root, in argument
/// order, is the error returned.
pub(crate) fn resolve_roots<I: SourceIndex>(graph: &MethodGraph<I>, methods: &[String]) -> Result<Vec<Arc<MethodInfo>>, GraphError> {
    let results: Vec<Result<Arc<MethodInfo>, GraphError>> = std::thread::scope(|s| {
        let handles: Vec<_> = methods
            .iter()
            .map(|method| (method, s.spawn(move || graph.resolve_method(method))))
            .collect();
        handles
            .into_iter()
            .map(|(method, h)| h.join().unwrap_or_else(|_| Err(GraphError::ResolutionPanicked(method.clone()))))
            .collect()
    });
    results.into_iter().collect()
}

fn cmd_methods(args: MethodsArgs) -> Result<(), GraphError> {
    let type_re = match args.type_filter.as_deref() {
        Some(pattern) => Some(
            Regex::new(pattern).map_err(|e| GraphError::InvalidArgs(format!("Invalid --type regex '{}': {}", pattern, e)))?,
        ),
        None => None,
    };
    let index = load_index(&args.source)?;
    let ids = method_ids(&index, type_re.as_ref(), args.synthetic);
    for id in &ids {
        println!("{}", id);
    }
    eprintln!("{} methods", ids.len());
    Ok(())
}

/// Sorted canonical identities of every source method, optionally restricted by type name.
pub(crate) fn method_ids(index: &JavaIndex, type_re: Option<&Regex>, include_synthetic: bool) -> Vec<String> {
    let mut ids: Vec<String> = index
        .type_ids()
        .filter(|t| type_re.is_none_or(|re| re.is_match(&index.type_decl(*t).qualified_name)))
        .flat_map(|t| index.methods_of(t))
        .filter(|m| include_synthetic || !index.method_decl(*m).synthetic)
        .map(|m| MethodId::of(index, m).to_string())
        .collect();
    ids.sort();
    ids
}

fn cmd_types(args: TypesArgs) -> Result<(), GraphError> {
    let index = load_index(&args.source)?;
    let rows = type_rows(&index);
    for (name, kind, module) in &rows {
        println!("{}\t{}\t{}", kind, name, module.as_deref().unwrap_or("-"));
    }
    eprintln!("{} types", rows.len());
    Ok(())
}

pub(crate) fn type_rows(index: &JavaIndex) -> Vec<(String, &'static str, Option<String>)> {
    let mut rows: Vec<_> = index
        .type_ids()
        .map(|t| {
            let decl = index.type_decl(t);
            let module = index.module_of(&decl.qualified_name).map(str::to_string);
            (decl.qualified_name.clone(), kind_label(decl.kind), module)
        })
        .collect();
    rows.sort();
    rows
}

fn kind_label(kind: TypeKind) -> &'static str {
    match kind {
        TypeKind::Class => "class",
        TypeKind::Interface => "interface",
        TypeKind::Enum => "enum",
        TypeKind::Record => "record",
        TypeKind::Annotation => "annotation",
    }
}
