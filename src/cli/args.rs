//! CLI argument structs for all subcommands.

use clap::{Args, Parser, ValueEnum};

use methodlink::SubtypeStrategy;

/// Where the sources come from and how they are loaded. Shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Root directory to analyze (repeatable)
    #[arg(short, long, default_value = ".")]
    pub dir: Vec<String>,

    /// Source file extensions, comma-separated
    #[arg(short, long, default_value = "java")]
    pub ext: String,

    /// Compiled-type metadata JSON for third-party jars (repeatable)
    #[arg(long, value_name = "FILE.json")]
    pub classpath: Vec<String>,

    /// Number of parser threads (0 = auto)
    #[arg(short, long, default_value = "0")]
    pub threads: usize,

    /// Do not generate @Data/@Getter/@Setter and record accessors
    #[arg(long)]
    pub no_accessors: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtypesArg {
    /// Search every subtype for overrides
    All,
    /// Only follow types with exactly one direct subtype
    Single,
}

impl From<SubtypesArg> for SubtypeStrategy {
    fn from(value: SubtypesArg) -> Self {
        match value {
            SubtypesArg::All => SubtypeStrategy::All,
            SubtypesArg::Single => SubtypeStrategy::SingleOnly,
        }
    }
}

#[derive(Parser, Debug)]
pub struct GraphArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Root method identity, e.g. demo.Shop#checkout(java.lang.String) (repeatable)
    #[arg(short, long, required = true)]
    pub method: Vec<String>,

    /// Print the flat node/edge view instead of the nested tree
    #[arg(long)]
    pub view: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Which subtypes are searched for overrides
    #[arg(long, value_enum, default_value = "all")]
    pub subtypes: SubtypesArg,

    /// Disable the heuristic inferencer; keep only calls the primary resolver pins down
    #[arg(long)]
    pub no_heuristics: bool,

    /// Receiver name whose calls are never inferred (repeatable, adds to log/LOGGER/logger)
    #[arg(long, value_name = "NAME")]
    pub exclude_receiver: Vec<String>,

    /// Expand standard-library callees too
    #[arg(long)]
    pub include_stdlib: bool,
}

#[derive(Parser, Debug)]
pub struct MethodsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only types whose qualified name matches this regex
    #[arg(long = "type", value_name = "REGEX")]
    pub type_filter: Option<String>,

    /// Include generated accessors in the listing
    #[arg(long)]
    pub synthetic: bool,
}

#[derive(Parser, Debug)]
pub struct TypesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
