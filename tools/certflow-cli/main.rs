use certflow::expr::formatter::ExprFormatter;
use certflow::prelude::*;
use clap::{Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatCli {
    Json,
    Yaml,
}

impl From<FormatCli> for ExportFormat {
    fn from(format: FormatCli) -> Self {
        match format {
            FormatCli::Json => ExportFormat::Json,
            FormatCli::Yaml => ExportFormat::Yaml,
        }
    }
}

/// Inspect and transform certificate workflow graphs
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the workflow graph JSON file
    graph_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the prior nodes visible from a node, nearest first
    Prior { node_id: String },

    /// List the variables a branch condition on this node may compare against
    Variables { node_id: String },

    /// List upstream certificate outputs a deploy node may consume
    Certificates { node_id: String },

    /// Report references that are not visible from the nodes holding them
    Check,

    /// Show a branch condition in its flat editable form
    Flatten { node_id: String },

    /// Duplicate a node and its subtree, printing the copy
    Duplicate {
        node_id: String,

        /// Append "-copy" to the duplicated node's name
        #[arg(long)]
        copy_suffix: bool,

        /// Assign every id before rewriting references, so forward references are remapped
        #[arg(long)]
        two_pass: bool,

        /// Use deterministic ids with this prefix instead of random ones
        #[arg(long)]
        id_prefix: Option<String>,

        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatCli,
    },

    /// Export the whole graph with the stable key order
    Export {
        #[arg(short, long, value_enum, default_value = "json")]
        format: FormatCli,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let document = FlowDocument::from_file(&cli.graph_path).unwrap_or_else(|e| {
        exit_with_error(&format!(
            "Failed to load workflow graph '{}': {}",
            cli.graph_path, e
        ))
    });

    if let Err(e) = run(&document, cli.command) {
        exit_with_error(&e.to_string());
    }
}

fn run(document: &FlowDocument, command: Command) -> Result<()> {
    let index = document.index()?;

    match command {
        Command::Prior { node_id } => {
            let nodes = visible_prior_nodes(&index, &node_id)?;
            if nodes.is_empty() {
                println!("No prior nodes are visible from '{}'", node_id);
            }
            for node in nodes {
                println!("{:<24} {:<14} {}", node.id, node.kind, node.name());
            }
        }
        Command::Variables { node_id } => {
            let options = selectable_variables(&index, &node_id)?;
            if options.is_empty() {
                println!("No variables are selectable from '{}'", node_id);
            }
            for option in options {
                let value_type = option
                    .selector
                    .value_type
                    .map(|t| t.as_str())
                    .unwrap_or("?");
                let operators = option
                    .selector
                    .value_type
                    .map(|t| ComparisonOperator::supported_by(t).iter().join("/"))
                    .unwrap_or_default();
                println!(
                    "{:<40} {:<8} [{}]  {}",
                    option.label,
                    value_type,
                    operators,
                    option.key()
                );
            }
        }
        Command::Certificates { node_id } => {
            for source in certificate_sources(&index, &node_id)? {
                let name = index.node(&source.node_id).map(|n| n.name()).unwrap_or("");
                println!("{:<40} {}", source, name);
            }
        }
        Command::Check => {
            let mut problems = 0;
            for id in document.nodes.iter().flat_map(|n| n.subtree_ids()) {
                let invisible = invisible_references(&index, id)?;
                if !invisible.is_empty() {
                    problems += 1;
                    println!(
                        "{}: references invisible nodes {}",
                        id,
                        invisible.iter().join(", ")
                    );
                }
            }
            if problems == 0 {
                println!("All references are visible from the nodes that hold them.");
            }
        }
        Command::Flatten { node_id } => {
            let form = load_flat_form(document, &node_id);
            println!("{}", serde_json::to_string_pretty(&form)?);
            match from_flat_form(&form) {
                Some(expr) => println!("\n{}", ExprFormatter::format(&expr)),
                None => println!("\n(no condition, branch always taken)"),
            }
        }
        Command::Duplicate {
            node_id,
            copy_suffix,
            two_pass,
            id_prefix,
            format,
        } => {
            let source = index.require(&node_id)?;
            let strategy = if two_pass {
                RemapStrategy::TwoPass
            } else {
                RemapStrategy::SinglePass
            };
            let mut builder = Duplicator::builder()
                .with_copy_suffix(copy_suffix)
                .with_strategy(strategy);
            if let Some(prefix) = id_prefix {
                builder = builder.with_allocator(SequentialIdAllocator::new(prefix));
            }
            let duplication = builder.build().duplicate(source);

            eprintln!(
                "Identity map: {}",
                duplication
                    .identities
                    .iter()
                    .map(|(old_id, new_id)| format!("{} -> {}", old_id, new_id))
                    .join(", ")
            );
            println!(
                "{}",
                export(std::slice::from_ref(&duplication.node), format.into())?
            );
        }
        Command::Export { format } => {
            println!("{}", export(&document.nodes, format.into())?);
        }
    }

    Ok(())
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
