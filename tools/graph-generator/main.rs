use certflow::node::{CERTIFICATE_CONFIG_KEY, EXPRESSION_CONFIG_KEY};
use certflow::prelude::*;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::fs;

/// A CLI tool to generate random workflow graphs for exercising the engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_workflow.json")]
    output: String,

    /// Number of steps in the main chain between start and end
    #[arg(long, default_value_t = 6)]
    steps: usize,

    /// Maximum nesting depth of condition and try/catch blocks
    #[arg(long, default_value_t = 2)]
    depth: usize,

    /// Seed for reproducible graphs
    #[arg(long)]
    seed: Option<u64>,
}

struct Generator {
    rng: StdRng,
    ids: SequentialIdAllocator,
    /// Nodes generated so far that deploy references may point at.
    certificate_sources: Vec<String>,
    /// Nodes generated so far that publish condition variables.
    variable_sources: Vec<String>,
}

impl Generator {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        Self {
            rng,
            ids: SequentialIdAllocator::new("n"),
            certificate_sources: Vec::new(),
            variable_sources: Vec::new(),
        }
    }

    fn chain(&mut self, steps: usize, depth: usize) -> Vec<Node> {
        (0..steps).map(|_| self.step(depth)).collect()
    }

    fn step(&mut self, depth: usize) -> Node {
        let roll = self.rng.random_range(0..10);
        match roll {
            0 if depth > 0 => self.condition(depth),
            1 if depth > 0 => self.try_catch(depth),
            2..=3 => self.leaf(NodeType::BizApply),
            4 => self.leaf(NodeType::BizUpload),
            5 => self.leaf(NodeType::BizMonitor),
            6..=7 => self.deploy(),
            8 => self.leaf(NodeType::BizNotify),
            _ => self.leaf(NodeType::Delay),
        }
    }

    fn leaf(&mut self, kind: NodeType) -> Node {
        let id = self.ids.allocate();
        if kind.provides_certificate() {
            self.certificate_sources.push(id.clone());
        }
        if !kind.variables().is_empty() {
            self.variable_sources.push(id.clone());
        }
        let name = format!("{} {}", kind, id);
        Node::new(id, kind, name)
    }

    fn deploy(&mut self) -> Node {
        let node = self.leaf(NodeType::BizDeploy);
        let reference = Self::pick(&mut self.rng, &self.certificate_sources)
            .map(|id| CertificateRef::new(id).to_string())
            .unwrap_or_default();
        let mut config = NodeConfig::new();
        config.insert(CERTIFICATE_CONFIG_KEY.to_string(), json!(reference));
        node.with_config(config)
    }

    fn condition(&mut self, depth: usize) -> Node {
        let node = self.leaf(NodeType::Condition);
        let branches = self.rng.random_range(2..=3);
        let blocks = (0..branches)
            .map(|_| {
                let mut branch = self.leaf(NodeType::BranchBlock);
                if let Some(expr) = self.random_expression() {
                    let mut config = NodeConfig::new();
                    config.insert(EXPRESSION_CONFIG_KEY.to_string(), json!(expr));
                    branch = branch.with_config(config);
                }
                let steps = self.rng.random_range(1..=3);
                branch.with_blocks(self.chain(steps, depth - 1))
            })
            .collect();
        node.with_blocks(blocks)
    }

    fn try_catch(&mut self, depth: usize) -> Node {
        let node = self.leaf(NodeType::TryCatch);
        let steps = self.rng.random_range(1..=3);
        let try_block = self.leaf(NodeType::TryBlock);
        let try_block = try_block.with_blocks(self.chain(steps, depth - 1));
        let catch_block = self.leaf(NodeType::CatchBlock);
        let catch_block = catch_block.with_blocks(vec![self.leaf(NodeType::BizNotify)]);
        node.with_blocks(vec![try_block, catch_block])
    }

    fn pick(rng: &mut StdRng, ids: &[String]) -> Option<String> {
        if ids.is_empty() {
            return None;
        }
        let index = rng.random_range(0..ids.len());
        Some(ids[index].clone())
    }

    fn random_expression(&mut self) -> Option<Expr> {
        let count = self.rng.random_range(0..=3);
        let conditions: Vec<FlatCondition> = (0..count)
            .filter_map(|_| {
                let producer = Self::pick(&mut self.rng, &self.variable_sources)?;
                let condition = if self.rng.random_bool(0.5) {
                    let selector =
                        Selector::new(producer, "certificate.daysLeft", ValueType::Number);
                    let days = self.rng.random_range(1..=90);
                    FlatCondition::new(&selector, ComparisonOperator::Lte, days.to_string())
                } else {
                    let selector =
                        Selector::new(producer, "certificate.validity", ValueType::Boolean);
                    FlatCondition::new(&selector, ComparisonOperator::Eq, "true")
                };
                Some(condition)
            })
            .collect();
        let logical_operator = if self.rng.random_bool(0.5) {
            LogicalOperator::And
        } else {
            LogicalOperator::Or
        };
        from_flat_form(&FlatForm {
            conditions,
            logical_operator,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut generator = Generator::new(cli.seed);

    println!(
        "Generating workflow graph ({} steps, depth {})...",
        cli.steps, cli.depth
    );

    let mut nodes = vec![generator.leaf(NodeType::Start)];
    nodes.extend(generator.chain(cli.steps, cli.depth));
    nodes.push(generator.leaf(NodeType::End));

    let document = FlowDocument::new(nodes);
    let index = document.index()?;
    fs::write(&cli.output, to_json(&document.nodes)?)?;

    println!(
        "Successfully generated {} nodes and saved them to '{}'",
        index.len(),
        cli.output
    );

    Ok(())
}
