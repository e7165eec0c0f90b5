use chrono::Utc;
use clap::{Parser, Subcommand};
use navigator_core::incident::render_plain;
use navigator_core::{
    Catalog, DatasetExport, DatasetRequest, Direction, NavigatorResult, QaPair, TreeCursor,
    WizardKind,
};
use navigator_gateway::{GatewayConfig, LlmGateway};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "navigator")]
#[command(about = "Knowledge Navigator support dashboard CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List system components and their connections
    Components,
    /// Show the components connected to one component
    Related {
        /// Component id (e.g. iris)
        id: String,
    },
    /// List the troubleshooting wizards
    Wizards,
    /// Walk a wizard's decision tree
    Walk {
        /// Wizard kind: dicom, hl7 or powerscribe
        wizard: String,
        /// Option indices to take from the start node, in order
        choices: Vec<usize>,
    },
    /// Check every decision tree and report unreachable nodes
    Validate,
    /// Print an incident assessment
    Incident {
        /// Incident id
        id: String,
    },
    /// Ask the knowledge base a question (needs an AI API key)
    Ask {
        /// Question text
        question: String,
    },
    /// Generate a training dataset and write it as JSON (needs an AI API key)
    Dataset {
        /// Dataset topic
        topic: String,
        /// Persona the questions are written as
        #[arg(long, default_value = "Support Engineer")]
        persona: String,
        /// Number of question/answer pairs (clamped to 1..=20)
        #[arg(long)]
        count: Option<u32>,
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("navigator=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let catalog = Catalog::builtin()?;

    match cli.command {
        Some(Commands::Components) => print!("{}", components_report(&catalog)),
        Some(Commands::Related { id }) => match related_report(&catalog, &id) {
            Ok(report) => print!("{report}"),
            Err(e) => eprintln!("Error: {}", e),
        },
        Some(Commands::Wizards) => {
            for kind in WizardKind::ALL {
                println!("{:<12} {}", kind.slug(), kind.title());
                println!("             {}", kind.description());
            }
        }
        Some(Commands::Walk { wizard, choices }) => match walk_report(&catalog, &wizard, &choices) {
            Ok(report) => print!("{report}"),
            Err(e) => eprintln!("Error walking wizard: {}", e),
        },
        Some(Commands::Validate) => print!("{}", validate_report(&catalog)),
        Some(Commands::Incident { id }) => match catalog.incident(&id) {
            Ok(doc) => {
                println!("{}\n", doc.title);
                print!("{}", render_plain(&doc.segments()));
            }
            Err(e) => eprintln!("Error: {}", e),
        },
        Some(Commands::Ask { question }) => {
            let gateway = LlmGateway::new(gateway_config()?);
            match navigator_gateway::ask(&gateway, catalog.knowledge_base(), &question).await {
                Ok(answer) => println!("{answer}"),
                Err(e) => eprintln!("Error asking question: {}", e),
            }
        }
        Some(Commands::Dataset {
            topic,
            persona,
            count,
            out,
        }) => {
            let request = DatasetRequest::new(&topic, &persona, count)?;
            let gateway = LlmGateway::new(gateway_config()?);
            match navigator_gateway::generate_dataset(&gateway, catalog.knowledge_base(), &request)
                .await
            {
                Ok(pairs) => {
                    let path = export_dataset(&request, pairs, &out)?;
                    println!("Wrote dataset to {}", path.display());
                }
                Err(e) => eprintln!("Error generating dataset: {}", e),
            }
        }
        None => {
            println!("No command given. Try --help.");
        }
    }

    Ok(())
}

fn gateway_config() -> Result<GatewayConfig, Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env_values(
        std::env::var("NAVIGATOR_AI_PROVIDER").ok(),
        std::env::var("NAVIGATOR_AI_MODEL").ok(),
        std::env::var("NAVIGATOR_AI_API_KEY").ok(),
        std::env::var("API_KEY").ok(),
    )?;
    if !config.is_configured() {
        return Err("set NAVIGATOR_AI_API_KEY (or API_KEY) to use AI commands".into());
    }
    Ok(config)
}

fn components_report(catalog: &Catalog) -> String {
    let graph = catalog.graph();
    let mut out = String::new();
    for component in graph.components() {
        out.push_str(&format!("{:<12} {}\n", component.id.as_str(), component.name));
    }
    out.push('\n');
    for conn in graph.connections() {
        out.push_str(&format!("{} -> {} ({})\n", conn.from, conn.to, conn.protocol.label()));
    }
    out
}

fn related_report(catalog: &Catalog, id: &str) -> NavigatorResult<String> {
    let graph = catalog.graph();
    let component = graph.component(id)?;
    let mut out = format!("{} ({})\n", component.name, component.id);
    for conn in graph.neighbors(id, Direction::Incoming)? {
        out.push_str(&format!("  <- {} [{}]\n", conn.from, conn.protocol.label()));
    }
    for conn in graph.neighbors(id, Direction::Outgoing)? {
        out.push_str(&format!("  -> {} [{}]\n", conn.to, conn.protocol.label()));
    }
    Ok(out)
}

fn walk_report(catalog: &Catalog, wizard: &str, choices: &[usize]) -> NavigatorResult<String> {
    let kind: WizardKind = wizard.parse()?;
    let tree = catalog.tree(kind);
    let cursor = TreeCursor::walk(tree, choices)?;
    let node = cursor.node(tree)?;

    let mut out = format!("{} > {}\n", kind.title(), cursor.current());
    out.push_str(&format!("{}\n", node.text));
    match node.resolution() {
        Some(resolution) => out.push_str(&format!("Resolution: {resolution}\n")),
        None => {
            for (index, option) in node.options().iter().enumerate() {
                out.push_str(&format!("  [{index}] {}\n", option.text));
            }
        }
    }
    Ok(out)
}

fn validate_report(catalog: &Catalog) -> String {
    let mut out = String::new();
    for kind in WizardKind::ALL {
        let tree = catalog.tree(kind);
        let orphans = tree.orphans();
        out.push_str(&format!("{}: {} nodes", tree.name(), tree.len()));
        if orphans.is_empty() {
            out.push_str(", all reachable\n");
        } else {
            let names: Vec<&str> = orphans.iter().map(|k| k.as_str()).collect();
            out.push_str(&format!(", unreachable: {}\n", names.join(", ")));
        }
    }
    out
}

fn export_dataset(
    request: &DatasetRequest,
    pairs: Vec<QaPair>,
    dir: &Path,
) -> NavigatorResult<PathBuf> {
    DatasetExport::new(request, pairs, Utc::now()).write_to(dir)
}
