use std::io;

use anyhow::Result;
use log::warn;

use callflow::config::ConsoleConfig;
use callflow::console;
use callflow::flow::scenario::demo_store;
use callflow::flow::store::{GraphStore, JsonDirGraphStore};
use callflow::flow::Interpreter;

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info   cargo run   # flow starts, transitions, finish/abort
    //   RUST_LOG=debug  cargo run   # + history appends, context writes, template fallbacks
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config = ConsoleConfig::from_args(&args)?;

    println!("========================================");
    println!("        CUSTOMER CARE CALL GUIDE");
    println!("========================================");
    println!("  Caller type : {}", config.caller);
    println!("  First flow  : {}/{}", config.category, config.flow);

    match &config.trees_dir {
        Some(dir) => {
            println!("  Flows from  : {}", dir.display());
            run_call(JsonDirGraphStore::new(dir), &config)
        }
        None => {
            println!("  Flows from  : built-in demo");
            run_call(demo_store(), &config)
        }
    }
}

fn run_call<S: GraphStore>(store: S, config: &ConsoleConfig) -> Result<()> {
    if let Ok(graph) = store.load(config.caller, &config.category, &config.flow) {
        for (from, to) in graph.dangling_references() {
            warn!("Flow {}/{}: '{from}' points at missing node '{to}'", config.category, config.flow);
        }
    }

    let mut interp = Interpreter::new(store);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut out = io::stdout();

    console::run(
        &mut interp,
        config.caller,
        (config.category.as_str(), config.flow.as_str()),
        &mut input,
        &mut out,
    )?;
    Ok(())
}
