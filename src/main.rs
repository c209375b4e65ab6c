mod analyzer;
mod cli;
mod collision;
mod dsl;
mod emit;
mod error;
mod geometry;
mod interpreter;
mod scene;
mod shapes;
mod timeline;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;

const DEMO_PROGRAM: &str = include_str!("../demos/orbit.motion");

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    let source = match &cli.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading input file {}", path.display()))?,
        None => {
            log::info!("no --input given, running the bundled demo program");
            DEMO_PROGRAM.to_string()
        }
    };

    match run(&source, cli.print_type) {
        Ok(document) => {
            std::fs::write(&cli.output, document)
                .with_context(|| format!("writing output file {}", cli.output.display()))?;
            log::info!("wrote {}", cli.output.display());
            Ok(())
        }
        Err(err) => {
            eprintln!("{}", err.report());
            std::process::exit(1);
        }
    }
}

/// Parse → analyze → interpret → emit, returning the serialized document.
fn run(source: &str, print_type: bool) -> error::Result<String> {
    let program = dsl::parse(source)?;
    log::debug!("parsed program into AST");

    let mut analyzer = analyzer::Analyzer::new();
    analyzer.run(&program)?;
    log::debug!("static analysis passed for {} objects", analyzer.order.len());

    if print_type {
        for name in &analyzer.order {
            let state = &analyzer.states[name];
            println!(
                "{name}: appeared={} ignored={} moving={}",
                state.appeared, state.ignored, state.moving
            );
        }
    }

    let mut interpreter = interpreter::Interpreter::new();
    interpreter.run(&program)?;
    log::info!(
        "interpreted {} objects over {} segments",
        interpreter.scene.len(),
        interpreter.timeline.segments.len()
    );

    let document = emit::emit_document(&interpreter.scene, &interpreter.timeline);
    Ok(document.to_string_pretty())
}
