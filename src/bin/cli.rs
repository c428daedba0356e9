use std::env;
use std::error::Error;
use std::fs::File;
use std::io::Write;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use flowstep::graph::{self, Session, StepEvent, View};
use flowstep::io::{self, GraphFormat};
use flowstep::presets::{preset, random_graph, PRESET_NAMES};
use flowstep::types::node::path_to_string;
use flowstep::types::GraphSpec;

#[derive(Default)]
struct Options {
    format: Option<GraphFormat>,
    delay: Option<Duration>,
    dotfile: Option<String>,
    residual_view: bool,
    exportfile: Option<String>,
    input: Option<String>,
}

fn usage() {
    println!("Usage: cli [--format simple|json|matrix] [--auto <delay_ms>] [--dot <dotfile>] [--residual] [--export <file>] <graph file>");
    println!("Usage: cli [options] preset:<name>");
    println!("Usage: cli [options] random:<nodes>:<density percent>");
    println!("Presets: {}", PRESET_NAMES.join(", "));
    println!("Option --auto waits the given number of milliseconds between steps.");
    println!("Option --residual labels the dot output with residual capacities instead of flow.");
}

fn parse_args(args: &[String]) -> Result<Options, Box<dyn Error>> {
    let mut options = Options::default();
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        let mut value = || {
            args.next()
                .cloned()
                .ok_or_else(|| format!("Option {arg} expects a value"))
        };
        match arg.as_str() {
            "--format" => {
                let name = value()?;
                options.format = Some(
                    GraphFormat::from_name(&name).ok_or(format!("Unknown format: {name}"))?,
                );
            }
            "--auto" => options.delay = Some(Duration::from_millis(value()?.parse()?)),
            "--dot" => options.dotfile = Some(value()?),
            "--export" => options.exportfile = Some(value()?),
            "--residual" => options.residual_view = true,
            _ if options.input.is_none() && !arg.starts_with("--") => {
                options.input = Some(arg.clone())
            }
            _ => return Err(From::from(format!("Unexpected argument: {arg}"))),
        }
    }
    Ok(options)
}

fn load_input(input: &str, format: Option<GraphFormat>) -> Result<GraphSpec, Box<dyn Error>> {
    if let Some(name) = input.strip_prefix("preset:") {
        return preset(name).ok_or_else(|| From::from(format!("Unknown preset: {name}")));
    }
    if let Some(params) = input.strip_prefix("random:") {
        let (nodes, density) = params
            .split_once(':')
            .ok_or_else(|| format!("Expected random:<nodes>:<density>, got {input}"))?;
        let graph = random_graph(nodes.parse()?, density.parse()?, &mut rand::thread_rng())?;
        println!("Generated graph: {}", io::to_simple(&graph));
        return Ok(graph);
    }
    Ok(io::read_graph_file(input, format)?)
}

fn print_event(event: &StepEvent) {
    match event {
        StepEvent::PathFound { path, bottleneck } => {
            println!("Path found: {} (bottleneck: {bottleneck})", path_to_string(path))
        }
        StepEvent::Augmented {
            path,
            bottleneck,
            max_flow,
            path_count,
        } => println!(
            "Augmented +{bottleneck} along {} (max flow {max_flow}, path #{path_count})",
            path_to_string(path)
        ),
        StepEvent::Complete { max_flow } => println!("Algorithm complete! Maximum flow: {max_flow}"),
    }
}

fn run(options: Options) -> Result<(), Box<dyn Error>> {
    let input = options.input.as_deref().ok_or("Missing graph file")?;
    let mut session = Session::with_graph(load_input(input, options.format)?)?;
    println!(
        "Loaded {} nodes, {} edges from {input}",
        session.network().node_count(),
        session.network().edge_count()
    );
    session.initialize()?;
    loop {
        let event = session.step()?;
        print_event(&event);
        if matches!(event, StepEvent::Complete { .. }) {
            break;
        }
        if let Some(delay) = options.delay {
            thread::sleep(delay);
        }
    }

    let metrics = session.metrics();
    println!(
        "{}",
        json::object! {
            maxFlowValue: metrics.max_flow,
            pathCount: metrics.path_count,
            runtimeMs: metrics.runtime_ms as u64,
            density: format!("{:.1}", metrics.density),
        }
    );

    if let Some(dotfile) = options.dotfile {
        let view = if options.residual_view {
            View::Residual
        } else {
            View::Flow
        };
        let dot = graph::network_to_dot(
            session.network(),
            session.residual(),
            view,
            session.current_path(),
        );
        File::create(&dotfile)?.write_all(dot.as_bytes())?;
        println!("Wrote dotfile {dotfile}.");
    }
    if let Some(exportfile) = options.exportfile {
        File::create(&exportfile)?.write_all(io::export_session(&session).pretty(2).as_bytes())?;
        println!("Wrote export {exportfile}.");
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = env::args().skip(1).collect::<Vec<_>>();
    let options = match parse_args(&args) {
        Ok(options) if options.input.is_some() => options,
        Ok(_) => {
            usage();
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}");
            usage();
            return ExitCode::FAILURE;
        }
    };
    match run(options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
