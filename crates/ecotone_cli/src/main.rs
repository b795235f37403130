mod render;

use anyhow::Result;
use clap::Parser;
use ecotone_core::factory::{build_session, ModelKind};
use ecotone_core::session::SimulationSession;
use ecotone_core::solver::SolverOptions;
use std::io::{self, BufRead, Write};

/// Interactive explorer for ecological population-dynamics models.
///
/// Starts one simulation session and drives it with line commands; each
/// committed change re-integrates the whole trajectory from the model's
/// fixed initial condition and redraws it.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Model variant to start with (lotka-volterra, rosenzweig-macarthur,
    /// food-web).
    #[arg(long, default_value = "lotka-volterra")]
    model: String,

    /// List the available model variants and exit.
    #[arg(long)]
    list: bool,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = Cli::parse();

    if args.list {
        for kind in ModelKind::ALL {
            println!("{kind:<22} {}", kind.title());
        }
        return Ok(());
    }

    let kind: ModelKind = args.model.parse()?;
    run_session(kind)
}

/// Compartments worth plotting per variant: both populations for the
/// predator-prey models, the four consumer series for the food web (its
/// nutrient and autotroph pools would dwarf them on a shared axis).
fn display_dims(kind: ModelKind) -> Vec<usize> {
    match kind {
        ModelKind::LotkaVolterra | ModelKind::RosenzweigMacArthur => vec![0, 1],
        ModelKind::FoodWeb => vec![4, 5, 6, 7],
    }
}

fn draw(kind: ModelKind, session: &SimulationSession) {
    println!("\n{}", kind.title());
    render::draw(
        session.time_grid(),
        session.trajectory(),
        kind.state_labels(),
        &display_dims(kind),
    );
}

fn print_params(session: &SimulationSession) {
    for (spec, value) in session.parameters().iter() {
        println!(
            "  {:<10} = {:<10} ({}, range {} .. {})",
            spec.name, value, spec.label, spec.min, spec.max
        );
    }
}

fn print_help() {
    println!("commands:");
    println!("  set <name> <value>   change one parameter and recompute");
    println!("  reset                restore defaults and recompute");
    println!("  params               list parameters of the active model");
    println!("  show                 redraw the current trajectory");
    println!("  model <kind>         switch to another model variant");
    println!("  help                 this message");
    println!("  quit                 leave");
}

fn run_session(mut kind: ModelKind) -> Result<()> {
    let mut session = build_session(kind, SolverOptions::default())?;
    draw(kind, &session);
    print_help();

    let stdin = io::stdin();
    loop {
        print!("ecotone> ");
        io::stdout().flush()?;

        let Some(line) = stdin.lock().lines().next() else {
            break;
        };
        let line = line?;
        let mut words = line.split_whitespace();

        // One command is processed fully before the next line is read; the
        // session never sees overlapping events.
        match words.next() {
            None => {}
            Some("set") => match (words.next(), words.next()) {
                (Some(name), Some(raw)) => match raw.parse::<f64>() {
                    Ok(value) => match session.set_parameter(name, value) {
                        Ok(_) => draw(kind, &session),
                        Err(error) => println!("error: {error}"),
                    },
                    Err(_) => println!("error: \"{raw}\" is not a number"),
                },
                _ => println!("usage: set <name> <value>"),
            },
            Some("reset") => match session.reset() {
                Ok(_) => draw(kind, &session),
                Err(error) => println!("error: {error}"),
            },
            Some("params") => print_params(&session),
            Some("show") => draw(kind, &session),
            Some("model") => match words.next().map(str::parse::<ModelKind>) {
                Some(Ok(next_kind)) => {
                    session = build_session(next_kind, SolverOptions::default())?;
                    kind = next_kind;
                    draw(kind, &session);
                }
                Some(Err(error)) => println!("error: {error}"),
                None => println!("usage: model <kind>"),
            },
            Some("help") => print_help(),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command \"{other}\" (try \"help\")"),
        }
    }

    Ok(())
}
