use std::{fs, process};

use anyhow::{Context, Result, bail};

use svg_turtle::{
    engine::Turtle,
    script::{self, TurtleScript},
};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const RUN_USAGE: &str = "svg-turtle run <script.json> <output.svg>";
const SHOW_USAGE: &str = "svg-turtle show <script.json>";

fn run() -> Result<()> {
    simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Warn)
        .env()
        .init()?;

    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("run") => {
            let script_path = args.next().context(RUN_USAGE)?;
            let output_path = args.next().context(RUN_USAGE)?;
            run_script(&script_path, &output_path)
        }
        Some("show") => {
            let script_path = args.next().context(SHOW_USAGE)?;
            show(&script_path)
        }
        _ => bail!(
            "svg-turtle — turtle graphics rendered to SVG\n\nUsage:\n  {RUN_USAGE}\n  {SHOW_USAGE}"
        ),
    }
}

fn load(path: &str) -> Result<TurtleScript> {
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {path}"))
}

fn execute(path: &str) -> Result<Turtle> {
    let script = load(path)?;
    // File output is static; skip animation delays regardless of the
    // scripted speed.
    let mut config = script.window.clone();
    config.speed = 0;
    let mut turtle = Turtle::new(config)?;
    script::run(&mut turtle, &script.commands)
        .with_context(|| format!("Failed to execute {path}"))?;
    Ok(turtle)
}

fn run_script(script_path: &str, output_path: &str) -> Result<()> {
    let turtle = execute(script_path)?;
    turtle
        .save_svg(output_path, false)
        .with_context(|| format!("Failed to write {output_path}"))?;

    let scene = turtle.scene();
    eprintln!(
        "Rendered {} path fragments, {} dots, {} stamps from {} -> {}",
        scene.lines().len(),
        scene.dots().len(),
        scene.stamp_count(),
        script_path,
        output_path,
    );
    Ok(())
}

fn show(script_path: &str) -> Result<()> {
    let turtle = execute(script_path)?;
    println!("{}", turtle.to_svg(false));
    Ok(())
}
