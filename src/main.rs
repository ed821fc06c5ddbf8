use std::{fs, process};

use anyhow::{Context, Result, bail};

use showroom::{
    engine::{Engine, materials::MaterialTable, source::ShowroomConfig},
    player::Player,
    scheduler::Scheduler,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const PLAY_USAGE: &str = "showroom play <config.json>";
const PLAN_USAGE: &str = "showroom plan <config.json> <output.json>";
const SAMPLE_USAGE: &str = "showroom sample <config.json> <seconds>";

fn run() -> Result<()> {
    let mut args = std::env::args().skip(1);

    match args.next().as_deref() {
        Some("play") => {
            let path = args.next().context(PLAY_USAGE)?;
            play(&path)
        }
        Some("plan") => {
            let config_path = args.next().context(PLAN_USAGE)?;
            let output_path = args.next().context(PLAN_USAGE)?;
            plan(&config_path, &output_path)
        }
        Some("sample") => {
            let path = args.next().context(SAMPLE_USAGE)?;
            let seconds = args.next().context(SAMPLE_USAGE)?;
            let seconds: f64 = seconds
                .parse()
                .with_context(|| format!("Invalid time '{seconds}'"))?;
            sample(&path, seconds)
        }
        _ => bail!(
            "showroom: procedural bathroom walkthrough\n\nUsage:\n  {PLAY_USAGE}\n  {PLAN_USAGE}\n  {SAMPLE_USAGE}"
        ),
    }
}

fn play(path: &str) -> Result<()> {
    let config = ShowroomConfig::load(path)?;
    let plan = Engine::build(&config, &MaterialTable::builtin());
    let mut player = Player::new(plan)?;
    player.play()
}

fn plan(config_path: &str, output_path: &str) -> Result<()> {
    let config = ShowroomConfig::load(config_path)?;
    let plan = Engine::build(&config, &MaterialTable::builtin());

    let json = serde_json::to_string_pretty(&plan)?;
    fs::write(output_path, &json).with_context(|| format!("Failed to write {output_path}"))?;

    log::info!(
        "Wrote {} scene nodes from {} -> {}",
        plan.graph.len(),
        config_path,
        output_path,
    );
    Ok(())
}

fn sample(path: &str, seconds: f64) -> Result<()> {
    let config = ShowroomConfig::load(path)?;
    let plan = Engine::build(&config, &MaterialTable::builtin());
    let state = Scheduler::for_plan(&plan, 0.0).tick(seconds);
    println!("{}", serde_json::to_string_pretty(&state)?);
    Ok(())
}
