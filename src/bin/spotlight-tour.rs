use std::{
    cell::RefCell,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    rc::Rc,
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use spotlight_tour::{
    AnimationKind, AnimationOutcome, Effect, Size, SpotGeometry, SpotRect, SpotlightTour,
    TipPlacement, TourConfig, TourEvent, Viewport,
};

#[derive(Parser, Debug)]
#[command(name = "spotlight-tour", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a tour JSON file and print a summary.
    Check(CheckArgs),
    /// Run a tour headlessly and print per-step geometry and tooltip placement as JSON.
    Plan(PlanArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input tour JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input tour JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Target rectangles JSON: one `{x, y, width, height}` (or `null`) per step.
    #[arg(long)]
    targets: PathBuf,

    /// Viewport size as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size, default_value = "360x640")]
    viewport: Size,

    /// Tooltip size as `WIDTHxHEIGHT`.
    #[arg(long, value_parser = parse_size, default_value = "240x120")]
    tip: Size,
}

#[derive(Debug, serde::Serialize)]
struct PlannedStep {
    index: usize,
    spot: Option<SpotRect>,
    geometry: Option<SpotGeometry>,
    tip: Option<TipPlacement>,
    never_measured: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

fn parse_size(s: &str) -> Result<Size, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w: f64 = w.trim().parse().map_err(|e| format!("width: {e}"))?;
    let h: f64 = h.trim().parse().map_err(|e| format!("height: {e}"))?;
    if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
        return Err(format!("size must be positive, got '{s}'"));
    }
    Ok(Size::new(w, h))
}

fn read_config(path: &Path) -> anyhow::Result<TourConfig> {
    let config = TourConfig::from_path(path)
        .with_context(|| format!("load tour '{}'", path.display()))?;
    config.validate().with_context(|| "validate tour")?;
    Ok(config)
}

fn read_targets(path: &Path) -> anyhow::Result<Vec<Option<SpotRect>>> {
    let f = File::open(path).with_context(|| format!("open targets '{}'", path.display()))?;
    let targets = serde_json::from_reader(BufReader::new(f)).with_context(|| "parse targets JSON")?;
    Ok(targets)
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let config = read_config(&args.in_path)?;
    println!(
        "ok: {} steps, mask {:?} at {:.2}, continue on backdrop press: {}",
        config.steps.len(),
        config.color.0,
        config.opacity,
        config.should_continue_on_backdrop_press
    );
    for (idx, step) in config.steps.iter().enumerate() {
        println!(
            "  [{idx}] {:?} {:?} align={:?} motion={:?} {}",
            step.position, step.shape, step.align_to, step.motion, step.title
        );
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let config = read_config(&args.in_path)?;
    let targets = read_targets(&args.targets)?;
    let viewport = Viewport::new(args.viewport.width, args.viewport.height)?;
    let step_count = config.steps.len();

    let mut tour = SpotlightTour::new(config, viewport)?;
    for (idx, target) in targets.into_iter().enumerate() {
        if let Some(target) = target {
            tour.register(idx, Arc::new(target.to_rect()?));
        }
    }

    let gave_up = Rc::new(RefCell::new(Vec::new()));
    {
        let gave_up = Rc::clone(&gave_up);
        tour.subscribe(move |event| {
            if let TourEvent::TargetNeverMeasured { index, .. } = event {
                gave_up.borrow_mut().push(*index);
            }
        });
    }

    let mut planned = Vec::with_capacity(step_count);
    tour.start()?;
    for index in 0..step_count {
        if index > 0 {
            tour.next();
        }
        settle(&mut tour);
        tour.on_tip_layout(args.tip);
        let never_measured = gave_up.borrow().contains(&index);
        planned.push(PlannedStep {
            index,
            spot: tour.spot().map(SpotRect::from),
            geometry: tour.geometry(),
            tip: tour.tip_placement(),
            never_measured,
        });
    }
    tour.stop();

    let out = serde_json::to_string_pretty(&planned).with_context(|| "serialize plan")?;
    println!("{out}");
    Ok(())
}

/// Complete every queued effect immediately.
fn settle(tour: &mut SpotlightTour) {
    loop {
        let effects = tour.take_effects();
        if effects.is_empty() {
            return;
        }
        for effect in effects {
            match effect {
                Effect::Measure { transition, .. } => tour.resolve_measurement(transition),
                Effect::RetryMeasure { transition, .. } => tour.on_retry_due(transition),
                Effect::HideTip { transition, .. } => tour.on_animation_finished(
                    transition,
                    AnimationKind::HideTip,
                    AnimationOutcome::Completed,
                ),
                Effect::MoveSpot { transition, .. } => tour.on_animation_finished(
                    transition,
                    AnimationKind::MoveSpot,
                    AnimationOutcome::Completed,
                ),
                Effect::RevealTip { transition, .. } => tour.on_animation_finished(
                    transition,
                    AnimationKind::RevealTip,
                    AnimationOutcome::Completed,
                ),
                Effect::CancelAnimations { .. } => {}
            }
        }
    }
}
