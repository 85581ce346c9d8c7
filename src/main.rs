//! Marbles entry point
//!
//! Headless driver: builds a layout, runs fixed ticks with scripted rotor
//! controls and pointer clicks, then prints the final model as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use glam::DVec2;

use marbles::consts::{TICK_HZ, TICK_MS};
use marbles::sim::{Control, TurnSense};
use marbles::{Direction, Layout, Model, PointerButton, Settings, resolve};

#[derive(Debug, Parser)]
#[command(name = "marbles", about = "Run a marble track layout headless")]
struct Args {
    /// Layout JSON file (defaults to the built-in demo level)
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Settings JSON file (board geometry, hit radii)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 600)]
    ticks: u64,

    /// Spin a rotor: TICK:ROW:COL:cw|ccw
    #[arg(long, value_parser = parse_turn)]
    turn: Vec<Scripted>,

    /// Eject from a rotor: TICK:ROW:COL:n|e|s|w
    #[arg(long, value_parser = parse_eject)]
    eject: Vec<Scripted>,

    /// Pointer press at a screen point: TICK:X:Y[:right]
    #[arg(long, value_parser = parse_click)]
    click: Vec<Scripted>,

    /// Print the demo layout as JSON and exit
    #[arg(long)]
    dump_demo: bool,
}

#[derive(Debug, Clone)]
enum Action {
    Control(Control),
    Click { point: DVec2, button: PointerButton },
}

#[derive(Debug, Clone)]
struct Scripted {
    tick: u64,
    action: Action,
}

fn fields(s: &str, min: usize, max: usize) -> Result<Vec<&str>, String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() < min || parts.len() > max {
        return Err(format!("expected {} to {} ':'-separated fields, got '{}'", min, max, s));
    }
    Ok(parts)
}

fn number<T: std::str::FromStr>(s: &str) -> Result<T, String> {
    s.parse().map_err(|_| format!("'{}' is not a number", s))
}

fn parse_turn(s: &str) -> Result<Scripted, String> {
    let f = fields(s, 4, 4)?;
    let sense = match f[3].to_lowercase().as_str() {
        "cw" => TurnSense::Clockwise,
        "ccw" => TurnSense::CounterClockwise,
        other => return Err(format!("'{}' is not cw or ccw", other)),
    };
    Ok(Scripted {
        tick: number(f[0])?,
        action: Action::Control(Control::Turn {
            row: number(f[1])?,
            col: number(f[2])?,
            sense,
        }),
    })
}

fn parse_eject(s: &str) -> Result<Scripted, String> {
    let f = fields(s, 4, 4)?;
    let side = Direction::parse(f[3]).ok_or_else(|| format!("'{}' is not a direction", f[3]))?;
    Ok(Scripted {
        tick: number(f[0])?,
        action: Action::Control(Control::Eject {
            row: number(f[1])?,
            col: number(f[2])?,
            side,
        }),
    })
}

fn parse_click(s: &str) -> Result<Scripted, String> {
    let f = fields(s, 3, 4)?;
    let button = match f.get(3).map(|b| b.to_lowercase()) {
        None => PointerButton::Primary,
        Some(b) if b == "right" => PointerButton::Secondary,
        Some(b) if b == "left" => PointerButton::Primary,
        Some(b) => return Err(format!("'{}' is not left or right", b)),
    };
    Ok(Scripted {
        tick: number(f[0])?,
        action: Action::Click {
            point: DVec2::new(number(f[1])?, number(f[2])?),
            button,
        },
    })
}

fn load_model(path: Option<&PathBuf>) -> Result<Model> {
    let layout = match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading layout {}", path.display()))?;
            Layout::from_json(&json).with_context(|| format!("parsing layout {}", path.display()))?
        }
        None => Layout::demo(),
    };
    Ok(layout.build()?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.dump_demo {
        println!("{}", Layout::demo().to_json()?);
        return Ok(());
    }

    log::info!("Marbles (headless) starting...");
    let settings = match &args.settings {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let mut model = load_model(args.layout.as_ref())?;

    let mut script: Vec<Scripted> = args
        .turn
        .into_iter()
        .chain(args.eject)
        .chain(args.click)
        .collect();
    if let Some(late) = script.iter().find(|s| s.tick > args.ticks) {
        bail!("scripted input at tick {} is past the last tick {}", late.tick, args.ticks);
    }
    // Stable sort keeps command-line order within a tick
    script.sort_by_key(|s| s.tick);
    let mut pending = script.into_iter().peekable();

    // Inputs scheduled at tick N land before the Nth progress call
    for tick in 0..=args.ticks {
        while let Some(scripted) = pending.next_if(|s| s.tick == tick) {
            let control = match scripted.action {
                Action::Control(control) => Some(control),
                Action::Click { point, button } => {
                    resolve(&model, &settings.geometry, &settings.hit, point, button)
                }
            };
            match control {
                Some(control) => {
                    let applied = model.apply(control)?;
                    log::info!("Tick {}: {:?} applied={}", tick, control, applied);
                }
                None => log::info!("Tick {}: click hit nothing", tick),
            }
        }
        if tick == args.ticks {
            break;
        }

        model
            .progress(TICK_MS)
            .with_context(|| format!("tick {}", tick))?;

        if (tick + 1) % (TICK_HZ as u64) == 0 {
            let captured = model.balls().iter().filter(|b| b.is_inside_rotor()).count();
            log::debug!("{} s: {} balls held in rotors", (tick + 1) / TICK_HZ as u64, captured);
        }
    }

    log::info!("Ran {} ticks with {} balls", args.ticks, model.balls().len());
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}
