use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use listen::GameState;
use listen::engine::{AudioEvent, InputSnapshot, Output, OutputBlock, RecordingAudio};
use listen::world::{load_world_from_file, validate_world};

const DEFAULT_CUE_MS: u64 = 800;

fn flush_output(out: Output, audio: Vec<AudioEvent>) {
    for event in audio {
        match event {
            AudioEvent::Play(cue) => println!("  ~ {}", cue),
            AudioEvent::PlayLooped { handle, cue, .. } => println!("  ~ loop #{} {}", handle.0, cue),
            AudioEvent::Stop(handle) => println!("  ~ stop #{}", handle.0),
            AudioEvent::Preload(n) => println!("  ~ {} sounds loaded", n),
            AudioEvent::Listener(_) | AudioEvent::SourcePose { .. } => {}
        }
    }

    for block in out.blocks {
        match block {
            OutputBlock::Event(ev) => println!("* {}", ev),
            OutputBlock::Warning(w) => println!("! {}", w),
        }
    }
}

fn parse_ms(arg: Option<&str>, default: u64) -> u64 {
    arg.and_then(|s| s.parse().ok()).unwrap_or(default)
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let world_path: PathBuf = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("world/demo.toml"));

    let world = match load_world_from_file(&world_path) {
        Ok(w) => {
            println!("Using world file: {}", world_path.display());
            w
        }
        Err(e) => {
            eprintln!("Failed to load world file '{}': {e}", world_path.display());
            std::process::exit(1);
        }
    };

    let problems = validate_world(&world);
    if !problems.is_empty() {
        for p in &problems {
            eprintln!("world error: {p}");
        }
        std::process::exit(1);
    }

    let mut game = match GameState::new(world, RecordingAudio::new(DEFAULT_CUE_MS)) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("Could not start: {e}");
            std::process::exit(1);
        }
    };

    println!("Commands: move <degrees> <ms>, hold <ms>, wait <ms>, tap [n], where, attrs,");
    println!("          pause, resume, quit\n");
    let out = game.take_output();
    let audio = game.audio_mut().take_events();
    flush_output(out, audio);

    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let bytes_read = stdin.read_line(&mut input)?;
        if bytes_read == 0 {
            println!("\nGoodbye.");
            break;
        }

        let lower = input.trim().to_lowercase();
        let mut parts = lower.split_whitespace();
        let verb = match parts.next() {
            Some(v) => v,
            None => continue,
        };

        match verb {
            "quit" | "exit" => {
                println!("Goodbye.");
                break;
            }
            "move" => {
                let degrees: f64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0.0);
                let ms = parse_ms(parts.next(), 500);
                game.advance(ms, &mut InputSnapshot::pushing(degrees.to_radians()));
            }
            "hold" => {
                let ms = parse_ms(parts.next(), 2500);
                game.advance(ms, &mut InputSnapshot::holding_still());
            }
            "wait" => {
                let ms = parse_ms(parts.next(), 1000);
                game.advance(ms, &mut InputSnapshot::released());
            }
            "tap" => {
                let n = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1u32);
                let counted = (0..n).filter(|_| game.pulse()).count();
                println!("{} of {} taps counted", counted, n);
            }
            "where" => {
                let p = &game.player;
                println!(
                    "{} at ({:.1}, {:.1}), {:?}, t={}ms",
                    p.room,
                    p.position.x,
                    p.position.y,
                    game.state(),
                    game.now()
                );
                for (name, near) in &p.options {
                    println!("  near {} ({:.1})", name, near.distance);
                }
            }
            "attrs" => {
                let mut attrs: Vec<_> = game.player.attributes.iter().collect();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (k, v) in attrs {
                    println!("  {} = {}", k, v);
                }
            }
            "pause" => game.set_paused(true),
            "resume" => game.set_paused(false),
            _ => println!("I don't understand that command."),
        }

        let out = game.take_output();
        let audio = game.audio_mut().take_events();
        flush_output(out, audio);
    }

    Ok(())
}
