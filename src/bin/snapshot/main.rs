// snapshot - Render a field headlessly and save the last frame as PNG
//
// Drives the same controller the browser uses, with a fixed 60 Hz clock.
//
// Usage: cargo run --bin snapshot -- [--variant constellation|nebula]
//        [--width N] [--height N] [--frames N] [--seed N] [--scroll P]
//        [--config file.json] [--out path.png]

mod host;

use std::env;
use std::fs;
use std::process;

use constellation_engine::{
    ConstellationScene, Controller, EngineConfig, NebulaConfig, NebulaScene, Scene,
};
use host::{BufferPresenter, ImmediateScheduler};
use log::{error, info};

const FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Clone, Copy, PartialEq)]
enum Variant {
    Constellation,
    Nebula,
}

struct Args {
    variant: Variant,
    width: u32,
    height: u32,
    frames: u32,
    seed: Option<u64>,
    scroll: f32,
    config: Option<String>,
    out: String,
}

fn parse_args() -> Args {
    let args: Vec<String> = env::args().collect();
    let mut parsed = Args {
        variant: Variant::Constellation,
        width: 800,
        height: 600,
        frames: 120,
        seed: None,
        scroll: 0.0,
        config: None,
        out: "snapshot.png".into(),
    };

    let mut i = 1;
    while i < args.len() {
        let value = args.get(i + 1);
        match args[i].as_str() {
            "--variant" => {
                parsed.variant = match value.map(String::as_str) {
                    Some("nebula") => Variant::Nebula,
                    _ => Variant::Constellation,
                };
                i += 2;
            }
            "--width" => { parsed.width = value.and_then(|s| s.parse().ok()).unwrap_or(800); i += 2; }
            "--height" => { parsed.height = value.and_then(|s| s.parse().ok()).unwrap_or(600); i += 2; }
            "--frames" => { parsed.frames = value.and_then(|s| s.parse().ok()).unwrap_or(120); i += 2; }
            "--seed" => { parsed.seed = value.and_then(|s| s.parse().ok()); i += 2; }
            "--scroll" => { parsed.scroll = value.and_then(|s| s.parse().ok()).unwrap_or(0.0); i += 2; }
            "--config" => { parsed.config = value.cloned(); i += 2; }
            "--out" => { if let Some(v) = value { parsed.out = v.clone(); } i += 2; }
            _ => i += 1,
        }
    }
    parsed
}

/// Activate, fire `frames` callbacks, and return the last presented frame.
fn run<S: Scene>(scene: S, args: &Args, before_frame: impl Fn(&mut S)) -> Option<Vec<u8>> {
    let presenter = BufferPresenter::new(args.width, args.height);
    let mut controller = Controller::new(scene, ImmediateScheduler::default(), presenter);

    if let Err(e) = controller.activate() {
        error!("activation failed: {e}");
        return None;
    }
    for n in 0..args.frames {
        let Some(handle) = controller.pending() else { break };
        before_frame(controller.scene_mut());
        controller.on_frame(handle, n as f64 * FRAME_MS);
    }
    controller.teardown();

    let presenter = controller.presenter();
    info!("rendered {} frames", presenter.presented);
    Some(presenter.frame.clone())
}

fn read_config(path: &Option<String>) -> Option<String> {
    let path = path.as_ref()?;
    match fs::read_to_string(path) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("cannot read {path}: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = parse_args();
    let json = read_config(&args.config);

    let frame = match args.variant {
        Variant::Constellation => {
            let config = match json.as_deref().map(EngineConfig::from_json) {
                Some(Ok(c)) => c,
                Some(Err(e)) => { error!("{e}"); process::exit(1); }
                None => EngineConfig::default(),
            };
            let config = EngineConfig { seed: args.seed.or(config.seed), ..config };
            match ConstellationScene::new(config) {
                Ok(scene) => run(scene, &args, |_| {}),
                Err(e) => { error!("{e}"); process::exit(1); }
            }
        }
        Variant::Nebula => {
            let config = match json.as_deref().map(NebulaConfig::from_json) {
                Some(Ok(c)) => c,
                Some(Err(e)) => { error!("{e}"); process::exit(1); }
                None => NebulaConfig::default(),
            };
            let config = NebulaConfig { seed: args.seed.or(config.seed), ..config };
            let scroll = args.scroll;
            match NebulaScene::new(config) {
                Ok(scene) => run(scene, &args, |s: &mut NebulaScene| s.set_scroll_progress(scroll)),
                Err(e) => { error!("{e}"); process::exit(1); }
            }
        }
    };

    let Some(frame) = frame else { process::exit(1) };
    if frame.is_empty() {
        error!("no frame was presented");
        process::exit(1);
    }

    let Some(img) = image::RgbaImage::from_raw(args.width, args.height, frame) else {
        error!("frame does not match {}x{}", args.width, args.height);
        process::exit(1);
    };
    if let Err(e) = img.save(&args.out) {
        error!("cannot write {}: {e}", args.out);
        process::exit(1);
    }
    println!("Wrote {} ({}x{})", args.out, args.width, args.height);
}
