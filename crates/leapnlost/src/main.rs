//! Headless runner
//!
//! Plays a level with a scripted route: hop forward, wait out traffic when a
//! vehicle is close, and restart after dying. Drawing goes to a counting
//! backend.
//!
//! Usage: `leapnlost [config.toml] [area] [level]`

use leap_engine::assets::{ModelCache, NullModelLoader};
use leap_engine::audio::NullAudio;
use leap_engine::config::Config;
use leap_engine::foundation::logging;
use leap_engine::render::NullRenderBackend;
use leapnlost::prelude::*;

const FRAME_TIME: f32 = 1.0 / 60.0;
const MAX_FRAMES: usize = 60 * 120;
const MAX_RESTARTS: usize = 20;
const HOP_EVERY: usize = 12;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_with_default_filter("info");

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "leapnlost.toml".to_string());
    let area = args.next().map(|a| a.parse::<u32>()).transpose()?.unwrap_or(1);
    let level = args.next().map(|l| l.parse::<u32>()).transpose()?.unwrap_or(1);

    let config = GameConfig::load_or_default(&config_path);
    let levels = DirectoryLevelSource::new(config.paths.levels_dir.clone());
    let profiles = FileProfileStore::new(config.paths.profile_path.clone());

    let mut scene = Scene::new(config, Box::new(levels), Box::new(profiles), Box::new(NullAudio))?;
    scene.load_level(area, level)?;

    let mut backend = NullRenderBackend::default();
    let mut models = ModelCache::new(NullModelLoader::default());
    let mut restarts = 0;

    for frame in 0..MAX_FRAMES {
        let Some(state) = scene.player_state() else {
            break;
        };
        match state.status() {
            PlayerStatus::GameOver => {
                log::info!(
                    "Finished {}-{} in {:.1}s with score {}",
                    area,
                    level,
                    scene.elapsed_time(),
                    scene.score()
                );
                scene.complete_level()?;
                break;
            }
            PlayerStatus::Dead if restarts < MAX_RESTARTS => {
                restarts += 1;
                log::info!("Died on row {}, restarting ({}/{})", state.tile_row, restarts, MAX_RESTARTS);
                scene.restart_level();
            }
            PlayerStatus::Dead => {
                log::warn!("Giving up after {} restarts", restarts);
                scene.save_score_to_scoreboard()?;
                break;
            }
            PlayerStatus::Alive => {
                if frame % HOP_EVERY == 0 && next_row_is_clear(&scene) {
                    scene.handle_input(Direction::Up);
                }
            }
        }

        scene.update(FRAME_TIME);
        scene.render(&mut backend, &mut models);
    }

    log::info!(
        "Rendered {} frames, {} draws, {} distinct models",
        backend.frames,
        backend.total_submissions,
        models.len()
    );
    Ok(())
}

/// Whether hopping up now avoids any vehicle in the next row
fn next_row_is_clear(scene: &Scene) -> bool {
    let Some(state) = scene.player_state() else {
        return false;
    };
    let x = scene.player().transform.position.x;
    scene.entities_in_row(state.tile_row + 1).iter().all(|&id| {
        scene.entity(id).map_or(true, |e| {
            e.kind() != EntityKind::Vehicle || (e.transform.position.x - x).abs() > 8.0
        })
    })
}
