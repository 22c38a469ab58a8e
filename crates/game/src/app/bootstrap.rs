use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use engine::{
    resolve_app_paths, AppError, CatalogError, GameState, HostRuntime, LoopConfig, MapCatalog,
    MapId, MapInfo, StartupError, TransferError,
};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::map_scene::{self, MapScene};
use super::params::{load_parameters, ParamsError, PluginParameters, MAPS_FILE};

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error("read '{path}': {source}")]
    ReadCatalog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("'{path}': {source}")]
    Catalog {
        path: PathBuf,
        #[source]
        source: CatalogError,
    },
    #[error("invalid start position: {0}")]
    StartPosition(#[source] TransferError),
    #[error(transparent)]
    Runtime(#[from] AppError),
}

pub(crate) struct AppWiring {
    pub(crate) runtime: HostRuntime,
    /// Console script to run instead of stdin.
    pub(crate) script: Option<PathBuf>,
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== Vehicle Interiors Startup ===");

    let paths = resolve_app_paths()?;
    let params = load_parameters(&paths.data_dir)?;
    let catalog = load_catalog(&paths.data_dir)?;
    let config = LoopConfig::default();
    let state = new_game_state(catalog, &params)?;
    let scene = MapScene::new(&params, config.screen_width)?;

    let mut runtime = HostRuntime::new(config, paths.saves_dir, state, Box::new(scene));
    map_scene::register_plugin_commands(&mut runtime)?;

    Ok(AppWiring {
        runtime,
        script: std::env::args_os().nth(1).map(PathBuf::from),
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .compact()
        .init();
}

/// Reads `<data_dir>/maps.json`; a missing file yields the demo catalog.
fn load_catalog(data_dir: &Path) -> Result<MapCatalog, BootstrapError> {
    let path = data_dir.join(MAPS_FILE);
    match fs::read_to_string(&path) {
        Ok(raw) => {
            let catalog = MapCatalog::from_json_str(&raw)
                .map_err(|source| BootstrapError::Catalog { path: path.clone(), source })?;
            info!(path = %path.display(), maps = catalog.len(), "map_catalog_loaded");
            Ok(catalog)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "map_catalog_missing_using_demo");
            demo_catalog().map_err(|source| BootstrapError::Catalog { path, source })
        }
        Err(source) => Err(BootstrapError::ReadCatalog { path, source }),
    }
}

fn demo_catalog() -> Result<MapCatalog, CatalogError> {
    let map = |id: u32, name: &str, display_name: &str, width: u32, height: u32| MapInfo {
        id: MapId(id),
        name: name.to_string(),
        display_name: display_name.to_string(),
        width,
        height,
    };
    MapCatalog::new(vec![
        map(1, "Overworld", "Overworld", 40, 30),
        map(2, "BoatInterior", "Rowboat", 6, 6),
        map(3, "ShipDeck", "Ship Deck", 12, 10),
        map(4, "ShipCabin", "Captain's Cabin", 10, 8),
        map(5, "AirshipGondola", "Airship Gondola", 10, 8),
    ])
}

fn new_game_state(
    catalog: MapCatalog,
    params: &PluginParameters,
) -> Result<GameState, BootstrapError> {
    let start = &params.system;
    let mut state = GameState::new(catalog);
    state
        .setup_start(start.start_map_id, start.start_x, start.start_y, start.start_direction)
        .map_err(BootstrapError::StartPosition)?;
    info!(
        map_id = %start.start_map_id,
        x = start.start_x,
        y = start.start_y,
        "new_game_started"
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use engine::Direction;

    use super::*;

    #[test]
    fn missing_catalog_falls_back_to_demo_maps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let catalog = load_catalog(dir.path()).expect("catalog");
        assert_eq!(catalog.len(), 5);
        assert_eq!(
            catalog.get(MapId(1)).map(|info| info.display_name.as_str()),
            Some("Overworld")
        );
    }

    #[test]
    fn catalog_errors_name_the_file_and_json_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join(MAPS_FILE),
            r#"[{ "id": 1, "name": "World", "width": "wide", "height": 4 }]"#,
        )
        .expect("write");

        let error = load_catalog(dir.path()).expect_err("bad width");
        let message = error.to_string();
        assert!(message.contains("maps.json"));
        assert!(message.contains("[0].width"));
    }

    #[test]
    fn shipped_data_files_build_a_game() {
        let catalog = MapCatalog::from_json_str(include_str!("../../../../data/maps.json"))
            .expect("maps.json");
        let params = crate::app::params::parse_parameters_json(
            include_str!("../../../../data/plugins.json"),
            Path::new("plugins.json"),
        )
        .expect("plugins.json");

        for location in [
            &params.vehicle_interiors.boat,
            &params.vehicle_interiors.ship,
            &params.vehicle_interiors.airship,
        ] {
            let info = catalog.get(location.map_id).expect("interior map listed");
            assert!((location.x as u32) < info.width && (location.y as u32) < info.height);
        }
        let state = new_game_state(catalog, &params).expect("state");
        assert_eq!(state.map.display_name(), "Overworld");
        MapScene::new(&params, 816).expect("scene");
    }

    #[test]
    fn start_position_outside_the_map_is_rejected() {
        let mut params = PluginParameters::default();
        params.system.start_x = 400;
        let error = new_game_state(demo_catalog().expect("demo"), &params)
            .expect_err("out of bounds");
        assert!(matches!(error, BootstrapError::StartPosition(_)));

        params.system.start_x = 3;
        params.system.start_direction = Direction::Left;
        let state = new_game_state(demo_catalog().expect("demo"), &params).expect("state");
        assert_eq!(state.player.position(), (3, 6));
        assert_eq!(state.player.direction(), Direction::Left);
    }
}
