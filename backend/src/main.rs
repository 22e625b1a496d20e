use log::{error, info, warn};
use moon::*;
use shared::{ClientConfig, DashboardConfig, DownMsg, MapMode, UpMsg};
use shared::config::MapSection;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::net::TcpStream;

const CONFIG_FILE_PATH: &str = "telemetry_dashboard.toml";
/// Reachability of the public tile server decides the `auto` map mode.
const TILE_SERVER_ADDR: &str = "tile.openstreetmap.org:443";

/// Resolved once at startup; every session receives the same settings.
static CLIENT_CONFIG: OnceLock<Result<ClientConfig, String>> = OnceLock::new();

async fn frontend() -> Frontend {
    Frontend::new()
        .title("Telemetry Dashboard")
        .index_by_robots(false)
}

async fn up_msg_handler(req: UpMsgRequest<UpMsg>) {
    let (session_id, cor_id) = (req.session_id, req.cor_id);

    match req.up_msg {
        UpMsg::LoadDashboardConfig => {
            send_dashboard_config(session_id, cor_id).await;
        }
    }
}

async fn send_down_msg(msg: DownMsg, session_id: SessionId, cor_id: CorId) {
    if let Some(session) = sessions::by_session_id().wait_for(session_id).await {
        session.send_down_msg(&msg, cor_id).await;
    } else {
        warn!("Session {:?} disconnected before its reply", session_id);
    }
}

async fn send_dashboard_config(session_id: SessionId, cor_id: CorId) {
    let msg = match CLIENT_CONFIG.get() {
        Some(Ok(config)) => DownMsg::DashboardConfigLoaded(config.clone()),
        Some(Err(error)) => DownMsg::ConfigError(error.clone()),
        None => DownMsg::ConfigError("dashboard config not resolved yet".to_string()),
    };
    send_down_msg(msg, session_id, cor_id).await;
}

// ===== CONFIG FILE =====

/// Read the config, creating it with defaults when missing. A config that
/// needed fixes is written back so the file matches what is served.
fn load_config(path: &Path) -> Result<DashboardConfig, Box<dyn std::error::Error>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            info!("No {} found, creating it with defaults", path.display());
            let config = DashboardConfig::default();
            save_config_to_file(&config, path)?;
            return Ok(config);
        }
        Err(error) => return Err(error.into()),
    };

    let mut config = DashboardConfig::from_toml(&content)?;
    let fixes = config.validate_and_fix();
    if !fixes.is_empty() {
        for fix in &fixes {
            warn!("Config: {}", fix);
        }
        // The fixed config is served even when it cannot be saved.
        if let Err(save_error) = save_config_to_file(&config, path) {
            warn!("Failed to save fixed config: {}", save_error);
        }
    }
    Ok(config)
}

fn save_config_to_file(
    config: &DashboardConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let toml_content = config.to_toml()?;

    let content_with_header = format!(
        "# Telemetry Dashboard Configuration\n\
         # [server] api_base_url: telemetry API root, empty for same origin\n\
         # [map] mode: \"auto\", \"online\" or \"offline\"\n\
         \n\
         {}",
        toml_content
    );

    fs::write(path, content_with_header)?;
    Ok(())
}

// ===== MAP MODE =====

async fn resolve_online(map: &MapSection) -> bool {
    match map.mode {
        MapMode::Online => true,
        MapMode::Offline => false,
        MapMode::Auto => {
            tile_server_reachable(TILE_SERVER_ADDR, Duration::from_millis(map.probe_timeout_ms))
                .await
        }
    }
}

async fn tile_server_reachable(addr: &str, timeout: Duration) -> bool {
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_)) => true,
        Ok(Err(error)) => {
            info!("Tile server {} unreachable: {}", addr, error);
            false
        }
        Err(_) => {
            info!("Tile server {} did not answer within {:?}", addr, timeout);
            false
        }
    }
}

async fn resolve_client_config(path: &Path) -> Result<ClientConfig, String> {
    let config = load_config(path).map_err(|error| error.to_string())?;
    let online = resolve_online(&config.map).await;
    info!(
        "Map mode {:?} resolved to {}",
        config.map.mode,
        if online { "online" } else { "offline" }
    );
    Ok(config.client_config(online))
}

#[moon::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let client_config = resolve_client_config(Path::new(CONFIG_FILE_PATH)).await;
    if let Err(config_error) = &client_config {
        error!("Failed to load {}: {}", CONFIG_FILE_PATH, config_error);
    }
    let _ = CLIENT_CONFIG.set(client_config);

    start(frontend, up_msg_handler, |_| {}).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_file(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("telemetry_dashboard_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = fs::remove_file(&path);
        path
    }

    #[test]
    fn missing_config_is_created_with_defaults() {
        let path = scratch_file("missing.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config, DashboardConfig::default());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Telemetry Dashboard Configuration"));
        assert_eq!(DashboardConfig::from_toml(&written).unwrap(), config);
    }

    #[test]
    fn fixed_config_is_written_back() {
        let path = scratch_file("fixed.toml");
        fs::write(
            &path,
            "[app]\nversion = \"1.0.0\"\n\n[server]\napi_base_url = \"http://boat.local/\"\n\n[map]\nmode = \"offline\"\ndefault_zoom = 40\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.server.api_base_url, "http://boat.local");
        assert_eq!(config.map.default_zoom, 19);
        assert_eq!(config.map.mode, MapMode::Offline);

        let reloaded = DashboardConfig::from_toml(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn unparsable_config_is_an_error() {
        let path = scratch_file("broken.toml");
        fs::write(&path, "[map\nmode = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[tokio::test]
    async fn explicit_modes_skip_the_probe() {
        let mut map = MapSection::default();
        map.mode = MapMode::Online;
        assert!(resolve_online(&map).await);
        map.mode = MapMode::Offline;
        assert!(!resolve_online(&map).await);
    }

    #[tokio::test]
    async fn offline_config_serves_local_tiles() {
        let path = scratch_file("offline.toml");
        fs::write(&path, "[map]\nmode = \"offline\"\ntile_cache_path = \"/tiles/\"\n").unwrap();
        let config = resolve_client_config(&path).await.unwrap();
        assert!(!config.online);
        assert_eq!(config.tile_cache_path, "/tiles");
    }

    #[tokio::test]
    async fn unreachable_tile_server_means_offline() {
        // Port 9 on localhost is closed on test machines; connect fails fast.
        assert!(!tile_server_reachable("127.0.0.1:9", Duration::from_millis(200)).await);
    }
}
