use futures::channel::mpsc::{unbounded, UnboundedReceiver};
use futures::StreamExt;
use zoon::*;

use crate::error_display::{log_error_console_only, ErrorAlert};
use shared::{ClientConfig, DownMsg, UpMsg};

/// MoonZoon connection whose down messages are read as a stream.
pub struct ConnectionAdapter {
    connection: Connection<UpMsg, DownMsg>,
}

impl ConnectionAdapter {
    pub fn new() -> (Self, UnboundedReceiver<DownMsg>) {
        let (down_msg_sender, down_msg_stream) = unbounded();
        let connection = Connection::new(move |down_msg, _| {
            let _ = down_msg_sender.unbounded_send(down_msg);
        });
        (Self { connection }, down_msg_stream)
    }

    pub async fn send_up_msg(&self, up_msg: UpMsg) -> bool {
        match self.connection.send_up_msg(up_msg).await {
            Ok(_) => true,
            Err(error) => {
                zoon::println!("Failed to send message: {:?}", error);
                false
            }
        }
    }
}

/// Ask the server for the session settings. Falls back to same-origin,
/// online defaults when the server cannot provide them.
pub async fn load_client_config() -> ClientConfig {
    let (adapter, mut down_msg_stream) = ConnectionAdapter::new();
    if !adapter.send_up_msg(UpMsg::LoadDashboardConfig).await {
        return ClientConfig::default();
    }
    while let Some(down_msg) = down_msg_stream.next().await {
        match down_msg {
            DownMsg::DashboardConfigLoaded(config) => {
                zoon::println!(
                    "Dashboard config loaded: {} map, api base '{}'",
                    if config.online { "online" } else { "offline" },
                    config.api_base_url
                );
                return config;
            }
            DownMsg::ConfigError(error) => {
                log_error_console_only(ErrorAlert::new_config_error(error));
                return ClientConfig::default();
            }
        }
    }
    ClientConfig::default()
}
