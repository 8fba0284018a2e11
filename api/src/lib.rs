use std::sync::Arc;

use abi::config::Config;
use abi::errors::Result;
use db::DbRepo;

use crate::chat::ChatClient;

mod api_utils;
pub(crate) mod chat;
pub(crate) mod handlers;
pub(crate) mod routes;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Arc<DbRepo>,
    pub chat: Arc<ChatClient>,
    pub jwt_secret: String,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self> {
        let db = Arc::new(DbRepo::new(config).await?);
        let chat = Arc::new(ChatClient::new(&config.chat));
        Ok(Self {
            db,
            chat,
            jwt_secret: config.server.jwt_secret.clone(),
        })
    }
}

pub async fn start(config: Config) -> Result<()> {
    let state = AppState::new(&config).await?;
    let app = routes::app_routes(state);
    let listener = tokio::net::TcpListener::bind(&config.server.server_url()).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
