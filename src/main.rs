use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use rs_body_shape_pipeline::api::ApiServer;
use rs_body_shape_pipeline::api::state::AppState;
use rs_body_shape_pipeline::config::config::AppConfig;
use rs_body_shape_pipeline::helper::body_helper::BodyHelper;
use rs_body_shape_pipeline::helper::draw_helper::DrawHelper;
use rs_body_shape_pipeline::modules::pose_detection_client::PoseDetectionClient;
use rs_body_shape_pipeline::pipeline::pipeline::BodyShapePipeline;
use rs_body_shape_pipeline::triton_client::client::TritonInferenceClient;

/// Body measurement and body shape analysis server
#[derive(Parser, Debug)]
#[command(name = "body-shape-server", version, about)]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Triton gRPC endpoint of the pose landmark model
    #[arg(long)]
    triton_url: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::new(),
        };
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(url) = self.triton_url {
            config.pose_detection.triton_url = url;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let config = Args::parse().into_config()?;
    info!(?config, "configuration loaded");

    let triton_client = TritonInferenceClient::new(
        &config.pose_detection.triton_url,
        config.pose_detection.timeout,
    )?;
    let detector = PoseDetectionClient::new(triton_client, config.pose_detection.clone());
    let pipeline = BodyShapePipeline::new(
        Arc::new(detector),
        BodyHelper::new(config.measurement.clone()),
        DrawHelper::new(),
    );

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.server.host, config.server.port))?;

    ApiServer::new(AppState::new(pipeline), addr, config.server.body_limit_bytes)
        .start()
        .await
}
