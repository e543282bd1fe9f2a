use crate::gui_bridge::model::VisualizationModel;
use crate::gui_bridge::LiveDisplay;
use anyhow::anyhow;
use log::{error, info};
use serde_json::json;
use std::{
    net::SocketAddr,
    sync::{Arc, RwLock},
    thread,
};
use tokio::runtime::Builder;
use vnacore::report::ProfileFrame;
use warp::Filter;

pub fn gui_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 9000))
}

/// Bridge that hosts the live-profile HTTP endpoint polled by the visualizer.
pub struct GuiBridge {
    state: Arc<RwLock<VisualizationModel>>,
}

impl GuiBridge {
    pub fn new(captures_total: usize) -> Self {
        Self {
            state: Arc::new(RwLock::new(VisualizationModel::new(captures_total))),
        }
    }

    /// Serves `GET /profile` and `GET /status` on a background thread.
    pub fn serve(&self, address: SocketAddr) {
        let state_for_filter = self.state.clone();
        let state_filter = warp::any().map(move || state_for_filter.clone());

        let profile_route = warp::path("profile")
            .and(warp::get())
            .and(state_filter.clone())
            .map(|state: Arc<RwLock<VisualizationModel>>| match state.read() {
                Ok(guard) => warp::reply::json(&*guard),
                Err(_) => warp::reply::json(&json!({"status": "unavailable"})),
            });

        let status_route = warp::path("status")
            .and(warp::get())
            .and(state_filter)
            .map(|state: Arc<RwLock<VisualizationModel>>| match state.read() {
                Ok(guard) => warp::reply::json(&json!({
                    "status": guard.status,
                    "iteration": guard.frame.iteration,
                    "frames_published": guard.frames_published,
                    "captures_total": guard.captures_total,
                })),
                Err(_) => warp::reply::json(&json!({"status": "unavailable"})),
            });

        thread::spawn(move || {
            let routes = profile_route.or(status_route);
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!("failed to build bridge runtime: {}", err);
                    return;
                }
            };
            runtime.block_on(async move {
                match warp::serve(routes).try_bind_ephemeral(address) {
                    Ok((bound, server)) => {
                        info!("live profile bridge listening on http://{}", bound);
                        server.await;
                    }
                    Err(err) => error!("failed to bind live profile bridge {}: {}", address, err),
                }
            });
        });
    }

    pub fn publish_status(&self, message: &str) {
        if let Ok(mut guard) = self.state.write() {
            guard.status = message.to_string();
        }
        info!("[GUI] {}", message);
    }

    pub fn snapshot(&self) -> VisualizationModel {
        self.state
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl LiveDisplay for GuiBridge {
    fn publish(&mut self, frame: &ProfileFrame) -> anyhow::Result<()> {
        let mut guard = self
            .state
            .write()
            .map_err(|_| anyhow!("visualization state lock poisoned"))?;
        guard.frame = frame.clone();
        guard.frames_published += 1;
        guard.status = format!(
            "capture {}/{}: {} peaks",
            frame.iteration + 1,
            guard.captures_total,
            frame.table.rows().len()
        );
        Ok(())
    }
}
