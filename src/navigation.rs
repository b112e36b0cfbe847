//! Seam to the map/3D engine collaborator. The engine itself lives outside
//! this crate; navigation is exposed as an awaitable operation so callers
//! and tests observe completion instead of firing an event and hoping.

use crate::catalog::Destination;
use crate::error::Result;
use async_trait::async_trait;
use tracing::info;

#[async_trait]
pub trait MapCamera: Send + Sync {
    /// Fly the camera to (longitude, latitude). Resolves when the animation
    /// has been handed off and acknowledged by the engine.
    async fn fly_to(&self, lon: f64, lat: f64) -> Result<()>;

    async fn fly_to_destination(&self, destination: &Destination) -> Result<()> {
        let (lon, lat) = destination.coordinates;
        self.fly_to(lon, lat).await
    }
}

/// Default camera used when no map engine is attached (CLI runs, tests).
pub struct LoggingCamera;

#[async_trait]
impl MapCamera for LoggingCamera {
    async fn fly_to(&self, lon: f64, lat: f64) -> Result<()> {
        info!("Camera fly-to ({:.6}, {:.6})", lon, lat);
        Ok(())
    }
}
