//! Locally cached camera directory.
//!
//! The directory is a read-only snapshot of the operator's cameras, keyed
//! by stream key. Lookups never touch the network: a miss is a terminal
//! [`CameraNotFound`](crate::FeedError::CameraNotFound) and no stream
//! request is attempted for an unknown key.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{FeedError, Result};

/// One camera record as cached from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub id: u64,
    /// Display name shown to the operator.
    pub name: String,
    /// Stream key used to resolve the feed endpoint.
    pub cam_key: String,
}

/// Read-only lookup over the cached camera list.
#[derive(Debug, Clone, Default)]
pub struct CameraDirectory {
    cameras: Vec<Camera>,
}

impl CameraDirectory {
    /// Build a directory from an already-fetched camera list.
    pub fn from_cameras(cameras: Vec<Camera>) -> Self {
        Self { cameras }
    }

    /// Load the cached directory from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::directory(path.display().to_string(), Box::new(e)))?;
        let cameras: Vec<Camera> = serde_yaml_ng::from_str(&raw)
            .map_err(|e| FeedError::directory(path.display().to_string(), Box::new(e)))?;
        info!(count = cameras.len(), path = %path.display(), "camera directory loaded");
        Ok(Self { cameras })
    }

    /// Find a camera by its stream key.
    pub fn lookup(&self, cam_key: &str) -> Option<&Camera> {
        self.cameras.iter().find(|cam| cam.cam_key == cam_key)
    }

    /// Like [`lookup`](Self::lookup) but mapping a miss to the terminal
    /// error the session controller surfaces.
    pub fn require(&self, cam_key: &str) -> Result<&Camera> {
        self.lookup(cam_key).ok_or_else(|| FeedError::camera_not_found(cam_key))
    }

    /// All cached cameras, in cache order.
    pub fn cameras(&self) -> &[Camera] {
        &self.cameras
    }
}
