//! Pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::capabilities::Capabilities;

/// Longest side, in pixels, an embedded image may keep.
pub const DEFAULT_MAX_IMAGE_DIMENSION: u32 = 2000;

/// Resolution images are placed at (pixels per inch).
pub const DEFAULT_IMAGE_DPI: f32 = 100.0;

/// Image normalization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    pub max_dimension: u32,
    pub dpi: f32,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            max_dimension: DEFAULT_MAX_IMAGE_DIMENSION,
            dpi: DEFAULT_IMAGE_DPI,
        }
    }
}

impl ImageOptions {
    /// Points per pixel at the configured resolution.
    pub(crate) fn points_per_pixel(&self) -> f32 {
        let dpi = if self.dpi.is_finite() && self.dpi > 0.0 {
            self.dpi
        } else {
            DEFAULT_IMAGE_DPI
        };
        72.0 / dpi
    }
}

/// Everything a [`MergePipeline`](crate::MergePipeline) needs to run.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MergeConfig {
    pub capabilities: Capabilities,
    pub image: ImageOptions,
}

impl MergeConfig {
    /// Configuration with the process-wide capabilities and default image
    /// options.
    pub fn from_env() -> Self {
        Self {
            capabilities: Capabilities::global(),
            image: ImageOptions::default(),
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_max_image_dimension(mut self, max: u32) -> Self {
        self.image.max_dimension = max.max(1);
        self
    }

    pub fn with_image_dpi(mut self, dpi: f32) -> Self {
        self.image.dpi = dpi;
        self
    }
}
