//! Host messages: commands in, events out.

use serde::{Deserialize, Serialize};

use super::{DEFAULT_COLORS, PropsUpdate};

fn default_pixel_ratio() -> f32 {
    1.0
}

fn default_colors() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|c| c.to_string()).collect()
}

/// Display surface size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: f32,
    pub height: f32,
}

impl SurfaceSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Inbound command, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    Init {
        surface: SurfaceSize,
        #[serde(default = "default_pixel_ratio")]
        pixel_ratio: f32,
        #[serde(default = "default_colors")]
        initial_colors: Vec<String>,
    },
    Start,
    Stop,
    Resize {
        width: f32,
        height: f32,
    },
    Visibility {
        visible: bool,
    },
    /// Pointer position in device pixels, origin top-left.
    Pointer {
        x: f32,
        y: f32,
    },
    PointerInside {
        inside: bool,
    },
    Props(PropsUpdate),
    Palette {
        colors: Vec<String>,
    },
    Cleanup,
}

impl Command {
    /// Name of the variant, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Init { .. } => "init",
            Command::Start => "start",
            Command::Stop => "stop",
            Command::Resize { .. } => "resize",
            Command::Visibility { .. } => "visibility",
            Command::Pointer { .. } => "pointer",
            Command::PointerInside { .. } => "pointerInside",
            Command::Props(_) => "props",
            Command::Palette { .. } => "palette",
            Command::Cleanup => "cleanup",
        }
    }

    #[inline]
    pub fn is_pointer(&self) -> bool {
        matches!(self, Command::Pointer { .. })
    }
}

/// Outbound event, tagged by `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Event {
    /// The compositor is prepared and frames will be produced.
    Ready,
}
