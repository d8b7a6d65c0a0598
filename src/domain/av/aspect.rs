use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const LANDSCAPE_RATIO: f64 = 16.0 / 9.0;
const PORTRAIT_RATIO: f64 = 9.0 / 16.0;
const RATIO_EPSILON: f64 = 0.05;

/// Orientation bucket used as the first segment of every object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectClass {
    Landscape,
    Portrait,
    Other,
}

impl AspectClass {
    pub const ALL: [AspectClass; 3] = [
        AspectClass::Landscape,
        AspectClass::Portrait,
        AspectClass::Other,
    ];

    /// Bucket `width / height` around 16:9 and 9:16.
    ///
    /// Callers guarantee `height > 0`; [`super::stream::StreamProperties`] never
    /// holds a zero dimension.
    pub fn classify(width: u32, height: u32) -> Self {
        let ratio = f64::from(width) / f64::from(height);

        if (ratio - LANDSCAPE_RATIO).abs() < RATIO_EPSILON {
            AspectClass::Landscape
        } else if (ratio - PORTRAIT_RATIO).abs() < RATIO_EPSILON {
            AspectClass::Portrait
        } else {
            AspectClass::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Landscape => "landscape",
            AspectClass::Portrait => "portrait",
            AspectClass::Other => "other",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AspectClass::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| format!("unknown aspect class {s:?}"))
    }
}
