use std::fmt;

use serde::{Deserialize, Serialize};

/// Camera parameters describing what part of the map is visible.
///
/// The page's URL fragment (`#zoom/lat/lon/bearing/pitch`) is the only
/// persisted view state; [`decode`] reads it on mount and the host map
/// library keeps it current afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: f64,
    pub pitch: f64,
}

impl Default for Viewport {
    /// The view the site opens with when the URL carries no usable fragment:
    /// the contiguous US at a national overview zoom.
    fn default() -> Self {
        Viewport {
            zoom: 4.0,
            latitude: 38.85,
            longitude: -98.38,
            bearing: 0.0,
            pitch: 0.0,
        }
    }
}

/// Result of decoding a URL fragment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decoded {
    pub viewport: Viewport,
    /// The fragment was present but malformed. The caller must rewrite the
    /// URL without it: returning the default viewport alone is not enough,
    /// because the host map library also reads the fragment and would be
    /// confused by the leftovers.
    pub strip_fragment: bool,
}

/// Parse a location fragment into a viewport.
///
/// Token order matches what mapbox-gl writes: zoom, latitude, longitude,
/// bearing, pitch. Trailing missing tokens keep their defaults.
///
/// ```rust
/// use map_model::viewport::{decode, Viewport};
/// assert_eq!(decode("").viewport, Viewport::default());
/// assert_eq!(decode("#5/40/-100").viewport.zoom, 5.0);
/// ```
pub fn decode(fragment: &str) -> Decoded {
    if fragment.is_empty() || fragment == "#" || !fragment.starts_with('#') {
        return Decoded {
            viewport: Viewport::default(),
            strip_fragment: false,
        };
    }

    let defaults = Viewport::default();
    let mut positions = [
        defaults.zoom,
        defaults.latitude,
        defaults.longitude,
        defaults.bearing,
        defaults.pitch,
    ];
    // every token must be numeric for the fragment to count, even ones past
    // the positions we use
    for (position, token) in fragment[1..].split('/').enumerate() {
        match token.parse::<f64>() {
            Ok(value) => {
                if let Some(slot) = positions.get_mut(position) {
                    *slot = value;
                }
            }
            Err(_) => {
                return Decoded {
                    viewport: defaults,
                    strip_fragment: true,
                }
            }
        }
    }

    let [zoom, latitude, longitude, bearing, pitch] = positions;
    Decoded {
        viewport: Viewport {
            zoom,
            latitude,
            longitude,
            bearing,
            pitch,
        },
        strip_fragment: false,
    }
}

/// Format a viewport the way the host library does: bearing and pitch only
/// appear when they carry information.
pub fn encode(viewport: &Viewport) -> String {
    let mut hash = format!(
        "#{}/{}/{}",
        Precise(viewport.zoom),
        Precise(viewport.latitude),
        Precise(viewport.longitude)
    );
    if viewport.bearing != 0.0 || viewport.pitch != 0.0 {
        hash.push_str(&format!("/{}", Precise(viewport.bearing)));
    }
    if viewport.pitch != 0.0 {
        hash.push_str(&format!("/{}", Precise(viewport.pitch)));
    }
    hash
}

/// Prints with enough decimals to round-trip a pan at street zoom, without
/// the trailing zeros `{:.4}` would leave on whole numbers.
struct Precise(f64);

impl fmt::Display for Precise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = (self.0 * 10_000.0).round() / 10_000.0;
        write!(f, "{}", rounded)
    }
}
