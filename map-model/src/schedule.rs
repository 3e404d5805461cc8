//! The schedule overlay's data: per-tile JSON documents holding "lines" —
//! trip geometries whose every coordinate carries the in-data timestamp at
//! which the vehicle passes it. The animation strokes, for each line active
//! at the clock's current time, the portion covered in the trailing window.

use geo::Point;
use serde::{Deserialize, Serialize};

/// One coordinate of a trip geometry, `[lon, lat, seconds]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64, f64)", into = "(f64, f64, f64)")]
pub struct SchedulePoint {
    pub position: Point<f64>,
    pub seconds: f64,
}

impl From<(f64, f64, f64)> for SchedulePoint {
    fn from((lon, lat, seconds): (f64, f64, f64)) -> Self {
        SchedulePoint {
            position: Point::new(lon, lat),
            seconds,
        }
    }
}

impl From<SchedulePoint> for (f64, f64, f64) {
    fn from(point: SchedulePoint) -> Self {
        (point.position.x(), point.position.y(), point.seconds)
    }
}

/// A trip geometry with nondecreasing timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleLine(pub Vec<SchedulePoint>);

/// One schedule tile: an array of lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleTile(pub Vec<ScheduleLine>);

impl ScheduleLine {
    pub fn start_seconds(&self) -> Option<f64> {
        self.0.first().map(|p| p.seconds)
    }

    pub fn end_seconds(&self) -> Option<f64> {
        self.0.last().map(|p| p.seconds)
    }

    /// Whether the trip is under way at `t`. Lines with fewer than two
    /// points carry no span.
    pub fn spans(&self, t: f64) -> bool {
        if self.0.len() < 2 {
            return false;
        }
        self.start_seconds().unwrap() <= t && t <= self.end_seconds().unwrap()
    }

    /// Where the vehicle is at `t`, linearly interpolated along the
    /// timestamps. `None` outside the line's span.
    pub fn position_at(&self, t: f64) -> Option<Point<f64>> {
        if !self.spans(t) {
            return None;
        }
        for pair in self.0.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            if t <= to.seconds {
                return Some(interpolate(from, to, t));
            }
        }
        // t == the final timestamp and float noise skipped the last window
        self.0.last().map(|p| p.position)
    }

    /// The polyline covered in `[t - trail_seconds, t]`: the interpolated
    /// tail, every intermediate coordinate, and the interpolated head, in
    /// travel order. Empty when the trip is not under way at `t`.
    pub fn trail(&self, t: f64, trail_seconds: f64) -> Vec<Point<f64>> {
        let head = match self.position_at(t) {
            None => return Vec::new(),
            Some(position) => position,
        };
        let window_start = t - trail_seconds;

        let mut points = Vec::new();
        if let Some(tail) = self.position_at(window_start) {
            points.push(tail);
        }
        points.extend(
            self.0
                .iter()
                .filter(|p| p.seconds > window_start && p.seconds < t)
                .map(|p| p.position),
        );
        points.push(head);
        points
    }
}

fn interpolate(from: SchedulePoint, to: SchedulePoint, t: f64) -> Point<f64> {
    let span = to.seconds - from.seconds;
    if span <= 0.0 {
        // dwell: two coordinates at the same timestamp
        return to.position;
    }
    let fraction = ((t - from.seconds) / span).max(0.0).min(1.0);
    Point::new(
        from.position.x() + (to.position.x() - from.position.x()) * fraction,
        from.position.y() + (to.position.y() - from.position.y()) * fraction,
    )
}

impl ScheduleTile {
    pub fn active_lines(&self, t: f64) -> impl Iterator<Item = &ScheduleLine> {
        self.0.iter().filter(move |line| line.spans(t))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Where the per-tile schedule documents live. `{base}/{z}/{x}/{y}.json`.
pub const SCHEDULE_TILES_BASE_URL: &str =
    "https://data.kylebarron.dev/all-transit/tmpjson/schedule/4_16-20";

/// Slippy-map address of one schedule tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileCoord {
    /// The tile containing a lon/lat at zoom `z` (web mercator).
    pub fn containing(lon: f64, lat: f64, z: u8) -> TileCoord {
        let tiles = f64::from(1u32 << z);
        let x = ((lon + 180.0) / 360.0 * tiles).floor();
        let lat_rad = lat.to_radians();
        let y = ((1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
            * tiles)
            .floor();
        let max = (1u32 << z) - 1;
        TileCoord {
            z,
            x: clamp_tile(x, max),
            y: clamp_tile(y, max),
        }
    }

    pub fn url(&self, base: &str) -> String {
        format!("{}/{}/{}/{}.json", base, self.z, self.x, self.y)
    }
}

fn clamp_tile(index: f64, max: u32) -> u32 {
    if index < 0.0 {
        0
    } else if index > f64::from(max) {
        max
    } else {
        index as u32
    }
}

/// Every tile touching the `(west, south, east, north)` viewport at zoom
/// `z`, row-major. The animation data only exists up to
/// [`crate::constants::MAX_SCHEDULE_ANIMATION_ZOOM`]; callers clamp `z`
/// before covering.
pub fn tile_cover(bounds: (f64, f64, f64, f64), z: u8) -> Vec<TileCoord> {
    let (west, south, east, north) = bounds;
    let top_left = TileCoord::containing(west, north, z);
    let bottom_right = TileCoord::containing(east, south, z);
    let mut tiles = Vec::new();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            tiles.push(TileCoord { z, x, y });
        }
    }
    tiles
}

#[cfg(test)]
mod test {
    use super::{SchedulePoint, ScheduleLine, ScheduleTile};
    use geo::Point;

    fn line(points: &[(f64, f64, f64)]) -> ScheduleLine {
        ScheduleLine(points.iter().map(|&p| SchedulePoint::from(p)).collect())
    }

    #[test]
    fn tile_wire_form() {
        let tile: ScheduleTile =
            serde_json::from_str("[[[-122.0,47.0,57600.0],[-122.1,47.05,57900.0]]]").unwrap();
        assert_eq!(tile.0.len(), 1);
        assert_eq!(tile.0[0].0[1].seconds, 57_900.0);
        assert_eq!(tile.0[0].0[1].position, Point::new(-122.1, 47.05));

        let round_tripped: ScheduleTile =
            serde_json::from_str(&serde_json::to_string(&tile).unwrap()).unwrap();
        assert_eq!(round_tripped, tile);
    }

    #[test]
    fn point_wire_form_is_a_bare_triple() {
        use serde_test::{assert_tokens, Token};
        assert_tokens(
            &SchedulePoint::from((-122.0, 47.0, 57_600.0)),
            &[
                Token::Tuple { len: 3 },
                Token::F64(-122.0),
                Token::F64(47.0),
                Token::F64(57_600.0),
                Token::TupleEnd,
            ],
        );
    }

    #[test]
    fn interpolates_between_coordinates() {
        let line = line(&[(0.0, 0.0, 100.0), (10.0, 0.0, 200.0)]);
        assert_eq!(line.position_at(100.0), Some(Point::new(0.0, 0.0)));
        assert_eq!(line.position_at(150.0), Some(Point::new(5.0, 0.0)));
        assert_eq!(line.position_at(200.0), Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn outside_span_is_none() {
        let line = line(&[(0.0, 0.0, 100.0), (10.0, 0.0, 200.0)]);
        assert_eq!(line.position_at(99.9), None);
        assert_eq!(line.position_at(200.1), None);
    }

    #[test]
    fn single_point_never_interpolates() {
        let line = line(&[(0.0, 0.0, 100.0)]);
        assert!(!line.spans(100.0));
        assert_eq!(line.position_at(100.0), None);
        assert!(line.trail(100.0, 60.0).is_empty());
    }

    #[test]
    fn dwell_points_share_a_timestamp() {
        let line = line(&[(0.0, 0.0, 100.0), (5.0, 0.0, 150.0), (5.0, 1.0, 150.0), (5.0, 2.0, 250.0)]);
        // sampling exactly at the dwell resolves to the coordinate that
        // first reaches it
        assert_eq!(line.position_at(150.0), Some(Point::new(5.0, 0.0)));
        assert_eq!(line.position_at(200.0), Some(Point::new(5.0, 1.5)));
    }

    #[test]
    fn trail_covers_the_window() {
        let line = line(&[
            (0.0, 0.0, 100.0),
            (10.0, 0.0, 200.0),
            (20.0, 0.0, 300.0),
            (30.0, 0.0, 400.0),
        ]);
        // window [150, 350]: tail interpolated, two coordinates, head interpolated
        assert_eq!(
            line.trail(350.0, 200.0),
            vec![
                Point::new(5.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(20.0, 0.0),
                Point::new(25.0, 0.0),
            ]
        );
    }

    #[test]
    fn trail_near_the_start_has_no_tail() {
        let line = line(&[(0.0, 0.0, 100.0), (10.0, 0.0, 200.0)]);
        // the window extends before the trip began
        assert_eq!(
            line.trail(150.0, 200.0),
            vec![Point::new(0.0, 0.0), Point::new(5.0, 0.0)]
        );
    }

    #[test]
    fn tile_addressing() {
        use super::{tile_cover, TileCoord};

        // the whole world is one tile at zoom 0
        assert_eq!(
            TileCoord::containing(-122.33, 47.6, 0),
            TileCoord { z: 0, x: 0, y: 0 }
        );
        // null island sits at the top-left corner of the south-east quadrant
        assert_eq!(
            TileCoord::containing(0.0, -0.000001, 1),
            TileCoord { z: 1, x: 1, y: 1 }
        );

        // x grows eastwards, y grows southwards
        let z = 13;
        let seattle = TileCoord::containing(-122.3321, 47.6062, z);
        let east_of_seattle = TileCoord::containing(-122.0, 47.6062, z);
        let south_of_seattle = TileCoord::containing(-122.3321, 47.3, z);
        assert!(east_of_seattle.x > seattle.x);
        assert_eq!(east_of_seattle.y, seattle.y);
        assert!(south_of_seattle.y > seattle.y);

        assert_eq!(
            TileCoord { z: 13, x: 1312, y: 2861 }.url("https://example.com/schedule"),
            "https://example.com/schedule/13/1312/2861.json"
        );

        // covering a viewport includes the corner tiles
        let cover = tile_cover((-122.4, 47.3, -122.0, 47.7), z);
        assert!(cover.contains(&TileCoord::containing(-122.4, 47.7, z)));
        assert!(cover.contains(&TileCoord::containing(-122.0, 47.3, z)));
        let expected = ((east_of_seattle.x - TileCoord::containing(-122.4, 47.7, z).x + 1)
            * (south_of_seattle.y - TileCoord::containing(-122.4, 47.7, z).y + 1))
            as usize;
        assert_eq!(cover.len(), expected);

        // poles clamp into range instead of indexing off the grid
        let polar = TileCoord::containing(0.0, 89.9, 1);
        assert_eq!(polar.y, 0);
    }

    #[test]
    fn active_lines_filter_by_span() {
        let tile = ScheduleTile(vec![
            line(&[(0.0, 0.0, 100.0), (1.0, 0.0, 200.0)]),
            line(&[(0.0, 0.0, 300.0), (1.0, 0.0, 400.0)]),
        ]);
        assert_eq!(tile.active_lines(150.0).count(), 1);
        assert_eq!(tile.active_lines(250.0).count(), 0);
        assert_eq!(tile.active_lines(350.0).count(), 1);
    }
}
