const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64, elevation: f64) -> Self {
        Self { lat, lon, elevation }
    }
}

/// Great-circle (haversine) distance in whole metres.
pub fn surface_distance_metres(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let d_lat = (p1.lat - p2.lat).to_radians();
    let d_lon = (p1.lon - p2.lon).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + p1.lat.to_radians().cos() * p2.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_M * c).round()
}

/// Surface distance combined with the elevation delta, in whole metres.
pub fn spatial_distance_metres(p1: GeoPoint, p2: GeoPoint) -> f64 {
    let ground = surface_distance_metres(p1, p2);
    let climb = p1.elevation - p2.elevation;

    (ground.powi(2) + climb.powi(2)).sqrt().round()
}
