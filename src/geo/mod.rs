pub mod gazetteer;

use crate::error::AppError;
use crate::models::booking::Location;

const EARTH_RADIUS_KM: f64 = 6_371.0;

pub fn haversine_km(a: &Location, b: &Location) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Great-circle distance between two validated locations.
pub fn distance_km(a: &Location, b: &Location) -> Result<f64, AppError> {
    validate(a)?;
    validate(b)?;
    Ok(haversine_km(a, b))
}

pub fn validate(location: &Location) -> Result<(), AppError> {
    let Location {
        latitude,
        longitude,
        ..
    } = location;

    if !latitude.is_finite() || !longitude.is_finite() {
        return Err(AppError::InvalidLocation(format!(
            "non-finite coordinates for {:?}",
            location.address
        )));
    }

    if !(-90.0..=90.0).contains(latitude) || !(-180.0..=180.0).contains(longitude) {
        return Err(AppError::InvalidLocation(format!(
            "coordinates out of range for {:?}: ({latitude}, {longitude})",
            location.address
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{distance_km, haversine_km};
    use crate::error::AppError;
    use crate::models::booking::Location;

    fn point(lat: f64, lng: f64) -> Location {
        Location::new(lat, lng, "test")
    }

    #[test]
    fn zero_distance_for_same_point() {
        let p = point(12.9716, 77.5946);
        let distance = haversine_km(&p, &p);
        assert!(distance < 1e-9);
    }

    #[test]
    fn london_to_paris_is_around_343_km() {
        let london = point(51.5074, -0.1278);
        let paris = point(48.8566, 2.3522);
        let distance = haversine_km(&london, &paris);
        assert!((distance - 343.0).abs() < 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (point(12.9716, 77.5946), point(12.9352, 77.6245)),
            (point(-33.8688, 151.2093), point(40.7128, -74.0060)),
            (point(0.0, 179.9), point(0.0, -179.9)),
        ];

        for (a, b) in pairs {
            let forward = haversine_km(&a, &b);
            let backward = haversine_km(&b, &a);
            assert!((forward - backward).abs() < 1e-9);
        }
    }

    #[test]
    fn mg_road_to_koramangala_is_about_5_km() {
        let mg_road = point(12.9716, 77.5946);
        let koramangala = point(12.9352, 77.6245);
        let distance = distance_km(&mg_road, &koramangala).unwrap();
        assert!((distance - 5.18).abs() < 0.01);
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let good = point(12.9716, 77.5946);
        let nan = point(f64::NAN, 77.5946);
        let inf = point(12.9716, f64::INFINITY);

        assert!(matches!(
            distance_km(&good, &nan),
            Err(AppError::InvalidLocation(_))
        ));
        assert!(matches!(
            distance_km(&inf, &good),
            Err(AppError::InvalidLocation(_))
        ));
    }

    #[test]
    fn rejects_out_of_range_latitude() {
        let good = point(12.9716, 77.5946);
        let bad = point(91.0, 77.5946);
        assert!(matches!(
            distance_km(&good, &bad),
            Err(AppError::InvalidLocation(_))
        ));
    }
}
