use rand::Rng;

use crate::error::AppError;
use crate::models::booking::Location;

const MIN_QUERY_LEN: usize = 3;
const FALLBACK_JITTER_DEG: f64 = 0.1;

/// Free-text to coordinates lookup.
pub trait LocationResolver: Send + Sync {
    fn resolve(&self, query: &str) -> Result<Location, AppError>;
}

/// Fixed list of known places; unknown text lands near the first entry.
pub struct Gazetteer {
    places: Vec<Location>,
}

impl Gazetteer {
    pub fn new(places: Vec<Location>) -> Self {
        Self { places }
    }

    pub fn bangalore() -> Self {
        Self::new(vec![
            Location::new(12.9716, 77.5946, "MG Road, Bangalore").named("MG Road Metro Station"),
            Location::new(12.9762, 77.6033, "Brigade Road, Bangalore").named("Brigade Road"),
            Location::new(12.9698, 77.7500, "Whitefield, Bangalore").named("Whitefield Main Road"),
            Location::new(12.9352, 77.6245, "Koramangala, Bangalore")
                .named("Koramangala 5th Block"),
            Location::new(12.9279, 77.6271, "BTM Layout, Bangalore").named("BTM Layout 1st Stage"),
        ])
    }

    fn lookup(&self, query: &str) -> Option<&Location> {
        let needle = query.to_lowercase();

        self.places.iter().find(|place| {
            let address = place.address.to_lowercase();
            let name = place.name.as_deref().unwrap_or_default().to_lowercase();

            address.contains(&needle)
                || needle.contains(&address)
                || (!name.is_empty() && (name.contains(&needle) || needle.contains(&name)))
        })
    }

    fn near_anchor(&self, query: &str) -> Result<Location, AppError> {
        let anchor = self
            .places
            .first()
            .ok_or_else(|| AppError::Internal("gazetteer has no places".to_string()))?;

        let mut rng = rand::thread_rng();
        Ok(Location::new(
            anchor.latitude + rng.gen_range(0.0..FALLBACK_JITTER_DEG),
            anchor.longitude + rng.gen_range(0.0..FALLBACK_JITTER_DEG),
            query,
        ))
    }
}

impl LocationResolver for Gazetteer {
    fn resolve(&self, query: &str) -> Result<Location, AppError> {
        let query = query.trim();

        if query.is_empty() {
            return Err(AppError::BadRequest("location is required".to_string()));
        }
        if query.chars().count() < MIN_QUERY_LEN {
            return Err(AppError::BadRequest(format!(
                "location must be at least {MIN_QUERY_LEN} characters"
            )));
        }

        match self.lookup(query) {
            Some(place) => Ok(place.clone()),
            None => self.near_anchor(query),
        }
    }
}
