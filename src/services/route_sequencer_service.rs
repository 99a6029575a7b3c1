//! Route Sequencer
//!
//! Orders a day's stops into a walkable/drivable sequence with a greedy
//! nearest-neighbor pass in lat/lng space.
//!
//! ## Rules
//! - The route starts at the northernmost stop.
//! - Each next stop is the unvisited one closest to the last placed stop.
//! - Ties keep the earlier stop, so identical coordinates keep input order.
//! - Stops without coordinates are appended after the route, in input order.
//!
//! Lists here are at most ~15 items, so the O(n²) scan needs no spatial index.

use crate::models::candidate::Candidate;
use crate::models::location::Coordinates;

/// Anything that may sit on a map.
pub trait Located {
    fn coordinates(&self) -> Option<Coordinates>;
}

impl Located for Candidate {
    fn coordinates(&self) -> Option<Coordinates> {
        self.coordinates
    }
}

pub struct RouteSequencer;

impl RouteSequencer {
    pub fn sequence<T: Located>(items: Vec<T>) -> Vec<T> {
        if items.len() <= 1 {
            return items;
        }

        let mut unvisited: Vec<(T, Coordinates)> = Vec::new();
        let mut unplaced: Vec<T> = Vec::new();
        for item in items {
            match item.coordinates() {
                Some(coords) if coords.lat.is_finite() && coords.lng.is_finite() => {
                    unvisited.push((item, coords))
                }
                _ => unplaced.push(item),
            }
        }

        let mut route = Vec::with_capacity(unvisited.len() + unplaced.len());

        if let Some(start_idx) = Self::northernmost(&unvisited) {
            let (start, mut current) = unvisited.remove(start_idx);
            route.push(start);

            while !unvisited.is_empty() {
                let nearest_idx = Self::nearest(&unvisited, current);
                let (item, coords) = unvisited.remove(nearest_idx);
                current = coords;
                route.push(item);
            }
        }

        route.extend(unplaced);
        route
    }

    fn northernmost<T>(stops: &[(T, Coordinates)]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, (_, coords)) in stops.iter().enumerate() {
            match best {
                Some((_, lat)) if coords.lat <= lat => {}
                _ => best = Some((idx, coords.lat)),
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn nearest<T>(stops: &[(T, Coordinates)], from: Coordinates) -> usize {
        let mut nearest_idx = 0;
        let mut nearest_distance = f64::INFINITY;
        for (idx, (_, coords)) in stops.iter().enumerate() {
            let distance = euclidean(from, *coords);
            if distance < nearest_distance {
                nearest_distance = distance;
                nearest_idx = idx;
            }
        }
        nearest_idx
    }
}

fn euclidean(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = a.lat - b.lat;
    let d_lng = a.lng - b.lng;
    (d_lat * d_lat + d_lng * d_lng).sqrt()
}
