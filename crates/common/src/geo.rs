//! Neighborhood geometry.
//!
//! Submitted coordinates are resolved to one of the city's named
//! neighborhoods by nearest-centroid lookup. Distances are plain
//! Euclidean in degree space, which is accurate enough at the scale of
//! a single municipality.

/// A named neighborhood reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighborhood {
    /// Neighborhood name.
    pub name: &'static str,
    /// Centroid latitude.
    pub lat: f64,
    /// Centroid longitude.
    pub lng: f64,
    /// Estimated open damage in EUR, used by the statistics endpoint.
    pub damage_estimate_eur: u32,
}

/// The city's neighborhoods.
pub const NEIGHBORHOODS: [Neighborhood; 15] = [
    Neighborhood { name: "Lagja 5 Maji", lat: 41.1128, lng: 20.0892, damage_estimate_eur: 12_500 },
    Neighborhood { name: "Lagja 28 Nëntori", lat: 41.1145, lng: 20.0823, damage_estimate_eur: 8_700 },
    Neighborhood { name: "Lagja Kala", lat: 41.1098, lng: 20.0789, damage_estimate_eur: 15_200 },
    Neighborhood { name: "Lagja Luigj Gurakuqi", lat: 41.1189, lng: 20.0901, damage_estimate_eur: 9_800 },
    Neighborhood { name: "Lagja Partizani", lat: 41.1167, lng: 20.0756, damage_estimate_eur: 11_300 },
    Neighborhood { name: "Lagja Skënderbeu", lat: 41.1112, lng: 20.0934, damage_estimate_eur: 7_600 },
    Neighborhood { name: "Lagja 11 Nëntori", lat: 41.1078, lng: 20.0867, damage_estimate_eur: 13_400 },
    Neighborhood { name: "Lagja Republika", lat: 41.1201, lng: 20.0812, damage_estimate_eur: 6_900 },
    Neighborhood { name: "Lagja Kongresi i Elbasanit", lat: 41.1156, lng: 20.0878, damage_estimate_eur: 10_200 },
    Neighborhood { name: "Lagja Aqif Pasha", lat: 41.1089, lng: 20.0945, damage_estimate_eur: 8_100 },
    Neighborhood { name: "Lagja Dyli Haxhire", lat: 41.1234, lng: 20.0789, damage_estimate_eur: 5_400 },
    Neighborhood { name: "Lagja Shën Koll", lat: 41.1045, lng: 20.0823, damage_estimate_eur: 7_200 },
    Neighborhood { name: "Lagja Sopotit", lat: 41.0989, lng: 20.0901, damage_estimate_eur: 4_800 },
    Neighborhood { name: "Lagja Shirgjan", lat: 41.0912, lng: 20.0756, damage_estimate_eur: 3_600 },
    Neighborhood { name: "Lagja Bradashesh", lat: 41.1312, lng: 20.1023, damage_estimate_eur: 2_900 },
];

/// Resolve a coordinate pair to the closest neighborhood name.
///
/// Ties break toward the earlier list entry (first minimum wins). The
/// list is non-empty by construction, so this always returns a name.
#[must_use]
pub fn resolve_neighborhood(lat: f64, lng: f64) -> &'static str {
    closest(&NEIGHBORHOODS, lat, lng)
}

fn closest(neighborhoods: &[Neighborhood], lat: f64, lng: f64) -> &'static str {
    let mut closest = neighborhoods[0].name;
    let mut min_distance = f64::INFINITY;

    for neighborhood in neighborhoods {
        let d_lat = lat - neighborhood.lat;
        let d_lng = lng - neighborhood.lng;
        // Squared distance preserves ordering; no need for the sqrt.
        let distance = d_lat * d_lat + d_lng * d_lng;
        if distance < min_distance {
            min_distance = distance;
            closest = neighborhood.name;
        }
    }

    closest
}

/// Look up the damage estimate for a neighborhood by name.
#[must_use]
pub fn damage_estimate(name: &str) -> Option<u32> {
    NEIGHBORHOODS
        .iter()
        .find(|n| n.name == name)
        .map(|n| n.damage_estimate_eur)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centroid_resolves_to_itself() {
        for neighborhood in &NEIGHBORHOODS {
            assert_eq!(
                resolve_neighborhood(neighborhood.lat, neighborhood.lng),
                neighborhood.name
            );
        }
    }

    #[test]
    fn resolution_is_closest_by_euclidean_distance() {
        // Verify against a brute-force check on a coarse grid over the city.
        let mut lat = 41.08;
        while lat < 41.14 {
            let mut lng = 20.07;
            while lng < 20.11 {
                let resolved = resolve_neighborhood(lat, lng);
                let expected = NEIGHBORHOODS
                    .iter()
                    .map(|n| {
                        let d = (lat - n.lat).powi(2) + (lng - n.lng).powi(2);
                        (d, n.name)
                    })
                    .fold((f64::INFINITY, ""), |acc, cur| {
                        if cur.0 < acc.0 { cur } else { acc }
                    })
                    .1;
                assert_eq!(resolved, expected, "mismatch at ({lat}, {lng})");
                lng += 0.0037;
            }
            lat += 0.0041;
        }
    }

    #[test]
    fn ties_break_toward_first_entry() {
        // Two candidates exactly one degree away on either side: the
        // earlier entry wins the tie.
        let candidates = [
            Neighborhood { name: "Para", lat: 1.0, lng: 0.0, damage_estimate_eur: 0 },
            Neighborhood { name: "Pas", lat: -1.0, lng: 0.0, damage_estimate_eur: 0 },
        ];

        assert_eq!(closest(&candidates, 0.0, 0.0), "Para");
    }

    #[test]
    fn far_away_points_still_resolve() {
        // Resolution is total: even coordinates far outside the city
        // return some neighborhood from the list.
        let name = resolve_neighborhood(0.0, 0.0);
        assert!(NEIGHBORHOODS.iter().any(|n| n.name == name));
    }

    #[test]
    fn damage_estimates_cover_all_neighborhoods() {
        for neighborhood in &NEIGHBORHOODS {
            assert_eq!(
                damage_estimate(neighborhood.name),
                Some(neighborhood.damage_estimate_eur)
            );
        }
        assert_eq!(damage_estimate("Lagja Inexistente"), None);
    }
}
