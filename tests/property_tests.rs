use proptest::prelude::*;

use skyclust::geom::{squared_euclidean, squared_euclidean_for_angle};
use skyclust::{LonLat, Point, SeedList, Tree, Vec3, NOT_FOUND};

fn points_with_reach(reaches: &[f64]) -> Vec<Point> {
    reaches
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let mut p = Point::new(Vec3::new(1.0, 0.0, 0.0), i);
            p.reach = r;
            p
        })
        .collect()
}

proptest! {
    #[test]
    fn prop_seed_list_pops_in_reach_order(
        reaches in prop::collection::vec(-1.0e6f64..1.0e6, 1..200)
    ) {
        let mut points = points_with_reach(&reaches);
        let mut seeds = SeedList::new(points.len());

        for i in 0..points.len() {
            seeds.add(&mut points, i);
            prop_assert!(seeds.check_invariants(&points));
        }

        let mut max_reach = f64::NEG_INFINITY;
        while !seeds.is_empty() {
            let i = seeds.pop(&mut points);
            prop_assert!(seeds.check_invariants(&points));
            prop_assert!(points[i].reach >= max_reach);
            max_reach = points[i].reach;
        }
    }

    #[test]
    fn prop_seed_list_update_keeps_invariants(
        reaches in prop::collection::vec(0.0f64..100.0, 2..100),
        updates in prop::collection::vec((0usize..100, -50.0f64..150.0), 1..200)
    ) {
        let mut points = points_with_reach(&reaches);
        let n = points.len();
        let mut seeds = SeedList::new(n);

        for (i, reach) in updates {
            seeds.update(&mut points, i % n, reach);
            prop_assert!(seeds.check_invariants(&points));
        }

        let mut max_reach = f64::NEG_INFINITY;
        while !seeds.is_empty() {
            let i = seeds.pop(&mut points);
            prop_assert!(points[i].reach >= max_reach);
            max_reach = points[i].reach;
        }
        prop_assert!(seeds.check_invariants(&points));
    }

    #[test]
    fn prop_lon_lat_round_trip(
        lon in 0.0f64..360.0,
        lat in -89.999f64..89.999
    ) {
        let v = Vec3::from(LonLat::from_degrees(lon, lat));
        let p = v.lon_lat();
        prop_assert!((p.lon - lon).abs() < 1e-8 || (p.lon - lon).abs() > 359.999);
        prop_assert!((p.lat - lat).abs() < 1e-8);
    }

    #[test]
    fn prop_angle_distance_matches_vectors(angle in 0.0f64..180.0) {
        let a = Vec3::from(LonLat::from_degrees(0.0, 0.0));
        let b = Vec3::from(LonLat::from_degrees(angle, 0.0));
        let expected = squared_euclidean(&a, &b);
        prop_assert!((squared_euclidean_for_angle(angle) - expected).abs() < 1e-9);
    }

    #[test]
    fn prop_in_range_matches_brute_force(
        coords in prop::collection::vec((0.0f64..360.0, -89.0f64..89.0), 1..150),
        query in (0.0f64..360.0, -89.0f64..89.0),
        radius in 0.01f64..30.0
    ) {
        let mut points: Vec<Point> = coords
            .iter()
            .enumerate()
            .map(|(i, &(lon, lat))| Point::new(LonLat::from_degrees(lon, lat).into(), i))
            .collect();

        let q = Vec3::from(LonLat::from_degrees(query.0, query.1));
        let dist = squared_euclidean_for_angle(radius);
        let tree = Tree::build(&mut points, 4, 0.0).unwrap();

        // the oracle sees the same permuted points and the same arithmetic,
        // so set equality is exact
        let mut expected: Vec<usize> = points
            .iter()
            .filter(|p| squared_euclidean(&q, &p.v) <= dist)
            .map(|p| p.record)
            .collect();
        expected.sort_unstable();

        let mut matches = Vec::new();
        let mut i = tree.in_range(&mut points, &q, dist);
        while i != NOT_FOUND {
            matches.push(points[i].record);
            i = points[i].next;
        }
        matches.sort_unstable();

        prop_assert_eq!(matches, expected);
    }
}
