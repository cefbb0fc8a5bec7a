//! End-to-end OPTICS scenarios: cluster segmentation, ordering, and noise
//! handling over small synthetic skies.

use skyclust::{LonLat, Optics, Point};

fn sky_points(coords: &[(f64, f64)]) -> Vec<Point> {
    coords
        .iter()
        .enumerate()
        .map(|(i, &(lon, lat))| Point::new(LonLat::from_degrees(lon, lat).into(), i))
        .collect()
}

fn run_optics(
    points: Vec<Point>,
    min_neighbors: usize,
    epsilon: f64,
) -> Vec<Vec<usize>> {
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut sink = |cluster: &[usize]| clusters.push(cluster.to_vec());
    let mut optics = Optics::new(points, min_neighbors, epsilon, 32, 0.0).unwrap();
    optics.run(&mut sink).unwrap();
    clusters
}

/// A deterministic scatter of `n` points around a center, all within
/// `spread` degrees.
fn make_blob(center: (f64, f64), n: usize, spread: f64) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| {
            let dlon = spread * ((i * 7) % 11) as f64 / 11.0 - spread / 2.0;
            let dlat = spread * ((i * 13) % 11) as f64 / 11.0 - spread / 2.0;
            (center.0 + dlon, center.1 + dlat)
        })
        .collect()
}

#[test]
fn empty_dataset_is_rejected() {
    assert!(Optics::new(Vec::new(), 1, 1.0, 32, 0.0).is_err());
}

#[test]
fn single_point_is_a_noise_singleton() {
    let clusters = run_optics(sky_points(&[(42.0, -17.0)]), 1, 1.0);
    assert_eq!(clusters, vec![vec![0]]);
}

#[test]
fn two_identical_points_form_one_cluster() {
    let clusters = run_optics(sky_points(&[(5.0, 5.0), (5.0, 5.0)]), 1, 0.1);
    assert_eq!(clusters, vec![vec![0, 1]]);
}

#[test]
fn antipodal_point_is_noise() {
    // two neighbors and a point on the far side of the sphere
    let clusters = run_optics(sky_points(&[(0.0, 0.0), (0.0, 0.1), (180.0, 0.0)]), 2, 1.0);

    assert_eq!(clusters.len(), 2);
    let mut pair = clusters[0].clone();
    pair.sort_unstable();
    assert_eq!(pair, vec![0, 1]);
    assert_eq!(clusters[1], vec![2]);
}

#[test]
fn dense_grid_is_one_cluster() {
    // 5x5 grid, 0.1 degree pitch: every pair is within epsilon
    let mut coords = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            coords.push((10.0 + 0.1 * i as f64, 20.0 + 0.1 * j as f64));
        }
    }
    let n = coords.len();
    let clusters = run_optics(sky_points(&coords), 4, 1.0);

    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), n);
    // the scan starts the cluster at the first unprocessed point
    assert_eq!(clusters[0][0], 0);
    let mut records = clusters[0].clone();
    records.sort_unstable();
    assert_eq!(records, (0..n).collect::<Vec<_>>());
}

#[test]
fn large_grid_is_one_cluster() {
    // large enough that the tree actually subdivides and permutes
    let mut coords = Vec::new();
    for i in 0..20 {
        for j in 0..20 {
            coords.push((80.0 + 0.05 * i as f64, -40.0 + 0.05 * j as f64));
        }
    }
    let n = coords.len();
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut sink = |cluster: &[usize]| clusters.push(cluster.to_vec());
    let mut optics = Optics::new(sky_points(&coords), 8, 2.0, 16, 0.0).unwrap();
    optics.run(&mut sink).unwrap();

    assert_eq!(clusters.len(), 1);
    let mut records = clusters[0].clone();
    records.sort_unstable();
    assert_eq!(records, (0..n).collect::<Vec<_>>());
}

#[test]
fn well_separated_blobs_form_two_clusters() {
    let mut coords = make_blob((10.0, 0.0), 40, 0.5);
    coords.extend(make_blob((200.0, -30.0), 40, 0.5));
    let clusters = run_optics(sky_points(&coords), 5, 2.0);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].len() + clusters[1].len(), 80);

    // each publish holds exactly the records of one blob; which blob comes
    // first depends on how the index permuted the array
    let mut first = clusters[0].clone();
    first.sort_unstable();
    let mut second = clusters[1].clone();
    second.sort_unstable();
    if first[0] == 0 {
        assert_eq!(first, (0..40).collect::<Vec<_>>());
        assert_eq!(second, (40..80).collect::<Vec<_>>());
    } else {
        assert_eq!(first, (40..80).collect::<Vec<_>>());
        assert_eq!(second, (0..40).collect::<Vec<_>>());
    }
}

#[test]
fn clustering_is_deterministic() {
    let mut coords = make_blob((120.0, 45.0), 30, 0.4);
    coords.extend(make_blob((121.5, 45.0), 25, 0.4));
    coords.push((140.0, -60.0));

    let first = run_optics(sky_points(&coords), 4, 0.5);
    let second = run_optics(sky_points(&coords), 4, 0.5);
    assert_eq!(first, second);
}

#[test]
fn every_record_is_published_exactly_once() {
    let mut coords = make_blob((0.5, -0.5), 25, 0.8);
    coords.extend(make_blob((3.0, 1.0), 15, 0.6));
    coords.extend([(90.0, 0.0), (270.0, 30.0)]);
    let n = coords.len();

    let clusters = run_optics(sky_points(&coords), 3, 1.0);
    let mut records: Vec<usize> = clusters.iter().flatten().copied().collect();
    records.sort_unstable();
    assert_eq!(records, (0..n).collect::<Vec<_>>());
}

#[test]
fn singleton_clusters_are_noise() {
    // min_neighbors larger than any neighborhood: everything is noise
    let coords = [(0.0, 0.0), (30.0, 0.0), (60.0, 0.0)];
    let clusters = run_optics(sky_points(&coords), 2, 1.0);
    assert_eq!(clusters, vec![vec![0], vec![1], vec![2]]);
}
