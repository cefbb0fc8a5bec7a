//! OPTICS over a small synthetic sky: two groups of sources and a stray.

use skyclust::{LonLat, Optics, Point};

fn main() {
    // Two compact groups of sky positions plus an isolated source.
    let sources: Vec<LonLat> = vec![
        // Group A (near lon 10, lat 0)
        LonLat::from_degrees(10.00, 0.00),
        LonLat::from_degrees(10.12, 0.05),
        LonLat::from_degrees(9.95, -0.08),
        LonLat::from_degrees(10.05, 0.12),
        LonLat::from_degrees(9.90, 0.02),
        // Group B (near lon 250, lat -45)
        LonLat::from_degrees(250.00, -45.00),
        LonLat::from_degrees(250.15, -44.92),
        LonLat::from_degrees(249.88, -45.10),
        LonLat::from_degrees(250.05, -45.05),
        // A stray source on its own
        LonLat::from_degrees(120.0, 60.0),
    ];

    let points: Vec<Point> = sources
        .iter()
        .enumerate()
        .map(|(i, &p)| Point::new(p.into(), i))
        .collect();

    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut sink = |cluster: &[usize]| clusters.push(cluster.to_vec());

    let mut optics = Optics::new(points, 3, 1.0, 32, 0.0).unwrap();
    optics.run(&mut sink).unwrap();

    println!("=== OPTICS (min_neighbors=3, epsilon=1.0 deg) ===");
    for (c, cluster) in clusters.iter().enumerate() {
        let tag = if cluster.len() == 1 { " (noise)" } else { "" };
        println!("cluster {}{} - {} source(s):", c, tag, cluster.len());
        for &record in cluster {
            let p = sources[record];
            println!("  source {:2} at ({:7.2}, {:6.2})", record, p.lon, p.lat);
        }
    }
}
