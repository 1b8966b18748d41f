use rayon::prelude::*;
use std::collections::VecDeque;
use tracing::{debug, info};

use crate::config::ClusteringConfig;
use crate::models::{ClusterId, NOISE};

const UNVISITED: ClusterId = -2;

/// Density-based clustering (DBSCAN) over unit-normalized embeddings with
/// cosine distance. No pre-specified cluster count; points outside every
/// dense region get the `NOISE` label.
///
/// Deterministic given identical input order and parameters: points are
/// visited in input order, region queries preserve index order, and final
/// ids are renumbered 0..k in order of first appearance. Clusters that end
/// up smaller than `min_cluster_size` dissolve back into noise.
pub fn cluster_embeddings(vectors: &[Vec<f32>], params: &ClusteringConfig) -> Vec<ClusterId> {
    let n = vectors.len();
    if n == 0 {
        return Vec::new();
    }
    if n < params.min_cluster_size {
        debug!(
            "Fewer points ({}) than min_cluster_size ({}) - everything is noise",
            n, params.min_cluster_size
        );
        return vec![NOISE; n];
    }

    let start = std::time::Instant::now();
    let mut labels = vec![UNVISITED; n];
    let mut next_cluster: ClusterId = 0;

    for i in 0..n {
        if labels[i] != UNVISITED {
            continue;
        }
        let neighbors = region_query(vectors, i, params.epsilon);
        if neighbors.len() < params.min_samples {
            labels[i] = NOISE;
            continue;
        }

        let cluster = next_cluster;
        next_cluster += 1;
        labels[i] = cluster;

        let mut queue: VecDeque<usize> = neighbors.into_iter().collect();
        while let Some(j) = queue.pop_front() {
            if labels[j] == NOISE {
                // Border point previously labeled noise joins the cluster
                // but does not expand it.
                labels[j] = cluster;
                continue;
            }
            if labels[j] != UNVISITED {
                continue;
            }
            labels[j] = cluster;
            let reach = region_query(vectors, j, params.epsilon);
            if reach.len() >= params.min_samples {
                queue.extend(reach);
            }
        }
    }

    dissolve_small_clusters(&mut labels, next_cluster, params.min_cluster_size);
    let labels = renumber(&labels);

    let clustered = labels.iter().filter(|&&l| l != NOISE).count();
    info!(
        "Clustering completed - duration={:.2}s, points={}, clustered={}, noise={}",
        start.elapsed().as_secs_f32(),
        n,
        clustered,
        n - clustered
    );
    labels
}

/// Indices (including `i` itself) within cosine distance `epsilon` of point
/// `i`. The parallel scan preserves index order.
fn region_query(vectors: &[Vec<f32>], i: usize, epsilon: f32) -> Vec<usize> {
    let center = &vectors[i];
    (0..vectors.len())
        .into_par_iter()
        .filter(|&j| cosine_distance(center, &vectors[j]) <= epsilon)
        .collect()
}

/// `1 - dot` on unit vectors.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    1.0 - dot
}

fn dissolve_small_clusters(labels: &mut [ClusterId], cluster_count: ClusterId, min_size: usize) {
    if cluster_count == 0 {
        return;
    }
    let mut sizes = vec![0usize; cluster_count as usize];
    for &label in labels.iter() {
        if label >= 0 {
            sizes[label as usize] += 1;
        }
    }
    let mut dissolved = 0usize;
    for label in labels.iter_mut() {
        if *label >= 0 && sizes[*label as usize] < min_size {
            *label = NOISE;
            dissolved += 1;
        }
    }
    if dissolved > 0 {
        debug!(
            "Dissolved {} points from clusters below min_cluster_size={}",
            dissolved, min_size
        );
    }
}

/// Renumber surviving cluster ids to consecutive 0..k in first-appearance
/// order so output ids do not depend on how many small clusters dissolved.
fn renumber(labels: &[ClusterId]) -> Vec<ClusterId> {
    let mut mapping: std::collections::HashMap<ClusterId, ClusterId> =
        std::collections::HashMap::new();
    let mut next: ClusterId = 0;
    labels
        .iter()
        .map(|&label| {
            if label == NOISE {
                NOISE
            } else {
                *mapping.entry(label).or_insert_with(|| {
                    let id = next;
                    next += 1;
                    id
                })
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::unit_normalize;

    fn params(min_cluster_size: usize, min_samples: usize, epsilon: f32) -> ClusteringConfig {
        ClusteringConfig {
            min_cluster_size,
            min_samples,
            epsilon,
        }
    }

    /// Unit vectors in the plane: angle in degrees.
    fn at(degrees: f32) -> Vec<f32> {
        let r = degrees.to_radians();
        unit_normalize(vec![r.cos(), r.sin()])
    }

    #[test]
    fn separates_two_dense_groups_and_an_outlier() {
        // Two tight bundles 90 degrees apart plus one point far from both.
        let vectors = vec![
            at(0.0),
            at(2.0),
            at(4.0),
            at(90.0),
            at(92.0),
            at(94.0),
            at(200.0),
        ];
        let labels = cluster_embeddings(&vectors, &params(3, 2, 0.05));
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
        assert_eq!(labels[6], NOISE);
        // First-seen cluster gets id 0.
        assert_eq!(labels[0], 0);
        assert_eq!(labels[3], 1);
    }

    #[test]
    fn assignment_is_total() {
        let vectors: Vec<Vec<f32>> = (0..20).map(|i| at(i as f32 * 17.0)).collect();
        let labels = cluster_embeddings(&vectors, &params(2, 2, 0.1));
        assert_eq!(labels.len(), vectors.len());
        assert!(labels.iter().all(|&l| l == NOISE || l >= 0));
    }

    #[test]
    fn fewer_points_than_min_cluster_size_is_all_noise() {
        let vectors = vec![at(0.0), at(1.0), at(2.0)];
        let labels = cluster_embeddings(&vectors, &params(5, 2, 0.5));
        assert_eq!(labels, vec![NOISE, NOISE, NOISE]);
    }

    #[test]
    fn small_clusters_dissolve_into_noise() {
        // A dense group of 4 and a pair; min_cluster_size 3 keeps the group,
        // dissolves the pair.
        let vectors = vec![at(0.0), at(1.0), at(2.0), at(3.0), at(180.0), at(181.0)];
        let labels = cluster_embeddings(&vectors, &params(3, 2, 0.02));
        assert!(labels[..4].iter().all(|&l| l == 0));
        assert_eq!(labels[4], NOISE);
        assert_eq!(labels[5], NOISE);
    }

    #[test]
    fn deterministic_for_identical_input() {
        let vectors: Vec<Vec<f32>> = (0..30).map(|i| at((i % 7) as f32 * 5.0)).collect();
        let p = params(3, 2, 0.1);
        assert_eq!(
            cluster_embeddings(&vectors, &p),
            cluster_embeddings(&vectors, &p)
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(cluster_embeddings(&[], &params(5, 2, 0.35)).is_empty());
    }
}
