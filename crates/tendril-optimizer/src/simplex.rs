//! Standard Nelder-Mead simplex search over the 5-D parameter space.
//! Reflection/expansion/contraction/shrink with the coefficients and
//! evaluation budget declared as config, not inlined.

use crate::bounds::clamp_vector;

/// Reflection, expansion, contraction and shrink coefficients.
#[derive(Debug, Clone, Copy)]
pub struct SimplexConfig {
    pub alpha: f64,
    pub gamma: f64,
    pub rho: f64,
    pub sigma: f64,
    pub max_evals: usize,
    pub tolerance: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            gamma: 2.0,
            rho: 0.5,
            sigma: 0.5,
            max_evals: 300,
            tolerance: 1e-8,
        }
    }
}

type Vertex = ([f64; 5], f64);

fn sub(a: [f64; 5], b: [f64; 5]) -> [f64; 5] {
    let mut out = [0.0; 5];
    for i in 0..5 {
        out[i] = a[i] - b[i];
    }
    out
}

fn add(a: [f64; 5], b: [f64; 5]) -> [f64; 5] {
    let mut out = [0.0; 5];
    for i in 0..5 {
        out[i] = a[i] + b[i];
    }
    out
}

fn scale(a: [f64; 5], s: f64) -> [f64; 5] {
    let mut out = [0.0; 5];
    for i in 0..5 {
        out[i] = a[i] * s;
    }
    out
}

fn centroid_excluding(vertices: &[Vertex], exclude_idx: usize) -> [f64; 5] {
    let n = vertices.len() - 1;
    let mut sum = [0.0; 5];
    for (i, (v, _)) in vertices.iter().enumerate() {
        if i == exclude_idx {
            continue;
        }
        sum = add(sum, *v);
    }
    scale(sum, 1.0 / n as f64)
}

/// Build the initial 6-vertex simplex: the warm-start vertex plus one
/// perturbation per coordinate, alternating sign, all clamped to bounds.
pub fn initial_simplex(warm_start: [f64; 5], epsilon: [f64; 5]) -> Vec<[f64; 5]> {
    let mut vertices = Vec::with_capacity(6);
    vertices.push(clamp_vector(warm_start));
    for i in 0..5 {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        let mut v = warm_start;
        v[i] += epsilon[i] * sign;
        vertices.push(clamp_vector(v));
    }
    vertices
}

/// Classic Nelder-Mead minimization, clamping every candidate vertex to the
/// declared parameter bounds. Returns the best vertex and its value.
pub fn minimize(
    mut objective: impl FnMut([f64; 5]) -> f64,
    initial_vertices: Vec<[f64; 5]>,
    config: &SimplexConfig,
) -> ([f64; 5], f64) {
    let mut evals = 0usize;
    let mut eval = |v: [f64; 5], evals: &mut usize| -> f64 {
        *evals += 1;
        objective(v)
    };

    let mut vertices: Vec<Vertex> = initial_vertices
        .into_iter()
        .map(|v| {
            let f = eval(v, &mut evals);
            (v, f)
        })
        .collect();

    while evals < config.max_evals {
        vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        let best = vertices[0];
        let worst_idx = vertices.len() - 1;
        let worst = vertices[worst_idx];
        let second_worst = vertices[vertices.len() - 2];

        if (worst.1 - best.1).abs() < config.tolerance {
            break;
        }
        if evals >= config.max_evals {
            break;
        }

        let centroid = centroid_excluding(&vertices, worst_idx);

        let xr = clamp_vector(add(centroid, scale(sub(centroid, worst.0), config.alpha)));
        let fr = eval(xr, &mut evals);

        if fr < best.1 {
            let xe = clamp_vector(add(centroid, scale(sub(xr, centroid), config.gamma)));
            let fe = eval(xe, &mut evals);
            if fe < fr {
                vertices[worst_idx] = (xe, fe);
            } else {
                vertices[worst_idx] = (xr, fr);
            }
            continue;
        }

        if fr < second_worst.1 {
            vertices[worst_idx] = (xr, fr);
            continue;
        }

        let xc = if fr < worst.1 {
            clamp_vector(add(centroid, scale(sub(xr, centroid), config.rho)))
        } else {
            clamp_vector(add(centroid, scale(sub(worst.0, centroid), config.rho)))
        };
        let fc = eval(xc, &mut evals);

        if fc < fr.min(worst.1) {
            vertices[worst_idx] = (xc, fc);
            continue;
        }

        // Shrink toward the best vertex.
        let best_v = best.0;
        for vertex in vertices.iter_mut().skip(1) {
            if evals >= config.max_evals {
                break;
            }
            let shrunk = clamp_vector(add(best_v, scale(sub(vertex.0, best_v), config.sigma)));
            let f = eval(shrunk, &mut evals);
            *vertex = (shrunk, f);
        }
    }

    vertices.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    vertices[0]
}

/// Maximize `objective` by minimizing its negation.
pub fn maximize(
    mut objective: impl FnMut([f64; 5]) -> f64,
    initial_vertices: Vec<[f64; 5]>,
    config: &SimplexConfig,
) -> ([f64; 5], f64) {
    let (vertex, neg_value) = minimize(|v| -objective(v), initial_vertices, config);
    (vertex, -neg_value)
}
