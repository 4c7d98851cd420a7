use faer::Mat;

/// Residual `Y - B 1' - S beta` for the current baseline, signature and activation.
#[must_use]
pub fn residual_matrix(
    expression: &Mat<f64>,
    baseline: &[f64],
    signature: &Mat<f64>,
    activation: &Mat<f64>,
) -> Mat<f64> {
    let fitted = signature * activation;
    Mat::from_fn(expression.nrows(), expression.ncols(), |i, j| {
        expression[(i, j)] - baseline[i] - fitted[(i, j)]
    })
}

/// Add `scale * S[:, pathway] beta[pathway, :]` to `residual` in place.
///
/// With `scale = 1` this removes the pathway from the fit, giving its partial
/// residual; with `scale = -1` the pathway is put back.
pub fn add_pathway_contribution(
    residual: &mut Mat<f64>,
    signature: &Mat<f64>,
    activation: &Mat<f64>,
    pathway: usize,
    scale: f64,
) {
    for gene in 0..residual.nrows() {
        let weight = scale * signature[(gene, pathway)];
        if weight == 0.0 {
            continue;
        }
        for sample in 0..residual.ncols() {
            residual[(gene, sample)] += weight * activation[(pathway, sample)];
        }
    }
}

#[must_use]
pub fn row_sums(values: &Mat<f64>) -> Vec<f64> {
    (0..values.nrows())
        .map(|i| (0..values.ncols()).map(|j| values[(i, j)]).sum())
        .collect()
}

#[must_use]
pub fn row_sums_of_squares(values: &Mat<f64>) -> Vec<f64> {
    (0..values.nrows())
        .map(|i| {
            (0..values.ncols())
                .map(|j| values[(i, j)] * values[(i, j)])
                .sum()
        })
        .collect()
}

#[must_use]
pub fn hadamard(a: &Mat<f64>, b: &Mat<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)] * b[(i, j)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{max_abs_diff, usize_to_f64};
    use approx::assert_relative_eq;

    #[test]
    fn residual_subtracts_baseline_and_fit() {
        let expression = Mat::from_fn(2, 2, |_, _| 5.0);
        let signature = Mat::from_fn(2, 1, |i, _| if i == 0 { 1.0 } else { 2.0 });
        let activation = Mat::from_fn(1, 2, |_, j| if j == 0 { 0.5 } else { 1.0 });
        let residual = residual_matrix(&expression, &[1.0, 2.0], &signature, &activation);
        assert_relative_eq!(residual[(0, 0)], 3.5);
        assert_relative_eq!(residual[(1, 1)], 1.0);
    }

    #[test]
    fn pathway_contribution_round_trips() {
        let expression = Mat::from_fn(3, 2, |i, j| 1.0 + usize_to_f64(i + j));
        let signature = Mat::from_fn(3, 2, |i, j| if i == j { 1.0 } else { 0.25 });
        let activation = Mat::from_fn(2, 2, |i, j| if i == j { 0.8 } else { 0.1 });
        let baseline = [0.1, 0.2, 0.3];
        let original = residual_matrix(&expression, &baseline, &signature, &activation);

        let mut residual = original.clone();
        add_pathway_contribution(&mut residual, &signature, &activation, 1, 1.0);
        let without_second = Mat::from_fn(3, 2, |i, j| {
            expression[(i, j)] - baseline[i] - signature[(i, 0)] * activation[(0, j)]
        });
        assert!(max_abs_diff(&residual, &without_second) < 1.0e-12);

        add_pathway_contribution(&mut residual, &signature, &activation, 1, -1.0);
        assert!(max_abs_diff(&residual, &original) < 1.0e-12);
    }

    #[test]
    fn row_reductions_match_manual_sums() {
        let values = Mat::from_fn(2, 3, |i, j| if i == 0 { 1.0 } else { usize_to_f64(j) - 2.0 });
        assert_eq!(row_sums(&values), vec![3.0, -3.0]);
        assert_eq!(row_sums_of_squares(&values), vec![3.0, 5.0]);
    }

    #[test]
    fn hadamard_multiplies_elementwise() {
        let a = Mat::from_fn(2, 2, |i, _| if i == 0 { 2.0 } else { 3.0 });
        let b = Mat::from_fn(2, 2, |_, j| if j == 0 { 0.0 } else { 1.0 });
        let product = hadamard(&a, &b);
        assert_relative_eq!(product[(0, 0)], 0.0);
        assert_relative_eq!(product[(1, 1)], 3.0);
    }
}
