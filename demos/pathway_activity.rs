use faer::Mat;
use pathway_factor_models::{
    PathwayFitOptions, PathwayModelInput, PathwayPriorConfig, PathwaySamplerConfig, SamplerMode,
    fit_pathway_input_with_config,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let input = build_synthetic_input(40, 8, 2);

    let config = PathwaySamplerConfig {
        fit_options: PathwayFitOptions {
            iterations: 600,
            seed: 2_026,
            ..PathwayFitOptions::for_mode(SamplerMode::FullFactorAnalysis)
        },
        prior_config: PathwayPriorConfig {
            baseline_variance: 0.5,
            ..PathwayPriorConfig::default()
        },
    };

    let trajectory = fit_pathway_input_with_config(&input, config)?;
    println!(
        "Pathway fit complete: mode={:?}, iterations={}",
        config.fit_options.mode(),
        trajectory.iterations()
    );

    let burn_in = trajectory.iterations() / 2;
    let retained = trajectory.iterations() - burn_in;
    for pathway in 0..input.n_pathways() {
        let means: Vec<String> = (0..input.n_samples())
            .map(|sample| {
                let total: f64 = (burn_in..trajectory.iterations())
                    .filter_map(|index| trajectory.effective_activation_at(index))
                    .map(|kappa| kappa[(pathway, sample)])
                    .sum();
                format!("{:.2}", total / to_f64(retained))
            })
            .collect();
        println!("pathway {pathway} mean activation: [{}]", means.join(", "));
    }

    if let Some(last) = trajectory
        .signature_indicator
        .as_ref()
        .and_then(|indicators| indicators.last())
    {
        let included = (0..last.nrows())
            .flat_map(|gene| (0..last.ncols()).map(move |pathway| (gene, pathway)))
            .filter(|(gene, pathway)| last[(*gene, *pathway)] >= 0.5)
            .count();
        println!("significant gene-pathway pairs at the last iteration: {included}");
    }

    let precision_mean = (0..input.n_genes())
        .map(|gene| trajectory.precision[(trajectory.iterations() - 1, gene)])
        .sum::<f64>()
        / to_f64(input.n_genes());
    println!("mean gene precision at the last iteration: {precision_mean:.3}");

    Ok(())
}

fn to_f64(value: usize) -> f64 {
    f64::from(u32::try_from(value).unwrap_or(u32::MAX))
}

fn build_synthetic_input(genes: usize, samples: usize, pathways: usize) -> PathwayModelInput {
    let signature = Mat::from_fn(genes, pathways, |gene, pathway| {
        if gene % pathways == pathway {
            if gene % 5 == 0 { -1.0 } else { 1.5 }
        } else {
            0.1
        }
    });
    let activation = Mat::from_fn(pathways, samples, |pathway, sample| {
        if sample % pathways == pathway { 0.8 } else { 0.0 }
    });
    let fitted = &signature * &activation;
    let expression = Mat::from_fn(genes, samples, |gene, sample| {
        let noise = to_f64((gene * 13 + sample * 7) % 11) / 50.0 - 0.1;
        3.0 + fitted[(gene, sample)] + noise
    });
    PathwayModelInput::new(
        expression,
        Mat::from_fn(genes, 1, |_, _| 3.0),
        signature,
        Mat::from_fn(genes, pathways, |gene, pathway| {
            if gene % pathways == pathway { 0.8 } else { 0.2 }
        }),
    )
}
