//! Behaviour shared by all engines, exercised through the public API.

use approx::assert_relative_eq;
use micro_anc::batch::{run_batch, BatchJob};
use micro_anc::config::{EngineConfig, LmsOptions, PredictorOptions, RlsOptions, StepNormalization};
use micro_anc::lms::LmsEngine;
use micro_anc::rls::RlsEngine;
use micro_anc::{run, run_single, AncError, Engine, EngineKind, Sample, SignalExt};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn noise_signal(len: usize, amplitude: i16, seed: u64) -> Vec<Sample> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len)
        .map(|_| rng.random_range(-amplitude..=amplitude))
        .collect()
}

fn reference_configs() -> Vec<EngineConfig> {
    vec![
        EngineConfig::Lms(LmsOptions {
            order: 1,
            mu: 1e-10,
            normalization: StepNormalization::None,
        }),
        EngineConfig::Lms(LmsOptions {
            order: 16,
            mu: 0.2,
            normalization: StepNormalization::Power { eps: 1e-3 },
        }),
        EngineConfig::Rls(RlsOptions {
            order: 8,
            ..RlsOptions::default()
        }),
    ]
}

#[test]
fn zero_reference_passes_desired_through() {
    let desired = noise_signal(2000, 20000, 1);
    let silence = vec![0; desired.len()];
    for config in reference_configs() {
        let mut engine = config.build().unwrap();
        let output = run(&desired, &silence, &mut engine).unwrap();
        assert_eq!(output, desired, "{:?}", config);
    }
}

#[test]
fn lms_converges_to_scale_factor() {
    let k = 0.25;
    let reference = noise_signal(20000, 10000, 2);
    let mut lms = LmsEngine::new(1e-9).unwrap();
    for x in reference.iter() {
        let x = *x as f64;
        lms.step(k * x, x).unwrap();
    }
    assert_relative_eq!(lms.weights()[0], k, epsilon = 1e-3);
}

#[test]
fn rls_cancels_filtered_noise() {
    let reference = noise_signal(5000, 8000, 3);
    // Noise reaching the desired microphone through a short FIR path.
    let desired: Vec<Sample> = (0..reference.len())
        .map(|n| {
            let mut d = 0.6 * reference[n] as f64;
            if n > 0 {
                d -= 0.2 * reference[n - 1] as f64;
            }
            d.round() as Sample
        })
        .collect();

    let mut rls = RlsEngine::from_options(RlsOptions {
        order: 4,
        lambda: 0.999,
        ..RlsOptions::default()
    })
    .unwrap();
    let output = run(&desired, &reference, &mut rls).unwrap();
    // Only the rounding of d remains.
    assert!(output[1000..].iter().all(|e| e.abs() <= 1));
    assert_relative_eq!(rls.weights()[0], 0.6, epsilon = 1e-3);
    assert_relative_eq!(rls.weights()[1], -0.2, epsilon = 1e-3);
}

#[test]
fn runs_are_deterministic() {
    let desired = noise_signal(3000, 15000, 4);
    let reference = noise_signal(3000, 15000, 5);
    for config in reference_configs() {
        let mut a = config.build().unwrap();
        let mut b = config.build().unwrap();
        assert_eq!(
            run(&desired, &reference, &mut a),
            run(&desired, &reference, &mut b)
        );
    }
}

#[test]
fn reset_engine_repeats_its_output() {
    let desired = noise_signal(500, 15000, 6);
    let reference = noise_signal(500, 15000, 7);
    for config in reference_configs() {
        let mut engine = config.build().unwrap();
        let first = run(&desired, &reference, &mut engine).unwrap();
        assert_eq!(engine.processed(), 500);
        engine.reset();
        assert_eq!(engine.processed(), 0);
        let second = run(&desired, &reference, &mut engine).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn length_mismatch_is_rejected_for_every_engine() {
    let configs = reference_configs()
        .into_iter()
        .chain(std::iter::once(EngineConfig::Predictive(
            PredictorOptions::default(),
        )));
    for config in configs {
        let mut engine = config.build().unwrap();
        assert_eq!(
            run(&[1, 2, 3, 4], &[1, 2, 3], &mut engine),
            Err(AncError::LengthMismatch {
                desired: 4,
                reference: 3
            })
        );
        assert_eq!(engine.processed(), 0);
    }
}

#[test]
fn output_is_always_in_range() {
    // A step size far outside the stable range makes LMS diverge.
    let desired = noise_signal(20, 32767, 8);
    let reference = noise_signal(20, 32767, 9);
    let mut lms = LmsEngine::from_options(LmsOptions {
        order: 4,
        mu: 1e-3,
        normalization: StepNormalization::None,
    })
    .unwrap();
    let output = run(&desired, &reference, &mut lms).unwrap();
    assert_eq!(output.len(), desired.len());
    assert!(output
        .iter()
        .any(|s| *s == Sample::MAX || *s == Sample::MIN));
}

#[test]
fn predictor_needs_no_reference() {
    let config = EngineConfig::Predictive(PredictorOptions::default());
    let mut engine = config.build().unwrap();
    assert_eq!(engine.kind(), EngineKind::Predictive);
    assert_eq!(
        run_single(&[100, 100, -40, 0], &mut engine).unwrap(),
        vec![100, 50, -60, 30]
    );

    let mut rls = RlsEngine::new(2).unwrap();
    assert_eq!(
        run_single(&[1, 2], &mut rls),
        Err(AncError::MissingReference {
            engine: EngineKind::Rls
        })
    );
}

#[test]
fn batch_preserves_job_order() {
    let jobs: Vec<BatchJob> = (0..8)
        .map(|n| {
            let reference = noise_signal(1000, 5000, 100 + n);
            let desired = reference.iter().map(|x| x / (n as Sample + 2)).collect();
            BatchJob::with_reference(desired, reference, reference_configs()[n as usize % 3].clone())
        })
        .collect();

    let results = run_batch(&jobs);
    for (job, result) in jobs.iter().zip(results.iter()) {
        let mut engine = job.config.build().unwrap();
        let expected = run(&job.desired, job.reference.as_ref().unwrap(), &mut engine).unwrap();
        assert_eq!(result.as_ref().unwrap(), &expected);
    }
}

#[test]
fn default_configs_handle_realistic_levels() {
    let reference = noise_signal(44100, 12000, 10);
    let desired: Vec<Sample> = reference.iter().map(|x| x / 2).collect();
    let configs = [
        EngineConfig::default(),
        EngineConfig::Lms(LmsOptions {
            order: 32,
            ..LmsOptions::default()
        }),
        EngineConfig::Rls(RlsOptions::default()),
    ];
    for config in configs.iter() {
        let mut engine = config.build().unwrap();
        let output = run(&desired, &reference, &mut engine)
            .unwrap_or_else(|err| panic!("{:?} failed: {}", config, err));
        // Mostly the rounding of the halved reference remains.
        let input_rms = desired[22050..].rms_level();
        let output_rms = output[22050..].rms_level();
        // At least 40 dB of attenuation.
        assert!(
            output_rms < 0.01 * input_rms,
            "{:?}: RMS {} in, {} out",
            config,
            input_rms,
            output_rms
        );
    }
}
