use micro_anc::config::{EngineConfig, LmsOptions, RlsOptions, StepNormalization};
use micro_anc::{run, Sample, SignalExt};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() {
    const SAMPLE_COUNT: usize = 44100;
    const ORDER: usize = 8;

    // Using notation from https://en.wikipedia.org/wiki/Least_mean_squares_filter

    let mut rng = StdRng::seed_from_u64(1);
    // x, the noise reference we want to remove from d
    let x: Vec<f64> = (0..SAMPLE_COUNT)
        .map(|_| rng.random_range(-6000.0..=6000.0))
        .collect();
    // y, the version of x present in d, x passed through a short FIR path
    let y: Vec<f64> = (0..SAMPLE_COUNT)
        .map(|n| 0.7 * x[n] - if n > 1 { 0.3 * x[n - 2] } else { 0.0 })
        .collect();
    // v, the signal of interest, a 440 Hz tone
    let v: Vec<f64> = (0..SAMPLE_COUNT)
        .map(|n| 4000.0 * (2.0 * std::f64::consts::PI * 440.0 * n as f64 / 44100.0).sin())
        .collect();
    // d, the sum of v and y
    let d: Vec<Sample> = v.iter().zip(y.iter()).map(|(v, y)| (v + y).round() as Sample).collect();
    let x: Vec<Sample> = x.iter().map(|x| x.round() as Sample).collect();
    let v: Vec<Sample> = v.iter().map(|v| v.round() as Sample).collect();
    println!("Created input signals");
    println!("x(n) {:.1} dBFS RMS", x.rms_level_db());
    println!("v(n) {:.1} dBFS RMS", v.rms_level_db());
    println!("d(n) <- v(n) + y(n), {:.1} dBFS RMS", d.rms_level_db());
    println!();

    let configs = [
        EngineConfig::Lms(LmsOptions {
            order: ORDER,
            mu: 0.05,
            normalization: StepNormalization::Power { eps: 1.0 },
        }),
        EngineConfig::Rls(RlsOptions {
            order: ORDER,
            lambda: 0.999,
            ..RlsOptions::default()
        }),
    ];
    for config in configs.iter() {
        println!("Filtering ({:?})", config);
        let mut engine = match config.build() {
            Ok(engine) => engine,
            Err(err) => {
                println!("  {}", err);
                continue;
            }
        };
        match run(&d, &x, &mut engine) {
            Ok(e) => {
                // The residual noise is what remains after removing v.
                let residual: Vec<Sample> = e.iter().zip(v.iter()).map(|(e, v)| e.saturating_sub(*v)).collect();
                println!("  e(n) {:.1} dBFS RMS", e.rms_level_db());
                println!("  e(n) - v(n), last second half {:.1} dBFS RMS", residual[SAMPLE_COUNT / 2..].rms_level_db());
            }
            Err(err) => println!("  {}", err),
        }
        println!();
    }
}
