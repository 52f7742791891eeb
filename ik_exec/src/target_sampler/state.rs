//! Implementations for the TargetSampler state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, trace};
use nalgebra::Vector3;
use rand::{
    distributions::{Distribution, Uniform},
    rngs::StdRng,
    SeedableRng,
};
use serde::Serialize;

// Internal
use super::{Params, TargetSamplerError};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::strictly_between,
    module::State,
    params,
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Target sampler module state
pub struct TargetSampler {
    params: Params,

    rng: StdRng,

    report: StatusReport,

    /// Candidate accepted in the last tick, if any.
    output: Option<Vector3<f64>>,

    arch_candidates: Archiver,
}

/// Status report for one sampling attempt.
#[derive(Clone, Copy, Serialize, Debug, Default, PartialEq)]
pub struct StatusReport {
    /// Final axis values, before the z offset.
    ///
    /// Units: meters
    pub point_m: [f64; 3],

    /// Which axes were redrawn
    pub redrawn: [bool; 3],

    /// Squared norm of `point_m`
    ///
    /// Units: meters^2
    pub squared_norm_m2: f64,

    /// True if the point was inside the shell and emitted
    pub accepted: bool,
}

#[derive(Serialize)]
struct ArchRecord {
    time_s: f64,
    x_m: f64,
    y_m: f64,
    z_m: f64,
    squared_norm_m2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TargetSampler {
    fn default() -> Self {
        Self {
            params: Params::default(),
            rng: StdRng::from_entropy(),
            report: StatusReport::default(),
            output: None,
            arch_candidates: Archiver::default(),
        }
    }
}

impl State for TargetSampler {
    type InitData = &'static str;
    type InitError = TargetSamplerError;

    type InputData = ();
    type OutputData = Option<Vector3<f64>>;
    type StatusReport = StatusReport;
    type ProcError = TargetSamplerError;

    /// Initialise the TargetSampler module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data)?;

        *self = Self::new(params)?;

        self.arch_candidates = Archiver::from_path(session, "target_sampler/candidates.csv")?;

        Ok(())
    }

    /// Make one sampling attempt.
    fn proc(
        &mut self,
        _input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let dist = Uniform::new(-self.params.r_max_m, self.params.r_max_m);
        let rng = &mut self.rng;

        let (output, report) = sample_with(&self.params, || dist.sample(&mut *rng));

        match output {
            Some(c) => debug!("New random target {:?}", c.as_slice()),
            None => trace!(
                "Sample {:?} outside the shell (|p|^2 = {:.6})",
                report.point_m,
                report.squared_norm_m2
            ),
        }

        self.output = output;
        self.report = report;

        Ok((output, report))
    }
}

impl Archived for TargetSampler {
    /// Write the candidate from the last tick, if there was one.
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.output {
            Some(c) => self.arch_candidates.serialise(ArchRecord {
                time_s: session::get_elapsed_seconds(),
                x_m: c[0],
                y_m: c[1],
                z_m: c[2],
                squared_norm_m2: self.report.squared_norm_m2,
            }),
            None => Ok(()),
        }
    }
}

impl TargetSampler {
    /// Create a new sampler, seeded from the parameters if a seed is given.
    pub fn new(params: Params) -> Result<Self, TargetSamplerError> {
        params.validate()?;

        let rng = match params.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            params,
            rng,
            report: StatusReport::default(),
            output: None,
            arch_candidates: Archiver::default(),
        })
    }

    /// Get the sampler's parameters.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Make one sampling attempt using `draw` as the source of uniform values in
/// `[-r_max, r_max)`.
///
/// All three axes are drawn first, then each axis whose magnitude is not
/// greater than `r_min` is redrawn once, in x, y, z order. The redraw is kept
/// whatever its value. The point is returned, with the z offset added, only if
/// its squared norm lies strictly inside the shell shrunk by the tolerance.
pub fn sample_with<F>(params: &Params, mut draw: F) -> (Option<Vector3<f64>>, StatusReport)
where
    F: FnMut() -> f64,
{
    let mut report = StatusReport::default();

    for v in report.point_m.iter_mut() {
        *v = draw();
    }

    for (v, redrawn) in report.point_m.iter_mut().zip(report.redrawn.iter_mut()) {
        if v.abs() <= params.r_min_m {
            *v = draw();
            *redrawn = true;
        }
    }

    let point = Vector3::from(report.point_m);
    report.squared_norm_m2 = point.norm_squared();
    report.accepted = strictly_between(
        report.squared_norm_m2,
        params.min_squared_norm_m2(),
        params.max_squared_norm_m2(),
    );

    if report.accepted {
        (
            Some(point + Vector3::new(0.0, 0.0, params.z_offset_m)),
            report,
        )
    } else {
        (None, report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Build a draw function returning the given values in order.
    fn scripted(values: &[f64]) -> impl FnMut() -> f64 + '_ {
        let mut iter = values.iter();
        move || *iter.next().expect("Ran out of scripted draws")
    }

    #[test]
    fn test_redraws_small_axes() {
        let params = Params::default();

        let (out, rpt) = sample_with(&params, scripted(&[0.4, 0.0, 0.0, 0.1, 0.2]));

        assert_eq!(rpt.redrawn, [false, true, true]);
        assert_eq!(rpt.point_m, [0.4, 0.1, 0.2]);
        assert!(rpt.accepted);

        let out = out.unwrap();
        assert!((out - Vector3::new(0.4, 0.1, 0.4)).norm() < 1e-12);
    }

    #[test]
    fn test_redraw_is_not_validated() {
        let params = Params::default();

        // z redraws to another small value, which is kept
        let (out, rpt) = sample_with(&params, scripted(&[0.2, -0.3, 0.01, -0.02]));

        assert_eq!(rpt.redrawn, [false, false, true]);
        assert_eq!(rpt.point_m, [0.2, -0.3, -0.02]);
        assert!(rpt.accepted);
        assert!((out.unwrap()[2] - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_r_min_is_redrawn() {
        let params = Params::default();

        // Exactly r_min is not greater than r_min
        let (_, rpt) = sample_with(&params, scripted(&[0.03, -0.03, 0.3, 0.1, 0.1]));

        assert_eq!(rpt.redrawn, [true, true, false]);
        assert_eq!(rpt.point_m, [0.1, 0.1, 0.3]);
    }

    #[test]
    fn test_outside_shell_withheld() {
        let params = Params::default();

        // Corner of the draw cube is outside the outer sphere
        let (out, rpt) = sample_with(&params, scripted(&[0.5, -0.5, 0.5]));
        assert!(out.is_none());
        assert!(!rpt.accepted);
        assert!((rpt.squared_norm_m2 - 0.75).abs() < 1e-12);

        // Inside the inner sphere after a redraw to zero
        let (out, _) = sample_with(&params, scripted(&[0.035, 0.0, 0.0, 0.0, 0.0]));
        assert!(out.is_none());

        // Inside the outer sphere but within the tolerance of it
        let (out, _) = sample_with(&params, scripted(&[0.525, 0.0, 0.0, 0.0, 0.0]));
        assert!(out.is_none());
    }

    #[test]
    fn test_shell_membership() {
        let params = Params {
            seed: Some(7),
            ..Default::default()
        };
        let mut sampler = TargetSampler::new(params.clone()).unwrap();

        let mut num_accepted = 0;
        for _ in 0..10_000 {
            let (out, rpt) = sampler.proc(&()).unwrap();

            for v in rpt.point_m.iter() {
                assert!(*v >= -params.r_max_m && *v < params.r_max_m);
            }

            match out {
                Some(c) => {
                    num_accepted += 1;
                    let pre_offset = c - Vector3::new(0.0, 0.0, params.z_offset_m);
                    let n2 = pre_offset.norm_squared();

                    assert!(rpt.accepted);
                    assert!(n2 > params.min_squared_norm_m2() - 1e-12);
                    assert!(n2 < params.max_squared_norm_m2() + 1e-12);
                    assert!(strictly_between(
                        rpt.squared_norm_m2,
                        params.min_squared_norm_m2(),
                        params.max_squared_norm_m2()
                    ));
                }
                None => assert!(!rpt.accepted),
            }
        }

        // The sphere fills roughly half of the draw cube
        assert!(num_accepted > 3000 && num_accepted < 7000);
    }

    #[test]
    fn test_seeded_is_repeatable() {
        let params = Params {
            seed: Some(1234),
            ..Default::default()
        };

        let mut a = TargetSampler::new(params.clone()).unwrap();
        let mut b = TargetSampler::new(params).unwrap();

        for _ in 0..100 {
            assert_eq!(a.proc(&()).unwrap(), b.proc(&()).unwrap());
        }
    }

    #[test]
    fn test_new_uses_given_params() {
        let params = Params {
            r_min_m: 0.05,
            seed: Some(3),
            ..Default::default()
        };
        let mut sampler = TargetSampler::new(params.clone()).unwrap();

        assert_eq!(sampler.params().r_min_m, 0.05);

        // Nothing sampled yet so there is nothing to archive
        assert!(sampler.output.is_none());
        assert!(sampler.write().is_ok());

        // Same stream as a generator seeded directly
        let mut rng = StdRng::seed_from_u64(3);
        let dist = Uniform::new(-params.r_max_m, params.r_max_m);
        let (expected, _) = sample_with(&params, || dist.sample(&mut rng));
        assert_eq!(sampler.proc(&()).unwrap().0, expected);
    }

    #[test]
    fn test_invalid_params() {
        let params = Params {
            r_max_m: 0.02,
            ..Default::default()
        };

        assert!(matches!(
            TargetSampler::new(params),
            Err(TargetSamplerError::InvalidParams(_))
        ));
    }
}
