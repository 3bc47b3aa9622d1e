//! Implementations for the VehicleModel state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, trace};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// Internal
use super::{Params, VehicleError};
use crate::{
    geodesy::{enu_to_geodetic, Geodetic, GeometryError},
    units::Radians,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Vehicle model state
pub struct VehicleModel {
    pub(crate) params: Params,

    state: VehicleState,
    arch_state: Archiver,

    /// Slip angle from the last step
    beta: Radians,

    /// Longitudinal acceleration.
    ///
    /// Units: meters/second^2
    acceleration_ms2: f64,

    /// Velocity subtracted from the vehicle's velocity each step.
    ///
    /// Units: meters/second, Frame: local ENU
    disturbance_ms: Vector2<f64>,

    /// Geodetic origin of the local frame
    reference: Geodetic,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// Kinematic state of the vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VehicleState {
    /// Position east of the reference origin.
    ///
    /// Units: meters
    pub x_m: f64,

    /// Position north of the reference origin.
    ///
    /// Units: meters
    pub y_m: f64,

    /// Units: meters/second
    pub speed_ms: f64,

    /// Yaw, counter-clockwise from east, in [0, 2pi)
    pub heading: Radians,
}

/// Data required to initialise the vehicle model.
#[derive(Debug, Clone, Copy)]
pub struct InitData {
    /// Path to the parameter file, relative to the params directory
    pub params_path: &'static str,

    /// Geodetic origin of the local frame
    pub reference: Geodetic,
}

/// Input data to the vehicle model.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Steering command.
    ///
    /// Units: radians
    pub steering: Radians,

    /// Integration timestep.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Status report for VehicleModel processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub beta_rad: f64,
    pub vx_ms: f64,
    pub vy_ms: f64,
    pub heading_rate_rads: f64,
    pub speed_rate_ms2: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl VehicleState {
    pub fn is_finite(&self) -> bool {
        self.x_m.is_finite()
            && self.y_m.is_finite()
            && self.speed_ms.is_finite()
            && self.heading.is_finite()
    }
}

impl Default for VehicleModel {
    fn default() -> Self {
        Self::new(Params::default(), Geodetic::default())
    }
}

impl State for VehicleModel {
    const NAME: &'static str = "VehicleModel";

    type InitData = InitData;
    type InitError = VehicleError;

    type InputData = InputData;
    type OutputData = VehicleState;
    type StatusReport = StatusReport;
    type ProcError = VehicleError;

    /// Initialise the VehicleModel module.
    ///
    /// Loads the parameters, resets the state to the initial state and sets the reference origin.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data.params_path).map_err(VehicleError::ParamLoad)?;

        // Check the origin converts before accepting it
        enu_to_geodetic(0.0, 0.0, 0.0, &init_data.reference).map_err(VehicleError::Reference)?;

        *self = Self::new(params, init_data.reference);

        self.arch_state =
            Archiver::from_path(session, "vehicle/state.csv").map_err(VehicleError::Archive)?;
        self.arch_report = Archiver::from_path(session, "vehicle/status_report.csv")
            .map_err(VehicleError::Archive)?;

        info!(
            "Vehicle initialised at {:?}, reference origin ({:.6}, {:.6})",
            self.state, self.reference.lat.0, self.reference.lon.0
        );

        Ok(())
    }

    /// Integrate the model by one timestep.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let state = self.step(input_data.steering, self.disturbance_ms, input_data.dt_s)?;

        trace!("VehicleModel state: {:?}", state);

        Ok((state, self.report))
    }
}

impl Archived for VehicleModel {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_state.serialise(self.state)?;
        self.arch_report.serialise(self.report)
    }
}

impl VehicleModel {
    /// Create a new model in its initial state.
    pub fn new(params: Params, reference: Geodetic) -> Self {
        Self {
            state: VehicleState {
                x_m: params.init_x_m,
                y_m: params.init_y_m,
                speed_ms: params.init_speed_ms,
                heading: Radians(params.init_heading_rad).wrapped(),
            },
            arch_state: Archiver::default(),
            beta: Radians(0.0),
            acceleration_ms2: params.acceleration_ms2,
            disturbance_ms: Vector2::new(params.disturbance_ms[0], params.disturbance_ms[1]),
            reference,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
            params,
        }
    }

    pub fn state(&self) -> VehicleState {
        self.state
    }

    /// Slip angle from the last step.
    pub fn beta(&self) -> Radians {
        self.beta
    }

    pub fn reference(&self) -> Geodetic {
        self.reference
    }

    pub fn set_acceleration(&mut self, acceleration_ms2: f64) {
        self.acceleration_ms2 = acceleration_ms2;
    }

    pub fn set_disturbance(&mut self, disturbance_ms: Vector2<f64>) {
        self.disturbance_ms = disturbance_ms;
    }

    /// Advance the state by `dt_s` under the given steering command and disturbance.
    ///
    /// If the resulting state is not finite the state is left as it was and an error returned.
    pub fn step(
        &mut self,
        heading_command: Radians,
        disturbance_ms: Vector2<f64>,
        dt_s: f64,
    ) -> Result<VehicleState, VehicleError> {
        let lr = self.params.lr_m;
        let lf = self.params.lf_m;
        let s = self.state;

        let beta = (heading_command.0.tan() * lr / (lr + lf)).atan();

        let vx = s.speed_ms * (s.heading.0 + beta).cos() - disturbance_ms.x;
        let vy = s.speed_ms * (s.heading.0 + beta).sin() - disturbance_ms.y;
        let heading_rate = -(s.speed_ms / lr) * beta.sin();
        let speed_rate = self.acceleration_ms2;

        let next = VehicleState {
            x_m: s.x_m + vx * dt_s,
            y_m: s.y_m + vy * dt_s,
            speed_ms: s.speed_ms + speed_rate * dt_s,
            heading: Radians(s.heading.0 + heading_rate * dt_s).wrapped(),
        };

        if !next.is_finite() {
            return Err(VehicleError::NonFinite(next));
        }

        self.state = next;
        self.beta = Radians(beta);
        self.report = StatusReport {
            beta_rad: beta,
            vx_ms: vx,
            vy_ms: vy,
            heading_rate_rads: heading_rate,
            speed_rate_ms2: speed_rate,
        };

        Ok(next)
    }

    /// Geodetic position of the vehicle.
    pub fn to_geodetic(&self) -> Result<Geodetic, GeometryError> {
        enu_to_geodetic(self.state.x_m, self.state.y_m, 0.0, &self.reference)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};

    fn model() -> VehicleModel {
        VehicleModel::new(
            Params::default(),
            Geodetic::new(57.5726428059939, 11.924482585745864, 0.0),
        )
    }

    #[test]
    fn test_initial_state() {
        let m = model();
        assert_eq!(
            m.state(),
            VehicleState {
                x_m: 0.0,
                y_m: 0.0,
                speed_ms: 10.0,
                heading: Radians(0.0)
            }
        );
    }

    #[test]
    fn test_straight_step() {
        let mut m = model();
        let s = m
            .proc(&InputData {
                steering: Radians(0.0),
                dt_s: 0.2,
            })
            .unwrap()
            .0;

        assert!((s.x_m - 2.0).abs() < 1e-12);
        assert!(s.y_m.abs() < 1e-12);
        assert_eq!(s.speed_ms, 10.0);
        assert_eq!(s.heading, Radians(0.0));
    }

    #[test]
    fn test_positive_steering_turns_clockwise() {
        let mut m = model();
        let s = m.step(Radians(0.5), Vector2::zeros(), 0.2).unwrap();

        let beta = (0.5f64.tan() * 0.5).atan();
        assert!((m.beta().0 - beta).abs() < 1e-12);

        // Heading decreases and wraps below zero
        assert!((s.heading.0 - (TAU - beta.sin() * 0.2)).abs() < 1e-12);
        // Velocity is rotated by the slip angle
        assert!(s.y_m > 0.0);
        assert!((s.x_m - 2.0 * beta.cos()).abs() < 1e-12);
    }

    #[test]
    fn test_heading_stays_wrapped() {
        let mut m = model();
        for _ in 0..500 {
            let s = m.step(Radians(-0.7), Vector2::zeros(), 0.2).unwrap();
            assert!(s.heading.0 >= 0.0 && s.heading.0 < TAU);
        }
    }

    #[test]
    fn test_acceleration_and_disturbance() {
        let mut m = model();
        m.set_acceleration(1.0);
        let s = m.step(Radians(0.0), Vector2::new(1.0, -0.5), 0.2).unwrap();

        assert!((s.x_m - 1.8).abs() < 1e-12);
        assert!((s.y_m - 0.1).abs() < 1e-12);
        assert!((s.speed_ms - 10.2).abs() < 1e-12);

        // The configured disturbance is used by proc
        let mut m = model();
        m.set_disturbance(Vector2::new(0.0, 10.0));
        let s = m
            .proc(&InputData {
                steering: Radians(0.0),
                dt_s: 1.0,
            })
            .unwrap()
            .0;
        assert!((s.y_m + 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_non_finite_does_not_mutate() {
        let mut m = model();
        m.step(Radians(0.1), Vector2::zeros(), 0.2).unwrap();
        let before = m.state();

        assert!(matches!(
            m.step(Radians(f64::NAN), Vector2::zeros(), 0.2),
            Err(VehicleError::NonFinite(_))
        ));
        assert!(m.step(Radians(0.0), Vector2::zeros(), f64::INFINITY).is_err());
        assert!(m
            .step(Radians(0.0), Vector2::new(f64::NAN, 0.0), 0.2)
            .is_err());

        assert_eq!(m.state(), before);
    }

    #[test]
    fn test_to_geodetic() {
        let mut m = model();
        let origin = m.to_geodetic().unwrap();
        assert!((origin.lat.0 - m.reference().lat.0).abs() < 1e-10);
        assert!((origin.lon.0 - m.reference().lon.0).abs() < 1e-10);

        // Head north for 100 m
        m = VehicleModel::new(
            Params {
                init_heading_rad: PI / 2.0,
                ..Default::default()
            },
            m.reference(),
        );
        for _ in 0..50 {
            m.step(Radians(0.0), Vector2::zeros(), 0.2).unwrap();
        }
        let g = m.to_geodetic().unwrap();
        assert!(g.lat.0 > origin.lat.0 + 0.0008);
        assert!((g.lon.0 - origin.lon.0).abs() < 1e-8);
    }
}
