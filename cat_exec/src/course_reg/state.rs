//! Implementations for the CourseReg state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use serde::Serialize;

// Internal
use super::{
    bearing_error, is_valid_position, ConfigError, ControlConfig, ControlMode, CourseRegError,
    Params, PidController,
};
use crate::{
    geodesy::{self, Geodetic, GeometryError},
    units::Radians,
};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::lin_map,
    module::State,
    params, raise_error,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Course regulator module state
pub struct CourseReg {
    pub(crate) params: Params,

    pid: PidController,

    /// Loaded route as `[longitude, latitude]` pairs
    route: Vec<[f64; 2]>,

    goal: ActiveGoal,

    /// A goal change which has not yet been written to the settings document
    pending_goal_update: Option<ActiveGoal>,

    pub(crate) report: StatusReport,
    arch_report: Archiver,
}

/// The route waypoint currently being steered toward.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActiveGoal {
    pub index: usize,
    pub lat_deg: f64,
    pub lon_deg: f64,
}

/// Input data to the course regulator.
#[derive(Debug, Clone, Copy)]
pub struct InputData {
    /// Control configuration for this cycle
    pub config: ControlConfig,

    /// Current position of the vehicle
    pub position: Geodetic,

    /// Current heading of the vehicle, counter-clockwise from east
    pub heading: Radians,

    /// Time since the previous cycle.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Output of the course regulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OutputData {
    /// Steering command.
    ///
    /// Units: radians
    pub steering: Radians,
}

/// Status report for CourseReg processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    pub goal_index: usize,
    pub distance_to_goal_m: Option<f64>,
    pub commanded_course_deg: Option<f64>,
    pub vehicle_course_deg: f64,
    pub course_error_deg: Option<f64>,
    pub course_error_abs_deg: Option<f64>,
    pub pid_used: bool,
    pub goal_advanced: bool,
    pub steering_rad: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for CourseReg {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl State for CourseReg {
    const NAME: &'static str = "CourseReg";

    type InitData = &'static str;
    type InitError = CourseRegError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = CourseRegError;

    /// Initialise the CourseReg module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(CourseRegError::ParamLoad)?;
        self.pid = PidController::from_params(&params);
        self.params = params;

        self.arch_report = Archiver::from_path(session, "course_reg/status_report.csv")
            .map_err(CourseRegError::Archive)?;

        Ok(())
    }

    /// Compute the steering command for this cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport {
            goal_index: self.goal.index,
            vehicle_course_deg: input_data.heading.to_compass().0,
            ..Default::default()
        };

        // Modes which don't regulate the course
        let target = match input_data.config.mode {
            ControlMode::ManualRudder(r) => return Ok(self.finish(self.manual_steering(r))),
            ControlMode::FixedCourse(_) => None,
            ControlMode::FixedLocation(loc) => Some(loc),
            ControlMode::Route | ControlMode::Off => {
                if self.route.is_empty() {
                    return Err(ConfigError::NoRoute.into());
                }
                Some(Geodetic::new(self.goal.lat_deg, self.goal.lon_deg, 0.0))
            }
        };

        // Distance and bearing to the target. Coincident points have no bearing but still count
        // as reaching the target.
        let mut geometry_error = None;
        let mut bearing_to_target = None;
        if let Some(t) = target {
            match geodesy::inverse(&input_data.position, &t) {
                Ok(inv) => {
                    self.report.distance_to_goal_m = Some(inv.distance_m);
                    bearing_to_target = Some(inv.initial_bearing);
                }
                Err(GeometryError::CoincidentPoints) => {
                    self.report.distance_to_goal_m = Some(0.0);
                    geometry_error = Some(GeometryError::CoincidentPoints);
                }
                Err(e) => return Err(e.into()),
            }
        }

        let az = match input_data.config.mode {
            ControlMode::FixedCourse(c) => Some(c),
            _ => bearing_to_target,
        };

        let steering = match az {
            Some(az) => {
                let err = bearing_error(az, input_data.heading.to_compass())?;
                self.report.commanded_course_deg = Some(az.0);
                self.report.course_error_deg = Some(err.signed.0);
                self.report.course_error_abs_deg = Some(err.magnitude.0);
                self.report.pid_used = true;

                Some(Radians(self.pid.get(err.signed.0, input_data.dt_s)))
            }
            None => None,
        };

        if input_data.config.mode == ControlMode::Route {
            if let Some(d) = self.report.distance_to_goal_m {
                self.report.goal_advanced = self.advance_goal(d);
            }
        }

        match (steering, geometry_error) {
            (Some(s), None) => Ok(self.finish(s)),
            (_, Some(e)) => Err(e.into()),
            (None, None) => Err(GeometryError::NonFinite("commanded course").into()),
        }
    }
}

impl Archived for CourseReg {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl CourseReg {
    /// Create a new regulator with no route loaded.
    pub fn new(params: Params) -> Self {
        Self {
            pid: PidController::from_params(&params),
            params,
            route: Vec::new(),
            goal: ActiveGoal::default(),
            pending_goal_update: None,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// The current route goal.
    pub fn goal(&self) -> ActiveGoal {
        self.goal
    }

    /// The loaded route as `[longitude, latitude]` pairs.
    pub fn route(&self) -> &[[f64; 2]] {
        &self.route
    }

    /// Bring the regulator's route in line with the route document.
    ///
    /// If the route coordinates have changed the route is reloaded and the goal index taken from
    /// the settings. Otherwise an externally changed goal index is adopted, unless the regulator
    /// has its own goal change waiting to be written.
    pub fn sync_route(
        &mut self,
        coordinates: &[[f64; 2]],
        settings_goal_index: usize,
    ) -> Result<(), ConfigError> {
        if coordinates.is_empty() {
            return Err(ConfigError::EmptyRoute);
        }
        if let Some(i) = coordinates
            .iter()
            .position(|c| !is_valid_position(c[1], c[0]))
        {
            return Err(ConfigError::InvalidWaypoint(i));
        }

        if coordinates != self.route.as_slice() {
            self.route = coordinates.to_vec();
            self.pending_goal_update = None;

            if settings_goal_index < self.route.len() {
                self.set_goal(settings_goal_index);
            } else {
                warn!(
                    "Goal index {} is outside the {} waypoint route, restarting from waypoint 0",
                    settings_goal_index,
                    self.route.len()
                );
                self.set_goal(0);
                self.pending_goal_update = Some(self.goal);
            }

            info!(
                "Route loaded with {} waypoints, goal {} at ({:.6}, {:.6})",
                self.route.len(),
                self.goal.index,
                self.goal.lat_deg,
                self.goal.lon_deg
            );
        } else if self.pending_goal_update.is_none() && settings_goal_index != self.goal.index {
            if settings_goal_index < self.route.len() {
                info!("Goal index changed externally to {}", settings_goal_index);
                self.set_goal(settings_goal_index);
            } else {
                warn!(
                    "Ignoring external goal index {}, the route has {} waypoints",
                    settings_goal_index,
                    self.route.len()
                );
            }
        }

        Ok(())
    }

    /// The goal change waiting to be written to the settings document, if any.
    pub fn pending_goal_update(&self) -> Option<ActiveGoal> {
        self.pending_goal_update
    }

    /// Mark a goal change as written. A newer pending change is kept.
    pub fn goal_update_persisted(&mut self, goal: &ActiveGoal) {
        if self.pending_goal_update.as_ref() == Some(goal) {
            self.pending_goal_update = None;
        }
    }

    /// Manual rudder steering from the raw reference.
    fn manual_steering(&self, reference: u64) -> Radians {
        let p = &self.params;
        let s = lin_map(
            (
                p.rudder_ref_centre - p.rudder_ref_half_span,
                p.rudder_ref_centre + p.rudder_ref_half_span,
            ),
            (-p.rudder_max_rad, p.rudder_max_rad),
            reference as f64,
        );

        Radians(s.max(-p.rudder_max_rad).min(p.rudder_max_rad))
    }

    /// Move to the next waypoint if the current one has been reached. Once the goal is the last
    /// waypoint the route starts again from the first on the next update.
    ///
    /// Returns true if the goal changed.
    fn advance_goal(&mut self, distance_m: f64) -> bool {
        let prev = self.goal.index;

        if prev + 1 >= self.route.len() {
            if prev == 0 {
                return false;
            }

            self.set_goal(0);
            self.pending_goal_update = Some(self.goal);
            info!(
                "End of route, looping back to goal 0 at ({:.6}, {:.6})",
                self.goal.lat_deg, self.goal.lon_deg
            );
            return true;
        }

        if distance_m >= self.params.capture_radius_m {
            return false;
        }

        self.set_goal(prev + 1);
        self.pending_goal_update = Some(self.goal);

        info!(
            "Waypoint {} reached ({:.2} m), new goal {} at ({:.6}, {:.6})",
            prev, distance_m, self.goal.index, self.goal.lat_deg, self.goal.lon_deg
        );

        true
    }

    fn set_goal(&mut self, index: usize) {
        let wp = match self.route.get(index) {
            Some(wp) => wp,
            None => raise_error!(
                "Goal index {} outside route of {} waypoints",
                index,
                self.route.len()
            ),
        };

        self.goal = ActiveGoal {
            index,
            lat_deg: wp[1],
            lon_deg: wp[0],
        };

        debug!("Goal set to {:?}", self.goal);
    }

    fn finish(&mut self, steering: Radians) -> (OutputData, StatusReport) {
        self.report.steering_rad = steering.0;
        self.report.goal_index = self.goal.index;

        trace!("CourseReg output: {}, report: {:?}", steering, self.report);

        (OutputData { steering }, self.report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::units::Degrees;
    use std::f64::consts::FRAC_PI_2;

    const ROUTE: [[f64; 2]; 3] = [
        [11.924482585745864, 57.5726428059939],
        [11.930000000000000, 57.5750000000000],
        [11.935000000000000, 57.5720000000000],
    ];

    fn config(mode: ControlMode) -> ControlConfig {
        ControlConfig {
            mode,
            dark_mode: false,
            goal_index: 0,
        }
    }

    fn input(mode: ControlMode, lat: f64, lon: f64, heading: f64) -> InputData {
        InputData {
            config: config(mode),
            position: Geodetic::new(lat, lon, 0.0),
            heading: Radians(heading),
            dt_s: 0.2,
        }
    }

    fn route_reg(goal_index: usize) -> CourseReg {
        let mut reg = CourseReg::default();
        reg.sync_route(&ROUTE, goal_index).unwrap();
        reg
    }

    #[test]
    fn test_advance_within_capture_radius() {
        let mut reg = route_reg(0);

        // ~1 m north of waypoint 0
        let i = input(ControlMode::Route, ROUTE[0][1] + 0.00001, ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(report.goal_advanced);
        assert_eq!(reg.goal().index, 1);
        assert_eq!(reg.goal().lat_deg, ROUTE[1][1]);
        assert_eq!(reg.goal().lon_deg, ROUTE[1][0]);
        assert_eq!(reg.pending_goal_update(), Some(reg.goal()));

        let persisted = reg.goal();
        reg.goal_update_persisted(&persisted);
        assert_eq!(reg.pending_goal_update(), None);
    }

    #[test]
    fn test_no_advance_outside_capture_radius() {
        let mut reg = route_reg(0);

        // ~100 m north of waypoint 0
        let i = input(ControlMode::Route, ROUTE[0][1] + 0.0009, ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(!report.goal_advanced);
        assert!(report.distance_to_goal_m.unwrap() > 90.0);
        assert_eq!(reg.goal().index, 0);
        assert_eq!(reg.pending_goal_update(), None);
    }

    #[test]
    fn test_loop_back_after_last_waypoint() {
        let mut reg = route_reg(2);
        assert_eq!(reg.goal().index, 2);

        // Far from every waypoint, the reset doesn't depend on the distance
        let i = input(ControlMode::Route, ROUTE[0][1] - 0.01, ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(report.goal_advanced);
        assert_eq!(reg.goal().index, 0);
        assert_eq!(reg.goal().lat_deg, ROUTE[0][1]);
        assert_eq!(reg.goal().lon_deg, ROUTE[0][0]);
        assert_eq!(reg.pending_goal_update(), Some(reg.goal()));
    }

    #[test]
    fn test_no_loop_back_outside_route_mode() {
        let mut reg = route_reg(2);

        let i = input(ControlMode::FixedCourse(Degrees(90.0)), ROUTE[0][1], ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(!report.goal_advanced);
        assert_eq!(reg.goal().index, 2);
        assert_eq!(reg.pending_goal_update(), None);
    }

    #[test]
    fn test_single_waypoint_route_holds_goal() {
        let mut reg = CourseReg::default();
        reg.sync_route(&ROUTE[..1], 0).unwrap();

        let i = input(ControlMode::Route, ROUTE[0][1] + 0.00001, ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(!report.goal_advanced);
        assert_eq!(reg.goal().index, 0);
    }

    #[test]
    fn test_coincident_with_goal() {
        let mut reg = route_reg(1);

        let i = input(ControlMode::Route, ROUTE[1][1], ROUTE[1][0], 0.0);
        match reg.proc(&i) {
            Err(CourseRegError::Geometry(GeometryError::CoincidentPoints)) => (),
            r => panic!("Expected coincident points error, got {:?}", r.map(|o| o.0)),
        }

        // The waypoint still counts as reached
        assert_eq!(reg.goal().index, 2);
    }

    #[test]
    fn test_manual_rudder() {
        let mut reg = CourseReg::default();

        let (out, report) = reg.proc(&input(ControlMode::ManualRudder(512), 0.0, 0.0, 0.0)).unwrap();
        assert!(out.steering.0.abs() < 1e-12);
        assert!(!report.pid_used);

        let (out, _) = reg.proc(&input(ControlMode::ManualRudder(0), 0.0, 0.0, 0.0)).unwrap();
        assert!((out.steering.0 + std::f64::consts::FRAC_PI_4).abs() < 1e-12);

        let (out, _) = reg.proc(&input(ControlMode::ManualRudder(1023), 0.0, 0.0, 0.0)).unwrap();
        assert!(out.steering.0 > 0.78 && out.steering.0 <= std::f64::consts::FRAC_PI_4);
    }

    #[test]
    fn test_off_steers_to_goal_without_advancing() {
        let mut reg = route_reg(0);

        // Heading east, ~100 m south of waypoint 0, so the goal is due north
        let i = input(ControlMode::Off, ROUTE[0][1] - 0.0009, ROUTE[0][0], 0.0);
        let (out, report) = reg.proc(&i).unwrap();

        assert!(report.pid_used);
        let az = report.commanded_course_deg.unwrap();
        assert!(az < 1.0 || az > 359.0);
        assert!((report.course_error_deg.unwrap() - 90.0).abs() < 1.0);
        assert_eq!(out.steering, Radians(-0.9));

        // Within the capture radius the goal is still held
        let i = input(ControlMode::Off, ROUTE[0][1] + 0.00001, ROUTE[0][0], 0.0);
        let (_, report) = reg.proc(&i).unwrap();

        assert!(!report.goal_advanced);
        assert_eq!(reg.goal().index, 0);
        assert_eq!(reg.pending_goal_update(), None);
    }

    #[test]
    fn test_off_without_route() {
        let mut reg = CourseReg::default();

        assert!(matches!(
            reg.proc(&input(ControlMode::Off, 0.0, 0.0, 1.0)),
            Err(CourseRegError::Config(ConfigError::NoRoute))
        ));
    }

    #[test]
    fn test_fixed_course() {
        let mut reg = CourseReg::default();

        // Heading north (yaw pi/2), commanded course 100, error -100 saturates the PID
        let i = input(ControlMode::FixedCourse(Degrees(100.0)), 0.0, 0.0, FRAC_PI_2);
        let (out, report) = reg.proc(&i).unwrap();
        assert!((report.course_error_deg.unwrap() + 100.0).abs() < 1e-9);
        assert_eq!(out.steering, Radians(0.9));

        // Heading 90 (yaw 0), commanded course 100
        let i = input(ControlMode::FixedCourse(Degrees(100.0)), 0.0, 0.0, 0.0);
        let (out, _) = reg.proc(&i).unwrap();
        assert!((out.steering.0 - 0.5).abs() < 1e-9);

        // No route is needed
        assert!(reg.route().is_empty());
    }

    #[test]
    fn test_fixed_location_keeps_route_goal() {
        let mut reg = route_reg(1);

        // Vehicle on the equator heading east, target due north
        let target = Geodetic::new(0.01, 0.0, 0.0);
        let i = input(ControlMode::FixedLocation(target), 0.0, 0.0, 0.0);
        let (out, report) = reg.proc(&i).unwrap();

        assert!(report.commanded_course_deg.unwrap().abs() < 1e-9);
        assert!((report.course_error_deg.unwrap() - 90.0).abs() < 1e-9);
        assert_eq!(out.steering, Radians(-0.9));

        // Reaching the fixed location does not touch the route
        let i = input(ControlMode::FixedLocation(target), 0.01, 0.00001, 0.0);
        reg.proc(&i).unwrap();
        assert_eq!(reg.goal().index, 1);
        assert_eq!(reg.pending_goal_update(), None);
    }

    #[test]
    fn test_route_mode_without_route() {
        let mut reg = CourseReg::default();

        assert!(matches!(
            reg.proc(&input(ControlMode::Route, 0.0, 0.0, 0.0)),
            Err(CourseRegError::Config(ConfigError::NoRoute))
        ));
    }

    #[test]
    fn test_sync_route() {
        let mut reg = CourseReg::default();

        assert_eq!(reg.sync_route(&[], 0), Err(ConfigError::EmptyRoute));
        assert_eq!(
            reg.sync_route(&[[0.0, 0.0], [0.0, 91.0]], 0),
            Err(ConfigError::InvalidWaypoint(1))
        );

        // Out of range index on load falls back to 0 and must be written back
        reg.sync_route(&ROUTE, 7).unwrap();
        assert_eq!(reg.goal().index, 0);
        assert_eq!(reg.pending_goal_update(), Some(reg.goal()));

        // While the write is pending the stale settings index is not adopted
        reg.sync_route(&ROUTE, 7).unwrap();
        assert_eq!(reg.goal().index, 0);

        let goal = reg.goal();
        reg.goal_update_persisted(&goal);

        // External change of the goal index
        reg.sync_route(&ROUTE, 2).unwrap();
        assert_eq!(reg.goal().index, 2);
        assert_eq!(reg.goal().lat_deg, ROUTE[2][1]);

        // New route reloads the goal from the settings
        let new_route = [ROUTE[2], ROUTE[1]];
        reg.sync_route(&new_route, 1).unwrap();
        assert_eq!(reg.route().len(), 2);
        assert_eq!(reg.goal().index, 1);
        assert_eq!(reg.goal().lon_deg, ROUTE[1][0]);
    }
}
