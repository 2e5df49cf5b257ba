use crate::algorithms::angle::{angle_between, normalize_angle};
use crate::algorithms::pose_estimator::{DeadReckoning, PoseEstimator};
use crate::config::DrawConfig;
use crate::messages::{
    CmdVel, Kill, KillRequest, PenStyle, SetPen, SetPenRequest, Spawn, SpawnRequest, TurtleState,
};
use serde::Serialize;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::time::Duration;
use turtle_core::scheduling::{Clock, EventPump};
use turtle_core::{LogSummary, NodeInfo, Publisher, ServiceClient, ServiceType, TurtleResult};

/// Everything the controller talks to
pub struct DrawHandles {
    /// Velocity commands (`/turtle1/cmd_vel`)
    pub cmd_vel: Box<dyn Publisher<CmdVel>>,
    pub pen: Box<dyn ServiceClient<SetPen>>,
    pub spawn: Box<dyn ServiceClient<Spawn>>,
    pub kill: Box<dyn ServiceClient<Kill>>,
    /// Yielded to once per emitted command
    pub pump: Box<dyn EventPump>,
    /// Times straight moves
    pub clock: Arc<dyn Clock>,
}

/// Counters describing what the controller has done
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawStats {
    pub rotations: u64,
    pub straight_moves: u64,
    pub lines: u64,
    pub arcs: u64,
    pub skipped_circles: u64,
    pub rejected_inputs: u64,
    pub commands_published: u64,
    pub service_requests: u64,
}

/// Turtle Draw Node - open-loop kinematic drawing controller
///
/// Drives a turtle through pen toggles, straight segments and circular arcs
/// by publishing velocity commands. It never observes the turtle; its pose
/// is a dead-reckoned estimate that the compound operations snap to their
/// commanded endpoints.
///
/// Every control loop publishes one command and then yields to the event
/// pump, so the node must be driven from the thread that owns the pump
/// rather than being ticked by a scheduler.
pub struct TurtleDrawNode {
    handles: DrawHandles,
    config: DrawConfig,
    estimator: Box<dyn PoseEstimator>,
    state: TurtleState,
    stats: DrawStats,
    ctx: NodeInfo,
}

impl TurtleDrawNode {
    /// Create a controller at (0, 0) facing +x with the pen down
    pub fn new(handles: DrawHandles, config: DrawConfig) -> TurtleResult<Self> {
        config.validate()?;
        let mut ctx = NodeInfo::new("turtle_draw", true);
        ctx.initialize()?;

        Ok(Self {
            handles,
            config,
            estimator: Box::new(DeadReckoning::new()),
            state: TurtleState::default(),
            stats: DrawStats::default(),
            ctx,
        })
    }

    /// Replace the pose estimator
    pub fn with_estimator(mut self, estimator: Box<dyn PoseEstimator>) -> Self {
        self.ctx
            .log_debug(&format!("using pose estimator '{}'", estimator.name()));
        self.estimator = estimator;
        self
    }

    pub fn state(&self) -> &TurtleState {
        &self.state
    }

    pub fn stats(&self) -> &DrawStats {
        &self.stats
    }

    pub fn config(&self) -> &DrawConfig {
        &self.config
    }

    pub fn context(&self) -> &NodeInfo {
        &self.ctx
    }

    /// Set the pen style and whether it is lifted.
    ///
    /// Blocks until the pen service is available. The local pen state
    /// changes before the request is sent and the response is never awaited.
    pub fn set_pen(&mut self, style: PenStyle, off: bool) {
        wait_for_service(
            &*self.handles.pen,
            &mut *self.handles.pump,
            &self.ctx,
            self.config.service_wait_duration(),
            "pen",
        );

        let request = SetPenRequest::new(style, off);
        self.state.set_pen_down(!off);
        self.ctx.log_pub(self.handles.pen.service_name(), &request);
        self.handles.pen.call_async(request).detach();
        self.stats.service_requests += 1;
    }

    /// Lift the pen using the configured style
    pub fn pen_up(&mut self) {
        self.set_pen(self.config.pen, true);
    }

    /// Lower the pen using the configured style
    pub fn pen_down(&mut self) {
        self.set_pen(self.config.pen, false);
    }

    /// Turn in place by `delta` radians along the shorter direction.
    pub fn rotate_in_place(&mut self, delta: f64) {
        if !delta.is_finite() {
            self.reject(&format!("rotation by {} rad", delta));
            return;
        }

        let target = normalize_angle(self.state.heading() + delta);
        let direction = if angle_between(self.state.heading(), target) < 0.0 {
            -1.0
        } else {
            1.0
        };
        let cmd = CmdVel::turn(direction * self.config.rotate_speed);
        let period = self.config.control_period;

        while angle_between(self.state.heading(), target).abs() > self.config.heading_tolerance {
            self.publish(cmd);
            self.handles.pump.spin_once();
            self.estimator.integrate(&mut self.state, &cmd, period);
        }

        self.publish(CmdVel::zero());
        self.stats.rotations += 1;
    }

    /// Drive forward at `speed` for as long as covering `distance` takes.
    ///
    /// The position estimate is not touched; callers snap it afterwards.
    pub fn move_straight(&mut self, distance: f64, speed: f64) {
        if !(distance.is_finite() && distance >= 0.0) {
            self.reject(&format!("straight move of {} m", distance));
            return;
        }
        if !valid_speed(speed) {
            self.reject(&format!("straight move at {} m/s", speed));
            return;
        }

        let duration = distance / speed;
        let cmd = CmdVel::forward(speed);
        let period = self.config.control_period;
        let start = self.handles.clock.now();

        while elapsed_secs(&*self.handles.clock, start) < duration {
            self.publish(cmd);
            self.handles.pump.spin_once();
            self.estimator.integrate(&mut self.state, &cmd, period);
        }

        self.publish(CmdVel::zero());
        self.stats.straight_moves += 1;
    }

    /// Face `(x, y)`, drive there and take it as the new position
    pub fn draw_line(&mut self, x: f64, y: f64, speed: f64) {
        if !(x.is_finite() && y.is_finite()) {
            self.reject(&format!("line to ({}, {})", x, y));
            return;
        }
        if !valid_speed(speed) {
            self.reject(&format!("line at {} m/s", speed));
            return;
        }

        let dx = x - self.state.x();
        let dy = y - self.state.y();
        let distance = dx.hypot(dy);
        let turning = angle_between(self.state.heading(), dy.atan2(dx));

        if turning.abs() > self.config.turn_epsilon {
            self.rotate_in_place(turning);
        }
        self.move_straight(distance, speed);

        self.state.set_position(x, y);
        self.stats.lines += 1;
    }

    /// Drive one full circle of `radius` around `(center_x, center_y)`.
    ///
    /// The turtle must already be on the circumference. Otherwise nothing is
    /// drawn and the call only logs.
    pub fn draw_circle(&mut self, center_x: f64, center_y: f64, radius: f64, speed: f64) {
        if !(center_x.is_finite() && center_y.is_finite()) {
            self.reject(&format!("circle around ({}, {})", center_x, center_y));
            return;
        }
        if !(radius.is_finite() && radius > 0.0) {
            self.reject(&format!("circle of radius {}", radius));
            return;
        }
        if !valid_speed(speed) {
            self.reject(&format!("circle at {} m/s", speed));
            return;
        }

        let dx = center_x - self.state.x();
        let dy = center_y - self.state.y();
        if (dx.hypot(dy) - radius).abs() >= self.config.circumference_tolerance {
            self.ctx
                .log_info("Not starting at the circumference. Adjusting position...");
            self.stats.skipped_circles += 1;
            return;
        }

        let to_center = dy.atan2(dx);
        let face_center = angle_between(self.state.heading(), to_center);
        if face_center.abs() > self.config.turn_epsilon {
            self.rotate_in_place(face_center);
        }

        // Quarter turn clockwise puts the center on the left
        let tangent_turn = (-dx).atan2(dy) - to_center;
        if tangent_turn.abs() > self.config.turn_epsilon {
            self.rotate_in_place(tangent_turn);
        }

        let angular = speed / radius;
        let cmd = CmdVel::new(speed, angular);
        let period = self.config.control_period;
        let mut swept = 0.0_f64;

        // Ends once the estimated heading has come all the way around
        while swept.abs() < TAU {
            self.publish(cmd);
            self.handles.pump.spin_once();
            let before = self.state.heading();
            self.estimator.integrate(&mut self.state, &cmd, period);
            swept += angle_between(before, self.state.heading());
        }

        self.publish(CmdVel::zero());

        let heading = self.state.heading();
        self.state.set_position(
            center_x + radius * heading.cos(),
            center_y + radius * heading.sin(),
        );
        self.stats.arcs += 1;
    }

    /// Travel to `(x, y)` with the pen lifted, then lower it
    pub fn move_turtle(&mut self, x: f64, y: f64, speed: f64) {
        self.pen_up();
        self.draw_line(x, y, speed);
        self.pen_down();
    }

    /// Turn in place to an absolute heading
    pub fn face_heading(&mut self, heading: f64) {
        if !heading.is_finite() {
            self.reject(&format!("heading {}", heading));
            return;
        }
        let delta = angle_between(self.state.heading(), heading);
        self.rotate_in_place(delta);
    }

    /// Ask the simulator for another turtle; an empty name lets it choose
    pub fn spawn(&mut self, x: f64, y: f64, theta: f64, name: &str) {
        wait_for_service(
            &*self.handles.spawn,
            &mut *self.handles.pump,
            &self.ctx,
            self.config.service_wait_duration(),
            "spawn",
        );

        let request = SpawnRequest {
            x,
            y,
            theta,
            name: name.to_string(),
        };
        self.ctx.log_pub(self.handles.spawn.service_name(), &request);
        self.handles.spawn.call_async(request).detach();
        self.stats.service_requests += 1;
    }

    /// Ask the simulator to remove the turtle called `name`
    pub fn kill(&mut self, name: &str) {
        wait_for_service(
            &*self.handles.kill,
            &mut *self.handles.pump,
            &self.ctx,
            self.config.service_wait_duration(),
            "kill",
        );

        let request = KillRequest {
            name: name.to_string(),
        };
        self.ctx.log_pub(self.handles.kill.service_name(), &request);
        self.handles.kill.call_async(request).detach();
        self.stats.service_requests += 1;
    }

    /// Stop the turtle, report and release the event pump
    pub fn shutdown(&mut self) {
        self.publish(CmdVel::zero());
        self.ctx.log_info(&format!(
            "final estimate {}, {} commands, {} service requests",
            self.state.log_summary(),
            self.stats.commands_published,
            self.stats.service_requests
        ));
        self.ctx.log_metrics_summary();
        if let Err(e) = self.ctx.shutdown() {
            self.ctx.log_error(&format!("context shutdown failed: {}", e));
        }
        self.handles.pump.shutdown();
    }

    fn publish(&mut self, cmd: CmdVel) {
        match self.handles.cmd_vel.send(cmd) {
            Ok(()) => {
                self.ctx.log_pub(self.handles.cmd_vel.topic(), &cmd);
                self.stats.commands_published += 1;
            }
            Err(e) => self
                .ctx
                .log_warning(&format!("dropped {}: {}", cmd.log_summary(), e)),
        }
    }

    fn reject(&mut self, what: &str) {
        self.ctx.log_warning(&format!("skipping invalid {}", what));
        self.stats.rejected_inputs += 1;
    }
}

/// Block until `client`'s service is up, letting the pump run between waits.
///
/// There is no retry limit; an absent service keeps the caller here.
fn wait_for_service<S: ServiceType>(
    client: &dyn ServiceClient<S>,
    pump: &mut dyn EventPump,
    ctx: &NodeInfo,
    timeout: Duration,
    label: &str,
) {
    while !client.wait_for_service(timeout) {
        ctx.log_info(&format!("Waiting for {} service...", label));
        pump.spin_once();
    }
}

fn valid_speed(speed: f64) -> bool {
    speed.is_finite() && speed > 0.0
}

fn elapsed_secs(clock: &dyn Clock, start: Duration) -> f64 {
    clock.now().saturating_sub(start).as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};
    use turtle_core::communication::service::{self, Server};
    use turtle_core::scheduling::SimClock;
    use turtle_core::Hub;

    /// Advances a simulated clock by one control period per spin
    struct StepPump {
        clock: SimClock,
    }

    impl EventPump for StepPump {
        fn spin_once(&mut self) {
            self.clock.advance(Duration::from_millis(100));
        }
    }

    struct Fixture {
        node: TurtleDrawNode,
        cmd_vel: Hub<CmdVel>,
        pen_server: Server<SetPen>,
        _spawn_server: Server<Spawn>,
        _kill_server: Server<Kill>,
    }

    fn fixture() -> Fixture {
        let clock = SimClock::new();
        let cmd_vel: Hub<CmdVel> = Hub::new_with_capacity("/turtle1/cmd_vel", 100_000).unwrap();
        let (pen, pen_server) = service::pair::<SetPen>("/turtle1/set_pen");
        let (spawn, spawn_server) = service::pair::<Spawn>("spawn");
        let (kill, kill_server) = service::pair::<Kill>("kill");
        pen_server.advertise();
        spawn_server.advertise();
        kill_server.advertise();

        let handles = DrawHandles {
            cmd_vel: Box::new(cmd_vel.clone()),
            pen: Box::new(pen),
            spawn: Box::new(spawn),
            kill: Box::new(kill),
            pump: Box::new(StepPump {
                clock: clock.clone(),
            }),
            clock: Arc::new(clock),
        };

        Fixture {
            node: TurtleDrawNode::new(handles, DrawConfig::default()).unwrap(),
            cmd_vel,
            pen_server,
            _spawn_server: spawn_server,
            _kill_server: kill_server,
        }
    }

    fn active(commands: &[CmdVel]) -> Vec<CmdVel> {
        commands.iter().copied().filter(|c| !c.is_zero()).collect()
    }

    #[test]
    fn test_initial_state() {
        let f = fixture();
        let state = f.node.state();
        assert_eq!(state.position(), (0.0, 0.0));
        assert_eq!(state.heading(), 0.0);
        assert!(state.pen_down());
        assert_eq!(*f.node.stats(), DrawStats::default());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let f = fixture();
        let handles = f.node.handles;
        let config = DrawConfig {
            control_period: 0.0,
            ..DrawConfig::default()
        };
        assert!(TurtleDrawNode::new(handles, config).is_err());
    }

    #[test]
    fn test_move_straight_duration() {
        let mut f = fixture();
        f.node.move_straight(5.0, 1.0);

        let commands = f.cmd_vel.drain();
        let moving = active(&commands);
        assert_eq!(moving.len(), 50);
        assert!(moving.iter().all(|c| *c == CmdVel::forward(1.0)));
        assert_eq!(commands.last(), Some(&CmdVel::zero()));
        // Position is left for the caller to snap
        assert_eq!(f.node.state().position(), (0.0, 0.0));
    }

    #[test]
    fn test_zero_distance_only_stops() {
        let mut f = fixture();
        f.node.move_straight(0.0, 1.0);
        assert_eq!(f.cmd_vel.drain(), vec![CmdVel::zero()]);
    }

    #[test]
    fn test_rotate_reaches_target() {
        let mut f = fixture();
        f.node.rotate_in_place(FRAC_PI_2);

        let heading = f.node.state().heading();
        assert!((heading - FRAC_PI_2).abs() <= 1e-2);

        let commands = f.cmd_vel.drain();
        assert!(active(&commands).iter().all(|c| *c == CmdVel::turn(0.1)));
        assert_eq!(commands.last(), Some(&CmdVel::zero()));
        assert_eq!(f.node.stats().rotations, 1);
    }

    #[test]
    fn test_rotate_takes_shorter_direction() {
        let mut f = fixture();
        f.node.rotate_in_place(-0.5);
        assert!(active(&f.cmd_vel.drain())
            .iter()
            .all(|c| c.angular < 0.0));

        // +3π/2 is the same as a quarter turn clockwise
        f.node.rotate_in_place(1.5 * PI);
        assert!(active(&f.cmd_vel.drain())
            .iter()
            .all(|c| c.angular < 0.0));
        assert_relative_eq!(
            f.node.state().heading(),
            normalize_angle(-0.5 - FRAC_PI_2),
            epsilon = 2e-2
        );
    }

    #[test]
    fn test_rotate_within_tolerance_only_stops() {
        let mut f = fixture();
        f.node.rotate_in_place(0.005);
        assert_eq!(f.cmd_vel.drain(), vec![CmdVel::zero()]);
    }

    #[test]
    fn test_draw_line_turns_then_snaps() {
        let mut f = fixture();
        f.node.draw_line(3.0, 4.0, 1.0);

        assert_eq!(f.node.state().position(), (3.0, 4.0));
        assert!((f.node.state().heading() - 4.0_f64.atan2(3.0)).abs() <= 1e-2);

        let moving = active(&f.cmd_vel.drain());
        let turns = moving.iter().filter(|c| c.angular != 0.0).count();
        let drives = moving.iter().filter(|c| c.linear != 0.0).count();
        // 0.9273 rad at 0.01 rad per command
        assert!((92..=93).contains(&turns), "{} turn commands", turns);
        assert_eq!(drives, 50);
        assert_eq!(f.node.stats().lines, 1);
    }

    #[test]
    fn test_draw_line_already_facing_skips_rotation() {
        let mut f = fixture();
        f.node.draw_line(2.0, 0.0005, 1.0);

        let moving = active(&f.cmd_vel.drain());
        assert!(moving.iter().all(|c| c.angular == 0.0));
        assert_eq!(f.node.stats().rotations, 0);
        assert_eq!(f.node.stats().straight_moves, 1);
    }

    #[test]
    fn test_draw_circle_from_circumference() {
        let mut f = fixture();
        f.node.draw_line(2.0, 0.0, 1.0);
        f.cmd_vel.drain();

        f.node.draw_circle(0.0, 0.0, 2.0, 1.0);

        let arc: Vec<_> = active(&f.cmd_vel.drain())
            .into_iter()
            .filter(|c| c.linear != 0.0)
            .collect();
        // 2π swept at 0.05 rad per command
        assert_eq!(arc.len(), 126);
        assert!(arc.iter().all(|c| *c == CmdVel::new(1.0, 0.5)));
        assert_eq!(f.node.stats().arcs, 1);

        let (x, y) = f.node.state().position();
        assert_relative_eq!(x.hypot(y), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_draw_circle_off_circumference_does_nothing() {
        let mut f = fixture();
        f.node.draw_line(1.0, 0.0, 1.0);
        f.cmd_vel.drain();
        let before = *f.node.state();

        f.node.draw_circle(0.0, 0.0, 2.0, 1.0);

        assert!(f.cmd_vel.drain().is_empty());
        assert_eq!(*f.node.state(), before);
        assert_eq!(f.node.stats().skipped_circles, 1);
        assert_eq!(f.node.stats().arcs, 0);
    }

    #[test]
    fn test_invalid_inputs_skipped() {
        let mut f = fixture();
        f.node.draw_line(1.0, 1.0, 0.0);
        f.node.draw_line(1.0, 1.0, f64::NAN);
        f.node.draw_circle(0.0, 0.0, -1.0, 1.0);
        f.node.move_straight(1.0, -2.0);

        assert!(f.cmd_vel.drain().is_empty());
        assert_eq!(f.node.stats().rejected_inputs, 4);
        assert_eq!(f.node.context().metrics().warnings_count, 4);
    }

    #[test]
    fn test_set_pen_is_optimistic_and_detached() {
        let mut f = fixture();
        f.node.pen_up();
        assert!(!f.node.state().pen_down());

        let mut seen = Vec::new();
        f.pen_server.spin_once(None, |req| seen.push(req));
        assert_eq!(seen, vec![SetPenRequest::new(PenStyle::default(), true)]);

        f.node.pen_down();
        assert!(f.node.state().pen_down());
        assert_eq!(f.node.stats().service_requests, 2);
    }

    #[test]
    fn test_face_heading() {
        let mut f = fixture();
        f.node.face_heading(-FRAC_PI_2);
        assert!((f.node.state().heading() + FRAC_PI_2).abs() <= 1e-2);
    }

    #[test]
    fn test_shutdown_stops_turtle() {
        let mut f = fixture();
        f.node.shutdown();
        assert_eq!(f.cmd_vel.drain(), vec![CmdVel::zero()]);
    }
}
