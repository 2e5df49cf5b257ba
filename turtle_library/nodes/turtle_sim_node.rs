use crate::messages::{
    CmdVel, Kill, KillRequest, PenStyle, Pose2D, SetPen, SetPenRequest, Spawn, SpawnRequest,
    SpawnResponse,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use turtle_core::communication::service::Server;
use turtle_core::{Hub, Node, NodeInfo, TurtleResult};

/// Name of the turtle that follows `cmd_vel`
pub const MAIN_TURTLE: &str = "turtle1";

/// One stroke left behind by a turtle with its pen down
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrailSegment {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub style: PenStyle,
}

impl TrailSegment {
    pub fn length(&self) -> f64 {
        (self.to.0 - self.from.0).hypot(self.to.1 - self.from.1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimTurtle {
    pub pose: Pose2D,
    pub pen: PenStyle,
    pub pen_down: bool,
}

impl SimTurtle {
    fn at(pose: Pose2D) -> Self {
        Self {
            pose,
            pen: PenStyle::default(),
            pen_down: true,
        }
    }
}

/// Everything the simulator knows
#[derive(Debug, Clone, Default, Serialize)]
pub struct WorldState {
    pub turtles: BTreeMap<String, SimTurtle>,
    pub trail: Vec<TrailSegment>,
    /// Simulated seconds
    pub elapsed: f64,
    pub commands_applied: u64,
}

/// Shared handle onto the simulated world, for reporting and tests
#[derive(Debug, Clone, Default)]
pub struct SimWorld {
    inner: Arc<Mutex<WorldState>>,
}

impl SimWorld {
    pub fn pose(&self, name: &str) -> Option<Pose2D> {
        self.inner.lock().turtles.get(name).map(|t| t.pose)
    }

    pub fn pen_down(&self, name: &str) -> Option<bool> {
        self.inner.lock().turtles.get(name).map(|t| t.pen_down)
    }

    pub fn turtle_names(&self) -> Vec<String> {
        self.inner.lock().turtles.keys().cloned().collect()
    }

    pub fn trail(&self) -> Vec<TrailSegment> {
        self.inner.lock().trail.clone()
    }

    /// Total length of everything drawn so far
    pub fn ink_length(&self) -> f64 {
        self.inner.lock().trail.iter().map(TrailSegment::length).sum()
    }

    pub fn snapshot(&self) -> WorldState {
        self.inner.lock().clone()
    }

    pub fn to_json(&self) -> TurtleResult<String> {
        Ok(serde_json::to_string_pretty(&*self.inner.lock())?)
    }
}

/// Services the simulator answers
pub struct SimServers {
    pub set_pen: Server<SetPen>,
    pub spawn: Server<Spawn>,
    pub kill: Server<Kill>,
}

/// Turtle Sim Node - headless turtlesim stand-in
///
/// Each tick it answers queued pen/spawn/kill requests, takes the latest
/// velocity command from `cmd_vel` and integrates the main turtle's pose
/// over one period. With no new command the turtle stands still.
pub struct TurtleSimNode {
    cmd_subscriber: Hub<CmdVel>,
    servers: SimServers,
    world: SimWorld,
    dt: f64,
    next_index: u32,
}

impl TurtleSimNode {
    /// Create a simulator whose main turtle starts at `start`
    pub fn new(cmd_subscriber: Hub<CmdVel>, servers: SimServers, start: Pose2D, dt: f64) -> Self {
        let world = SimWorld::default();
        world
            .inner
            .lock()
            .turtles
            .insert(MAIN_TURTLE.to_string(), SimTurtle::at(start));

        Self {
            cmd_subscriber,
            servers,
            world,
            dt,
            next_index: 2,
        }
    }

    /// Handle for reading the world after the node moves into a scheduler
    pub fn world(&self) -> SimWorld {
        self.world.clone()
    }

    fn serve_requests(&mut self, mut ctx: Option<&mut NodeInfo>) {
        let world = self.world.clone();
        self.servers
            .set_pen
            .spin_once(ctx.as_deref_mut(), |request| apply_pen(&world, request));

        let next_index = &mut self.next_index;
        let spawned = self.servers.spawn.spin_once(ctx.as_deref_mut(), |request| {
            spawn_turtle(&world, next_index, request)
        });

        let killed = self
            .servers
            .kill
            .spin_once(ctx.as_deref_mut(), |request| kill_turtle(&world, request));

        if spawned + killed > 0 {
            if let Some(ctx) = ctx {
                ctx.log_debug(&format!(
                    "turtles now: {}",
                    self.world.turtle_names().join(", ")
                ));
            }
        }
    }

    fn step_motion(&mut self, mut ctx: Option<&mut NodeInfo>) {
        let mut latest = None;
        while let Some(cmd) = self.cmd_subscriber.recv(ctx.as_deref_mut()) {
            latest = Some(cmd);
        }
        let cmd = latest.unwrap_or_default();

        let mut world = self.world.inner.lock();
        world.elapsed += self.dt;
        let state = &mut *world;
        let Some(turtle) = state.turtles.get_mut(MAIN_TURTLE) else {
            return;
        };
        if cmd.is_zero() {
            return;
        }

        let before = turtle.pose;
        turtle.pose = before.integrate(cmd.linear, cmd.angular, self.dt);
        state.commands_applied += 1;

        if turtle.pen_down && before.distance_to(&turtle.pose) > 0.0 {
            state.trail.push(TrailSegment {
                from: (before.x, before.y),
                to: (turtle.pose.x, turtle.pose.y),
                style: turtle.pen,
            });
        }
    }
}

fn apply_pen(world: &SimWorld, request: SetPenRequest) {
    let mut state = world.inner.lock();
    match state.turtles.get_mut(MAIN_TURTLE) {
        Some(turtle) => {
            turtle.pen = request.style();
            turtle.pen_down = !request.off;
        }
        None => tracing::warn!("set_pen for missing turtle '{}'", MAIN_TURTLE),
    }
}

fn spawn_turtle(world: &SimWorld, next_index: &mut u32, request: SpawnRequest) -> SpawnResponse {
    let mut state = world.inner.lock();

    let name = if request.name.is_empty() {
        loop {
            let candidate = format!("turtle{}", *next_index);
            *next_index += 1;
            if !state.turtles.contains_key(&candidate) {
                break candidate;
            }
        }
    } else {
        request.name
    };

    if state.turtles.contains_key(&name) {
        tracing::warn!("turtle '{}' already exists", name);
        return SpawnResponse { name };
    }

    let pose = Pose2D::new(request.x, request.y, request.theta);
    state.turtles.insert(name.clone(), SimTurtle::at(pose));
    tracing::info!("spawned '{}' at ({:.2}, {:.2})", name, pose.x, pose.y);
    SpawnResponse { name }
}

fn kill_turtle(world: &SimWorld, request: KillRequest) {
    if world.inner.lock().turtles.remove(&request.name).is_none() {
        tracing::warn!("no turtle named '{}' to kill", request.name);
    }
}

impl Node for TurtleSimNode {
    fn name(&self) -> &'static str {
        "turtlesim"
    }

    fn init(&mut self, ctx: &mut NodeInfo) -> TurtleResult<()> {
        self.servers.set_pen.advertise();
        self.servers.spawn.advertise();
        self.servers.kill.advertise();
        ctx.log_info(&format!(
            "serving {}, {}, {} and following {}",
            self.servers.set_pen.name(),
            self.servers.spawn.name(),
            self.servers.kill.name(),
            self.cmd_subscriber.get_topic_name()
        ));
        Ok(())
    }

    fn tick(&mut self, mut ctx: Option<&mut NodeInfo>) {
        // Pen changes apply to the motion commanded after them
        self.serve_requests(ctx.as_deref_mut());
        self.step_motion(ctx);
    }

    fn shutdown(&mut self, ctx: &mut NodeInfo) -> TurtleResult<()> {
        self.servers.set_pen.withdraw();
        self.servers.spawn.withdraw();
        self.servers.kill.withdraw();

        let world = self.world.snapshot();
        ctx.log_info(&format!(
            "simulated {:.1}s, {} trail segments, {:.2} units of ink",
            world.elapsed,
            world.trail.len(),
            self.world.ink_length()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;
    use turtle_core::communication::service::{self, Client};
    use turtle_core::ServiceClient;

    struct Rig {
        sim: TurtleSimNode,
        cmd_vel: Hub<CmdVel>,
        pen: Client<SetPen>,
        spawn: Client<Spawn>,
        kill: Client<Kill>,
    }

    fn rig() -> Rig {
        let cmd_vel: Hub<CmdVel> = Hub::new("/turtle1/cmd_vel").unwrap();
        let (pen, set_pen) = service::pair::<SetPen>("/turtle1/set_pen");
        let (spawn, spawn_server) = service::pair::<Spawn>("spawn");
        let (kill, kill_server) = service::pair::<Kill>("kill");
        let sim = TurtleSimNode::new(
            cmd_vel.clone(),
            SimServers {
                set_pen,
                spawn: spawn_server,
                kill: kill_server,
            },
            Pose2D::new(1.0, 1.0, 0.0),
            0.1,
        );
        Rig {
            sim,
            cmd_vel,
            pen,
            spawn,
            kill,
        }
    }

    #[test]
    fn test_init_advertises_services() {
        let mut r = rig();
        let mut ctx = NodeInfo::new("turtlesim", false);
        assert!(!r.pen.wait_for_service(std::time::Duration::ZERO));

        r.sim.init(&mut ctx).unwrap();

        assert!(r.pen.wait_for_service(std::time::Duration::ZERO));
        assert!(r.spawn.wait_for_service(std::time::Duration::ZERO));
        assert!(r.kill.wait_for_service(std::time::Duration::ZERO));
    }

    #[test]
    fn test_latest_command_wins() {
        let mut r = rig();
        r.cmd_vel.send(CmdVel::turn(1.0), None).unwrap();
        r.cmd_vel.send(CmdVel::forward(2.0), None).unwrap();

        r.sim.tick(None);

        let pose = r.sim.world().pose(MAIN_TURTLE).unwrap();
        assert_relative_eq!(pose.x, 1.2, epsilon = 1e-12);
        assert_relative_eq!(pose.y, 1.0);
        assert_relative_eq!(pose.theta, 0.0);
    }

    #[test]
    fn test_no_command_stands_still() {
        let mut r = rig();
        r.cmd_vel.send(CmdVel::forward(1.0), None).unwrap();
        r.sim.tick(None);
        r.sim.tick(None);

        let world = r.sim.world().snapshot();
        assert_relative_eq!(world.turtles[MAIN_TURTLE].pose.x, 1.1, epsilon = 1e-12);
        assert_eq!(world.commands_applied, 1);
        assert_relative_eq!(world.elapsed, 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_trail_follows_pen() {
        let mut r = rig();
        r.cmd_vel.send(CmdVel::forward(1.0), None).unwrap();
        r.sim.tick(None);

        r.pen
            .call_async(SetPenRequest::new(PenStyle::default(), true))
            .detach();
        r.cmd_vel.send(CmdVel::forward(1.0), None).unwrap();
        r.sim.tick(None);

        let style = PenStyle {
            r: 255,
            g: 0,
            b: 0,
            width: 3,
        };
        r.pen.call_async(SetPenRequest::new(style, false)).detach();
        r.cmd_vel.send(CmdVel::new(1.0, FRAC_PI_2), None).unwrap();
        r.sim.tick(None);

        let world = r.sim.world();
        let trail = world.trail();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].style, PenStyle::default());
        assert_eq!(trail[1].style, style);
        assert_relative_eq!(trail[1].from.0, 1.2, epsilon = 1e-12);
        assert_relative_eq!(world.ink_length(), 0.2, epsilon = 1e-9);
        assert_eq!(world.pen_down(MAIN_TURTLE), Some(true));
    }

    #[test]
    fn test_spawn_names_and_duplicates() {
        let mut r = rig();
        let request = |name: &str| SpawnRequest {
            x: 3.0,
            y: 4.0,
            theta: 0.0,
            name: name.to_string(),
        };

        let auto = r.spawn.call_async(request(""));
        let named = r.spawn.call_async(request("leo"));
        let duplicate = r.spawn.call_async(request("leo"));
        r.sim.tick(None);

        assert_eq!(auto.try_take().unwrap().name, "turtle2");
        assert_eq!(named.try_take().unwrap().name, "leo");
        assert_eq!(duplicate.try_take().unwrap().name, "leo");
        assert_eq!(r.sim.world().turtle_names(), vec!["leo", "turtle1", "turtle2"]);
        assert_eq!(
            r.sim.world().pose("leo"),
            Some(Pose2D::new(3.0, 4.0, 0.0))
        );
    }

    #[test]
    fn test_kill_removes_turtle() {
        let mut r = rig();
        r.kill
            .call_async(KillRequest {
                name: MAIN_TURTLE.to_string(),
            })
            .detach();
        r.kill
            .call_async(KillRequest {
                name: "nobody".to_string(),
            })
            .detach();
        r.cmd_vel.send(CmdVel::forward(1.0), None).unwrap();
        r.sim.tick(None);

        let world = r.sim.world();
        assert!(world.pose(MAIN_TURTLE).is_none());
        assert!(world.trail().is_empty());
    }

    #[test]
    fn test_world_json_export() {
        let r = rig();
        let json = r.sim.world().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["turtles"]["turtle1"]["pose"]["x"], 1.0);
        assert!(value["trail"].as_array().unwrap().is_empty());
    }
}
