use crate::core::{Node, NodeInfo, NodeState};
use crate::scheduling::clock::{Clock, MonotonicClock, SimClock};
use std::sync::Arc;
use std::time::Duration;

/// Default spin period, matching the controller's nominal tick
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(100);

/// Cooperative yield point for blocking control loops.
///
/// A controller calls `spin_once` once per emitted command so that inbound
/// and outbound traffic can flow. Implementations decide how time passes.
pub trait EventPump: Send {
    /// Let pending work run once
    fn spin_once(&mut self);

    /// Release resources when the caller is done
    fn shutdown(&mut self) {}
}

/// How the scheduler moves time between spins
#[derive(Debug, Clone)]
enum Pacing {
    /// Step a simulated clock by one period per spin, without sleeping
    Simulated(SimClock),
    /// Sleep so that spins happen once per period of wall-clock time
    RealTime {
        clock: MonotonicClock,
        next_deadline: Option<Duration>,
    },
}

/// Node registration info
struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    context: NodeInfo,
}

/// Central orchestrator: holds nodes, drives the tick loop.
pub struct Scheduler {
    nodes: Vec<RegisteredNode>,
    scheduler_name: String,
    period: Duration,
    pacing: Pacing,
    spins: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create an empty scheduler on simulated time
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            scheduler_name: "DefaultScheduler".to_string(),
            period: DEFAULT_PERIOD,
            pacing: Pacing::Simulated(SimClock::new()),
            spins: 0,
        }
    }

    /// Set the spin period (builder pattern)
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Drive an existing simulated clock instead of a private one
    pub fn with_sim_clock(mut self, clock: SimClock) -> Self {
        self.pacing = Pacing::Simulated(clock);
        self
    }

    /// Pace spins against the wall clock
    pub fn realtime(mut self) -> Self {
        self.pacing = Pacing::RealTime {
            clock: MonotonicClock::new(),
            next_deadline: None,
        };
        self
    }

    /// Set scheduler name (builder pattern)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    /// Add a node; lower `priority` values tick first.
    pub fn add(
        &mut self,
        node: Box<dyn Node>,
        priority: u32,
        logging_enabled: Option<bool>,
    ) -> &mut Self {
        let node_name = node.name().to_string();
        let logging_enabled = logging_enabled.unwrap_or(false);
        let context = NodeInfo::new(node_name.clone(), logging_enabled);

        self.nodes.push(RegisteredNode {
            node,
            priority,
            initialized: false,
            context,
        });
        self.nodes.sort_by_key(|registered| registered.priority);

        tracing::debug!(
            scheduler = %self.scheduler_name,
            "Added node '{}' with priority {} (logging: {})",
            node_name,
            priority,
            logging_enabled
        );

        self
    }

    /// The clock this scheduler advances
    pub fn clock(&self) -> Arc<dyn Clock> {
        match &self.pacing {
            Pacing::Simulated(clock) => Arc::new(clock.clone()),
            Pacing::RealTime { clock, .. } => Arc::new(*clock),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_realtime(&self) -> bool {
        matches!(self.pacing, Pacing::RealTime { .. })
    }

    /// Number of completed spins
    pub fn spins(&self) -> u64 {
        self.spins
    }

    pub fn get_node_list(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|registered| registered.node.name().to_string())
            .collect()
    }

    /// Spin until the scheduler clock has advanced by `duration`
    pub fn run_for(&mut self, duration: Duration) {
        let clock = self.clock();
        let start = clock.now();
        while clock.now().saturating_sub(start) < duration {
            self.spin_once();
        }
    }

    fn tick_nodes(&mut self) {
        for registered in &mut self.nodes {
            if matches!(registered.context.state(), NodeState::Error(_)) {
                continue;
            }

            if !registered.initialized {
                let _ = registered.context.initialize();
                match registered.node.init(&mut registered.context) {
                    Ok(()) => registered.initialized = true,
                    Err(e) => {
                        registered
                            .context
                            .transition_to_error(format!("init failed: {}", e));
                        continue;
                    }
                }
            }

            registered.context.start_tick();
            let node = &mut registered.node;
            let context = &mut registered.context;
            let tick_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                node.tick(Some(context));
            }));

            match tick_result {
                Ok(()) => registered.context.record_tick(),
                Err(_) => registered
                    .context
                    .transition_to_error("tick panicked".to_string()),
            }
        }
    }

    fn advance_time(&mut self) {
        let period = self.period;
        match &mut self.pacing {
            Pacing::Simulated(clock) => clock.advance(period),
            Pacing::RealTime {
                clock,
                next_deadline,
            } => {
                let now = clock.now();
                let deadline = next_deadline.unwrap_or(now) + period;
                if deadline > now {
                    std::thread::sleep(deadline - now);
                }
                *next_deadline = Some(deadline);
            }
        }
    }

    /// Shut every initialized node down and log its metrics
    pub fn shutdown_nodes(&mut self) {
        for registered in &mut self.nodes {
            if registered.initialized {
                if let Err(e) = registered.node.shutdown(&mut registered.context) {
                    registered
                        .context
                        .log_error(&format!("shutdown failed: {}", e));
                }
                registered.initialized = false;
            }
            if let Err(e) = registered.context.shutdown() {
                registered
                    .context
                    .log_error(&format!("context shutdown failed: {}", e));
            }
            registered.context.log_metrics_summary();
        }
    }
}

impl EventPump for Scheduler {
    fn spin_once(&mut self) {
        self.tick_nodes();
        self.spins += 1;
        self.advance_time();
    }

    fn shutdown(&mut self) {
        self.shutdown_nodes();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{TurtleError, TurtleResult};
    use parking_lot::Mutex;

    struct CountingNode {
        name: &'static str,
        log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Node for CountingNode {
        fn name(&self) -> &'static str {
            self.name
        }

        fn tick(&mut self, _ctx: Option<&mut NodeInfo>) {
            self.log.lock().push(self.name);
        }
    }

    struct BrokenNode;

    impl Node for BrokenNode {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn init(&mut self, _ctx: &mut NodeInfo) -> TurtleResult<()> {
            Err(TurtleError::InvalidParameter("no".into()))
        }

        fn tick(&mut self, _ctx: Option<&mut NodeInfo>) {
            panic!("must not tick after failed init");
        }
    }

    #[test]
    fn test_simulated_time_steps_per_spin() {
        let mut scheduler = Scheduler::new().with_period(Duration::from_millis(50));
        let clock = scheduler.clock();

        scheduler.spin_once();
        scheduler.spin_once();

        assert_eq!(clock.now(), Duration::from_millis(100));
        assert_eq!(scheduler.spins(), 2);
    }

    #[test]
    fn test_nodes_tick_in_priority_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut scheduler = Scheduler::new();
        scheduler.add(
            Box::new(CountingNode {
                name: "late",
                log: log.clone(),
            }),
            10,
            None,
        );
        scheduler.add(
            Box::new(CountingNode {
                name: "early",
                log: log.clone(),
            }),
            0,
            None,
        );

        scheduler.spin_once();
        assert_eq!(*log.lock(), vec!["early", "late"]);
        assert_eq!(scheduler.get_node_list(), vec!["early", "late"]);
    }

    #[test]
    fn test_failed_init_disables_node() {
        let mut scheduler = Scheduler::new();
        scheduler.add(Box::new(BrokenNode), 0, None);
        scheduler.spin_once();
        scheduler.spin_once();
        assert_eq!(scheduler.spins(), 2);
    }

    #[test]
    fn test_run_for_uses_scheduler_clock() {
        let mut scheduler = Scheduler::new();
        scheduler.run_for(Duration::from_secs(1));
        assert_eq!(scheduler.spins(), 10);
    }

    #[test]
    fn test_realtime_pacing_sleeps() {
        let mut scheduler = Scheduler::new()
            .with_period(Duration::from_millis(5))
            .realtime();
        assert!(scheduler.is_realtime());

        let start = std::time::Instant::now();
        for _ in 0..3 {
            scheduler.spin_once();
        }
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
