// Recording stand-ins for the transport, shared by the controller tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use turtle_core::error::TurtleResult as Result;
use turtle_core::scheduling::{EventPump, SimClock};
use turtle_core::{PendingCall, Publisher, ServiceClient, ServiceType};
use turtle_library::{
    CmdVel, DrawConfig, DrawHandles, Kill, KillRequest, SetPen, SetPenRequest, Spawn,
    SpawnRequest, SpawnResponse, TurtleDrawNode,
};

/// Everything the controller did, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Cmd(CmdVel),
    Pen(SetPenRequest),
    Spawn(SpawnRequest),
    Kill(KillRequest),
    WaitMiss(String),
    Spin,
}

#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
    pub fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn take(&self) -> Vec<Event> {
        std::mem::take(&mut *self.0.lock())
    }

    pub fn commands(&self) -> Vec<CmdVel> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Cmd(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }

    pub fn active_commands(&self) -> Vec<CmdVel> {
        self.commands().into_iter().filter(|c| !c.is_zero()).collect()
    }

    pub fn pen_requests(&self) -> Vec<SetPenRequest> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pen(req) => Some(req),
                _ => None,
            })
            .collect()
    }
}

struct RecordingPublisher {
    log: EventLog,
}

impl Publisher<CmdVel> for RecordingPublisher {
    fn topic(&self) -> &str {
        "/turtle1/cmd_vel"
    }

    fn send(&self, msg: CmdVel) -> Result<()> {
        self.log.push(Event::Cmd(msg));
        Ok(())
    }
}

/// Answers immediately; reports unavailable for the first `misses` waits
struct RecordingClient<S: ServiceType> {
    name: &'static str,
    log: EventLog,
    misses: Arc<AtomicUsize>,
    record: fn(&S::Request) -> Event,
    respond: fn(&S::Request) -> S::Response,
}

impl<S: ServiceType> ServiceClient<S> for RecordingClient<S> {
    fn service_name(&self) -> &str {
        self.name
    }

    fn wait_for_service(&self, _timeout: Duration) -> bool {
        let missed = self
            .misses
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if missed {
            self.log.push(Event::WaitMiss(self.name.to_string()));
        }
        !missed
    }

    fn call_async(&self, request: S::Request) -> PendingCall<S::Response> {
        self.log.push((self.record)(&request));
        let response = (self.respond)(&request);
        PendingCall::ready(self.name, response)
    }
}

/// Steps a simulated clock by 100ms per spin
struct RecordingPump {
    log: EventLog,
    clock: SimClock,
}

impl EventPump for RecordingPump {
    fn spin_once(&mut self) {
        self.log.push(Event::Spin);
        self.clock.advance(Duration::from_millis(100));
    }
}

pub struct Harness {
    pub node: TurtleDrawNode,
    pub log: EventLog,
    pub clock: SimClock,
}

pub fn harness() -> Harness {
    harness_with(DrawConfig::default(), 0)
}

/// Build a controller whose pen service is missing for the first `pen_misses` waits
pub fn harness_with(config: DrawConfig, pen_misses: usize) -> Harness {
    let log = EventLog::default();
    let clock = SimClock::new();

    let handles = DrawHandles {
        cmd_vel: Box::new(RecordingPublisher { log: log.clone() }),
        pen: Box::new(RecordingClient::<SetPen> {
            name: "/turtle1/set_pen",
            log: log.clone(),
            misses: Arc::new(AtomicUsize::new(pen_misses)),
            record: |req| Event::Pen(*req),
            respond: |_| (),
        }),
        spawn: Box::new(RecordingClient::<Spawn> {
            name: "spawn",
            log: log.clone(),
            misses: Arc::new(AtomicUsize::new(0)),
            record: |req| Event::Spawn(req.clone()),
            respond: |req| SpawnResponse {
                name: req.name.clone(),
            },
        }),
        kill: Box::new(RecordingClient::<Kill> {
            name: "kill",
            log: log.clone(),
            misses: Arc::new(AtomicUsize::new(0)),
            record: |req| Event::Kill(req.clone()),
            respond: |_| (),
        }),
        pump: Box::new(RecordingPump {
            log: log.clone(),
            clock: clock.clone(),
        }),
        clock: Arc::new(clock.clone()),
    };

    Harness {
        node: TurtleDrawNode::new(handles, config).unwrap(),
        log,
        clock,
    }
}
