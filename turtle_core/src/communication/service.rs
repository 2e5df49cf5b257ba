//! Request/response services
//!
//! A service is described by a [`ServiceType`]. Callers hold something that
//! implements [`ServiceClient`]; the in-process implementation is the
//! [`Client`]/[`Server`] pair returned by [`pair`].
//!
//! Calls are asynchronous: [`ServiceClient::call_async`] returns a
//! [`PendingCall`] handle. Callers that do not care about the response must
//! say so with [`PendingCall::detach`].

use crate::core::node::{LogSummary, NodeInfo};
use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::{Condvar, Mutex};
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

/// Describes one service: its request and response payloads
pub trait ServiceType: 'static {
    type Request: Send + Debug + LogSummary + 'static;
    type Response: Send + Debug + 'static;

    /// Type name used in logs
    const TYPE_NAME: &'static str;
}

/// Handle to a service call whose response may not have arrived yet
#[must_use = "a pending call must be awaited with `try_take` or explicitly `detach`ed"]
#[derive(Debug)]
pub struct PendingCall<R> {
    service: String,
    reply: Receiver<R>,
}

impl<R> PendingCall<R> {
    /// A call that has already completed with `response`
    pub fn ready(service: &str, response: R) -> Self {
        let (tx, rx) = channel::bounded(1);
        let _ = tx.send(response);
        Self {
            service: service.to_string(),
            reply: rx,
        }
    }

    /// A call that will never complete (the server went away)
    pub fn abandoned(service: &str) -> Self {
        let (_, rx) = channel::bounded(1);
        Self {
            service: service.to_string(),
            reply: rx,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Take the response if it has arrived
    pub fn try_take(&self) -> Option<R> {
        self.reply.try_recv().ok()
    }

    /// Give up on the response; the request itself stays in flight
    pub fn detach(self) {
        tracing::trace!(service = %self.service, "detached pending call");
    }
}

/// Client side of a service
pub trait ServiceClient<S: ServiceType>: Send {
    fn service_name(&self) -> &str;

    /// Block up to `timeout` for the service to come online
    fn wait_for_service(&self, timeout: Duration) -> bool;

    /// Send `request` without waiting for the response
    fn call_async(&self, request: S::Request) -> PendingCall<S::Response>;
}

#[derive(Default)]
struct Availability {
    online: Mutex<bool>,
    changed: Condvar,
}

impl Availability {
    fn set(&self, online: bool) {
        *self.online.lock() = online;
        self.changed.notify_all();
    }

    fn is_online(&self) -> bool {
        *self.online.lock()
    }

    fn wait_online(&self, timeout: Duration) -> bool {
        let mut online = self.online.lock();
        if !*online {
            let _ = self
                .changed
                .wait_while_for(&mut online, |online| !*online, timeout);
        }
        *online
    }
}

struct Call<S: ServiceType> {
    request: S::Request,
    reply: Sender<S::Response>,
}

/// In-process service client
pub struct Client<S: ServiceType> {
    name: String,
    calls: Sender<Call<S>>,
    availability: Arc<Availability>,
}

impl<S: ServiceType> Clone for Client<S> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            calls: self.calls.clone(),
            availability: self.availability.clone(),
        }
    }
}

impl<S: ServiceType> Debug for Client<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("service", &self.name)
            .field("type", &S::TYPE_NAME)
            .finish()
    }
}

impl<S: ServiceType> ServiceClient<S> for Client<S> {
    fn service_name(&self) -> &str {
        &self.name
    }

    fn wait_for_service(&self, timeout: Duration) -> bool {
        self.availability.wait_online(timeout)
    }

    fn call_async(&self, request: S::Request) -> PendingCall<S::Response> {
        let (reply, rx) = channel::bounded(1);
        tracing::trace!(service = %self.name, "call {}", request.log_summary());
        if self.calls.send(Call { request, reply }).is_err() {
            return PendingCall::abandoned(&self.name);
        }
        PendingCall {
            service: self.name.clone(),
            reply: rx,
        }
    }
}

/// In-process service server.
///
/// Requests queue up until [`Server::spin_once`] is called, normally from the
/// owning node's tick. Dropping the server takes the service offline.
pub struct Server<S: ServiceType> {
    name: String,
    calls: Receiver<Call<S>>,
    availability: Arc<Availability>,
    handled: u64,
}

impl<S: ServiceType> Server<S> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mark the service as available to clients
    pub fn advertise(&self) {
        self.availability.set(true);
    }

    /// Mark the service as unavailable; queued calls are kept
    pub fn withdraw(&self) {
        self.availability.set(false);
    }

    pub fn is_advertised(&self) -> bool {
        self.availability.is_online()
    }

    /// Number of requests answered so far
    pub fn handled(&self) -> u64 {
        self.handled
    }

    /// Answer every queued request with `handler`, returning how many ran
    pub fn spin_once<F>(&mut self, mut ctx: Option<&mut NodeInfo>, mut handler: F) -> usize
    where
        F: FnMut(S::Request) -> S::Response,
    {
        let mut count = 0;
        while let Ok(call) = self.calls.try_recv() {
            if let Some(ctx) = ctx.as_deref_mut() {
                ctx.log_sub(&self.name, &call.request);
            }
            let response = handler(call.request);
            // The caller may have detached; a closed reply channel is fine.
            let _ = call.reply.send(response);
            count += 1;
        }
        self.handled += count as u64;
        count
    }
}

impl<S: ServiceType> Drop for Server<S> {
    fn drop(&mut self) {
        self.availability.set(false);
    }
}

/// Create a connected client/server pair for service `name`.
///
/// The server starts offline; call [`Server::advertise`] once it is ready.
pub fn pair<S: ServiceType>(name: &str) -> (Client<S>, Server<S>) {
    let (tx, rx) = channel::unbounded();
    let availability = Arc::new(Availability::default());
    (
        Client {
            name: name.to_string(),
            calls: tx,
            availability: availability.clone(),
        },
        Server {
            name: name.to_string(),
            calls: rx,
            availability,
            handled: 0,
        },
    )
}
