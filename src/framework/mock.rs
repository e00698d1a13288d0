//! # Scripted Actor
//!
//! [`MockClient`] stands in for a running [`ResourceActor`](super::ResourceActor) when
//! testing a client wrapper. It hands out a real [`ResourceClient`]; a background task
//! answers each incoming request with the next scripted response, in the order the
//! responses were queued.
//!
//! ```ignore
//! let mut mock = MockClient::<Order>::new();
//! mock.expect_create().return_ok(OrderId(7));
//! mock.expect_get(OrderId(7)).return_ok(Some(order));
//!
//! let client = OrderClient::new(mock.client());
//! // ... exercise the client ...
//! mock.verify();
//! ```
//!
//! A request of the wrong kind, or for the wrong id, panics the responder task. The
//! client under test then sees [`FrameworkError::ActorDropped`].

use crate::framework::{ActorEntity, FrameworkError, ResourceClient, ResourceRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A queued answer. `Get` and `Action` also pin the id they expect.
enum Scripted<T: ActorEntity> {
    Create(Result<T::Id, FrameworkError>),
    Get(T::Id, Result<Option<T>, FrameworkError>),
    Action(T::Id, Result<T::ActionResult, FrameworkError>),
}

type Script<T> = Arc<Mutex<VecDeque<Scripted<T>>>>;

pub struct MockClient<T: ActorEntity> {
    client: ResourceClient<T>,
    script: Script<T>,
    _responder: JoinHandle<()>,
}

impl<T: ActorEntity> Default for MockClient<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers requests from `script` until every client is dropped.
async fn respond<T: ActorEntity>(mut requests: mpsc::Receiver<ResourceRequest<T>>, script: Script<T>) {
    while let Some(request) = requests.recv().await {
        let next = script.lock().unwrap().pop_front();
        match (request, next) {
            (ResourceRequest::Create { respond_to, .. }, Some(Scripted::Create(answer))) => {
                let _ = respond_to.send(answer);
            }
            (ResourceRequest::Get { id, respond_to }, Some(Scripted::Get(expected, answer))) => {
                assert_eq!(id, expected, "get for unexpected id");
                let _ = respond_to.send(answer);
            }
            (
                ResourceRequest::Action { id, respond_to, .. },
                Some(Scripted::Action(expected, answer)),
            ) => {
                assert_eq!(id, expected, "action for unexpected id");
                let _ = respond_to.send(answer);
            }
            (_, None) => panic!("request arrived with nothing scripted"),
            _ => panic!("request does not match the next scripted answer"),
        }
    }
}

impl<T: ActorEntity> MockClient<T> {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(100);
        let script: Script<T> = Arc::new(Mutex::new(VecDeque::new()));
        let responder = tokio::spawn(respond(receiver, script.clone()));
        Self {
            client: ResourceClient::new(sender),
            script,
            _responder: responder,
        }
    }

    /// A client wired to the scripted responder.
    pub fn client(&self) -> ResourceClient<T> {
        self.client.clone()
    }

    pub fn expect_create(&mut self) -> Expect<T, T::Id> {
        self.expect(Scripted::Create)
    }

    pub fn expect_get(&mut self, id: T::Id) -> Expect<T, Option<T>> {
        self.expect(move |answer| Scripted::Get(id, answer))
    }

    pub fn expect_action(&mut self, id: T::Id) -> Expect<T, T::ActionResult> {
        self.expect(move |answer| Scripted::Action(id, answer))
    }

    fn expect<R>(
        &mut self,
        wrap: impl FnOnce(Result<R, FrameworkError>) -> Scripted<T> + 'static,
    ) -> Expect<T, R> {
        Expect {
            script: self.script.clone(),
            wrap: Box::new(wrap),
        }
    }

    /// Panics if any scripted answer was never consumed.
    pub fn verify(&self) {
        let remaining = self.script.lock().unwrap().len();
        assert_eq!(remaining, 0, "{} scripted answer(s) never requested", remaining);
    }
}

/// Pending expectation; finish it with [`return_ok`](Self::return_ok) or
/// [`return_err`](Self::return_err).
pub struct Expect<T: ActorEntity, R> {
    script: Script<T>,
    wrap: Box<dyn FnOnce(Result<R, FrameworkError>) -> Scripted<T>>,
}

impl<T: ActorEntity, R> Expect<T, R> {
    pub fn return_ok(self, value: R) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FrameworkError) {
        self.push(Err(error));
    }

    fn push(self, answer: Result<R, FrameworkError>) {
        let scripted = (self.wrap)(answer);
        self.script.lock().unwrap().push_back(scripted);
    }
}
