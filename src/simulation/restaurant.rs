//! The restaurant actor and its client.
//!
//! A [`RestaurantActor`] owns one [`Kitchen`] and processes everything that touches it on
//! a single task: client requests arrive on one channel, ticks on another. Each ticker
//! sleeps its period, sends a tick and waits for the actor to acknowledge it before
//! sleeping again, so two runs of the same periodic task never overlap.
//!
//! ```rust,ignore
//! let (actor, client) = RestaurantActor::new(kitchen);
//! tokio::spawn(actor.run());
//!
//! client.open().await?;
//! // ... orders are generated and frames processed ...
//! client.close().await?;   // stops new orders, scheduled work keeps draining
//! drop(client);            // stops the actor and both tickers
//! ```

use crate::model::Restaurant;
use crate::simulation::{Kitchen, KitchenStats, SimulationError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Periodic work a ticker asks the actor to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Carries the generation of the ticker that sent it; each open starts a new one.
    NewOrder(u64),
    Frame,
}

/// A tick plus the channel the actor acknowledges it on.
#[derive(Debug)]
pub struct TickRequest {
    pub tick: Tick,
    pub done: oneshot::Sender<()>,
}

/// Point-in-time view of a restaurant.
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantSnapshot {
    pub restaurant: Restaurant,
    pub open: bool,
    pub stats: KitchenStats,
}

#[derive(Debug)]
pub enum RestaurantRequest {
    Open {
        respond_to: oneshot::Sender<bool>,
    },
    Close {
        respond_to: oneshot::Sender<bool>,
    },
    Snapshot {
        respond_to: oneshot::Sender<RestaurantSnapshot>,
    },
}

/// Starts a fixed-delay ticker. The task ends when the actor stops listening.
fn spawn_ticker(period: Duration, tick: Tick, sender: mpsc::Sender<TickRequest>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            let (done, ack) = oneshot::channel();
            if sender.send(TickRequest { tick, done }).await.is_err() {
                break;
            }
            if ack.await.is_err() {
                break;
            }
        }
    })
}

pub struct RestaurantActor {
    receiver: mpsc::Receiver<RestaurantRequest>,
    kitchen: Kitchen,
    open: bool,
    order_generation: u64,
    order_ticker: Option<JoinHandle<()>>,
    frame_ticker: Option<JoinHandle<()>>,
}

impl RestaurantActor {
    pub fn new(kitchen: Kitchen) -> (Self, RestaurantClient) {
        let (sender, receiver) = mpsc::channel(16);
        let actor = Self {
            receiver,
            kitchen,
            open: false,
            order_generation: 0,
            order_ticker: None,
            frame_ticker: None,
        };
        (actor, RestaurantClient { sender })
    }

    /// Runs until every [`RestaurantClient`] has been dropped.
    pub async fn run(mut self) {
        let store_id = self.kitchen.restaurant().store_id;
        info!(store_id, name = %self.kitchen.restaurant().name, "Restaurant actor started");

        let (tick_sender, mut ticks) = mpsc::channel::<TickRequest>(2);
        loop {
            tokio::select! {
                request = self.receiver.recv() => match request {
                    Some(request) => self.handle_request(request, &tick_sender),
                    None => break,
                },
                Some(request) = ticks.recv() => {
                    self.handle_tick(request.tick).await;
                    let _ = request.done.send(());
                }
            }
        }

        self.stop_tickers();
        let stats = self.kitchen.stats();
        info!(
            store_id,
            position = stats.position,
            orders = stats.orders_created,
            completed = stats.workflows_completed,
            stalled = stats.workflows_stalled,
            "Restaurant actor shutdown"
        );
    }

    fn handle_request(&mut self, request: RestaurantRequest, tick_sender: &mpsc::Sender<TickRequest>) {
        match request {
            RestaurantRequest::Open { respond_to } => {
                let was_open = self.open;
                self.open(tick_sender);
                let _ = respond_to.send(!was_open);
            }
            RestaurantRequest::Close { respond_to } => {
                let was_open = self.open;
                self.close();
                let _ = respond_to.send(was_open);
            }
            RestaurantRequest::Snapshot { respond_to } => {
                let _ = respond_to.send(RestaurantSnapshot {
                    restaurant: self.kitchen.restaurant().clone(),
                    open: self.open,
                    stats: self.kitchen.stats(),
                });
            }
        }
    }

    /// Restarts order generation and makes sure frames are being processed.
    fn open(&mut self, tick_sender: &mpsc::Sender<TickRequest>) {
        let properties = *self.kitchen.properties();
        if let Some(ticker) = self.order_ticker.take() {
            ticker.abort();
        }
        self.order_generation += 1;
        self.order_ticker = Some(spawn_ticker(
            properties.new_order_interval(),
            Tick::NewOrder(self.order_generation),
            tick_sender.clone(),
        ));
        if self.frame_ticker.is_none() {
            self.frame_ticker = Some(spawn_ticker(
                properties.preparation_interval(),
                Tick::Frame,
                tick_sender.clone(),
            ));
        }
        self.open = true;
        info!(
            store_id = self.kitchen.restaurant().store_id,
            new_order_ms = properties.new_order_time,
            frame_ms = properties.preparation_time,
            "Restaurant opened"
        );
    }

    fn close(&mut self) {
        if let Some(ticker) = self.order_ticker.take() {
            ticker.abort();
        }
        self.order_generation += 1;
        self.open = false;
        info!(store_id = self.kitchen.restaurant().store_id, "Restaurant closed");
    }

    fn stop_tickers(&mut self) {
        for ticker in [self.order_ticker.take(), self.frame_ticker.take()].into_iter().flatten() {
            ticker.abort();
        }
    }

    async fn handle_tick(&mut self, tick: Tick) {
        match tick {
            Tick::NewOrder(generation) => {
                // A tick from an aborted ticker may still be queued.
                if !self.open || generation != self.order_generation {
                    debug!(
                        store_id = self.kitchen.restaurant().store_id,
                        generation,
                        current = self.order_generation,
                        "Stale order tick ignored"
                    );
                    return;
                }
                if let Err(e) = self.kitchen.order_received().await {
                    warn!(
                        store_id = self.kitchen.restaurant().store_id,
                        error = %e,
                        "Could not create order"
                    );
                }
            }
            Tick::Frame => {
                self.kitchen.tick();
                self.kitchen.process_frame().await;
            }
        }
    }
}

/// Handle to a running [`RestaurantActor`]. Cheap to clone.
#[derive(Clone)]
pub struct RestaurantClient {
    sender: mpsc::Sender<RestaurantRequest>,
}

impl RestaurantClient {
    /// Starts the restaurant's tickers. Returns `false` if it was already open.
    #[tracing::instrument(skip(self))]
    pub async fn open(&self) -> Result<bool, SimulationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RestaurantRequest::Open { respond_to })
            .await
            .map_err(|_| SimulationError::ActorClosed)?;
        response.await.map_err(|_| SimulationError::ActorDropped)
    }

    /// Stops order generation. Returns `false` if it was already closed.
    #[tracing::instrument(skip(self))]
    pub async fn close(&self) -> Result<bool, SimulationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RestaurantRequest::Close { respond_to })
            .await
            .map_err(|_| SimulationError::ActorClosed)?;
        response.await.map_err(|_| SimulationError::ActorDropped)
    }

    pub async fn snapshot(&self) -> Result<RestaurantSnapshot, SimulationError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RestaurantRequest::Snapshot { respond_to })
            .await
            .map_err(|_| SimulationError::ActorClosed)?;
        response.await.map_err(|_| SimulationError::ActorDropped)
    }
}
