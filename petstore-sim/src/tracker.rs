//! Entity tracker actor
//!
//! All tracked state lives in one task that owns three [`EntitySet`]s and
//! serves commands over an mpsc channel. Workers hold a cheap cloneable
//! [`TrackerHandle`]; every mutation is serialized through the task, so
//! there are no locks and no torn reads in parallel mode.

use crate::entity::{DeletePlan, EntitySet};
use crate::error::SimError;
use petstore_config::SimulationConfig;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Snapshot of how many entities of each kind are tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedCounts {
    pub pets: usize,
    pub users: usize,
    pub orders: usize,
}

/// How many entities of each kind are missing against the minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerShortfall {
    pub pets: usize,
    pub users: usize,
    pub orders: usize,
}

impl TrackerShortfall {
    pub fn is_zero(&self) -> bool {
        self.pets == 0 && self.users == 0 && self.orders == 0
    }
}

enum Command {
    MergePets(Vec<i64>),
    ForgetPet(i64),
    SamplePet(oneshot::Sender<Option<i64>>),
    PlanPetDelete(oneshot::Sender<DeletePlan<i64>>),

    MergeUsers(Vec<String>),
    ForgetUser(String),
    SampleUser(oneshot::Sender<Option<String>>),
    PlanUserDelete(oneshot::Sender<DeletePlan<String>>),

    MergeOrders(Vec<i64>),
    ForgetOrder(i64),
    SampleOrder(oneshot::Sender<Option<i64>>),
    PlanOrderDelete(oneshot::Sender<DeletePlan<i64>>),

    Shortfall(oneshot::Sender<TrackerShortfall>),
    Counts(oneshot::Sender<TrackedCounts>),
}

struct TrackerState {
    pets: EntitySet<i64>,
    users: EntitySet<String>,
    orders: EntitySet<i64>,
}

impl TrackerState {
    fn new(config: &SimulationConfig) -> Self {
        let ceiling = config.protected_ceiling;
        Self {
            pets: EntitySet::new(config.min_pets, (1..=ceiling).map(|id| id as i64)),
            users: EntitySet::new(
                config.min_users,
                (1..=ceiling).map(|n| format!("user{}", n)),
            ),
            orders: EntitySet::new(config.min_orders, (1..=ceiling).map(|id| id as i64)),
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::MergePets(ids) => {
                let added = self.pets.merge(ids);
                if added > 0 {
                    debug!(added, total = self.pets.len(), "tracking new pets");
                }
            }
            Command::ForgetPet(id) => {
                if self.pets.forget(&id) {
                    debug!(pet_id = id, "pet removed from tracking");
                }
            }
            Command::SamplePet(reply) => {
                let _ = reply.send(self.pets.sample());
            }
            Command::PlanPetDelete(reply) => {
                let _ = reply.send(self.pets.deletion_plan());
            }

            Command::MergeUsers(usernames) => {
                let added = self.users.merge(usernames);
                if added > 0 {
                    debug!(added, total = self.users.len(), "tracking new users");
                }
            }
            Command::ForgetUser(username) => {
                if self.users.forget(&username) {
                    debug!(username = %username, "user removed from tracking");
                }
            }
            Command::SampleUser(reply) => {
                let _ = reply.send(self.users.sample());
            }
            Command::PlanUserDelete(reply) => {
                let _ = reply.send(self.users.deletion_plan());
            }

            Command::MergeOrders(ids) => {
                let added = self.orders.merge(ids);
                if added > 0 {
                    debug!(added, total = self.orders.len(), "tracking new orders");
                }
            }
            Command::ForgetOrder(id) => {
                if self.orders.forget(&id) {
                    debug!(order_id = id, "order removed from tracking");
                }
            }
            Command::SampleOrder(reply) => {
                let _ = reply.send(self.orders.sample());
            }
            Command::PlanOrderDelete(reply) => {
                let _ = reply.send(self.orders.deletion_plan());
            }

            Command::Shortfall(reply) => {
                let _ = reply.send(TrackerShortfall {
                    pets: self.pets.shortfall(),
                    users: self.users.shortfall(),
                    orders: self.orders.shortfall(),
                });
            }
            Command::Counts(reply) => {
                let _ = reply.send(TrackedCounts {
                    pets: self.pets.len(),
                    users: self.users.len(),
                    orders: self.orders.len(),
                });
            }
        }
    }
}

/// Handle to the tracker task. Clones share the same state.
#[derive(Clone)]
pub struct TrackerHandle {
    tx: mpsc::Sender<Command>,
}

impl TrackerHandle {
    /// Spawn the tracker task for the given simulation parameters.
    pub fn spawn(config: &SimulationConfig) -> Self {
        let mut state = TrackerState::new(config);
        let (tx, mut rx) = mpsc::channel(64);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                state.apply(command);
            }
            debug!("entity tracker stopped");
        });
        Self { tx }
    }

    async fn send(&self, command: Command) -> Result<(), SimError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| SimError::TrackerClosed)
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(oneshot::Sender<R>) -> Command,
    ) -> Result<R, SimError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| SimError::TrackerClosed)
    }

    pub async fn merge_pets(&self, ids: Vec<i64>) -> Result<(), SimError> {
        self.send(Command::MergePets(ids)).await
    }

    pub async fn pet_created(&self, id: i64) -> Result<(), SimError> {
        self.send(Command::MergePets(vec![id])).await
    }

    pub async fn forget_pet(&self, id: i64) -> Result<(), SimError> {
        self.send(Command::ForgetPet(id)).await
    }

    pub async fn sample_pet(&self) -> Result<Option<i64>, SimError> {
        self.request(Command::SamplePet).await
    }

    pub async fn plan_pet_delete(&self) -> Result<DeletePlan<i64>, SimError> {
        self.request(Command::PlanPetDelete).await
    }

    pub async fn merge_users(&self, usernames: Vec<String>) -> Result<(), SimError> {
        self.send(Command::MergeUsers(usernames)).await
    }

    pub async fn user_created(&self, username: String) -> Result<(), SimError> {
        self.send(Command::MergeUsers(vec![username])).await
    }

    pub async fn forget_user(&self, username: String) -> Result<(), SimError> {
        self.send(Command::ForgetUser(username)).await
    }

    pub async fn sample_user(&self) -> Result<Option<String>, SimError> {
        self.request(Command::SampleUser).await
    }

    pub async fn plan_user_delete(&self) -> Result<DeletePlan<String>, SimError> {
        self.request(Command::PlanUserDelete).await
    }

    pub async fn merge_orders(&self, ids: Vec<i64>) -> Result<(), SimError> {
        self.send(Command::MergeOrders(ids)).await
    }

    pub async fn order_created(&self, id: i64) -> Result<(), SimError> {
        self.send(Command::MergeOrders(vec![id])).await
    }

    pub async fn forget_order(&self, id: i64) -> Result<(), SimError> {
        self.send(Command::ForgetOrder(id)).await
    }

    pub async fn sample_order(&self) -> Result<Option<i64>, SimError> {
        self.request(Command::SampleOrder).await
    }

    pub async fn plan_order_delete(&self) -> Result<DeletePlan<i64>, SimError> {
        self.request(Command::PlanOrderDelete).await
    }

    pub async fn shortfall(&self) -> Result<TrackerShortfall, SimError> {
        self.request(Command::Shortfall).await
    }

    pub async fn counts(&self) -> Result<TrackedCounts, SimError> {
        self.request(Command::Counts).await
    }
}
