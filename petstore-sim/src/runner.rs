//! Simulation runner
//!
//! Drives the weighted operation loop against one [`PetstoreClient`],
//! reconciling the tracker on every outcome and re-enforcing population
//! minimums periodically. Sequential mode checks minimums every N
//! operations; parallel mode runs worker tasks plus a supervisor that
//! checks on an interval.

use crate::error::SimError;
use crate::generate;
use crate::metrics::Metrics;
use crate::ops::{OpKind, WeightedTable};
use crate::tracker::{TrackedCounts, TrackerHandle};
use petstore_client::models::PetStatus;
use petstore_client::outcome::Outcome;
use petstore_client::PetstoreClient;
use petstore_config::SimulationConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct Simulator {
    client: PetstoreClient,
    tracker: TrackerHandle,
    metrics: Arc<Metrics>,
    table: WeightedTable,
    config: SimulationConfig,
    stop: AtomicBool,
}

impl Simulator {
    /// The client must already carry `metrics` as its request observer;
    /// the runner only reads the counters for the final report.
    pub fn new(client: PetstoreClient, metrics: Arc<Metrics>, config: SimulationConfig) -> Self {
        let tracker = TrackerHandle::spawn(&config);
        Self {
            client,
            tracker,
            metrics,
            table: WeightedTable::standard(),
            config,
            stop: AtomicBool::new(false),
        }
    }

    pub fn tracker(&self) -> &TrackerHandle {
        &self.tracker
    }

    /// Ask the run loops to wind down after their current operation.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Discover existing entities, then create whatever is missing.
    pub async fn initialize(&self) -> Result<(), SimError> {
        info!("initializing simulation state");
        self.refresh_state().await?;
        self.ensure_minimum_entities().await?;
        info!("initialization complete");
        Ok(())
    }

    /// Probe the API for entities that already exist and track them.
    ///
    /// Pets are discoverable through findByStatus; users and orders have
    /// no list endpoint, so a few low ids are probed directly.
    async fn refresh_state(&self) -> Result<(), SimError> {
        if let Outcome::Success {
            body: Some(inventory),
            ..
        } = self.client.inventory().await
        {
            let total: i64 = inventory
                .as_object()
                .map(|counts| counts.values().filter_map(|v| v.as_i64()).sum())
                .unwrap_or(0);
            info!(total_pets = total, "inventory probe");
        }

        for status in PetStatus::all() {
            if let Outcome::Success {
                body: Some(pets), ..
            } = self.client.find_pets_by_status(*status).await
            {
                let ids: Vec<i64> = pets.iter().filter_map(|pet| pet.id).collect();
                self.tracker.merge_pets(ids).await?;
            }
        }

        for order_id in 1..=3 {
            if let Outcome::Success {
                body: Some(order), ..
            } = self.client.get_order(order_id).await
            {
                if let Some(id) = order.id {
                    self.tracker.merge_orders(vec![id]).await?;
                }
            }
        }

        for n in 1..=3 {
            let username = format!("user{}", n);
            if let Outcome::Success {
                body: Some(user), ..
            } = self.client.get_user(&username).await
            {
                self.tracker.merge_users(vec![user.username]).await?;
            }
        }

        let counts = self.tracker.counts().await?;
        info!(
            pets = counts.pets,
            users = counts.users,
            orders = counts.orders,
            "current tracked state"
        );
        Ok(())
    }

    /// Create entities until every population meets its minimum.
    ///
    /// Pets come first so order creation has pets to reference.
    pub async fn ensure_minimum_entities(&self) -> Result<(), SimError> {
        let shortfall = self.tracker.shortfall().await?;
        if shortfall.is_zero() {
            return Ok(());
        }

        if shortfall.pets > 0 {
            info!(count = shortfall.pets, "creating pets to meet minimum");
            for _ in 0..shortfall.pets {
                self.create_random_pet().await?;
            }
        }

        if shortfall.users > 0 {
            info!(count = shortfall.users, "creating users to meet minimum");
            for _ in 0..shortfall.users {
                self.create_random_user().await?;
            }
        }

        if shortfall.orders > 0 {
            if self.tracker.counts().await?.pets == 0 {
                warn!("cannot create orders: no pets tracked");
            } else {
                info!(count = shortfall.orders, "creating orders to meet minimum");
                for _ in 0..shortfall.orders {
                    self.create_random_order().await?;
                }
            }
        }
        Ok(())
    }

    async fn create_random_pet(&self) -> Result<Option<i64>, SimError> {
        let pet = generate::random_pet();
        if let Outcome::Success {
            body: Some(created),
            ..
        } = self.client.create_pet(&pet).await
        {
            if let Some(id) = created.id {
                self.tracker.pet_created(id).await?;
                info!(pet_id = id, name = %pet.name, "created new pet");
                return Ok(Some(id));
            }
            warn!("created pet but response carried no id");
        }
        Ok(None)
    }

    async fn create_random_user(&self) -> Result<Option<String>, SimError> {
        let user = generate::random_user();
        if self.client.create_user(&user).await.is_success() {
            self.tracker.user_created(user.username.clone()).await?;
            info!(username = %user.username, "created new user");
            return Ok(Some(user.username));
        }
        Ok(None)
    }

    async fn create_random_order(&self) -> Result<Option<i64>, SimError> {
        let pet_id = match self.tracker.sample_pet().await? {
            Some(id) => id,
            None => {
                warn!("cannot create order: no pets tracked");
                return Ok(None);
            }
        };
        let order = generate::random_order(pet_id);
        if let Outcome::Success {
            body: Some(created),
            ..
        } = self.client.create_order(&order).await
        {
            if let Some(id) = created.id {
                self.tracker.order_created(id).await?;
                info!(order_id = id, pet_id, "created new order");
                return Ok(Some(id));
            }
            warn!("created order but response carried no id");
        }
        Ok(None)
    }

    /// Execute one operation from the weighted table.
    ///
    /// Operations that need an existing entity fall back to creating one
    /// when nothing is tracked. A 404 on a tracked id removes it.
    pub async fn execute(&self, op: OpKind) -> Result<(), SimError> {
        debug!(op = %op, "executing operation");
        match op {
            OpKind::CreatePet => {
                self.create_random_pet().await?;
            }
            OpKind::UpdatePet => match self.tracker.sample_pet().await? {
                Some(pet_id) => self.update_pet(pet_id).await?,
                None => {
                    self.create_random_pet().await?;
                }
            },
            OpKind::DeletePet => self.delete_pet().await?,
            OpKind::GetPet => match self.tracker.sample_pet().await? {
                Some(pet_id) => {
                    if self.client.get_pet(pet_id).await.is_not_found() {
                        self.tracker.forget_pet(pet_id).await?;
                    }
                }
                None => {
                    self.create_random_pet().await?;
                }
            },
            OpKind::FindPetsByStatus => {
                let status = generate::random_pet_status();
                if let Outcome::Success {
                    body: Some(pets), ..
                } = self.client.find_pets_by_status(status).await
                {
                    info!(count = pets.len(), status = %status, "found pets by status");
                }
            }
            OpKind::FindPetsByTags => {
                let tags = generate::random_tag_names();
                if let Outcome::Success {
                    body: Some(pets), ..
                } = self.client.find_pets_by_tags(&tags).await
                {
                    info!(count = pets.len(), tags = ?tags, "found pets by tags");
                }
            }
            OpKind::CreateUser => {
                self.create_random_user().await?;
            }
            OpKind::UpdateUser => match self.tracker.sample_user().await? {
                Some(username) => {
                    let update = generate::random_user_update(&username);
                    if self.client.update_user(&username, &update).await.is_not_found() {
                        self.tracker.forget_user(username).await?;
                    }
                }
                None => {
                    self.create_random_user().await?;
                }
            },
            OpKind::DeleteUser => self.delete_user().await?,
            OpKind::GetUser => match self.tracker.sample_user().await? {
                Some(username) => {
                    if self.client.get_user(&username).await.is_not_found() {
                        self.tracker.forget_user(username).await?;
                    }
                }
                None => {
                    self.create_random_user().await?;
                }
            },
            OpKind::LoginUser => match self.tracker.sample_user().await? {
                Some(username) => {
                    let _ = self
                        .client
                        .login(&username, generate::DEFAULT_PASSWORD)
                        .await;
                }
                None => {
                    self.create_random_user().await?;
                }
            },
            OpKind::LogoutUser => {
                let _ = self.client.logout().await;
            }
            OpKind::CreateOrder => {
                self.create_random_order().await?;
            }
            OpKind::GetOrder => match self.tracker.sample_order().await? {
                Some(order_id) => {
                    if self.client.get_order(order_id).await.is_not_found() {
                        self.tracker.forget_order(order_id).await?;
                    }
                }
                None => {
                    self.create_random_order().await?;
                }
            },
            OpKind::DeleteOrder => self.delete_order().await?,
            OpKind::GetInventory => {
                let _ = self.client.inventory().await;
            }
        }
        Ok(())
    }

    async fn update_pet(&self, pet_id: i64) -> Result<(), SimError> {
        let mut pet = match self.client.get_pet(pet_id).await {
            Outcome::Success {
                body: Some(pet), ..
            } => pet,
            Outcome::NotFound => {
                self.tracker.forget_pet(pet_id).await?;
                return Ok(());
            }
            _ => return Ok(()),
        };

        pet.status = Some(generate::random_pet_status());
        pet.name = generate::random_pet_name().to_string();
        if fastrand::f64() < 0.3 {
            pet.category = Some(generate::random_category());
        }

        if self.client.update_pet(&pet).await.is_success() {
            info!(pet_id, "updated pet");
        }
        Ok(())
    }

    async fn delete_pet(&self) -> Result<(), SimError> {
        use crate::entity::DeletePlan;
        let pet_id = match self.tracker.plan_pet_delete().await? {
            DeletePlan::Delete(id) => id,
            DeletePlan::CreateInstead => {
                debug!("pet population at floor, creating instead of deleting");
                self.create_random_pet().await?;
                return Ok(());
            }
            DeletePlan::Skip => {
                debug!("no pets available to delete");
                return Ok(());
            }
        };

        let outcome = self.client.delete_pet(pet_id).await;
        // The id leaves tracking either way: deleted remotely, proven
        // absent by a 404, or too unreliable to keep serving traffic.
        self.tracker.forget_pet(pet_id).await?;
        if outcome.is_success() {
            info!(pet_id, "deleted pet");
        } else {
            warn!(pet_id, "failed to delete pet, removed from tracking");
        }
        Ok(())
    }

    async fn delete_user(&self) -> Result<(), SimError> {
        use crate::entity::DeletePlan;
        let username = match self.tracker.plan_user_delete().await? {
            DeletePlan::Delete(username) => username,
            DeletePlan::CreateInstead => {
                debug!("user population at floor, creating instead of deleting");
                self.create_random_user().await?;
                return Ok(());
            }
            DeletePlan::Skip => {
                debug!("no users available to delete");
                return Ok(());
            }
        };

        let outcome = self.client.delete_user(&username).await;
        if outcome.is_success() || outcome.is_not_found() {
            self.tracker.forget_user(username.clone()).await?;
            info!(username = %username, "deleted user");
        }
        Ok(())
    }

    async fn delete_order(&self) -> Result<(), SimError> {
        use crate::entity::DeletePlan;
        let order_id = match self.tracker.plan_order_delete().await? {
            DeletePlan::Delete(id) => id,
            DeletePlan::CreateInstead => {
                debug!("order population at floor, creating instead of deleting");
                self.create_random_order().await?;
                return Ok(());
            }
            DeletePlan::Skip => {
                debug!("no orders available to delete");
                return Ok(());
            }
        };

        let outcome = self.client.delete_order(order_id).await;
        if outcome.is_success() || outcome.is_not_found() {
            self.tracker.forget_order(order_id).await?;
            info!(order_id, "deleted order");
        }
        Ok(())
    }

    /// Run until the configured duration elapses or a stop is requested.
    /// Returns the number of operations performed.
    pub async fn run(self: Arc<Self>) -> Result<u64, SimError> {
        let deadline = Instant::now() + self.config.duration;
        let interval = Duration::from_secs_f64(60.0 / self.config.operations_per_minute as f64);

        if self.config.parallel == 0 {
            info!(
                duration_secs = self.config.duration.as_secs(),
                rate = self.config.operations_per_minute,
                "starting sequential simulation"
            );
            self.run_sequential(deadline, interval).await
        } else {
            info!(
                duration_secs = self.config.duration.as_secs(),
                rate = self.config.operations_per_minute,
                workers = self.config.parallel,
                "starting parallel simulation"
            );
            self.run_parallel(deadline, interval).await
        }
    }

    async fn run_sequential(&self, deadline: Instant, interval: Duration) -> Result<u64, SimError> {
        let mut count: u64 = 0;
        while Instant::now() < deadline && !self.stop_requested() {
            self.execute(self.table.pick()).await?;
            count += 1;
            if count % self.config.maintenance_every_ops == 0 {
                self.ensure_minimum_entities().await?;
            }
            tokio::time::sleep(interval).await;
        }
        info!(operations = count, "simulation completed");
        Ok(count)
    }

    async fn run_parallel(
        self: Arc<Self>,
        deadline: Instant,
        interval: Duration,
    ) -> Result<u64, SimError> {
        let mut workers = Vec::with_capacity(self.config.parallel);
        for worker_id in 0..self.config.parallel {
            let sim = Arc::clone(&self);
            workers.push(tokio::spawn(async move {
                let mut count: u64 = 0;
                while Instant::now() < deadline && !sim.stop_requested() {
                    if let Err(e) = sim.execute(sim.table.pick()).await {
                        warn!(worker_id, error = %e, "worker stopping");
                        break;
                    }
                    count += 1;
                    tokio::time::sleep(interval).await;
                }
                count
            }));
        }

        // Supervisor keeps the minimums enforced while workers run.
        while Instant::now() < deadline && !self.stop_requested() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(remaining.min(self.config.maintenance_interval)).await;
            if Instant::now() >= deadline || self.stop_requested() {
                break;
            }
            self.ensure_minimum_entities().await?;
        }

        let mut total: u64 = 0;
        for worker in workers {
            total += worker
                .await
                .map_err(|e| SimError::WorkerPanic(e.to_string()))?;
        }
        info!(operations = total, "parallel simulation completed");
        Ok(total)
    }

    /// Final metrics report with the tracked entity counts appended.
    pub async fn final_report(&self) -> Result<String, SimError> {
        let counts: TrackedCounts = self.tracker.counts().await?;
        Ok(self.metrics.summary(&counts))
    }
}
