//! The desk: local state plus the three synced collections.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::cache::{CacheError, CachingView, LocalCache};
use super::{BoardSummary, DeskError, DeskState, DeskView};
use crate::client::{Client, ClientUpdate};
use crate::config::DeskConfig;
use crate::order::{next_order_number, Order, OrderUpdate};
use crate::profile::Profile;
use crate::sync::{
    HttpRemote, RemoteCollection, RemoteError, Resource, SyncAdapter, SyncError, Transaction,
};
use crate::ticket::{lifecycle, LifecycleError, NewTicket, Stage, Ticket, TicketEdit, TicketUpdate};

/// Remote side of each collection.
pub struct DeskRemotes {
    pub clients: Arc<dyn RemoteCollection<Client>>,
    pub tickets: Arc<dyn RemoteCollection<Ticket>>,
    pub orders: Arc<dyn RemoteCollection<Order>>,
}

impl DeskRemotes {
    /// All three collections on one HTTP store.
    pub fn http(remote: HttpRemote) -> Self {
        Self {
            clients: Arc::new(remote.clone()),
            tickets: Arc::new(remote.clone()),
            orders: Arc::new(remote),
        }
    }
}

/// Owns the local [`DeskState`] and runs every user action against it.
///
/// Actions mutate locally first, render, then confirm with the remote store.
/// A rejected write is rolled back and the remote message goes to the view.
/// Every action takes `&mut self`, so two actions never interleave.
pub struct Desk {
    state: DeskState,
    profile: Profile,
    view: Arc<dyn DeskView>,
    clients: SyncAdapter<Client>,
    tickets: SyncAdapter<Ticket>,
    orders: SyncAdapter<Order>,
    overdue_highlight: bool,
    today: Option<NaiveDate>,
    /// Converted tickets the remote still holds because their removal failed.
    orphaned: BTreeSet<String>,
}

impl Desk {
    pub fn new(
        profile: Profile,
        view: Arc<dyn DeskView>,
        remotes: DeskRemotes,
        reconcile_after_write: bool,
    ) -> Self {
        Self {
            state: DeskState::default(),
            profile,
            view,
            clients: SyncAdapter::new(remotes.clients, reconcile_after_write),
            tickets: SyncAdapter::new(remotes.tickets, reconcile_after_write),
            orders: SyncAdapter::new(remotes.orders, reconcile_after_write),
            overdue_highlight: true,
            today: None,
            orphaned: BTreeSet::new(),
        }
    }

    /// Build a desk talking HTTP to `config.remote_url`.
    ///
    /// With a `cache_path` the cached state is loaded and every render saves it.
    pub fn from_config(
        config: &DeskConfig,
        profile: Profile,
        view: Arc<dyn DeskView>,
    ) -> Result<Self, CacheError> {
        let remotes = DeskRemotes::http(HttpRemote::new(config.remote_url.clone()));
        let mut desk = Self::new(profile, view, remotes, config.reconcile_after_write)
            .with_overdue_highlight(config.overdue_highlight);

        if let Some(path) = &config.cache_path {
            desk = desk.with_cache(LocalCache::new(path))?;
        }

        info!(remote_url = %config.remote_url, "Desk ready");
        Ok(desk)
    }

    /// Start from the cached state and save it after every render.
    pub fn with_cache(mut self, cache: LocalCache) -> Result<Self, CacheError> {
        self.state = cache.load()?;
        self.view = Arc::new(CachingView::new(self.view, cache));
        Ok(self)
    }

    pub fn with_state(mut self, state: DeskState) -> Self {
        self.state = state;
        self
    }

    pub fn with_overdue_highlight(mut self, enabled: bool) -> Self {
        self.overdue_highlight = enabled;
        self
    }

    /// Pin the date used for new tickets, conversions and overdue checks.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn state(&self) -> &DeskState {
        &self.state
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn summary(&self) -> BoardSummary {
        self.state.summary(self.today(), self.overdue_highlight)
    }

    fn render(&self) {
        self.view.render(&self.state);
    }

    fn reject(&self, err: LifecycleError) -> DeskError {
        let LifecycleError::Validation(message) = err;
        self.validation(message)
    }

    fn validation(&self, message: impl Into<String>) -> DeskError {
        let message = message.into();
        warn!(%message, "Action rejected");
        self.view.notify_failure(&message);
        DeskError::Validation(message)
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Re-read all three collections.
    ///
    /// A collection that fails to load keeps its local copy; the first
    /// failure is reported after the others have been tried.
    pub async fn refresh_all(&mut self) -> Result<(), DeskError> {
        let mut failures: Vec<SyncError> = Vec::new();

        if let Err(source) = self.clients.refresh(&mut self.state).await {
            failures.push(load_failure::<Client>(source));
        }
        if let Err(source) = self.tickets.refresh(&mut self.state).await {
            failures.push(load_failure::<Ticket>(source));
        }
        if let Err(source) = self.orders.refresh(&mut self.state).await {
            failures.push(load_failure::<Order>(source));
        }
        self.retry_orphaned().await;

        self.render();

        match failures.into_iter().next() {
            Some(err) => {
                self.view.notify_failure(err.source.message());
                Err(err.into())
            }
            None => {
                info!(
                    clients = self.state.clients.len(),
                    tickets = self.state.tickets.len(),
                    orders = self.state.orders.len(),
                    "Desk loaded"
                );
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------
    // Tickets
    // ------------------------------------------------------------------

    pub async fn submit_ticket(&mut self, request: NewTicket) -> Result<Ticket, DeskError> {
        let today = self.today();
        let tx = Transaction::begin(&self.state);
        let ticket = lifecycle::submit(&mut self.state, &self.profile, request, today)
            .map_err(|e| self.reject(e))?;
        self.render();

        self.tickets
            .push_create(tx, &mut self.state, self.view.as_ref(), &ticket)
            .await?;
        Ok(ticket)
    }

    pub async fn move_ticket(&mut self, id: &str, stage: Stage) -> Result<(), DeskError> {
        let tx = Transaction::begin(&self.state);
        if !lifecycle::move_to(&mut self.state, id, stage, &self.profile) {
            return Ok(());
        }
        self.render();
        self.push_stamped(tx, id, stage).await
    }

    /// Send a done ticket back to `new`. Other stages are left alone.
    pub async fn reopen_ticket(&mut self, id: &str) -> Result<(), DeskError> {
        let tx = Transaction::begin(&self.state);
        if !lifecycle::reopen(&mut self.state, id, &self.profile) {
            return Ok(());
        }
        self.render();
        self.push_stamped(tx, id, Stage::New).await
    }

    async fn push_stamped(&mut self, tx: Transaction, id: &str, stage: Stage) -> Result<(), DeskError> {
        let Some(ticket) = self.state.ticket(id) else {
            return Ok(());
        };
        let updates = [
            TicketUpdate::Stage(stage),
            TicketUpdate::AssigneeName(ticket.assignee_name.clone()),
            TicketUpdate::AssigneeAvatar(ticket.assignee_avatar.clone()),
        ];
        self.tickets
            .push_updates(tx, &mut self.state, self.view.as_ref(), id, &updates)
            .await?;
        Ok(())
    }

    pub async fn edit_ticket(&mut self, id: &str, edit: TicketEdit) -> Result<(), DeskError> {
        let tx = Transaction::begin(&self.state);
        if !lifecycle::edit(&mut self.state, id, edit).map_err(|e| self.reject(e))? {
            return Ok(());
        }
        self.render();

        let Some(ticket) = self.state.ticket(id) else {
            return Ok(());
        };
        let updates = [
            TicketUpdate::Title(ticket.title.clone()),
            TicketUpdate::Module(ticket.module.clone()),
            TicketUpdate::Reason(ticket.reason.clone()),
            TicketUpdate::Date(ticket.date),
        ];
        self.tickets
            .push_updates(tx, &mut self.state, self.view.as_ref(), id, &updates)
            .await?;
        Ok(())
    }

    pub async fn record_resolution(
        &mut self,
        id: &str,
        problem: Option<String>,
        solution: Option<String>,
    ) -> Result<(), DeskError> {
        let tx = Transaction::begin(&self.state);
        if !lifecycle::record_resolution(&mut self.state, id, problem, solution) {
            return Ok(());
        }
        self.render();

        let Some(ticket) = self.state.ticket(id) else {
            return Ok(());
        };
        let updates = [
            TicketUpdate::Problem(ticket.problem.clone()),
            TicketUpdate::Solution(ticket.solution.clone()),
        ];
        self.tickets
            .push_updates(tx, &mut self.state, self.view.as_ref(), id, &updates)
            .await?;
        Ok(())
    }

    pub async fn delete_ticket(&mut self, id: &str) -> Result<(), DeskError> {
        let tx = Transaction::begin(&self.state);
        if lifecycle::delete(&mut self.state, id).is_none() {
            return Ok(());
        }
        self.render();

        self.tickets
            .push_remove(tx, &mut self.state, self.view.as_ref(), id)
            .await?;
        Ok(())
    }

    /// Turn a done ticket into the next numbered order.
    ///
    /// If the store rejects the order, the ticket comes back at `done` and no
    /// order is left behind. Once the order is confirmed the ticket is removed
    /// remotely; a failure there is reported but the order stays, and the
    /// ticket cannot be converted again. `refresh_all` retries the removal.
    pub async fn convert_to_order(&mut self, id: &str) -> Result<Option<Order>, DeskError> {
        if self.orphaned.contains(id) {
            warn!(ticket_id = %id, "Ticket was already converted, ignoring");
            return Ok(None);
        }

        let today = self.today();
        let tx = Transaction::begin(&self.state);
        let Some(conversion) = lifecycle::convert_to_order(&mut self.state, id, today) else {
            return Ok(None);
        };
        self.render();

        self.orders
            .push_create(tx, &mut self.state, self.view.as_ref(), &conversion.order)
            .await?;

        if let Err(e) = self.tickets.remote().remove(id).await {
            warn!(
                ticket_id = %id,
                order_number = %conversion.order.number,
                error = %e,
                "Order saved but converted ticket could not be removed"
            );
            self.view.notify_failure(e.message());
            self.orphaned.insert(id.to_string());
        }

        Ok(Some(conversion.order))
    }

    /// Remove converted tickets left behind on the remote by a failed
    /// removal, and keep them off the local board until that succeeds.
    async fn retry_orphaned(&mut self) {
        let pending: Vec<String> = self.orphaned.iter().cloned().collect();
        for id in pending {
            match self.tickets.remote().remove(&id).await {
                Ok(()) => {
                    info!(ticket_id = %id, "Converted ticket removed on retry");
                    self.orphaned.remove(&id);
                }
                Err(e) if e.status() == Some(404) => {
                    self.orphaned.remove(&id);
                }
                Err(e) => {
                    warn!(ticket_id = %id, error = %e, "Converted ticket still not removed");
                }
            }
        }

        let orphaned = &self.orphaned;
        self.state.tickets.retain(|t| !orphaned.contains(&t.id));
    }

    // ------------------------------------------------------------------
    // Clients
    // ------------------------------------------------------------------

    /// Insert or replace a client by id.
    ///
    /// The name is required and a non-blank code must not be used by any
    /// other cached client. A blank code is stored as no code.
    pub async fn save_client(&mut self, mut client: Client) -> Result<(), DeskError> {
        client.name = client.name.trim().to_string();
        if client.name.is_empty() {
            return Err(self.validation("Client name is required"));
        }

        client.code = client
            .code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(code) = &client.code {
            let taken = self
                .state
                .clients
                .iter()
                .any(|c| c.id != client.id && c.code.as_ref() == Some(code));
            if taken {
                return Err(self.validation(format!("Client code {} is already in use", code)));
            }
        }

        let tx = Transaction::begin(&self.state);
        match self.state.clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client.clone(),
            None => self.state.clients.push(client.clone()),
        }
        self.render();

        self.clients
            .push_create(tx, &mut self.state, self.view.as_ref(), &client)
            .await?;
        Ok(())
    }

    /// Change one field of a cached client. Unknown ids are a no-op.
    ///
    /// Names must stay non-blank, codes unique among cached clients, and a
    /// blank code clears it.
    pub async fn update_client_field(
        &mut self,
        id: &str,
        update: ClientUpdate,
    ) -> Result<(), DeskError> {
        let update = match update {
            ClientUpdate::Name(name) => {
                let name = name.trim().to_string();
                if name.is_empty() {
                    return Err(self.validation("Client name is required"));
                }
                ClientUpdate::Name(name)
            }
            ClientUpdate::Code(code) => {
                let code = code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
                if let Some(code) = &code {
                    let taken = self
                        .state
                        .clients
                        .iter()
                        .any(|c| c.id != id && c.code.as_ref() == Some(code));
                    if taken {
                        return Err(
                            self.validation(format!("Client code {} is already in use", code))
                        );
                    }
                }
                ClientUpdate::Code(code)
            }
            other => other,
        };

        self.clients
            .update_field(&mut self.state, self.view.as_ref(), id, update)
            .await?;
        Ok(())
    }

    /// `(id, label)` pairs for picking a client, in cache order.
    pub fn client_choices(&self) -> Vec<(String, String)> {
        self.state
            .clients
            .iter()
            .map(|c| (c.id.clone(), c.label()))
            .collect()
    }

    pub async fn delete_client(&mut self, id: &str) -> Result<(), DeskError> {
        self.clients
            .remove(&mut self.state, self.view.as_ref(), id)
            .await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Orders
    // ------------------------------------------------------------------

    /// Create an order directly, numbered after the highest known order.
    pub async fn create_order(
        &mut self,
        title: &str,
        target_date: Option<NaiveDate>,
    ) -> Result<Order, DeskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.validation("Order title is required"));
        }

        let number = next_order_number(&self.state.orders);
        let order = Order::new(number, title, target_date.unwrap_or_else(|| self.today()));
        self.orders
            .create(&mut self.state, self.view.as_ref(), order.clone())
            .await?;
        Ok(order)
    }

    /// Change title and target date. Unknown ids are a no-op.
    pub async fn edit_order(
        &mut self,
        id: &str,
        title: &str,
        target_date: Option<NaiveDate>,
    ) -> Result<(), DeskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(self.validation("Order title is required"));
        }
        if self.state.order(id).is_none() {
            return Ok(());
        }

        let updates = [
            OrderUpdate::Title(title.to_string()),
            OrderUpdate::TargetDate(target_date),
        ];
        let tx = Transaction::begin(&self.state);
        if let Some(order) = self.state.orders.iter_mut().find(|o| o.id == id) {
            for update in &updates {
                update.apply(order);
            }
        }
        self.render();

        self.orders
            .push_updates(tx, &mut self.state, self.view.as_ref(), id, &updates)
            .await?;
        Ok(())
    }

    pub async fn delete_order(&mut self, id: &str) -> Result<(), DeskError> {
        self.orders
            .remove(&mut self.state, self.view.as_ref(), id)
            .await?;
        Ok(())
    }
}

fn load_failure<T: Resource>(source: RemoteError) -> SyncError {
    warn!(collection = T::COLLECTION, error = %source, "Failed to load collection");
    SyncError {
        collection: T::COLLECTION,
        source,
    }
}
