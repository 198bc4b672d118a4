//! Application state facade.
//!
//! [`AppState`] composes the account directory, session, booking ledger and
//! notification log, and is the only object a front end talks to.
//!
//! # Concurrency
//!
//! All in-memory state sits behind one async mutex, so mutations run one at a
//! time and finish before the next begins. After mutating, an operation
//! captures serialized copies of the persisted slots while still holding the
//! lock and queues them for a single background writer task. The operation
//! returns as soon as the snapshot is queued and observers are notified;
//! writes land in the order mutations happened. [`AppState::flush`] waits for
//! the queue to drain.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::{Mutex, mpsc, oneshot, watch};
use tracing::{debug, error, info, instrument, warn};

use homeservice_core::{BookingId, BookingStatus, NormalizedEmail};

use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{AccountRecord, Booking, NewAccount, NewBooking, NotificationEntry, UserProfile};
use crate::services::notifications::{booking_cancelled_message, booking_created_message};
use crate::services::{
    AccountDirectory, AccountError, BookingLedger, NotificationLog, Session, filter_by_owner,
};
use crate::storage::{KeyValueStore, SlotKeys};

/// Point-in-time view of the state handed to observers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSnapshot {
    /// Signed-in user, if any.
    pub current_user: Option<UserProfile>,
    /// Every booking, in creation order.
    pub bookings: Vec<Booking>,
    /// Every notification, oldest first.
    pub notifications: Vec<NotificationEntry>,
    /// Number of registered accounts.
    pub account_count: usize,
}

/// Application state shared with the front end.
///
/// This struct is cheaply cloneable via `Arc`; clones share the same state.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    data: Mutex<StateData>,
    keys: SlotKeys,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    loading: AtomicBool,
    snapshots: watch::Sender<Arc<AppSnapshot>>,
    writer: mpsc::UnboundedSender<WriteCommand>,
}

#[derive(Debug, Default)]
struct StateData {
    directory: AccountDirectory,
    session: Session,
    ledger: BookingLedger,
    log: NotificationLog,
}

/// One slot write.
#[derive(Debug)]
struct SlotWrite {
    key: String,
    value: Option<String>,
}

enum WriteCommand {
    Persist(Vec<SlotWrite>),
    Flush(oneshot::Sender<()>),
}

/// Resets the in-flight flag when a load finishes, however it finishes.
struct LoadGuard<'a>(&'a AtomicBool);

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AppState {
    /// Create app state over `store` using the system clock and default slot
    /// names.
    ///
    /// Spawns the persistence writer, so this must be called from within a
    /// Tokio runtime.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_parts(store, Arc::new(SystemClock), SlotKeys::default())
    }

    /// Create app state with an explicit clock.
    #[must_use]
    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_parts(store, clock, SlotKeys::default())
    }

    /// Create app state from configuration.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_parts(config.build_store(), Arc::new(SystemClock), config.slot_keys())
    }

    /// Create app state from all of its parts.
    #[must_use]
    pub fn with_parts(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, keys: SlotKeys) -> Self {
        let (writer, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_writer(Arc::clone(&store), queue));

        let (snapshots, _) = watch::channel(Arc::new(AppSnapshot::default()));

        Self {
            inner: Arc::new(AppStateInner {
                data: Mutex::new(StateData::default()),
                keys,
                store,
                clock,
                loading: AtomicBool::new(false),
                snapshots,
                writer,
            }),
        }
    }

    // =========================================================================
    // Load / Save
    // =========================================================================

    /// Load persisted state.
    ///
    /// Reads accounts, bookings and notifications, then restores the session
    /// against the freshly loaded accounts. A slot that cannot be read or
    /// parsed is logged and loads as empty; the others are unaffected. A call
    /// made while another load is running returns immediately.
    ///
    /// Call once at startup, before any mutation.
    #[instrument(skip(self))]
    pub async fn load(&self) {
        if self
            .inner
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("load already in flight, skipping");
            return;
        }
        let _guard = LoadGuard(&self.inner.loading);

        let keys = &self.inner.keys;
        let directory: AccountDirectory = self.read_slot(&keys.registered_users).await;
        let ledger: BookingLedger = self.read_slot(&keys.bookings).await;
        let log: NotificationLog = self.read_slot(&keys.notifications).await;
        let persisted_email = self.read_session_email().await;

        let mut data = self.inner.data.lock().await;
        data.directory = directory;
        data.ledger = ledger;
        data.log = log;

        let StateData {
            directory, session, ..
        } = &mut *data;
        let restored = session.restore(persisted_email.as_deref(), directory);
        if persisted_email.is_some() && !restored {
            self.enqueue(vec![SlotWrite {
                key: keys.current_user_email.clone(),
                value: None,
            }]);
        }

        info!(
            accounts = data.directory.len(),
            bookings = data.ledger.len(),
            notifications = data.log.len(),
            signed_in = data.session.is_authenticated(),
            "state loaded"
        );
        self.publish(&data);
    }

    /// Persist the current state and wait until it has been written.
    ///
    /// Each slot is written independently: a failed write is logged and does
    /// not undo the others.
    pub async fn save(&self) {
        {
            let data = self.inner.data.lock().await;
            self.enqueue(self.slot_writes(&data));
        }
        self.flush().await;
    }

    /// Wait until every queued write has been attempted.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.inner.writer.send(WriteCommand::Flush(ack)).is_err() {
            warn!("persistence writer stopped, nothing to flush");
            return;
        }
        if done.await.is_err() {
            warn!("persistence writer stopped before flushing");
        }
    }

    // =========================================================================
    // Accounts & Session
    // =========================================================================

    /// Register an account and sign it in.
    ///
    /// An existing account with the same email is replaced; check
    /// [`Self::lookup`] first to reject duplicates.
    #[instrument(skip(self, account), fields(email = %account.email))]
    pub async fn register(&self, account: NewAccount) -> UserProfile {
        let mut data = self.inner.data.lock().await;
        let profile = data.directory.register(account);
        data.session.log_in(profile.clone());
        info!("account registered");
        set_sentry_user(profile.email.as_str());
        self.commit(&data);
        profile
    }

    /// Find an account by email, ignoring case.
    pub async fn lookup(&self, email: &str) -> Option<AccountRecord> {
        self.inner.data.lock().await.directory.lookup(email).cloned()
    }

    /// Check an email/password pair without touching the session.
    pub async fn validate_credentials(&self, email: &str, password: &str) -> bool {
        self.inner
            .data
            .lock()
            .await
            .directory
            .validate_credentials(email, password)
    }

    /// Make `profile` the signed-in user.
    #[instrument(skip(self, profile), fields(email = %profile.email))]
    pub async fn log_in(&self, profile: UserProfile) {
        let mut data = self.inner.data.lock().await;
        set_sentry_user(profile.email.as_str());
        data.session.log_in(profile);
        self.commit(&data);
    }

    /// Validate credentials and sign in on success.
    ///
    /// Returns `None` and leaves the session untouched when the email is
    /// unknown or the password is wrong. A legacy plaintext credential is
    /// re-hashed on successful sign-in.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Option<UserProfile> {
        let mut data = self.inner.data.lock().await;
        if !data.directory.validate_credentials(email, password) {
            info!("sign-in rejected");
            return None;
        }

        let profile = match data.directory.upgrade_legacy_credential(email, password) {
            Some(upgraded) => upgraded,
            None => data.directory.lookup(email)?.profile.clone(),
        };
        data.session.log_in(profile.clone());
        set_sentry_user(profile.email.as_str());
        info!("signed in");
        self.commit(&data);
        Some(profile)
    }

    /// Sign out.
    #[instrument(skip(self))]
    pub async fn log_out(&self) {
        let mut data = self.inner.data.lock().await;
        data.session.log_out();
        clear_sentry_user();
        self.commit(&data);
    }

    /// The signed-in user's profile.
    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.data.lock().await.session.current().cloned()
    }

    /// Update name and phone for `email`. Unknown emails are ignored.
    ///
    /// The session copy follows when `email` is the signed-in user.
    #[instrument(skip(self, name, phone))]
    pub async fn update_profile(&self, email: &str, name: &str, phone: &str) {
        let mut data = self.inner.data.lock().await;
        if let Some(profile) = data.directory.update_profile(email, name, phone) {
            let previous = profile.email.clone();
            data.session.refresh(&previous, &profile);
        }
        self.commit(&data);
    }

    /// Change the email and optionally the password of an account.
    ///
    /// Unknown `old_email` is ignored. The session copy follows when the
    /// account is the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::DuplicateEmail` when `new_email` belongs to a
    /// different account. Nothing changes in that case.
    #[instrument(skip(self, new_password))]
    pub async fn update_email_and_password(
        &self,
        old_email: &str,
        new_email: &str,
        new_password: Option<&str>,
    ) -> Result<(), AccountError> {
        let mut data = self.inner.data.lock().await;
        let updated = data
            .directory
            .update_email_and_password(old_email, new_email, new_password)
            .inspect_err(|e| warn!(error = %e, "email change rejected"))?;

        if let Some(profile) = updated {
            data.session
                .refresh(&NormalizedEmail::new(old_email), &profile);
        }
        self.commit(&data);
        Ok(())
    }

    // =========================================================================
    // Bookings & Notifications
    // =========================================================================

    /// Create a booking.
    ///
    /// With no explicit owner the booking belongs to the signed-in user.
    /// Records a confirmation notification.
    #[instrument(skip(self, input), fields(service = %input.service_name))]
    pub async fn add_booking(&self, input: NewBooking) -> Booking {
        let now = self.inner.clock.now();
        let mut data = self.inner.data.lock().await;

        let owner = data.session.current_email().cloned();
        let booking = data.ledger.add(input, owner.as_ref());
        data.log.record(booking_created_message(&booking), now);

        let id = booking.id().to_string();
        info!(id = %id, "booking created");
        add_breadcrumb("booking", "Booking created", Some(&[("booking_id", id.as_str())]));
        self.commit(&data);
        booking
    }

    /// Cancel a booking.
    ///
    /// The ledger entry with the same ID is flagged cancelled. A cancellation
    /// notification is recorded and state is persisted every time, including
    /// repeat cancellations and bookings the ledger does not know. Returns
    /// whether the ledger had the booking.
    #[instrument(skip(self, booking), fields(id = %booking.id()))]
    pub async fn cancel_booking(&self, booking: &Booking) -> bool {
        let now = self.inner.clock.now();
        let mut data = self.inner.data.lock().await;

        let found = data.ledger.cancel(booking.id()).is_some();
        if !found {
            warn!("cancelled booking is not in the ledger");
        }
        data.log.record(booking_cancelled_message(booking), now);

        let id = booking.id().to_string();
        add_breadcrumb("booking", "Booking cancelled", Some(&[("booking_id", id.as_str())]));
        self.commit(&data);
        found
    }

    /// Find a booking by ID.
    pub async fn booking(&self, id: BookingId) -> Option<Booking> {
        self.inner.data.lock().await.ledger.get(id).cloned()
    }

    /// Every booking, in creation order.
    pub async fn bookings(&self) -> Vec<Booking> {
        self.inner.data.lock().await.ledger.all().to_vec()
    }

    /// Bookings owned by `email`, or all bookings when `email` is `None`.
    pub async fn bookings_for(&self, email: Option<&str>) -> Vec<Booking> {
        let data = self.inner.data.lock().await;
        filter_by_owner(data.ledger.all(), email)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Bookings of the signed-in user, or all bookings when signed out.
    pub async fn bookings_for_current_user(&self) -> Vec<Booking> {
        let data = self.inner.data.lock().await;
        let email = data.session.current_email().map(NormalizedEmail::as_str);
        filter_by_owner(data.ledger.all(), email)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Every notification, oldest first.
    pub async fn notifications(&self) -> Vec<NotificationEntry> {
        self.inner.data.lock().await.log.entries().to_vec()
    }

    /// Status of `booking` right now.
    #[must_use]
    pub fn status_of(&self, booking: &Booking) -> BookingStatus {
        booking.status(self.now())
    }

    /// Current time according to the state's clock.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.clock.now()
    }

    // =========================================================================
    // Observers
    // =========================================================================

    /// Subscribe to state changes.
    ///
    /// The receiver sees a new snapshot after every mutation and after
    /// [`Self::load`].
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<AppSnapshot>> {
        self.inner.snapshots.subscribe()
    }

    /// The most recently published snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppSnapshot> {
        Arc::clone(&self.inner.snapshots.borrow())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Queue persistence of `data` and notify observers.
    fn commit(&self, data: &StateData) {
        self.enqueue(self.slot_writes(data));
        self.publish(data);
    }

    fn publish(&self, data: &StateData) {
        self.inner.snapshots.send_replace(Arc::new(AppSnapshot {
            current_user: data.session.current().cloned(),
            bookings: data.ledger.all().to_vec(),
            notifications: data.log.entries().to_vec(),
            account_count: data.directory.len(),
        }));
    }

    fn enqueue(&self, writes: Vec<SlotWrite>) {
        if writes.is_empty() {
            return;
        }
        if self.inner.writer.send(WriteCommand::Persist(writes)).is_err() {
            error!("persistence writer stopped, changes will not be saved");
        }
    }

    fn slot_writes(&self, data: &StateData) -> Vec<SlotWrite> {
        let keys = &self.inner.keys;
        let mut writes = Vec::with_capacity(4);

        for (key, value) in [
            (&keys.registered_users, encode(&data.directory)),
            (&keys.bookings, encode(&data.ledger)),
            (&keys.notifications, encode(&data.log)),
        ] {
            match value {
                Ok(json) => writes.push(SlotWrite {
                    key: key.clone(),
                    value: Some(json),
                }),
                Err(e) => error!(key = %key, error = %e, "failed to serialize slot, skipping"),
            }
        }

        writes.push(SlotWrite {
            key: keys.current_user_email.clone(),
            value: data
                .session
                .current_email()
                .map(|email| email.as_str().to_owned()),
        });

        writes
    }

    async fn read_slot<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        match self.inner.store.get(key).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(key, error = %e, "persisted slot is malformed, starting empty");
                T::default()
            }),
            Ok(None) => T::default(),
            Err(e) => {
                error!(key, error = %e, "failed to read slot, starting empty");
                T::default()
            }
        }
    }

    /// The session slot holds the bare email string.
    async fn read_session_email(&self) -> Option<String> {
        let key = &self.inner.keys.current_user_email;
        match self.inner.store.get(key).await {
            Ok(value) => value
                .map(|raw| raw.trim().to_owned())
                .filter(|email| !email.is_empty()),
            Err(e) => {
                error!(key = %key, error = %e, "failed to read session slot");
                None
            }
        }
    }
}

fn encode<T: Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(value)
}

/// Drain the write queue in order until every `AppState` handle is gone.
async fn run_writer(
    store: Arc<dyn KeyValueStore>,
    mut queue: mpsc::UnboundedReceiver<WriteCommand>,
) {
    while let Some(command) = queue.recv().await {
        match command {
            WriteCommand::Persist(writes) => {
                for SlotWrite { key, value } in writes {
                    let result = match value {
                        Some(json) => store.set(&key, json).await,
                        None => store.remove(&key).await,
                    };
                    if let Err(e) = result {
                        error!(key = %key, error = %e, "failed to persist slot");
                    }
                }
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("persistence writer stopped");
}
