// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex, MutexGuard, RwLock},
};

use alloy::primitives::{Address, B256};
use arena_coprocessor::{DecryptionAuthorization, DecryptionBackend, UserDecryptRequest};
use arena_events::{
    ArenaError, AuthorizationGranted, AuthorizationRevoked, CiphertextHandle, ClearValue,
    EventBus, HistoryDecrypted,
};
use arena_utils::Clock;
use tracing::{info, instrument, warn};

use crate::{
    authorization_key, AuthorizationCache, AuthorizationKey, AuthorizationState, CacheLookup,
    SigningCapability, StatusBoard,
};

pub const DEFAULT_AUTHORIZATION_DAYS: u64 = 365;
const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// One handle to decrypt, together with the contract it was granted to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DecryptionRequest {
    pub handle: CiphertextHandle,
    pub contract: Address,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupFailure {
    pub contract: Address,
    pub user: Address,
    pub error: ArenaError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecryptionResult {
    pub values: HashMap<CiphertextHandle, ClearValue>,
    pub failures: Vec<GroupFailure>,
}

impl DecryptionResult {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Default)]
struct ManagerState {
    cache: AuthorizationCache,
    in_flight: bool,
}

struct Inner {
    backend: Arc<dyn DecryptionBackend>,
    signer: RwLock<Option<Arc<dyn SigningCapability>>>,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    board: StatusBoard,
    lifetime_secs: u64,
    state: Mutex<ManagerState>,
}

/// Obtains, caches and uses decryption authorizations, one per `(contract, user)`.
///
/// Authorizations only ever live in this manager's memory.
#[derive(Clone)]
pub struct DecryptionManager {
    inner: Arc<Inner>,
}

struct InFlightGuard<'a> {
    manager: &'a DecryptionManager,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.manager.inner.state.lock() {
            state.in_flight = false;
        }
        self.manager.inner.board.update(|s| s.is_decrypting = false);
    }
}

/// Puts a pair back to Unauthorized unless the prompt completed.
struct AuthorizingGuard<'a> {
    manager: &'a DecryptionManager,
    key: AuthorizationKey,
    completed: bool,
}

impl Drop for AuthorizingGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        if let Ok(mut state) = self.manager.inner.state.lock() {
            state
                .cache
                .set_state(self.key, AuthorizationState::Unauthorized);
        }
    }
}

impl DecryptionManager {
    pub fn new(
        backend: Arc<dyn DecryptionBackend>,
        clock: Arc<dyn Clock>,
        bus: EventBus,
        board: StatusBoard,
        authorization_days: u64,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                signer: RwLock::new(None),
                clock,
                bus,
                board,
                lifetime_secs: authorization_days.saturating_mul(SECONDS_PER_DAY),
                state: Mutex::new(ManagerState::default()),
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, ManagerState>, ArenaError> {
        self.inner
            .state
            .lock()
            .map_err(|_| ArenaError::DecryptionBackendError("decryption state poisoned".into()))
    }

    pub fn set_signer(&self, signer: Option<Arc<dyn SigningCapability>>) {
        if let Ok(mut current) = self.inner.signer.write() {
            *current = signer;
        }
    }

    pub fn signer(&self) -> Option<Arc<dyn SigningCapability>> {
        self.inner.signer.read().ok().and_then(|s| s.clone())
    }

    pub fn is_decrypting(&self) -> bool {
        self.lock().map(|s| s.in_flight).unwrap_or(false)
    }

    pub fn message(&self) -> String {
        self.inner.board.status()
    }

    pub fn results(&self) -> HashMap<CiphertextHandle, ClearValue> {
        self.inner.board.snapshot().results
    }

    pub fn authorization_state(&self, contract: Address, user: Address) -> AuthorizationState {
        let now = self.inner.clock.now();
        self.lock()
            .map(|s| s.cache.state(authorization_key(contract, user), now))
            .unwrap_or(AuthorizationState::Unauthorized)
    }

    /// Whether `decrypt` could run right now for this batch.
    pub fn can_decrypt(&self, requests: &[DecryptionRequest]) -> bool {
        !requests.is_empty() && !self.is_decrypting() && self.signer().is_some()
    }

    /// Drop the cached authorization for the pair. Returns whether one was held.
    pub fn revoke(&self, contract: Address, user: Address) -> bool {
        let key = authorization_key(contract, user);
        let removed = self
            .lock()
            .map(|mut s| s.cache.evict(key, AuthorizationState::Revoked))
            .unwrap_or(false);
        if removed {
            info!(%contract, %user, "decryption authorization revoked");
            self.inner.bus.publish(AuthorizationRevoked {
                user,
                contract,
                expired: false,
            });
        }
        removed
    }

    fn begin(&self) -> Result<InFlightGuard<'_>, ArenaError> {
        {
            let mut state = self.lock()?;
            if state.in_flight {
                return Err(ArenaError::DecryptionInFlight);
            }
            state.in_flight = true;
        }
        self.inner.board.update(|s| {
            s.is_decrypting = true;
            s.can_decrypt = false;
        });
        Ok(InFlightGuard { manager: self })
    }

    /// Decrypt a batch, prompting for authorizations as needed.
    ///
    /// Groups that fail are reported in the result next to the values that did decrypt.
    #[instrument(name = "decrypt", skip_all, fields(requests = requests.len()))]
    pub async fn decrypt(
        &self,
        requests: &[DecryptionRequest],
    ) -> Result<DecryptionResult, ArenaError> {
        if requests.is_empty() {
            return Ok(DecryptionResult::default());
        }
        let (signer, _flight) = match self.signer() {
            None => Err(ArenaError::NoCapability("no signer connected".into())),
            Some(signer) => self.begin().map(|flight| (signer, flight)),
        }
        .inspect_err(|err| {
            self.inner
                .board
                .set_status(format!("Decryption failed: {err}"))
        })?;
        let user = signer.address();

        let mut groups: BTreeMap<Address, Vec<CiphertextHandle>> = BTreeMap::new();
        for request in requests {
            let group = groups.entry(request.contract).or_default();
            if !group.contains(&request.handle) {
                group.push(request.handle);
            }
        }

        let mut result = DecryptionResult::default();
        for (contract, handles) in groups {
            match self.decrypt_group(&signer, contract, user, &handles).await {
                Ok(values) => {
                    self.inner.bus.publish(HistoryDecrypted {
                        user,
                        contract,
                        count: values.len(),
                    });
                    result.values.extend(values);
                }
                Err(error) => {
                    warn!(%contract, %user, "decryption failed: {error}");
                    self.inner.bus.err(&error);
                    result.failures.push(GroupFailure {
                        contract,
                        user,
                        error,
                    });
                }
            }
        }

        let status = match result.failures.first() {
            None => "Decryption completed!".to_string(),
            Some(failure) => format!("Decryption failed: {}", failure.error),
        };
        let values = result.values.clone();
        self.inner.board.update(|s| {
            if s.user == Some(user) {
                s.results.extend(values);
            }
            s.status = status;
        });
        Ok(result)
    }

    async fn decrypt_group(
        &self,
        signer: &Arc<dyn SigningCapability>,
        contract: Address,
        user: Address,
        handles: &[CiphertextHandle],
    ) -> Result<HashMap<CiphertextHandle, ClearValue>, ArenaError> {
        let authorization = self.ensure_authorized(signer, contract, user).await?;
        self.inner
            .board
            .set_status(format!("Decrypting {} handle(s)...", handles.len()));

        match self.inner.backend.user_decrypt(handles, &authorization).await {
            Err(err @ ArenaError::AuthorizationDenied(_)) => {
                // Rejected by the backend, so it must not be offered again.
                if let Ok(mut state) = self.lock() {
                    state.cache.evict(
                        authorization_key(contract, user),
                        AuthorizationState::Unauthorized,
                    );
                }
                Err(err)
            }
            other => other,
        }
    }

    async fn ensure_authorized(
        &self,
        signer: &Arc<dyn SigningCapability>,
        contract: Address,
        user: Address,
    ) -> Result<DecryptionAuthorization, ArenaError> {
        let key = authorization_key(contract, user);
        let now = self.inner.clock.now();
        let lookup = self.lock()?.cache.lookup(key, now);
        match lookup {
            CacheLookup::Valid(auth) => return Ok(auth),
            CacheLookup::Expired(auth) => {
                info!(%contract, %user, expired_at = auth.expires_at(), "decryption authorization expired");
                self.inner.bus.publish(AuthorizationRevoked {
                    user,
                    contract,
                    expired: true,
                });
            }
            CacheLookup::Missing => {}
        }

        self.lock()?
            .cache
            .set_state(key, AuthorizationState::Authorizing);
        let mut guard = AuthorizingGuard {
            manager: self,
            key,
            completed: false,
        };
        self.inner
            .board
            .set_status("Signing decryption authorization...");

        let domain = self.inner.backend.authorization_domain();
        let request = UserDecryptRequest::build(
            user,
            contract,
            now,
            self.inner.lifetime_secs,
            B256::from(rand::random::<[u8; 32]>()),
        );
        let signature = signer
            .sign_authorization(&request, &domain)
            .await
            .map_err(|e| match e {
                ArenaError::AuthorizationDenied(_) => e,
                other => ArenaError::AuthorizationDenied(other.to_string()),
            })?;
        let authorization = DecryptionAuthorization::new(request, signature);
        let recovered = authorization.recover_signer(&domain)?;
        if recovered != user {
            return Err(ArenaError::AuthorizationDenied(format!(
                "authorization signed by {recovered}, expected {user}"
            )));
        }

        self.lock()?.cache.insert(authorization.clone());
        guard.completed = true;
        info!(%contract, %user, expires_at = authorization.expires_at(), "decryption authorized");
        self.inner.bus.publish(AuthorizationGranted {
            user,
            contract,
            expires_at: authorization.expires_at(),
        });
        Ok(authorization)
    }
}
