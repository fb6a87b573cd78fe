use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::authenticator::PlatformAuthenticator;
use super::consumer::{CeremonyConsumer, CeremonyOutcome};
use super::errors::{CeremonyError, CeremonyFailure};
use super::transcript::TranscriptClient;
use super::types::{
    AssertionCredential, AttestationCredential, CeremonyKind, PublicKeyCredentialCreationOptions,
    PublicKeyCredentialRequestOptions,
};
use crate::config::{DEFAULT_PREFETCH_MAX_AGE_SECS, PASSKEY_PREFETCH_MAX_AGE};

/// Where a ceremony attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CeremonyState {
    #[default]
    Idle,
    Begun,
    AwaitingAuthenticator,
    Finishing,
    Completed,
    Failed,
}

impl CeremonyState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    fn can_advance_to(self, next: Self) -> bool {
        use CeremonyState::*;
        matches!(
            (self, next),
            (Idle, Begun)
                | (Idle, Failed)
                | (Begun, AwaitingAuthenticator)
                | (AwaitingAuthenticator, Finishing)
                | (AwaitingAuthenticator, Failed)
                | (Finishing, Completed)
                | (Finishing, Failed)
        )
    }
}

/// Registration options fetched ahead of the user's submission.
///
/// Not `Clone`: the challenge inside is consumed by exactly one attempt.
#[derive(Debug)]
pub struct PrefetchedRegistration {
    options: PublicKeyCredentialCreationOptions,
    fetched_at: DateTime<Utc>,
}

impl PrefetchedRegistration {
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    fn is_fresh(&self, max_age: Duration) -> bool {
        Utc::now() - self.fetched_at <= max_age
    }
}

/// What the UI asks the orchestrator to do.
#[derive(Debug)]
pub enum CeremonyRequest {
    Registration {
        name: String,
        prefetched: Option<PrefetchedRegistration>,
    },
    Authentication {
        identifier: String,
    },
}

impl CeremonyRequest {
    pub fn register(name: impl Into<String>) -> Self {
        Self::Registration {
            name: name.into(),
            prefetched: None,
        }
    }

    pub fn register_prefetched(
        prefetched: PrefetchedRegistration,
        name: impl Into<String>,
    ) -> Self {
        Self::Registration {
            name: name.into(),
            prefetched: Some(prefetched),
        }
    }

    pub fn login(identifier: impl Into<String>) -> Self {
        Self::Authentication {
            identifier: identifier.into(),
        }
    }

    pub fn kind(&self) -> CeremonyKind {
        match self {
            Self::Registration { .. } => CeremonyKind::Registration,
            Self::Authentication { .. } => CeremonyKind::Authentication,
        }
    }
}

/// Record of one finished attempt: its id, the states it went through and
/// its result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CeremonyAttempt {
    pub id: u64,
    pub kind: CeremonyKind,
    pub trail: Vec<CeremonyState>,
    pub result: Result<CeremonyOutcome, CeremonyError>,
}

impl CeremonyAttempt {
    /// The terminal state the attempt ended in.
    pub fn state(&self) -> CeremonyState {
        self.trail.last().copied().unwrap_or_default()
    }
}

/// In-progress bookkeeping for an attempt; consumed when it concludes.
struct AttemptTracker {
    id: u64,
    kind: CeremonyKind,
    trail: Vec<CeremonyState>,
}

impl AttemptTracker {
    fn current(&self) -> CeremonyState {
        self.trail.last().copied().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
struct CeremonyContext {
    state: CeremonyState,
    loading: bool,
    errors: Vec<String>,
}

/// Settles the context when an attempt ends, including when its future is
/// dropped mid-flight: loading is cleared and a non-terminal state becomes
/// `Failed`.
struct LoadingGuard<'a>(&'a Mutex<CeremonyContext>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut ctx = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        ctx.loading = false;
        if !ctx.state.is_terminal() {
            tracing::debug!("Ceremony abandoned in state {:?}", ctx.state);
            ctx.state = CeremonyState::Failed;
        }
    }
}

enum DecodedOptions {
    Creation(PublicKeyCredentialCreationOptions),
    Request(PublicKeyCredentialRequestOptions),
}

enum PlatformCredential {
    Attestation(AttestationCredential),
    Assertion(AssertionCredential),
}

fn prefetch_max_age(secs: u64) -> Duration {
    i64::try_from(secs)
        .ok()
        .and_then(Duration::try_seconds)
        .unwrap_or_else(|| {
            tracing::warn!(
                "Invalid prefetch max age: {}. Using default '{}'",
                secs,
                DEFAULT_PREFETCH_MAX_AGE_SECS
            );
            Duration::seconds(DEFAULT_PREFETCH_MAX_AGE_SECS as i64)
        })
}

/// Drives registration and authentication ceremonies.
///
/// Each instance owns its own loading flag and error list, so independent
/// widgets never share state. At most one attempt runs at a time; a second
/// submission while one is pending is ignored.
pub struct CeremonyOrchestrator<T, A> {
    transcript: T,
    authenticator: A,
    attempt_lock: tokio::sync::Mutex<()>,
    context: Mutex<CeremonyContext>,
    last_attempt_id: AtomicU64,
    prefetch_max_age: Duration,
}

impl<T, A> CeremonyOrchestrator<T, A>
where
    T: TranscriptClient,
    A: PlatformAuthenticator,
{
    pub fn new(transcript: T, authenticator: A) -> Self {
        Self {
            transcript,
            authenticator,
            attempt_lock: tokio::sync::Mutex::new(()),
            context: Mutex::new(CeremonyContext::default()),
            last_attempt_id: AtomicU64::new(0),
            prefetch_max_age: prefetch_max_age(*PASSKEY_PREFETCH_MAX_AGE),
        }
    }

    /// Override how long a prefetched registration stays usable.
    pub fn with_prefetch_max_age(mut self, max_age: Duration) -> Self {
        self.prefetch_max_age = max_age;
        self
    }

    /// Whether the login form should be shown at all.
    pub fn login_offered(&self) -> bool {
        self.authenticator.is_available()
    }

    pub fn is_loading(&self) -> bool {
        self.context().loading
    }

    pub fn state(&self) -> CeremonyState {
        self.context().state
    }

    /// Messages of the most recent attempt's failures, oldest first.
    pub fn errors(&self) -> Vec<String> {
        self.context().errors.clone()
    }

    fn context(&self) -> MutexGuard<'_, CeremonyContext> {
        self.context.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch and decode registration options ahead of time.
    ///
    /// The result is handed to [`CeremonyRequest::register_prefetched`]. It is
    /// discarded in favour of a fresh `begin` if it is older than the
    /// configured maximum age by the time it is submitted.
    pub async fn prefetch_registration(&self) -> Result<PrefetchedRegistration, CeremonyError> {
        let options = self.transcript.begin_registration().await?.decode()?;
        tracing::debug!("Prefetched registration options");
        Ok(PrefetchedRegistration {
            options,
            fetched_at: Utc::now(),
        })
    }

    pub async fn login(
        &self,
        identifier: impl Into<String>,
        consumer: &mut dyn CeremonyConsumer,
    ) -> Option<CeremonyAttempt> {
        let request = CeremonyRequest::login(identifier);
        self.submit(request, consumer).await
    }

    pub async fn register(
        &self,
        name: impl Into<String>,
        consumer: &mut dyn CeremonyConsumer,
    ) -> Option<CeremonyAttempt> {
        let request = CeremonyRequest::register(name);
        self.submit(request, consumer).await
    }

    /// Run one ceremony attempt to a terminal state and report it.
    ///
    /// Returns `None` without touching `consumer` when another attempt is
    /// already in flight on this instance.
    pub async fn submit(
        &self,
        request: CeremonyRequest,
        consumer: &mut dyn CeremonyConsumer,
    ) -> Option<CeremonyAttempt> {
        let Ok(_attempt_guard) = self.attempt_lock.try_lock() else {
            tracing::debug!("Ignoring {} submission: attempt in flight", request.kind());
            return None;
        };

        let mut attempt = AttemptTracker {
            id: self.last_attempt_id.fetch_add(1, Ordering::Relaxed) + 1,
            kind: request.kind(),
            trail: vec![CeremonyState::Idle],
        };
        {
            let mut ctx = self.context();
            ctx.state = CeremonyState::Idle;
            ctx.loading = true;
            ctx.errors.clear();
        }
        let _loading = LoadingGuard(&self.context);
        tracing::debug!("Ceremony #{} ({}) started", attempt.id, attempt.kind);

        let result = self.drive(request, &mut attempt).await;

        let terminal = match &result {
            Ok(_) => CeremonyState::Completed,
            Err(_) => CeremonyState::Failed,
        };
        self.advance(&mut attempt, terminal);

        let report = CeremonyAttempt {
            id: attempt.id,
            kind: attempt.kind,
            trail: attempt.trail,
            result,
        };

        match &report.result {
            Ok(outcome) => {
                tracing::info!("Ceremony #{} ({}) completed", report.id, report.kind);
                consumer.completed(outcome);
            }
            Err(err) => {
                let err = err.clone().log();
                self.context().errors.push(err.message().to_string());
                consumer.failed(&err);
            }
        }

        Some(report)
    }

    fn advance(&self, attempt: &mut AttemptTracker, next: CeremonyState) {
        let current = attempt.current();
        debug_assert!(
            current.can_advance_to(next),
            "invalid ceremony transition {current:?} -> {next:?}"
        );
        tracing::debug!(
            "Ceremony #{} ({}): {:?} -> {:?}",
            attempt.id,
            attempt.kind,
            current,
            next
        );
        attempt.trail.push(next);
        self.context().state = next;
    }

    /// begin → authenticator → finish, strictly in that order.
    async fn drive(
        &self,
        mut request: CeremonyRequest,
        attempt: &mut AttemptTracker,
    ) -> Result<CeremonyOutcome, CeremonyError> {
        let options = self.begin(&mut request).await?;
        self.advance(attempt, CeremonyState::Begun);

        self.advance(attempt, CeremonyState::AwaitingAuthenticator);
        let credential = self.invoke_authenticator(attempt.kind, options).await?;

        self.advance(attempt, CeremonyState::Finishing);
        self.finish(request, credential).await
    }

    async fn begin(&self, request: &mut CeremonyRequest) -> Result<DecodedOptions, CeremonyError> {
        match request {
            CeremonyRequest::Registration { prefetched, .. } => {
                let options = match prefetched.take() {
                    Some(p) if p.is_fresh(self.prefetch_max_age) => {
                        tracing::debug!(
                            "Using registration options prefetched at {}",
                            p.fetched_at
                        );
                        p.options
                    }
                    stale => {
                        if let Some(p) = stale {
                            tracing::debug!(
                                "Discarding registration options prefetched at {}",
                                p.fetched_at
                            );
                        }
                        self.transcript.begin_registration().await?.decode()?
                    }
                };
                Ok(DecodedOptions::Creation(options))
            }
            CeremonyRequest::Authentication { identifier } => {
                let options = self
                    .transcript
                    .begin_authentication(identifier)
                    .await?
                    .decode()?;
                Ok(DecodedOptions::Request(options))
            }
        }
    }

    async fn invoke_authenticator(
        &self,
        kind: CeremonyKind,
        options: DecodedOptions,
    ) -> Result<PlatformCredential, CeremonyError> {
        let credential = match options {
            DecodedOptions::Creation(options) => self
                .authenticator
                .create(&options)
                .await
                .map(PlatformCredential::Attestation),
            DecodedOptions::Request(options) => self
                .authenticator
                .get(&options)
                .await
                .map(PlatformCredential::Assertion),
        };
        credential.map_err(|rejection| CeremonyFailure::Authenticator { kind, rejection }.into())
    }

    async fn finish(
        &self,
        request: CeremonyRequest,
        credential: PlatformCredential,
    ) -> Result<CeremonyOutcome, CeremonyError> {
        match (request, credential) {
            (CeremonyRequest::Registration { name, .. }, PlatformCredential::Attestation(cred)) => {
                let payload = cred.into_finish_request(name);
                let passkey = self.transcript.finish_registration(&payload).await?;
                Ok(CeremonyOutcome::Registered(passkey))
            }
            (
                CeremonyRequest::Authentication { identifier },
                PlatformCredential::Assertion(cred),
            ) => {
                let payload = cred.into_finish_request(identifier);
                self.transcript.finish_authentication(&payload).await?;
                Ok(CeremonyOutcome::Authenticated)
            }
            _ => Err(CeremonyFailure::Unexpected(
                "Credential does not match the ceremony variant".to_string(),
            )
            .into()),
        }
    }
}
