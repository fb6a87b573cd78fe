use crate::ceremony::{
    CeremonyConsumer, CeremonyError, CeremonyOutcome, Passkey, PasskeyDirectory,
};

/// Local mirror of the member's passkey list on the settings page.
///
/// The server owns the list. This only reflects what `/passkey/list` returned,
/// minus removals and plus registrations that finished since.
pub struct PasskeySettings<D> {
    directory: D,
    passkeys: Vec<Passkey>,
    error: Option<String>,
    loading: bool,
}

impl<D: PasskeyDirectory> PasskeySettings<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            passkeys: Vec::new(),
            error: None,
            loading: true,
        }
    }

    pub fn passkeys(&self) -> &[Passkey] {
        &self.passkeys
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Replace the mirror with the server's current list.
    pub async fn load(&mut self) -> Result<(), CeremonyError> {
        let result = self.directory.list_passkeys().await;
        self.loading = false;
        match result {
            Ok(passkeys) => {
                tracing::debug!("Loaded {} passkeys", passkeys.len());
                self.passkeys = passkeys;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.message().to_string());
                Err(e.log())
            }
        }
    }

    /// Remove a passkey on the server, then drop it from the mirror.
    ///
    /// On failure the mirror is left as it was.
    pub async fn remove(&mut self, id: &str) -> Result<(), CeremonyError> {
        match self.directory.remove_passkey(id).await {
            Ok(()) => {
                if let Some(index) = self.passkeys.iter().position(|p| p.id == id) {
                    self.passkeys.remove(index);
                }
                self.error = None;
                Ok(())
            }
            Err(e) => {
                self.error = Some(e.message().to_string());
                Err(e.log())
            }
        }
    }
}

impl<D: PasskeyDirectory> CeremonyConsumer for PasskeySettings<D> {
    fn completed(&mut self, outcome: &CeremonyOutcome) {
        match outcome {
            CeremonyOutcome::Registered(passkey) => {
                tracing::debug!("Appending new passkey {}", passkey.id);
                self.passkeys.push(passkey.clone());
            }
            CeremonyOutcome::Authenticated => {
                tracing::warn!("Passkey settings received an authentication result");
            }
        }
    }

    fn failed(&mut self, error: &CeremonyError) {
        // The add form shows the message; the list itself stays as rendered.
        tracing::debug!("Adding a passkey failed: {}", error);
    }
}
