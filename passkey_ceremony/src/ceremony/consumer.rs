use super::errors::CeremonyError;
use super::types::Passkey;

/// Terminal artifact of a completed ceremony.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CeremonyOutcome {
    /// Registration finished; the server stored this passkey
    Registered(Passkey),
    /// Authentication finished; the server established a session
    Authenticated,
}

/// Receives the terminal state of each ceremony attempt.
///
/// Exactly one of the two methods is called per attempt. Ignored submissions
/// (another attempt already in flight) are not reported.
pub trait CeremonyConsumer: Send {
    fn completed(&mut self, outcome: &CeremonyOutcome);

    fn failed(&mut self, error: &CeremonyError);
}
