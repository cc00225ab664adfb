use crate::roster::{RegistryError, RosterCommand};
use crate::signaling::Outbound;
use huddle_core::{ConnectionId, Participant, ServerMessage, normalize_identity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Presence registry for the single flat room.
///
/// Owns the roster exclusively; every mutation arrives as a [`RosterCommand`]
/// over one channel, so the uniqueness check and the insert in `join` can
/// never interleave with another writer.
pub struct Roster {
    participants: HashMap<ConnectionId, Participant>,
    command_rx: mpsc::Receiver<RosterCommand>,
    outbound: Arc<dyn Outbound>,
}

impl Roster {
    pub fn new(command_rx: mpsc::Receiver<RosterCommand>, outbound: Arc<dyn Outbound>) -> Self {
        Self {
            participants: HashMap::new(),
            command_rx,
            outbound,
        }
    }

    pub async fn run(mut self) {
        info!("Presence registry event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Presence registry event loop finished");
    }

    async fn handle_command(&mut self, cmd: RosterCommand) {
        match cmd {
            RosterCommand::ValidateName { name, reply } => {
                let _ = reply.send(self.name_is_free(&name, None));
            }

            RosterCommand::Join {
                id,
                name,
                audio_enabled,
                reply,
            } => {
                let _ = reply.send(self.join(id, name, audio_enabled).await);
            }

            RosterCommand::SetAudio { id, audio_enabled } => {
                let Some(participant) = self.participants.get_mut(&id) else {
                    // Already left; a toggle racing a disconnect is benign.
                    debug!("Ignoring audio toggle for unknown connection {id}");
                    return;
                };
                participant.audio_enabled = audio_enabled;
                info!("Participant {id} set audio_enabled={audio_enabled}");

                // Everyone gets the update, the sender included, so all
                // roster views converge on the same state.
                self.broadcast(ServerMessage::ParticipantUpdated { id, audio_enabled }, None)
                    .await;
            }

            RosterCommand::Leave { id } => {
                let Some(participant) = self.participants.remove(&id) else {
                    return;
                };
                info!("Participant {:?} ({id}) left", participant.name);
                self.broadcast(ServerMessage::ParticipantLeft { id }, None).await;
            }

            RosterCommand::Snapshot { reply } => {
                let _ = reply.send(self.participants.values().cloned().collect());
            }
        }
    }

    async fn join(
        &mut self,
        id: ConnectionId,
        name: String,
        audio_enabled: bool,
    ) -> Result<Vec<Participant>, RegistryError> {
        // The caller's own handle is excluded so a participant can re-join
        // (rename) over the same connection.
        if !self.name_is_free(&name, Some(id)) {
            info!("Join rejected for {id}: name {name:?} already taken");
            return Err(RegistryError::NameTaken(name));
        }

        let participant = Participant::new(id, name, audio_enabled);
        info!("Participant {:?} ({id}) joined", participant.name);
        self.participants.insert(id, participant.clone());

        self.broadcast(ServerMessage::ParticipantJoined { participant }, Some(id))
            .await;

        Ok(self.participants.values().cloned().collect())
    }

    fn name_is_free(&self, name: &str, except: Option<ConnectionId>) -> bool {
        let key = normalize_identity(name);
        !self
            .participants
            .iter()
            .any(|(id, p)| Some(*id) != except && p.identity_key() == key)
    }

    async fn broadcast(&self, msg: ServerMessage, except: Option<ConnectionId>) {
        for id in self.participants.keys() {
            if Some(*id) == except {
                continue;
            }
            self.outbound.deliver(*id, msg.clone()).await;
        }
    }
}
