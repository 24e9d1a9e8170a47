//! Chat command handlers
//!
//! [`ChatHandler::handle`] is pure with respect to delivery: it returns the
//! replies for one message. [`ChatHandler::respond`] also sends them back to
//! the requester through the service's transport.

use crate::commands::ChatCommand;
use crate::render::{self, Reply};
use rosterlink_core::effects::RegistryEffects;
use rosterlink_core::{RegistryError, RequesterId};
use rosterlink_registry::RegistryService;
use std::sync::Arc;

/// Dispatches chat commands to the registry service
pub struct ChatHandler<E> {
    service: Arc<RegistryService<E>>,
}

impl<E> ChatHandler<E>
where
    E: RegistryEffects,
{
    /// Handler over a shared service
    pub fn new(service: Arc<RegistryService<E>>) -> Self {
        Self { service }
    }

    /// Service the handler dispatches to
    pub fn service(&self) -> &Arc<RegistryService<E>> {
        &self.service
    }

    /// Replies for one message from `from`
    pub async fn handle(&self, from: RequesterId, text: &str) -> Vec<Reply> {
        let command = ChatCommand::parse(text);
        tracing::debug!(requester = %from, ?command, "chat command");
        match self.dispatch(from, command).await {
            Ok(replies) => replies,
            Err(err) => {
                if err.is_operational() {
                    tracing::error!(requester = %from, error = %err, "request failed");
                } else {
                    tracing::info!(requester = %from, outcome = %err, "request refused");
                }
                vec![render::error(&err)]
            }
        }
    }

    /// Handle one message and deliver every reply to `from`.
    ///
    /// Delivery failures are logged and do not stop later replies.
    pub async fn respond(&self, from: RequesterId, text: &str) {
        for reply in self.handle(from, text).await {
            let effects = self.service.effects();
            let sent = match reply {
                Reply::Text(text) => effects.send_text(from, &text).await,
                Reply::File {
                    filename,
                    caption,
                    bytes,
                } => effects.send_file(from, bytes, &filename, &caption).await,
            };
            if let Err(err) = sent {
                tracing::warn!(recipient = %from, error = %err, "reply not delivered");
            }
        }
    }

    async fn dispatch(
        &self,
        from: RequesterId,
        command: ChatCommand,
    ) -> Result<Vec<Reply>, RegistryError> {
        let svc = &self.service;
        let reply = match command {
            ChatCommand::Start => render::welcome(),
            ChatCommand::Result(raw) => render::lookup(&svc.lookup(from, raw.as_deref()).await?),
            ChatCommand::Status => render::status(svc.bind_status(from).await.as_ref()),
            ChatCommand::AddAdmin(target) => {
                render::admin_added(target, svc.add_admin(from, target).await?)
            }
            ChatCommand::RemoveAdmin(target) => {
                svc.remove_admin(from, target).await?;
                render::admin_removed(target)
            }
            ChatCommand::AdminList => render::admin_list(&svc.admin_list().await),
            ChatCommand::Who(record) => render::ownership(&svc.who_owns(from, &record).await?),
            ChatCommand::UnlinkRecord(record) => {
                let owner = svc.unbind_by_record(from, &record).await?;
                render::unlinked(&record, owner)
            }
            ChatCommand::UnlinkRequester(target) => {
                let record = svc.unbind_by_requester(from, target).await?;
                render::unlinked(&record, target)
            }
            ChatCommand::Stats => {
                let stats = svc.stats(from).await?;
                let mut replies = vec![render::stats(&stats)];
                replies.extend(render::offenders(&svc.offenders(from, None).await?));
                return Ok(replies);
            }
            ChatCommand::Find(query) => {
                return Ok(render::search_results(&svc.find_by_name(from, &query).await?));
            }
            ChatCommand::Reset(secret) => {
                svc.reset_all(from, &secret).await?;
                render::reset_done()
            }
            ChatCommand::Usage(usage) => Reply::text(format!("❗ {usage}")),
            ChatCommand::Unknown(name) => render::unknown(&name),
        };
        Ok(vec![reply])
    }
}
