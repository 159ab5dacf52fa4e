//! The actor that drives a session against a renderer.

use std::collections::VecDeque;

use futures::StreamExt;
use futures::channel::mpsc;

use crate::renderer::Renderer;
use crate::session::{Effect, EditorEvent, Reaction, RenderReply, RenderRequest, Session};

/// Answers a render request.
pub async fn fulfil(renderer: &dyn Renderer, request: RenderRequest) -> RenderReply {
    match request {
        RenderRequest::Brackets { content } => {
            let result = renderer.find_bracket_pairs(&content).await;
            RenderReply::Brackets { content, result }
        }
        RenderRequest::Preview(request) => {
            let result = renderer
                .render(&request.source, request.kind, &request.processor)
                .await;
            RenderReply::Preview {
                ticket: request.ticket,
                result,
            }
        }
    }
}

/// A session whose render requests are answered in place.
pub struct SessionActor<R> {
    session: Session,
    renderer: R,
}

impl<R: Renderer> SessionActor<R> {
    /// Creates an actor rendering with `renderer`.
    pub fn new(session: Session, renderer: R) -> Self {
        Self { session, renderer }
    }

    /// The driven session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handles an event, answering every render it requests.
    ///
    /// The returned reaction holds no [`Effect::Request`]: each request is
    /// rendered and its answer fed back to the session, whose effects are
    /// appended in turn.
    pub async fn dispatch(&mut self, event: EditorEvent) -> Reaction {
        let mut reaction = self.session.handle(event);
        let mut queue = VecDeque::from(std::mem::take(&mut reaction.effects));
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Request(request) => {
                    let reply = fulfil(&self.renderer, request).await;
                    let answer = self.session.handle(EditorEvent::Rendered(reply));
                    queue.extend(answer.effects);
                }
                effect => reaction.effects.push(effect),
            }
        }
        reaction
    }

    /// Serves events until the sender side is dropped or the editor closes.
    pub async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<EditorEvent>,
        reactions: mpsc::UnboundedSender<Reaction>,
    ) {
        while let Some(event) = events.next().await {
            let closing = event == EditorEvent::Close;
            let reaction = self.dispatch(event).await;
            if reactions.unbounded_send(reaction).is_err() {
                log::info!("reaction receiver dropped, stopping session");
                return;
            }
            if closing {
                break;
            }
        }
        log::info!("session closed");
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use mathmate_query::NoScripts;

    use super::*;
    use crate::config::MathmateConfig;
    use crate::prelude::*;
    use crate::renderer::LocalRenderer;
    use crate::session::EditorSnapshot;

    fn actor() -> SessionActor<LocalRenderer> {
        let session = Session::new(MathmateConfig::default(), Box::new(NoScripts));
        SessionActor::new(session, LocalRenderer)
    }

    #[test]
    fn requests_are_answered_in_place() {
        let mut actor = actor();
        let snapshot = EditorSnapshot::new("$f(x)$", EditorPosition::new(0, 3));
        let reaction = block_on(actor.dispatch(EditorEvent::Changed(snapshot)));

        assert!(!reaction.effects.iter().any(|e| matches!(e, Effect::Request(_))));
        assert!(reaction.effects.iter().any(|e| matches!(e, Effect::ShowPreview { .. })));
        assert!(reaction.effects.iter().any(|e| matches!(e, Effect::AddHighlights { .. })));
        assert!(actor.session().brackets().pairs().is_some());
    }

    #[test]
    fn run_stops_on_close() {
        let (event_tx, event_rx) = mpsc::unbounded();
        let (reaction_tx, reaction_rx) = mpsc::unbounded();

        let snapshot = EditorSnapshot::new("$x$", EditorPosition::new(0, 2));
        event_tx.unbounded_send(EditorEvent::Changed(snapshot)).unwrap();
        event_tx.unbounded_send(EditorEvent::Close).unwrap();
        event_tx.unbounded_send(EditorEvent::Focus(true)).unwrap();

        block_on(actor().run(event_rx, reaction_tx));
        let reactions: Vec<_> = block_on(reaction_rx.collect());
        assert_eq!(reactions.len(), 2);
        assert_eq!(reactions[1].effects[0], Effect::ClosePopup);
    }
}
