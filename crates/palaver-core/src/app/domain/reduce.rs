use crate::app::domain::action::Action;
use crate::app::domain::effect::Effect;
use crate::app::domain::state::ChatState;
use crate::app::protocol::OutboundMessage;
use crate::session::{Message, MessageId, Role, Session};

pub fn reduce(state: &mut ChatState, action: Action) -> Vec<Effect> {
    match action {
        Action::Hydrate { session } => handle_hydrate(state, session),

        Action::RequestState => vec![
            Effect::Emit(OutboundMessage::State {
                messages: state.session.messages.clone(),
            }),
            model_update(state),
        ],

        Action::UserInput {
            message_id,
            text,
            timestamp,
        } => handle_user_input(state, message_id, &text, timestamp),

        Action::AssistantReply {
            message_id,
            text,
            timestamp,
        } => handle_assistant_reply(state, message_id, &text, timestamp),

        Action::SetModel { model_id } => handle_set_model(state, model_id),

        Action::Clear => handle_clear(state),
    }
}

fn handle_hydrate(state: &mut ChatState, mut session: Session) -> Vec<Effect> {
    if !state.registry.contains(&session.model_id) {
        tracing::warn!(
            target: "core.reduce",
            model_id = %session.model_id,
            default = %state.registry.default_id(),
            "Persisted model is not in the registry, using default"
        );
        session.model_id = state.registry.default_id().to_string();
    }

    state.session = session;
    state.hydrated = true;
    vec![]
}

fn handle_user_input(
    state: &mut ChatState,
    message_id: MessageId,
    text: &str,
    timestamp: u64,
) -> Vec<Effect> {
    let Some(message) = build_message(Role::User, message_id, text, timestamp) else {
        return vec![];
    };

    state.session.messages.push(message.clone());
    state.pending_replies += 1;

    vec![
        Effect::Persist {
            session: state.session.clone(),
        },
        Effect::Emit(OutboundMessage::Append {
            message: message.clone(),
        }),
        Effect::GenerateReply {
            model_id: state.session.model_id.clone(),
            prompt: message.text,
        },
    ]
}

fn handle_assistant_reply(
    state: &mut ChatState,
    message_id: MessageId,
    text: &str,
    timestamp: u64,
) -> Vec<Effect> {
    state.pending_replies = state.pending_replies.saturating_sub(1);

    let Some(message) = build_message(Role::Assistant, message_id, text, timestamp) else {
        return vec![];
    };

    state.session.messages.push(message.clone());

    vec![
        Effect::Persist {
            session: state.session.clone(),
        },
        Effect::Emit(OutboundMessage::Append { message }),
    ]
}

fn handle_set_model(state: &mut ChatState, model_id: String) -> Vec<Effect> {
    // Aliases collapse to the canonical id; unknown ids are kept verbatim.
    let resolved = state.registry.resolve(&model_id);
    state.session.model_id = resolved.id.clone();

    vec![
        Effect::Persist {
            session: state.session.clone(),
        },
        Effect::Emit(OutboundMessage::Model {
            id: resolved.id,
            label: resolved.label,
        }),
    ]
}

fn handle_clear(state: &mut ChatState) -> Vec<Effect> {
    state.session.messages.clear();

    vec![
        Effect::Persist {
            session: state.session.clone(),
        },
        Effect::Emit(OutboundMessage::Cleared),
    ]
}

fn model_update(state: &ChatState) -> Effect {
    let model = state.current_model();
    Effect::Emit(OutboundMessage::Model {
        id: model.id,
        label: model.label,
    })
}

fn build_message(role: Role, id: MessageId, text: &str, timestamp: u64) -> Option<Message> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    Some(Message {
        id,
        role,
        text: text.to_string(),
        timestamp,
    })
}
