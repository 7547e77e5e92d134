//! Update event catalog.
//!
//! Every inbound update is classified as exactly one event kind. Middleware
//! authoring can target a single event or a named group of related events.

use serde::{Deserialize, Serialize};

/// The kind of inbound update being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateEvent {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
}

impl UpdateEvent {
    /// Every supported event, in catalog order.
    pub const ALL: [UpdateEvent; 14] = [
        UpdateEvent::Message,
        UpdateEvent::EditedMessage,
        UpdateEvent::ChannelPost,
        UpdateEvent::EditedChannelPost,
        UpdateEvent::InlineQuery,
        UpdateEvent::ChosenInlineResult,
        UpdateEvent::CallbackQuery,
        UpdateEvent::ShippingQuery,
        UpdateEvent::PreCheckoutQuery,
        UpdateEvent::Poll,
        UpdateEvent::PollAnswer,
        UpdateEvent::MyChatMember,
        UpdateEvent::ChatMember,
        UpdateEvent::ChatJoinRequest,
    ];

    /// Snake-case key as used in config files and compiled buckets.
    pub fn key(&self) -> &'static str {
        match self {
            UpdateEvent::Message => "message",
            UpdateEvent::EditedMessage => "edited_message",
            UpdateEvent::ChannelPost => "channel_post",
            UpdateEvent::EditedChannelPost => "edited_channel_post",
            UpdateEvent::InlineQuery => "inline_query",
            UpdateEvent::ChosenInlineResult => "chosen_inline_result",
            UpdateEvent::CallbackQuery => "callback_query",
            UpdateEvent::ShippingQuery => "shipping_query",
            UpdateEvent::PreCheckoutQuery => "pre_checkout_query",
            UpdateEvent::Poll => "poll",
            UpdateEvent::PollAnswer => "poll_answer",
            UpdateEvent::MyChatMember => "my_chat_member",
            UpdateEvent::ChatMember => "chat_member",
            UpdateEvent::ChatJoinRequest => "chat_join_request",
        }
    }

    /// Parse a single event key. Group names are not accepted here.
    pub fn parse(key: &str) -> Option<UpdateEvent> {
        Self::ALL.iter().copied().find(|e| e.key() == key)
    }

    /// Expand a named event group into its member events.
    pub fn group(name: &str) -> Option<&'static [UpdateEvent]> {
        match name {
            "messages" => Some(&[
                UpdateEvent::Message,
                UpdateEvent::EditedMessage,
                UpdateEvent::ChannelPost,
                UpdateEvent::EditedChannelPost,
            ]),
            "inline" => Some(&[UpdateEvent::InlineQuery, UpdateEvent::ChosenInlineResult]),
            "callbacks_payments" => Some(&[
                UpdateEvent::CallbackQuery,
                UpdateEvent::ShippingQuery,
                UpdateEvent::PreCheckoutQuery,
            ]),
            "polls" => Some(&[UpdateEvent::Poll, UpdateEvent::PollAnswer]),
            "members" => Some(&[
                UpdateEvent::MyChatMember,
                UpdateEvent::ChatMember,
                UpdateEvent::ChatJoinRequest,
            ]),
            _ => None,
        }
    }
}
