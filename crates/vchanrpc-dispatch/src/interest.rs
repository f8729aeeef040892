use crate::backend::PluginBackend;
use crate::request::OutstandingRequest;
use crate::{ClipboardErrorCode, PacketType};

/// Ordered list of packet types a generic notifier should fire for.
///
/// Entries are never removed. Duplicates are kept, but a scan stops at the first match so a type
/// fires at most once per event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestRegistry {
    packet_types: Vec<PacketType>,
}

impl InterestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, packet_type: PacketType) {
        self.packet_types.push(packet_type);
    }

    /// Position of the first registration for `packet_type`.
    pub fn first_match(&self, packet_type: PacketType) -> Option<usize> {
        self.packet_types.iter().position(|registered| *registered == packet_type)
    }

    pub fn contains(&self, packet_type: PacketType) -> bool {
        self.first_match(packet_type).is_some()
    }

    pub fn len(&self) -> usize {
        self.packet_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packet_types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = PacketType> + '_ {
        self.packet_types.iter().copied()
    }
}

/// Cross-cutting state shared by the dispatcher, the sender and the features.
///
/// Features populate the registries during their own initialization, before steady-state traffic.
#[derive(Debug, Clone, Default)]
pub struct DispatchContext {
    on_done: InterestRegistry,
    on_invoke: InterestRegistry,
    pending_clipboard_error: ClipboardErrorCode,
}

impl DispatchContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the request's completion callback when a message of this type is delivered.
    pub fn register_on_done_packet_type(&mut self, packet_type: PacketType) {
        self.on_done.register(packet_type);
        debug!(%packet_type, registered = self.on_done.len(), "Registered on-done packet type");
    }

    /// Fire [`PluginBackend::on_invoke_done`] when a message of this type is received.
    pub fn register_on_invoke_packet_type(&mut self, packet_type: PacketType) {
        self.on_invoke.register(packet_type);
        debug!(%packet_type, registered = self.on_invoke.len(), "Registered on-invoke packet type");
    }

    pub fn on_done_interest(&self) -> &InterestRegistry {
        &self.on_done
    }

    pub fn on_invoke_interest(&self) -> &InterestRegistry {
        &self.on_invoke
    }

    /// Sets the error attached to the next outbound message.
    pub fn set_pending_clipboard_error(&mut self, error: ClipboardErrorCode) {
        self.pending_clipboard_error = error;
    }

    pub fn pending_clipboard_error(&self) -> ClipboardErrorCode {
        self.pending_clipboard_error
    }

    /// Returns the pending error, if any, and clears it.
    pub fn take_pending_clipboard_error(&mut self) -> Option<ClipboardErrorCode> {
        let error = core::mem::take(&mut self.pending_clipboard_error);
        (!error.is_none()).then_some(error)
    }

    /// Fires the request's own completion callback if its send-time packet type is registered.
    ///
    /// Returns whether a callback fired.
    pub(crate) fn notify_on_done(&self, plugin: &mut dyn PluginBackend, request: &OutstandingRequest) -> bool {
        let Some(handler) = request.on_done() else {
            return false;
        };

        let packet_type = request.packet_type();

        if !self.on_done.contains(packet_type) {
            return false;
        }

        debug!(%packet_type, "On-done callback fire");
        handler(plugin, packet_type);

        true
    }

    /// Fires the wide-scope invocation notifier if `packet_type` is registered.
    ///
    /// Returns whether the notifier fired.
    pub(crate) fn notify_on_invoke(&self, plugin: &mut dyn PluginBackend, packet_type: PacketType) -> bool {
        if !self.on_invoke.contains(packet_type) {
            return false;
        }

        debug!(%packet_type, "On-invoke callback fire");
        plugin.on_invoke_done(packet_type);

        true
    }
}
