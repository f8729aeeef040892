//! Interfaces of the feature collaborators the dispatcher routes to.
//!
//! The dispatcher only decodes and forwards. What "clipboard enabled by policy" means, how a
//! drag-and-drop session progresses or how file chunks are produced is decided by the
//! implementations of these traits.

use core::fmt;

use vchanrpc_core::{assert_obj_safe, AsAny};

use crate::PacketType;

/// Clipboard feature and plugin-wide lifecycle.
pub trait PluginBackend: AsAny + fmt::Debug + Send {
    /// Initializes the feature side of the plugin when the server channel becomes ready.
    ///
    /// Returning `false` aborts the rest of the ready transition setup.
    fn init(&mut self) -> bool;

    /// Releases feature state. `notify` is set when the channel went away after being ready, and
    /// unset when the open request was rejected.
    fn cleanup(&mut self, notify: bool);

    fn queue_clipboard_capability(&mut self);

    fn queue_clipboard_state(&mut self);

    fn queue_file_transfer_config(&mut self);

    /// Whether a clipboard change listener was registered and must be removed on disconnect.
    fn should_listen_for_clipboard_changes(&self) -> bool {
        false
    }

    fn queue_unregister_clipboard_listener(&mut self) {}

    /// Smart card client information advertised to the server right after the channel is ready.
    fn smart_card_info(&self) -> Option<Vec<u8>> {
        None
    }

    fn set_clipboard_locale(&mut self, lang_id: u32);

    fn set_clipboard_caps(&mut self, caps: u32);

    fn set_clipboard_audit(&mut self, audit: &[u8]);

    fn save_smart_card_info(&mut self, _info: &[u8]) {}

    /// Policy check for sending the local clipboard to the peer.
    fn clipboard_to_client_enabled(&self) -> bool;

    /// Policy check for applying clipboard content received from the peer.
    fn clipboard_to_server_enabled(&self) -> bool;

    /// The peer requested the local clipboard content.
    fn send_clipboard_data(&mut self);

    fn set_clipboard(&mut self, packet_type: PacketType, data: &[u8]);

    /// Completion callback attached to clipboard and legacy drop interaction sends.
    fn on_data_sent(&mut self, _packet_type: PacketType) {}

    /// Notifier for packet types registered with
    /// [`DispatchContext::register_on_invoke_packet_type`](crate::DispatchContext::register_on_invoke_packet_type).
    fn on_invoke_done(&mut self, _packet_type: PacketType) {}
}

assert_obj_safe!(PluginBackend);

/// Chunked file transfer feature.
pub trait FileTransferBackend: AsAny + fmt::Debug + Send {
    /// Called on every ready transition, on both sides.
    fn init_config(&mut self);

    /// The channel went away while a transfer may be in progress.
    fn on_interrupt(&mut self, is_server: bool);

    fn receive_request(&mut self, request: &[u8]);

    fn receive_file_data(&mut self, data: &[u8]);

    fn receive_config(&mut self, config: &[u8]);

    /// Policy check for accepting file data from the peer.
    fn to_server_enabled(&self) -> bool;

    /// Number of chunks in the batch currently being sent.
    fn current_chunk_count(&self) -> u32;

    /// The whole current batch was delivered.
    fn send_next_chunks(&mut self);
}

assert_obj_safe!(FileTransferBackend);

/// Message handler shared by the drag-and-drop and file-copy-paste features.
///
/// Each feature gets its own instance, and only reacts to its own packets. Every method defaults
/// to doing nothing.
pub trait CopyMsgHandler: AsAny + fmt::Debug + Send {
    /// Detects whether the server runs a full desktop or a remote application session.
    fn check_session_type(&mut self) {}

    fn queue_dnd_capability(&mut self) {}

    fn on_recv_dnd_capability(&mut self, _capability: u64) {}

    fn on_recv_dnd_rpc_packet(&mut self, _packet: &[u8]) {}

    fn on_recv_copy_progress(&mut self, _progress: u32) {}

    fn on_recv_copy_done(&mut self, _result: u32) {}

    fn on_recv_client_tmp_folder(&mut self, _path: &[u8]) {}

    fn on_recv_file_paths(&mut self, _paths: &[u8]) {}

    fn on_recv_cancel_copy(&mut self) {}

    fn on_recv_start_paste_files(&mut self) {}

    fn on_recv_not_ready(&mut self) {}
}

assert_obj_safe!(CopyMsgHandler);

/// Host platform services used during readiness transitions.
pub trait PlatformHooks: AsAny + fmt::Debug + Send {
    /// Tells the server process the channel open request was rejected so it can register for the
    /// fallback transport instead. Returns `false` if the signal could not be raised.
    fn signal_channel_open_rejected(&mut self) -> bool;

    /// Removes temporary folders created by the drag-and-drop and file-copy-paste features.
    fn remove_temp_folders(&mut self);
}

assert_obj_safe!(PlatformHooks);

/// All the collaborators a session routes to.
#[derive(Debug)]
pub(crate) struct Features {
    pub(crate) plugin: Box<dyn PluginBackend>,
    pub(crate) file_transfer: Option<Box<dyn FileTransferBackend>>,
    pub(crate) dnd: Option<Box<dyn CopyMsgHandler>>,
    pub(crate) fcp: Option<Box<dyn CopyMsgHandler>>,
    pub(crate) platform: Option<Box<dyn PlatformHooks>>,
}

impl Features {
    pub(crate) fn new(plugin: Box<dyn PluginBackend>) -> Self {
        Self {
            plugin,
            file_transfer: None,
            dnd: None,
            fcp: None,
            platform: None,
        }
    }

    pub(crate) fn has_copy_handlers(&self) -> bool {
        self.dnd.is_some() || self.fcp.is_some()
    }
}
