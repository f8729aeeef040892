use std::time::{Duration, Instant};

use vchanrpc_rpc::RequestId;

use crate::backend::PluginBackend;
use crate::PacketType;

/// Completion callback attached to an outstanding request.
pub type OnDoneHandler = fn(&mut dyn PluginBackend, PacketType);

/// What an outstanding request carries, which decides what its delivery triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    /// Clipboard content and any other feature data.
    Generic,
    /// One chunk of the file transfer batch in progress.
    FileTransferChunk,
    /// Drop interaction data of older drag-and-drop peers.
    LegacyDropInteraction,
}

impl DataKind {
    pub fn for_packet_type(packet_type: PacketType) -> Self {
        match packet_type {
            PacketType::FILE_TRANSFER_DATA_FILE => Self::FileTransferChunk,
            PacketType::LEGACY_DND_DATA => Self::LegacyDropInteraction,
            _ => Self::Generic,
        }
    }
}

fn notify_data_sent(plugin: &mut dyn PluginBackend, packet_type: PacketType) {
    plugin.on_data_sent(packet_type);
}

/// Bookkeeping for a sent message awaiting its delivery confirmation.
#[derive(Debug, Clone)]
pub struct OutstandingRequest {
    id: RequestId,
    data_len: usize,
    kind: DataKind,
    packet_type: PacketType,
    started_at: Instant,
    on_done: Option<OnDoneHandler>,
}

impl OutstandingRequest {
    /// Creates the request for a send of `packet_type`.
    ///
    /// `packet_type` is the type the feature asked for, before any wire aliasing. File transfer
    /// chunks carry no completion callback, their delivery drives the chunk batching instead.
    pub fn new(id: RequestId, data_len: usize, packet_type: PacketType) -> Self {
        let kind = DataKind::for_packet_type(packet_type);

        let on_done: Option<OnDoneHandler> = match kind {
            DataKind::FileTransferChunk => None,
            DataKind::Generic | DataKind::LegacyDropInteraction => Some(notify_data_sent),
        };

        Self {
            id,
            data_len,
            kind,
            packet_type,
            started_at: Instant::now(),
            on_done,
        }
    }

    #[must_use]
    pub fn with_on_done(mut self, handler: Option<OnDoneHandler>) -> Self {
        self.on_done = handler;
        self
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn data_len(&self) -> usize {
        self.data_len
    }

    pub fn kind(&self) -> DataKind {
        self.kind
    }

    pub fn packet_type(&self) -> PacketType {
        self.packet_type
    }

    pub fn on_done(&self) -> Option<OnDoneHandler> {
        self.on_done
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Outstanding requests, in send order.
#[derive(Debug, Default)]
pub struct RequestTable {
    requests: Vec<OutstandingRequest>,
}

impl RequestTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a request, replacing a stale entry carrying the same id.
    pub fn insert(&mut self, request: OutstandingRequest) -> Option<OutstandingRequest> {
        if let Some(existing) = self.requests.iter_mut().find(|r| r.id == request.id) {
            warn!(id = request.id, "Request id reused while still outstanding, replacing the stale entry");
            return Some(core::mem::replace(existing, request));
        }

        self.requests.push(request);
        None
    }

    /// Removes and returns the request with the given id.
    pub fn take(&mut self, id: RequestId) -> Option<OutstandingRequest> {
        let idx = self.requests.iter().position(|r| r.id == id)?;
        Some(self.requests.remove(idx))
    }

    pub fn get(&self, id: RequestId) -> Option<&OutstandingRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RequestId) -> bool {
        self.get(id).is_some()
    }

    /// Drops every request, returning how many there were.
    pub fn clear(&mut self) -> usize {
        let count = self.requests.len();
        self.requests.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutstandingRequest> {
        self.requests.iter()
    }
}
