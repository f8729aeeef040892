use core::fmt;

/// The command tag identifying what a message carries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketType(u32);

impl PacketType {
    pub const CLIPBOARD_REQUEST: Self = Self(1);
    pub const CLIPBOARD_DATA_TEXT: Self = Self(2);
    /// Rich clipboard content, also the wire type of [`Self::LEGACY_DND_DATA`]
    pub const CLIPBOARD_DATA_CP_CLIPBOARD: Self = Self(3);
    pub const CLIPBOARD_CAPABILITIES: Self = Self(4);
    pub const CLIPBOARD_LOCALE: Self = Self(5);
    /// Clipboard policy announcement
    pub const CLIPBOARD_STATE: Self = Self(6);
    /// Paste audit record
    pub const CLIPBOARD_PASTE_NOTIFICATION: Self = Self(7);

    pub const FILE_TRANSFER_REQUEST: Self = Self(8);
    pub const FILE_TRANSFER_DATA_FILE: Self = Self(9);
    pub const FILE_TRANSFER_CONFIG: Self = Self(10);
    pub const FILE_TRANSFER_ERROR: Self = Self(11);

    pub const DND_CAPABILITIES: Self = Self(12);
    pub const DND_CONTROLLER_RPC: Self = Self(13);
    pub const DND_COPY_PROGRESS: Self = Self(14);
    pub const DND_COPY_DONE: Self = Self(15);
    pub const DND_TEMP_FOLDER_SHARED_PATH: Self = Self(16);
    pub const DND_FILE_PATHS: Self = Self(17);
    pub const DND_CANCEL_COPY: Self = Self(18);
    /// Drop interaction data of older drag-and-drop peers.
    ///
    /// Never seen on the wire: it is sent as [`Self::CLIPBOARD_DATA_CP_CLIPBOARD`].
    pub const LEGACY_DND_DATA: Self = Self(19);

    pub const FCP_START_PASTE_FILES: Self = Self(20);
    pub const FCP_SHARED_FOLDER_FNAME: Self = Self(21);
    pub const FCP_TEMP_FOLDER_FNAME: Self = Self(22);
    pub const FCP_CANCEL_COPY: Self = Self(23);
    pub const FCP_COPY_PROGRESS: Self = Self(24);
    pub const FCP_COPY_DONE: Self = Self(25);

    pub const SMART_CARD_INFO: Self = Self(26);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// The command tag actually written on the wire for this packet type.
    #[must_use]
    pub fn wire_type(self) -> Self {
        if self == Self::LEGACY_DND_DATA {
            Self::CLIPBOARD_DATA_CP_CLIPBOARD
        } else {
            self
        }
    }

    pub fn is_known(self) -> bool {
        self.name().is_some()
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Self::CLIPBOARD_REQUEST => "ClipboardRequest",
            Self::CLIPBOARD_DATA_TEXT => "ClipboardData_Text",
            Self::CLIPBOARD_DATA_CP_CLIPBOARD => "ClipboardData_CPClipboard",
            Self::CLIPBOARD_CAPABILITIES => "Clipboard_Capabilities",
            Self::CLIPBOARD_LOCALE => "Clipboard_Locale",
            Self::CLIPBOARD_STATE => "ClipboardState",
            Self::CLIPBOARD_PASTE_NOTIFICATION => "ClipboardPasteNotification",
            Self::FILE_TRANSFER_REQUEST => "FileTransferRequest",
            Self::FILE_TRANSFER_DATA_FILE => "FileTransferData_File",
            Self::FILE_TRANSFER_CONFIG => "FileTransfer_Config",
            Self::FILE_TRANSFER_ERROR => "FileTransfer_Error",
            Self::DND_CAPABILITIES => "DnD_Capabilities",
            Self::DND_CONTROLLER_RPC => "DnD_ControllerRpc",
            Self::DND_COPY_PROGRESS => "DnD_CopyProgress",
            Self::DND_COPY_DONE => "DnD_CopyDone",
            Self::DND_TEMP_FOLDER_SHARED_PATH => "DnD_TempFolderSharedPath",
            Self::DND_FILE_PATHS => "DnD_FilePaths",
            Self::DND_CANCEL_COPY => "DnD_CancelCopy",
            Self::LEGACY_DND_DATA => "LegacyDnD_Data",
            Self::FCP_START_PASTE_FILES => "FCP_StartPasteFiles",
            Self::FCP_SHARED_FOLDER_FNAME => "FCP_SharedFolderFName",
            Self::FCP_TEMP_FOLDER_FNAME => "FCP_TempFolderFName",
            Self::FCP_CANCEL_COPY => "FCP_CancelCopy",
            Self::FCP_COPY_PROGRESS => "FCP_CopyProgress",
            Self::FCP_COPY_DONE => "FCP_CopyDone",
            Self::SMART_CARD_INFO => "SmartCardInfo",
            _ => return None,
        };

        Some(name)
    }
}

impl From<u32> for PacketType {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Debug for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "PacketType({name})"),
            None => write!(f, "PacketType({:#x})", self.0),
        }
    }
}

impl fmt::Display for PacketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "Unknown({:#x})", self.0),
        }
    }
}

/// Feature-level error reported alongside (or instead of) clipboard data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipboardErrorCode(u32);

impl ClipboardErrorCode {
    pub const NONE: Self = Self(0);
    /// The content exceeded the configured size limit. Text is sent truncated, other formats are
    /// not sent at all.
    pub const MAX_LIMIT_EXCEEDED: Self = Self(1);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl fmt::Display for ClipboardErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::NONE => f.write_str("None"),
            Self::MAX_LIMIT_EXCEEDED => f.write_str("MaxLimitExceeded"),
            Self(other) => write!(f, "Unknown({other})"),
        }
    }
}

/// Clipboard redirection policy announced by the peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipboardPolicy(u32);

impl ClipboardPolicy {
    pub const DISABLED: Self = Self(0);
    pub const SERVER_TO_CLIENT: Self = Self(1);
    pub const CLIENT_TO_SERVER: Self = Self(2);
    pub const BIDIRECTIONAL: Self = Self(3);

    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ClipboardPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::DISABLED => f.write_str("Disabled"),
            Self::SERVER_TO_CLIENT => f.write_str("ServerToClient"),
            Self::CLIENT_TO_SERVER => f.write_str("ClientToServer"),
            Self::BIDIRECTIONAL => f.write_str("Bidirectional"),
            Self(other) => write!(f, "Unknown({other})"),
        }
    }
}
