use vchanrpc_core::{non_empty, read_u32, read_u32_or_u64};
use vchanrpc_rpc::RpcTransport;

use crate::backend::{CopyMsgHandler, Features};
use crate::validate::{
    fetch_param, into_payload, validate_data_param, ValidationError, CLIPBOARD_DATA_PARAM_NAME,
    CLIPBOARD_ERROR_PARAM_NAME,
};
use crate::{ClipboardErrorCode, ClipboardPolicy, PacketType};

/// How far an inbound message went through the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchOutcome {
    /// The packet type was routed (or logged as unknown) without bailing out.
    Handled(PacketType),
    /// The payload failed validation; the message was dropped.
    Rejected(PacketType),
}

/// Decodes the packet type of `message` and routes it to the matching collaborator.
pub(crate) fn dispatch<T: RpcTransport>(
    transport: &T,
    features: &mut Features,
    max_name_len: usize,
    message: &T::Message,
) -> DispatchOutcome {
    let packet_type = PacketType::new(transport.command(message));
    debug!(%packet_type, "Received packet");

    let mut router = Router {
        transport,
        message,
        features,
        max_name_len,
    };

    match router.route(packet_type) {
        Ok(()) => DispatchOutcome::Handled(packet_type),
        Err(error) => {
            error!(%packet_type, %error, "Dropping invalid packet");
            DispatchOutcome::Rejected(packet_type)
        }
    }
}

struct Router<'a, T: RpcTransport> {
    transport: &'a T,
    message: &'a T::Message,
    features: &'a mut Features,
    max_name_len: usize,
}

impl<T: RpcTransport> Router<'_, T> {
    fn data(&self) -> Result<Vec<u8>, ValidationError> {
        validate_data_param(self.transport, self.message, self.max_name_len).map(into_payload)
    }

    fn dnd(&mut self) -> Option<&mut Box<dyn CopyMsgHandler>> {
        self.features.dnd.as_mut()
    }

    fn fcp(&mut self) -> Option<&mut Box<dyn CopyMsgHandler>> {
        self.features.fcp.as_mut()
    }

    fn route(&mut self, packet_type: PacketType) -> Result<(), ValidationError> {
        match packet_type {
            PacketType::CLIPBOARD_LOCALE => {
                let lang_id = read_u32("clipboard locale", &self.data()?)?;
                debug!(lang_id = format_args!("{lang_id:#010x}"), "Received locale");
                self.features.plugin.set_clipboard_locale(lang_id);
            }
            PacketType::CLIPBOARD_CAPABILITIES => {
                let caps = read_u32("clipboard capabilities", &self.data()?)?;
                debug!(caps = format_args!("{caps:#010x}"), "Received capability value");
                self.features.plugin.set_clipboard_caps(caps);
            }
            PacketType::CLIPBOARD_PASTE_NOTIFICATION => {
                let audit = self.data()?;
                debug!(size = audit.len(), "Received audit message");
                self.features.plugin.set_clipboard_audit(&audit);
            }
            PacketType::SMART_CARD_INFO => {
                let info = self.data()?;
                debug!(size = info.len(), "Received smart card client info");
                self.features.plugin.save_smart_card_info(&info);
            }
            PacketType::CLIPBOARD_REQUEST => {
                debug!("Received clipboard request");

                if self.features.plugin.clipboard_to_client_enabled() {
                    self.features.plugin.send_clipboard_data();
                } else {
                    info!("Sending the clipboard is disabled by policy, ignoring clipboard request");
                }
            }
            PacketType::CLIPBOARD_DATA_TEXT | PacketType::CLIPBOARD_DATA_CP_CLIPBOARD => {
                self.clipboard_data(packet_type)?;
            }
            PacketType::CLIPBOARD_STATE => {
                let policy = ClipboardPolicy::new(read_u32("clipboard state", &self.data()?)?);
                info!(%policy, "Received clipboard policy state");
            }

            PacketType::FILE_TRANSFER_REQUEST => {
                let request = self.data()?;

                if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
                    file_transfer.receive_request(&request);
                }
            }
            PacketType::FILE_TRANSFER_DATA_FILE => {
                let enabled = self
                    .features
                    .file_transfer
                    .as_deref()
                    .is_some_and(|file_transfer| file_transfer.to_server_enabled());

                if enabled {
                    let data = self.data()?;

                    if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
                        file_transfer.receive_file_data(&data);
                    }
                }
            }
            PacketType::FILE_TRANSFER_CONFIG => {
                let config = self.data()?;

                if let Some(file_transfer) = self.features.file_transfer.as_deref_mut() {
                    file_transfer.receive_config(&config);
                }
            }
            PacketType::FILE_TRANSFER_ERROR => {
                // Reported to the user by the client front-end, nothing to do here.
                info!("File transfer error is not handled by the channel plugin");
            }

            PacketType::DND_COPY_PROGRESS => {
                let progress = read_u32("DnD copy progress", &self.data()?)?;
                debug!(progress, "Received DnD copying progress");

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_copy_progress(progress);
                }
            }
            PacketType::DND_COPY_DONE => {
                let result = read_u32("DnD copy done", &self.data()?)?;
                debug!(result, "Received DnD copy done");

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_copy_done(result);
                }
            }
            PacketType::DND_CAPABILITIES => {
                // Version 1 peers send 32-bit capabilities, version 2 peers send 64-bit ones.
                let capability = read_u32_or_u64("DnD capabilities", &self.data()?)?;
                debug!(capability = format_args!("{capability:#x}"), "Received DnD capability");

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_dnd_capability(capability);
                }
            }
            PacketType::DND_CONTROLLER_RPC => {
                let packet = self.data()?;
                debug!(size = packet.len(), "Received DnD controller RPC");

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_dnd_rpc_packet(&packet);
                }
            }
            PacketType::DND_TEMP_FOLDER_SHARED_PATH => {
                let data = self.data()?;
                let path = non_empty("DnD temp folder shared path", "path", &data)?;

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_client_tmp_folder(path);
                }
            }
            PacketType::DND_FILE_PATHS => {
                let data = self.data()?;
                let paths = non_empty("DnD file paths", "paths", &data)?;

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_file_paths(paths);
                }
            }
            PacketType::DND_CANCEL_COPY => {
                debug!("Received notification to cancel DnD copying");

                if let Some(dnd) = self.dnd() {
                    dnd.on_recv_cancel_copy();
                }
            }

            PacketType::FCP_START_PASTE_FILES => {
                if let Some(fcp) = self.fcp() {
                    fcp.on_recv_start_paste_files();
                }
            }
            PacketType::FCP_SHARED_FOLDER_FNAME | PacketType::FCP_TEMP_FOLDER_FNAME => {
                let data = self.data()?;
                let name = non_empty("FCP folder friendly name", "name", &data)?;
                debug!(%packet_type, size = name.len(), "Received folder friendly name");

                if let Some(fcp) = self.fcp() {
                    if packet_type == PacketType::FCP_SHARED_FOLDER_FNAME {
                        fcp.on_recv_file_paths(name);
                    } else {
                        fcp.on_recv_client_tmp_folder(name);
                    }
                }
            }
            PacketType::FCP_CANCEL_COPY => {
                if let Some(fcp) = self.fcp() {
                    fcp.on_recv_cancel_copy();
                }
            }
            PacketType::FCP_COPY_PROGRESS => {
                let progress = read_u32("FCP copy progress", &self.data()?)?;
                debug!(progress, "Received FCP copy progress");

                if let Some(fcp) = self.fcp() {
                    fcp.on_recv_copy_progress(progress);
                }
            }
            PacketType::FCP_COPY_DONE => {
                let result = read_u32("FCP copy done", &self.data()?)?;
                debug!(result, "Received FCP copy done");

                if let Some(fcp) = self.fcp() {
                    fcp.on_recv_copy_done(result);
                }
            }

            _ => warn!(%packet_type, "Received unknown packet type"),
        }

        Ok(())
    }

    /// Clipboard content comes in three shapes:
    ///
    /// - the data alone,
    /// - the data and an error, when text was truncated to the size limit,
    /// - the error alone, when content that cannot be truncated exceeded the size limit.
    fn clipboard_data(&mut self, packet_type: PacketType) -> Result<(), ValidationError> {
        if !self.features.plugin.clipboard_to_server_enabled() {
            info!("Setting the clipboard is disabled by policy, ignoring clipboard data");
            return Ok(());
        }

        match self.transport.param_count(self.message) {
            1 => {
                let param = fetch_param(self.transport, self.message, 0, self.max_name_len)?;

                // Older peers send an unnamed blob.
                if param.is_named(CLIPBOARD_DATA_PARAM_NAME) || param.value.is_blob() {
                    let data = into_payload(param);
                    debug!(size = data.len(), "Received clipboard data");
                    self.features.plugin.set_clipboard(packet_type, &data);
                } else if param.is_named(CLIPBOARD_ERROR_PARAM_NAME) {
                    let error = ClipboardErrorCode::new(param.value.as_u32().unwrap_or_default());
                    info!(%error, "Received clipboard error");
                } else {
                    return Err(ValidationError::NoDataOrError { index: 0 });
                }
            }
            2 => {
                let data = fetch_param(self.transport, self.message, 0, self.max_name_len)?;
                let error = fetch_param(self.transport, self.message, 1, self.max_name_len)?;

                // Peers sending both always name them.
                if !data.is_named(CLIPBOARD_DATA_PARAM_NAME) {
                    return Err(ValidationError::Misnamed {
                        index: 0,
                        expected: CLIPBOARD_DATA_PARAM_NAME,
                    });
                }

                if !error.is_named(CLIPBOARD_ERROR_PARAM_NAME) {
                    return Err(ValidationError::Misnamed {
                        index: 1,
                        expected: CLIPBOARD_ERROR_PARAM_NAME,
                    });
                }

                let error = ClipboardErrorCode::new(error.value.as_u32().unwrap_or_default());
                let data = into_payload(data);
                info!(size = data.len(), %error, "Received clipboard data along an error");
                self.features.plugin.set_clipboard(packet_type, &data);
            }
            count => error!(count, "Unexpected clipboard parameter count"),
        }

        Ok(())
    }
}
