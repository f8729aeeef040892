use vchanrpc_core::DecodeError;
use vchanrpc_rpc::{NamedParam, RpcError, RpcTransport, Variant};

/// Name of the parameter carrying a payload.
pub const CLIPBOARD_DATA_PARAM_NAME: &str = "Clipboard data";

/// Name of the parameter carrying a [`ClipboardErrorCode`](crate::ClipboardErrorCode).
pub const CLIPBOARD_ERROR_PARAM_NAME: &str = "Clipboard error";

/// Why an inbound message was dropped before reaching its feature collaborator.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("could not retrieve variant at parameter {index}")]
    ParamUnavailable {
        index: usize,
        #[source]
        source: RpcError,
    },

    #[error("no data found at parameter {index}")]
    NoData { index: usize },

    #[error("no clipboard data or error found at parameter {index}")]
    NoDataOrError { index: usize },

    #[error("parameter {index} is not named `{expected}`")]
    Misnamed { index: usize, expected: &'static str },

    #[error("malformed payload: {0}")]
    Decode(#[from] DecodeError),
}

pub(crate) fn fetch_param<T: RpcTransport>(
    transport: &T,
    message: &T::Message,
    index: usize,
    max_name_len: usize,
) -> Result<NamedParam, ValidationError> {
    transport
        .named_param(message, index, max_name_len)
        .map_err(|source| ValidationError::ParamUnavailable { index, source })
}

/// Fetches the payload parameter every data-carrying packet type has at index 0.
///
/// The parameter is accepted if it is named [`CLIPBOARD_DATA_PARAM_NAME`] or if it is a blob:
/// older peers do not name their parameters.
pub fn validate_data_param<T: RpcTransport>(
    transport: &T,
    message: &T::Message,
    max_name_len: usize,
) -> Result<NamedParam, ValidationError> {
    let param = fetch_param(transport, message, 0, max_name_len)?;

    if !param.is_named(CLIPBOARD_DATA_PARAM_NAME) && !param.value.is_blob() {
        return Err(ValidationError::NoData { index: 0 });
    }

    Ok(param)
}

/// The bytes of the parameter, empty if it is not a blob.
pub fn into_payload(param: NamedParam) -> Vec<u8> {
    match param.value {
        Variant::Blob(bytes) => bytes,
        Variant::UInt32(_) | Variant::Other { .. } => Vec::new(),
    }
}
