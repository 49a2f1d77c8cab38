//! Body codecs
//!
//! Bodies are JSON unless a binary message type is registered for the
//! direction. Both paths decode into a [`Value`] tree so validation and path
//! extraction never care about the wire format.

use std::error::Error;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

/// Error produced by a codec
pub type CodecError = Box<dyn Error + Send + Sync>;

/// A message with its own binary wire format (protocol buffers and the like).
///
/// The message must also be serializable so decoded bodies can be validated
/// by path and shown as JSON in the generated document.
pub trait BinaryMessage: Serialize + Sized {
    /// Encode the message into its wire format
    ///
    /// # Errors
    ///
    /// Returns error if the message cannot be encoded
    fn marshal(&self) -> Result<Vec<u8>, CodecError>;

    /// Decode a message from its wire format
    ///
    /// # Errors
    ///
    /// Returns error if `bytes` is not a valid encoding
    fn unmarshal(bytes: &[u8]) -> Result<Self, CodecError>;
}

/// Type-erased decoder for one binary message type
trait MessageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError>;
    fn type_name(&self) -> &'static str;
}

struct TypedDecoder<M>(PhantomData<fn() -> M>);

impl<M: BinaryMessage> MessageDecoder for TypedDecoder<M> {
    fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        let message = M::unmarshal(bytes)?;
        Ok(serde_json::to_value(&message)?)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<M>()
    }
}

/// Decoding strategy for one direction of an exchange.
///
/// The default is JSON.
#[derive(Clone, Default)]
pub struct Codec {
    binary: Option<Arc<dyn MessageDecoder>>,
}

impl Codec {
    /// Codec for JSON bodies
    #[must_use]
    pub fn json() -> Self {
        Self::default()
    }

    /// Binary codec for message type `M`
    #[must_use]
    pub fn binary<M: BinaryMessage + 'static>() -> Self {
        Self {
            binary: Some(Arc::new(TypedDecoder::<M>(PhantomData))),
        }
    }

    /// Whether this codec decodes a binary message type
    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.binary.is_some()
    }

    /// Decode `bytes` into a value tree
    ///
    /// # Errors
    ///
    /// Returns error if the body is malformed for this codec
    pub fn decode(&self, bytes: &[u8]) -> Result<Value, CodecError> {
        match &self.binary {
            None => Ok(serde_json::from_slice(bytes)?),
            Some(decoder) => decoder.decode(bytes),
        }
    }

    /// Human-readable example of a body.
    ///
    /// JSON bodies are shown verbatim. Binary bodies are decoded and shown as
    /// indented JSON; if that fails the example is left empty.
    #[must_use]
    pub fn display(&self, bytes: &[u8]) -> String {
        match &self.binary {
            None => String::from_utf8_lossy(bytes).into_owned(),
            Some(decoder) => match decoder
                .decode(bytes)
                .and_then(|value| Ok(serde_json::to_string_pretty(&value)?))
            {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "Could not render {} body as JSON: {}",
                        decoder.type_name(),
                        e
                    );
                    String::new()
                }
            },
        }
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binary {
            None => f.write_str("Json"),
            Some(decoder) => f.debug_tuple("Binary").field(&decoder.type_name()).finish(),
        }
    }
}
