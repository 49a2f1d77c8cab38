//! Duplicating request body

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use hyper::body::{Body, Frame, SizeHint};

/// Request body handed to the wrapped service.
///
/// Frames pass through unchanged; the bytes of every data frame the service
/// reads are also copied into a shared buffer. Bytes the service never reads
/// are never captured.
pub struct TeeBody<B> {
    inner: Pin<Box<B>>,
    captured: Arc<Mutex<BytesMut>>,
}

impl<B> TeeBody<B> {
    /// Wrap `inner`, returning the body and a handle to the capture buffer
    pub fn new(inner: B) -> (Self, CaptureHandle) {
        let captured = Arc::new(Mutex::new(BytesMut::new()));
        let handle = CaptureHandle(Arc::clone(&captured));
        (
            Self {
                inner: Box::pin(inner),
                captured,
            },
            handle,
        )
    }
}

/// Read access to the bytes a [`TeeBody`] has seen
#[derive(Debug, Clone)]
pub struct CaptureHandle(Arc<Mutex<BytesMut>>);

impl CaptureHandle {
    /// Bytes read through the body so far
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl<B> Body for TeeBody<B>
where
    B: Body<Data = Bytes>,
{
    type Data = Bytes;
    type Error = B::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        let polled = this.inner.as_mut().poll_frame(cx);

        if let Poll::Ready(Some(Ok(frame))) = &polled {
            if let Some(data) = frame.data_ref() {
                this.captured
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend_from_slice(data);
            }
        }

        polled
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}
