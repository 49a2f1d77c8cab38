//! Response body replayed to the real client

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::BodyExt;
use hyper::body::{Body, Frame, SizeHint};

use super::BoxError;

/// The wrapped service's response body, drained and replayed frame by frame.
///
/// Data and trailer frames come out exactly as the service produced them,
/// followed by the service's body error if it failed part-way. An exact size
/// hint is kept only if the original body had one, so the transport chooses
/// the same framing it would have without recording.
#[derive(Debug, Default)]
pub struct RecordedBody {
    frames: VecDeque<Frame<Bytes>>,
    error: Option<BoxError>,
    exact: bool,
}

impl RecordedBody {
    /// Drain `body` into a replayable copy
    pub async fn drain<B>(body: B) -> Self
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BoxError>,
    {
        let exact = body.size_hint().exact().is_some();
        let mut body = std::pin::pin!(body);
        let mut frames = VecDeque::new();
        let mut error = None;

        while let Some(next) = body.frame().await {
            match next {
                Ok(frame) => frames.push_back(frame),
                Err(e) => {
                    error = Some(e.into());
                    break;
                }
            }
        }

        Self {
            frames,
            error,
            exact,
        }
    }

    /// First data frame, the documented response body
    #[must_use]
    pub fn first_data(&self) -> Bytes {
        self.frames
            .iter()
            .find_map(Frame::data_ref)
            .cloned()
            .unwrap_or_default()
    }

    fn remaining(&self) -> u64 {
        self.frames
            .iter()
            .filter_map(Frame::data_ref)
            .map(|data| data.len() as u64)
            .sum()
    }
}

impl Body for RecordedBody {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if let Some(frame) = this.frames.pop_front() {
            return Poll::Ready(Some(Ok(frame)));
        }
        Poll::Ready(this.error.take().map(Err))
    }

    fn is_end_stream(&self) -> bool {
        self.frames.is_empty() && self.error.is_none()
    }

    fn size_hint(&self) -> SizeHint {
        if self.exact && self.error.is_none() {
            SizeHint::with_exact(self.remaining())
        } else {
            SizeHint::default()
        }
    }
}
