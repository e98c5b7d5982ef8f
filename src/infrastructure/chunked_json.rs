// Chunked JSON streaming utilities
use crate::domain::dashboard::StreamMessage;
use crate::infrastructure::http_response::brotli_compress;
use axum::body::Body;
use axum::http::{Response, StatusCode, header};
use axum::response::IntoResponse;
use bytes::{BufMut, Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::Stream;

/// Create a chunked streaming response of length-prefixed JSON frames
pub async fn chunked_json_stream<S>(stream: S, compress: bool) -> Result<Response<Body>, StatusCode>
where
    S: Stream<Item = StreamMessage> + Send + 'static,
{
    let byte_stream = stream.then(move |msg| async move { serialize_chunk(msg, compress).await });

    let body = Body::from_stream(byte_stream);

    // Frames are compressed one by one, so no Content-Encoding header here
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson-framed")
        .header(header::TRANSFER_ENCODING, "chunked")
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Serialize a single message to one frame: u32 big-endian length, then payload
pub async fn serialize_chunk(msg: StreamMessage, compress: bool) -> Result<Bytes, std::io::Error> {
    let json = serde_json::to_vec(&msg).map_err(std::io::Error::other)?;

    let payload = if compress {
        brotli_compress(json).await?
    } else {
        json
    };

    let length = payload.len() as u32;
    let mut chunk = BytesMut::with_capacity(4 + payload.len());
    chunk.put_u32(length);
    chunk.put_slice(&payload);

    Ok(chunk.freeze())
}

/// Helper to create a streaming response from a receiver
pub async fn stream_from_receiver(
    mut rx: tokio::sync::mpsc::Receiver<StreamMessage>,
    compress: bool,
) -> impl IntoResponse {
    let stream = async_stream::stream! {
        while let Some(msg) = rx.recv().await {
            yield msg;
        }
    };

    match chunked_json_stream(stream, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::insight::InsightText;

    fn insight_message() -> StreamMessage {
        StreamMessage::InsightUpdate {
            revision: Some(3),
            insight: InsightText::Summary("Calm winds detected".to_string()),
        }
    }

    #[tokio::test]
    async fn test_frame_is_length_prefixed_json() {
        let chunk = serialize_chunk(insight_message(), false).await.unwrap();

        let length = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]) as usize;
        assert_eq!(length, chunk.len() - 4);

        let value: serde_json::Value = serde_json::from_slice(&chunk[4..]).unwrap();
        assert_eq!(value["type"], "insight_update");
        assert_eq!(value["revision"], 3);
        assert_eq!(value["insight"]["text"], "Calm winds detected");
    }

    #[tokio::test]
    async fn test_stream_body_concatenates_frames() {
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        tx.send(insight_message()).await.unwrap();
        tx.send(insight_message()).await.unwrap();
        drop(tx);

        let response = stream_from_receiver(rx, false).await.into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let single = serialize_chunk(insight_message(), false).await.unwrap();
        assert_eq!(body.len(), single.len() * 2);
    }
}
