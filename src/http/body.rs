//! Request body download.

use axum::body::Body;
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::http::BridgeError;

/// Downloads the whole body and decodes it as strict UTF-8.
///
/// Bodies larger than `limit` bytes are rejected with
/// [`BridgeError::BodyTooLarge`]. Transport errors are not classified.
pub async fn read_body(body: Body, limit: usize) -> Result<String, BridgeError> {
    let bytes = match Limited::new(body, limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => return Err(BridgeError::BodyTooLarge),
        Err(e) => {
            return Err(BridgeError::Internal(format!("failed to download request body: {e}")));
        }
    };

    String::from_utf8(bytes.to_vec()).map_err(|_| BridgeError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_utf8() {
        let body = Body::from("userid=j%C3%BCrgen&password=Gr%C3%BC%C3%9Fe ✓");
        let text = read_body(body, 1024).await.unwrap();
        assert_eq!(text, "userid=j%C3%BCrgen&password=Gr%C3%BC%C3%9Fe ✓");
    }

    #[tokio::test]
    async fn rejects_invalid_utf8() {
        let body = Body::from(vec![b'a', 0xff, 0xfe]);
        assert_eq!(read_body(body, 1024).await, Err(BridgeError::InvalidUtf8));
    }

    #[tokio::test]
    async fn rejects_oversized_body() {
        let body = Body::from("x".repeat(65));
        assert_eq!(read_body(body, 64).await, Err(BridgeError::BodyTooLarge));
    }

    #[tokio::test]
    async fn empty_body_is_empty_string() {
        assert_eq!(read_body(Body::empty(), 64).await, Ok(String::new()));
    }
}
