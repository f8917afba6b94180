// SPDX-License-Identifier: MIT

use super::*;

#[tokio::test]
async fn null_capture_is_available_without_interfaces() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let token = CancellationToken::new();
    token.cancel();
    let capture = crate::null::NullL2Capture;
    assert!(capture.run(tx, token).await.is_ok());
}
