// SPDX-License-Identifier: MIT

//! Fallback raw-capture implementation for hosts without packet-socket
//! support (Design Notes: "raw capture is a capability, not a
//! requirement").

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use wol_core::mac::MacAddress;

use crate::l2::L2Capability;
use crate::CaptureError;

/// Never observes anything; exits as soon as the token is cancelled. The
/// UDP path remains fully functional when this is the only capability
/// wired up.
pub struct NullL2Capture;

#[async_trait]
impl L2Capability for NullL2Capture {
    async fn run(
        &self,
        _sink: mpsc::UnboundedSender<MacAddress>,
        token: CancellationToken,
    ) -> Result<(), CaptureError> {
        info!("raw L2 capture disabled, relying on UDP only");
        token.cancelled().await;
        Ok(())
    }
}
