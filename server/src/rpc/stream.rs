//! Request/response loop for the webhook stream.

use futures::{Stream, StreamExt};
use relay_proto::{HttpRequest, HttpResponse};
use tokio::sync::mpsc;
use tracing::info;

use super::RpcError;

/// Answer each inbound request with `handler`, one at a time.
///
/// Ends with `Ok(())` when `inbound` is exhausted. A receive error, or the
/// response channel closing, ends the loop with an error.
pub async fn serve_requests<S, F>(
    mut inbound: S,
    outbound: mpsc::Sender<HttpResponse>,
    mut handler: F,
) -> Result<(), RpcError>
where
    S: Stream<Item = Result<HttpRequest, tonic::Status>> + Unpin,
    F: FnMut(HttpRequest) -> HttpResponse,
{
    while let Some(request) = inbound.next().await {
        let response = handler(request?);
        outbound
            .send(response)
            .await
            .map_err(|_| RpcError::ResponseStreamClosed)?;
    }

    info!("Bot host closed the request stream");
    Ok(())
}
