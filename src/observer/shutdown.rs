use tokio::select;
use tokio_util::sync::CancellationToken;

/// Waits for the observer to be told to wind down. This works with limmited
/// success.
///
/// On Windows detached processes can't detect signals sent to them, so the
/// host closing our stdin is the reliable stop signal. The event source
/// cancels the token when its input ends, which is what the second branch
/// picks up.
pub async fn detect_shutdown(cancelation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancelation.cancel();
        },
        _ = cancelation.cancelled() => (),
    };
}
