use log::error;
use tokio::task::JoinSet;

use crate::error::Error;

/// Waits for every task of the set, whatever their outcome,
/// and reassembles the outcomes in submission order.
/// Tasks tag their outcome with their submission index; a task that panicked
/// or got cancelled leaves [Error::TaskAborted] in its slot.
pub async fn settle_all<T: 'static>(
    mut tasks: JoinSet<(usize, Result<T, Error>)>,
    total: usize,
) -> Vec<Result<T, Error>> {
    let mut slots = (0..total).map(|_| None).collect::<Vec<_>>();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(outcome);
                }
            },
            Err(e) => {
                error!("task aborted: {}", e);
            },
        }
    }

    slots
        .into_iter()
        .map(|slot| slot.unwrap_or(Err(Error::TaskAborted)))
        .collect()
}
