// The per-room match task: sole owner of a `World`. Commands queue up on an
// mpsc channel and are drained between ticks, so the simulation itself never
// needs a lock.

use super::types::WorldSnapshot;
use crate::domain::content::ContentDb;
use crate::domain::world::{Command, Event, MatchPhase, RosterEntry, World};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::info;

pub async fn match_task(
    mut command_rx: mpsc::Receiver<Command>,
    event_tx: broadcast::Sender<Event>,
    snapshot_tx: watch::Sender<Arc<WorldSnapshot>>,
    phase_tx: watch::Sender<MatchPhase>,
    content: Arc<ContentDb>,
    roster: Vec<RosterEntry>,
    tick_interval: Duration,
    shutdown: Arc<tokio::sync::Notify>,
) {
    let dt = tick_interval.as_secs_f32();
    let mut world = World::new(content, roster);
    let mut interval = tokio::time::interval(tick_interval);

    info!(players = world.store.players.len(), "match task started");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                // Exit cleanly when the room is removed.
                break;
            }
            _ = interval.tick() => {}
        }

        let mut events = Vec::new();
        while let Ok(command) = command_rx.try_recv() {
            events.extend(world.apply(command));
        }
        events.extend(world.tick(dt));

        for event in events {
            if let Event::PhaseChanged(phase) = &event {
                let _ = phase_tx.send(*phase);
            }
            // No receivers is fine; nobody may be connected yet.
            let _ = event_tx.send(event);
        }

        let _ = snapshot_tx.send(Arc::new(WorldSnapshot::capture(&world)));
    }

    info!("match task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{PlayerId, Team};
    use tokio::sync::Notify;

    fn roster() -> Vec<RosterEntry> {
        vec![
            RosterEntry {
                id: PlayerId(1),
                name: "a".into(),
                team: Team::Radiant,
                is_bot: false,
            },
            RosterEntry {
                id: PlayerId(2),
                name: "b".into(),
                team: Team::Dire,
                is_bot: true,
            },
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn task_publishes_snapshots_and_phase_changes() {
        let content = Arc::new(ContentDb::builtin());
        let (command_tx, command_rx) = mpsc::channel(16);
        let (event_tx, mut event_rx) = broadcast::channel(64);
        let initial = Arc::new(WorldSnapshot::capture(&World::new(
            content.clone(),
            roster(),
        )));
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let (phase_tx, phase_rx) = watch::channel(MatchPhase::Waiting);
        let shutdown = Arc::new(Notify::new());

        tokio::spawn(match_task(
            command_rx,
            event_tx,
            snapshot_tx,
            phase_tx,
            content,
            roster(),
            Duration::from_millis(50),
            shutdown.clone(),
        ));

        command_tx
            .send(Command::Connected { player: PlayerId(1) })
            .await
            .unwrap();

        // One connected human is enough; the task should flip to hero select.
        let event = tokio::time::timeout(Duration::from_secs(2), event_rx.recv())
            .await
            .expect("phase change within two seconds")
            .unwrap();
        assert!(matches!(event, Event::PhaseChanged(MatchPhase::HeroSelect)));
        assert_eq!(*phase_rx.borrow(), MatchPhase::HeroSelect);
        assert!(snapshot_rx.borrow().tick > 0);

        shutdown.notify_waiters();
    }
}
