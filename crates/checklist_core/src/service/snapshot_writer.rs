//! Background writer for serialized collection snapshots.
//!
//! # Responsibility
//! - Move persistence off the caller's thread.
//! - Log write failures without reporting them back to callers.
//!
//! # Invariants
//! - Snapshots are written in submission order; when several are queued only
//!   the newest is written.
//! - A flush acknowledgement is sent only after every snapshot submitted
//!   before it has been handed to the repository.
//! - Dropping the writer drains the queue and joins the thread.

use crate::repo::kv_repo::KvRepository;
use crate::repo::lists_repo::ListsRepository;
use log::{debug, error, warn};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;

const WRITER_THREAD_NAME: &str = "checklist-writer";

enum WriterCommand {
    Save(String),
    Flush(Sender<()>),
}

/// Handle to the writer thread that owns the lists repository.
pub struct SnapshotWriter {
    sender: Option<Sender<WriterCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    /// Spawns the writer thread and moves `repo` into it.
    pub fn spawn<R>(repo: ListsRepository<R>) -> io::Result<Self>
    where
        R: KvRepository + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let handle = thread::Builder::new()
            .name(WRITER_THREAD_NAME.to_string())
            .spawn(move || run_writer(repo, receiver))?;

        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    /// Queues `snapshot` for writing and returns immediately.
    pub fn submit(&self, snapshot: String) {
        if !self.send(WriterCommand::Save(snapshot)) {
            error!("event=lists_save module=store status=error error_code=writer_closed");
        }
    }

    /// Blocks until all previously submitted snapshots were processed.
    ///
    /// Returns `false` when the writer thread is gone.
    pub fn flush(&self) -> bool {
        let (ack_sender, ack_receiver) = mpsc::channel();
        if !self.send(WriterCommand::Flush(ack_sender)) {
            return false;
        }
        ack_receiver.recv().is_ok()
    }

    fn send(&self, command: WriterCommand) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(command).is_ok())
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        drop(self.sender.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("event=writer_stop module=store status=error error_code=writer_panicked");
            }
        }
    }
}

fn run_writer<R: KvRepository>(repo: ListsRepository<R>, receiver: Receiver<WriterCommand>) {
    while let Ok(first) = receiver.recv() {
        let mut latest = None;
        let mut acks = Vec::new();
        let mut coalesced = 0usize;

        for command in std::iter::once(first).chain(receiver.try_iter()) {
            match command {
                WriterCommand::Save(snapshot) => {
                    if latest.replace(snapshot).is_some() {
                        coalesced += 1;
                    }
                }
                WriterCommand::Flush(ack) => acks.push(ack),
            }
        }

        if let Some(snapshot) = latest {
            write_snapshot(&repo, &snapshot, coalesced);
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    debug!("event=writer_stop module=store status=ok");
}

fn write_snapshot<R: KvRepository>(repo: &ListsRepository<R>, snapshot: &str, coalesced: usize) {
    let started_at = Instant::now();
    match repo.save(snapshot) {
        Ok(()) => debug!(
            "event=lists_save module=store status=ok bytes={} coalesced={} duration_ms={}",
            snapshot.len(),
            coalesced,
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=lists_save module=store status=error bytes={} duration_ms={} error={}",
            snapshot.len(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::SnapshotWriter;
    use crate::repo::kv_repo::{KvRepository, MemoryKvRepository, RepoResult};
    use crate::repo::lists_repo::{ListsRepository, LISTS_STORAGE_KEY};
    use std::sync::mpsc::{self, Receiver, Sender};
    use std::sync::{Arc, Mutex};

    /// Repository whose writes announce themselves and then wait for a release.
    struct GatedKv {
        started: Sender<String>,
        release: Mutex<Receiver<()>>,
        written: Arc<Mutex<Vec<String>>>,
    }

    impl KvRepository for GatedKv {
        fn get_item(&self, _key: &str) -> RepoResult<Option<String>> {
            Ok(None)
        }

        fn set_item(&self, _key: &str, value: &str) -> RepoResult<()> {
            self.started.send(value.to_string()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            self.written.lock().unwrap().push(value.to_string());
            Ok(())
        }

        fn remove_item(&self, _key: &str) -> RepoResult<bool> {
            Ok(false)
        }
    }

    #[test]
    fn snapshots_queued_behind_slow_write_collapse_to_newest() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let written = Arc::new(Mutex::new(Vec::new()));
        let writer = SnapshotWriter::spawn(ListsRepository::new(GatedKv {
            started: started_tx,
            release: Mutex::new(release_rx),
            written: Arc::clone(&written),
        }))
        .unwrap();

        writer.submit("a".to_string());
        assert_eq!(started_rx.recv().unwrap(), "a");

        for snapshot in ["b", "c", "d"] {
            writer.submit(snapshot.to_string());
        }
        release_tx.send(()).unwrap();
        assert_eq!(started_rx.recv().unwrap(), "d");
        release_tx.send(()).unwrap();

        assert!(writer.flush());
        assert_eq!(*written.lock().unwrap(), vec!["a", "d"]);
        assert!(started_rx.try_recv().is_err());
    }

    #[test]
    fn drop_drains_pending_snapshot() {
        let kv = MemoryKvRepository::new();
        let writer = SnapshotWriter::spawn(ListsRepository::new(kv.clone())).unwrap();
        assert!(writer.flush());

        writer.submit("[]".to_string());
        drop(writer);
        assert_eq!(kv.get_item(LISTS_STORAGE_KEY).unwrap().as_deref(), Some("[]"));
    }
}
