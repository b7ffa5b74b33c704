//! Feed a stream of remote messages, one JSON document per line, to a session.

use std::future::Future;

use mirror_client::{Dispatched, RemoteSession};
use mirror_store::MirrorStore;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info};

/// Counters of a replay run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplayStats {
    /// Non-blank lines read.
    pub messages: usize,
    /// Messages applied to the store.
    pub handled: usize,
    /// Messages with a body type we do not mirror.
    pub ignored: usize,
    /// Responses without body.
    pub acks: usize,
    /// Messages rejected or only partly applied.
    pub failed: usize,
    /// Sync requests sent.
    pub syncs: usize,
}

/// Read `reader` to the end, dispatching every line to `session`.
///
/// `stats` is updated as lines are processed, so the counts stay valid if the
/// future is dropped midway.
pub async fn replay<S, R>(
    session: &mut RemoteSession,
    store: &mut S,
    reader: R,
    stats: &mut ReplayStats,
) -> std::io::Result<()>
where
    S: MirrorStore + ?Sized,
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.messages += 1;

        match session.receive(store, line) {
            Some(Dispatched::Handled {
                body_type,
                elements,
                sync_sent,
            }) => {
                debug!(%body_type, elements, "message handled");
                stats.handled += 1;
                if sync_sent {
                    info!(remote = %session.remote().name, "sync requested");
                    stats.syncs += 1;
                }
            }
            Some(Dispatched::Ignored { .. }) => stats.ignored += 1,
            Some(Dispatched::Ack { .. }) => stats.acks += 1,
            None => stats.failed += 1,
        }
    }
    Ok(())
}

/// Why a replay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stop {
    EndOfInput,
    Interrupted,
}

/// Like [`replay`], but stops early when `shutdown` completes.
pub async fn replay_until<S, R, F>(
    session: &mut RemoteSession,
    store: &mut S,
    reader: R,
    shutdown: F,
) -> std::io::Result<(ReplayStats, Stop)>
where
    S: MirrorStore + ?Sized,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut stats = ReplayStats::default();
    let stop = tokio::select! {
        result = replay(session, store, reader, &mut stats) => {
            result?;
            Stop::EndOfInput
        }
        _ = shutdown => Stop::Interrupted,
    };
    Ok((stats, stop))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mirror_client::{RecordingOutbound, Remote};
    use mirror_store::{Database, MemoryStore, ReportLevel};
    use tokio::io::{AsyncWriteExt, BufReader};

    use super::*;

    const SESSION: &str = r#"
{"code":200,"body_type":"buffer","body":[{"id":1,"name":"core.weechat","number":1,"type":"formatted"},{"id":2,"name":"irc.libera.#rust","number":2,"nicklist":true,"nicklist_root":{"id":0,"parent_group_id":-1,"name":"root","visible":false,"nicks":[{"id":30,"parent_group_id":0,"name":"alice","visible":true}]}}]}
{"code":204}

{"code":0,"event":{"name":"buffer_line_added","buffer_id":2},"body_type":"line","body":{"y":-1,"date":"2024-05-01T10:00:00Z","prefix":"alice","message":"hi","tags":["irc_privmsg"]}}
{"code":0,"event":{"name":"hotlist_changed","buffer_id":2},"body_type":"hotlist","body":{}}
not json
{"code":200,"body_type":"version","body":{"weechat_version":"4.4.0","weechat_version_git":"v4.4.0","weechat_version_number":67371008,"relay_api_version":"0.1.0","relay_api_version_number":256}}
"#;

    fn session() -> (RemoteSession, Arc<RecordingOutbound>) {
        let outbound = Arc::new(RecordingOutbound::new());
        let session = RemoteSession::new(Remote::new("home"), outbound.clone());
        (session, outbound)
    }

    #[tokio::test]
    async fn test_replay_counts_messages() {
        let (mut session, outbound) = session();
        let mut store = MemoryStore::new();
        let mut stats = ReplayStats::default();

        replay(&mut session, &mut store, SESSION.as_bytes(), &mut stats)
            .await
            .unwrap();

        assert_eq!(
            stats,
            ReplayStats {
                messages: 6,
                handled: 3,
                ignored: 1,
                acks: 1,
                failed: 1,
                syncs: 1,
            }
        );
        assert_eq!(
            outbound.sent_json(),
            vec![r#"{"request":"POST /api/sync","body":{"colors":"weechat"}}"#]
        );

        let rust = store.buffer_by_name("remote.home.irc.libera.#rust").unwrap();
        let lines = store.lines(rust.handle);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "alice\thi");
        assert_eq!(lines[0].prefix(), Some("alice"));
        assert_eq!(lines[0].tags, "irc_privmsg");

        let levels: Vec<ReportLevel> = store.reports().iter().map(|r| r.level).collect();
        assert_eq!(levels, vec![ReportLevel::Error, ReportLevel::Info]);
    }

    #[tokio::test]
    async fn test_replay_into_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mirror.db");

        {
            let (mut session, _outbound) = session();
            let mut db = Database::open_at(&path).unwrap();
            let mut stats = ReplayStats::default();
            replay(&mut session, &mut db, SESSION.as_bytes(), &mut stats)
                .await
                .unwrap();
            assert_eq!(stats.handled, 3);
        }

        let db = Database::open_at(&path).unwrap();
        let buffer = db
            .get_buffer_by_name("remote.home.irc.libera.#rust")
            .unwrap()
            .unwrap();
        let lines = db.get_lines(buffer.handle, 10).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].message, "alice\thi");
        assert_eq!(lines[0].prefix(), Some("alice"));
        assert_eq!(lines[0].tags, "irc_privmsg");
        assert!(db
            .find_nick_by_remote_id(buffer.handle, 30)
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_shutdown_stops_pending_input() {
        let (mut session, _outbound) = session();
        let mut store = MemoryStore::new();

        // The writer stays open, so the input never reaches its end.
        let (mut writer, reader) = tokio::io::duplex(256);
        writer.write_all(b"{\"code\":204}\n").await.unwrap();

        let shutdown = tokio::time::sleep(std::time::Duration::from_millis(50));
        let reader = BufReader::new(reader);
        let (stats, stop) = replay_until(&mut session, &mut store, reader, shutdown)
            .await
            .unwrap();

        assert_eq!(stop, Stop::Interrupted);
        assert_eq!(stats.messages, 1);
        assert_eq!(stats.acks, 1);
    }

    #[tokio::test]
    async fn test_end_of_input_wins_over_pending_shutdown() {
        let (mut session, _outbound) = session();
        let mut store = MemoryStore::new();

        let (stats, stop) = replay_until(
            &mut session,
            &mut store,
            SESSION.as_bytes(),
            std::future::pending(),
        )
        .await
        .unwrap();

        assert_eq!(stop, Stop::EndOfInput);
        assert_eq!(stats.messages, 6);
    }
}
