use std::collections::VecDeque;
use std::io::Cursor;

use super::*;

/// Replays scripted replies and records every request.
#[derive(Default)]
struct ScriptedTransport {
    puts: VecDeque<ChunkOutcome>,
    queries: VecDeque<ChunkOutcome>,
    sent: Vec<(u64, Vec<u8>)>,
    status_queries: usize,
}

impl UploadTransport for ScriptedTransport {
    fn put_chunk(&mut self, offset: u64, bytes: &[u8], _total: u64) -> SpotDiffResult<ChunkOutcome> {
        self.sent.push((offset, bytes.to_vec()));
        self.puts
            .pop_front()
            .ok_or_else(|| SpotDiffError::publish("unexpected chunk"))
    }

    fn query_status(&mut self, _total: u64) -> SpotDiffResult<ChunkOutcome> {
        self.status_queries += 1;
        self.queries
            .pop_front()
            .ok_or_else(|| SpotDiffError::publish("unexpected status query"))
    }
}

fn upload(max_retries: u32) -> ResumableUpload {
    ResumableUpload::new(CHUNK_GRANULE, max_retries, Duration::ZERO).unwrap()
}

fn source(len: usize) -> Cursor<Vec<u8>> {
    Cursor::new((0..len).map(|i| (i % 251) as u8).collect())
}

fn done() -> ChunkOutcome {
    ChunkOutcome::Complete(serde_json::json!({"id": "abc123"}))
}

#[test]
fn chunk_size_must_be_granule_multiple() {
    assert!(ResumableUpload::new(0, 3, Duration::ZERO).is_err());
    assert!(ResumableUpload::new(1000, 3, Duration::ZERO).is_err());
    assert!(ResumableUpload::new(2 * CHUNK_GRANULE, 3, Duration::ZERO).is_ok());
    assert_eq!(ResumableUpload::default().chunk_size(), 8 * 1024 * 1024);
}

#[test]
fn uploads_in_fixed_chunks_until_complete() {
    let total = 2 * CHUNK_GRANULE + 100;
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![
            ChunkOutcome::Incomplete {
                next_offset: CHUNK_GRANULE as u64,
            },
            ChunkOutcome::Incomplete {
                next_offset: 2 * CHUNK_GRANULE as u64,
            },
            done(),
        ]),
        ..Default::default()
    };
    let mut src = source(total);

    let body = upload(3).run(&mut src, total as u64, &mut t).unwrap();
    assert_eq!(body["id"], "abc123");
    let offsets: Vec<u64> = t.sent.iter().map(|(o, _)| *o).collect();
    assert_eq!(offsets, vec![0, CHUNK_GRANULE as u64, 2 * CHUNK_GRANULE as u64]);
    assert_eq!(t.sent[2].1.len(), 100);
    assert_eq!(t.sent[1].1[0], src.get_ref()[CHUNK_GRANULE]);
}

#[test]
fn partial_acknowledgement_resends_from_server_offset() {
    let total = CHUNK_GRANULE * 2;
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![
            ChunkOutcome::Incomplete { next_offset: 1000 },
            ChunkOutcome::Incomplete {
                next_offset: total as u64 - 5,
            },
            done(),
        ]),
        ..Default::default()
    };
    upload(3)
        .run(&mut source(total), total as u64, &mut t)
        .unwrap();
    let offsets: Vec<u64> = t.sent.iter().map(|(o, _)| *o).collect();
    assert_eq!(offsets, vec![0, 1000, total as u64 - 5]);
    assert_eq!(t.sent[2].1.len(), 5);
}

#[test]
fn transport_failure_resumes_from_queried_range() {
    let total = CHUNK_GRANULE * 2;
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![
            ChunkOutcome::Incomplete {
                next_offset: CHUNK_GRANULE as u64,
            },
            ChunkOutcome::Retryable("connection reset".into()),
            done(),
        ]),
        queries: VecDeque::from(vec![ChunkOutcome::Incomplete {
            next_offset: CHUNK_GRANULE as u64 + 10,
        }]),
        ..Default::default()
    };
    upload(3)
        .run(&mut source(total), total as u64, &mut t)
        .unwrap();
    assert_eq!(t.status_queries, 1);
    assert_eq!(t.sent.last().unwrap().0, CHUNK_GRANULE as u64 + 10);
}

#[test]
fn status_query_can_report_completion() {
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![ChunkOutcome::Retryable("timeout".into())]),
        queries: VecDeque::from(vec![done()]),
        ..Default::default()
    };
    let body = upload(1).run(&mut source(10), 10, &mut t).unwrap();
    assert_eq!(body["id"], "abc123");
}

#[test]
fn gives_up_after_bounded_retries() {
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![
            ChunkOutcome::Retryable("503".into()),
            ChunkOutcome::Retryable("503".into()),
            ChunkOutcome::Retryable("503".into()),
        ]),
        queries: VecDeque::from(vec![
            ChunkOutcome::Incomplete { next_offset: 0 },
            ChunkOutcome::Incomplete { next_offset: 0 },
        ]),
        ..Default::default()
    };
    let err = upload(2).run(&mut source(10), 10, &mut t).unwrap_err();
    assert!(err.to_string().contains("gave up after 2 retries"), "{err}");
    // first failure plus a stalled status query use up both retries
    assert_eq!(t.sent.len(), 2);
    assert_eq!(t.status_queries, 1);
}

#[test]
fn empty_source_is_rejected() {
    let mut t = ScriptedTransport::default();
    assert!(upload(1).run(&mut source(0), 0, &mut t).is_err());
    assert!(t.sent.is_empty());
}

#[test]
fn overshooting_acknowledgement_is_an_error() {
    let mut t = ScriptedTransport {
        puts: VecDeque::from(vec![ChunkOutcome::Incomplete { next_offset: 11 }]),
        ..Default::default()
    };
    assert!(upload(1).run(&mut source(10), 10, &mut t).is_err());
}

#[test]
fn range_header_parsing() {
    assert_eq!(next_offset_from_range(None).unwrap(), 0);
    assert_eq!(next_offset_from_range(Some("bytes=0-262143")).unwrap(), 262_144);
    assert!(next_offset_from_range(Some("bytes=5-10")).is_err());
    assert!(next_offset_from_range(Some("garbage")).is_err());
}
