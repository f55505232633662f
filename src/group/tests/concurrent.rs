//! Tests for concurrent engine operation

#[cfg(test)]
mod tests {
    use crate::core::config::FacilityConfig;
    use crate::group::api::GroupFacility;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_concurrent_installs_of_same_id_create_one_group() {
        let facility = GroupFacility::with_defaults();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let facility = Arc::clone(&facility);
            handles.push(thread::spawn(move || facility.install(0)));
        }
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(facility.group_count(), 1);
    }

    #[test]
    fn test_concurrent_writers_lose_no_messages() {
        let facility = GroupFacility::new(FacilityConfig {
            max_group_messages: 1024,
            ..FacilityConfig::default()
        });
        facility.install(0).unwrap();

        let writers = 4;
        let per_writer = 25u8;
        let mut handles = Vec::new();
        for writer in 0..writers {
            let facility = Arc::clone(&facility);
            handles.push(thread::spawn(move || {
                for i in 0..per_writer {
                    let payload = [b'A' + writer, i];
                    assert!(facility.write(0, &payload).unwrap() > 0);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut seen = HashSet::new();
        while let Some(msg) = facility.read(0, 64).unwrap() {
            assert!(seen.insert(msg), "duplicate message delivered");
        }
        assert_eq!(seen.len(), writers as usize * per_writer as usize);
    }

    #[test]
    fn test_capacity_never_exceeded_under_concurrent_writes() {
        let capacity = 10;
        let facility = GroupFacility::new(FacilityConfig {
            max_group_messages: capacity,
            ..FacilityConfig::default()
        });
        facility.install(0).unwrap();

        let accepted = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for _ in 0..6 {
            let facility = Arc::clone(&facility);
            let accepted = Arc::clone(&accepted);
            handles.push(thread::spawn(move || {
                for _ in 0..20 {
                    if facility.write(0, b"contend").unwrap() > 0 {
                        accepted.fetch_add(1, Ordering::SeqCst);
                    }
                    assert!(facility.group(0).unwrap().outstanding() <= capacity);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(accepted.load(Ordering::SeqCst), capacity);
        let mut delivered = 0;
        while facility.read(0, 64).unwrap().is_some() {
            delivered += 1;
        }
        assert_eq!(delivered, capacity);
    }

    #[test]
    fn test_revoke_races_with_timer_expiry() {
        // Timers firing while revokes run in a tight loop must neither lose
        // nor duplicate a message.
        let facility = GroupFacility::new(FacilityConfig {
            max_group_messages: 256,
            ..FacilityConfig::default()
        });
        facility.install(0).unwrap();
        facility.set_delay(0, 30).unwrap();

        let writer = {
            let facility = Arc::clone(&facility);
            thread::spawn(move || {
                for i in 0..40u8 {
                    assert!(facility.write(0, &[i]).unwrap() > 0);
                    thread::sleep(Duration::from_millis(2));
                }
            })
        };
        let revoker = {
            let facility = Arc::clone(&facility);
            thread::spawn(move || {
                for _ in 0..30 {
                    facility.revoke(0).unwrap();
                    thread::sleep(Duration::from_millis(5));
                }
            })
        };
        writer.join().unwrap();
        revoker.join().unwrap();

        // Settle any timer still outstanding, then drain.
        facility.revoke(0).unwrap();
        let mut seen = HashSet::new();
        while let Some(msg) = facility.read(0, 64).unwrap() {
            assert!(seen.insert(msg), "duplicate message delivered");
        }
        assert_eq!(seen.len(), 40);
        assert_eq!(facility.group(0).unwrap().outstanding(), 0);
    }

    #[test]
    fn test_groups_operate_independently_under_load() {
        let facility = GroupFacility::with_defaults();
        facility.install(0).unwrap();
        facility.install(1).unwrap();
        facility.set_delay(1, 10_000).unwrap();

        let mut handles = Vec::new();
        for _ in 0..3 {
            let facility = Arc::clone(&facility);
            handles.push(thread::spawn(move || {
                for _ in 0..10 {
                    facility.write(0, b"fast").unwrap();
                    facility.write(1, b"slow").unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let mut fast = 0;
        while facility.read(0, 64).unwrap().is_some() {
            fast += 1;
        }
        assert_eq!(fast, 30);
        // Group 1 writes are all still pending.
        assert_eq!(facility.read(1, 64).unwrap(), None);
        assert_eq!(facility.group(1).unwrap().pending_len(), 30);
    }

    #[test]
    fn test_mixed_chaotic_workload() {
        // Threads write, read, awake and sleep in deterministic but varied
        // mixes while the main thread periodically releases the barrier.
        let facility = GroupFacility::new(FacilityConfig {
            max_group_messages: 512,
            ..FacilityConfig::default()
        });
        facility.install(0).unwrap();

        let written = Arc::new(AtomicUsize::new(0));
        let consumed = Arc::new(AtomicUsize::new(0));
        let mut handles = Vec::new();
        for worker in 0..6usize {
            let facility = Arc::clone(&facility);
            let written = Arc::clone(&written);
            let consumed = Arc::clone(&consumed);
            handles.push(thread::spawn(move || {
                let to_write = worker * 7 % 5;
                let to_read = worker * 3 % 4;
                for i in 0..to_write {
                    let payload = [worker as u8, i as u8];
                    if facility.write(0, &payload).unwrap() > 0 {
                        written.fetch_add(1, Ordering::SeqCst);
                    }
                }
                for _ in 0..to_read {
                    if facility.read(0, 64).unwrap().is_some() {
                        consumed.fetch_add(1, Ordering::SeqCst);
                    }
                }
                if worker % 3 == 0 {
                    facility.awake_barrier(0).unwrap();
                }
                if worker % 2 == 1 {
                    facility.sleep_on_barrier(0).unwrap();
                }
            }));
        }

        // Keep releasing until every worker has finished.
        while handles.iter().any(|h| !h.is_finished()) {
            facility.awake_barrier(0).unwrap();
            thread::sleep(Duration::from_millis(20));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // Drain the remainder and balance the books.
        while facility.read(0, 64).unwrap().is_some() {
            consumed.fetch_add(1, Ordering::SeqCst);
        }
        assert_eq!(
            written.load(Ordering::SeqCst),
            consumed.load(Ordering::SeqCst)
        );
        assert_eq!(facility.group(0).unwrap().outstanding(), 0);
    }
}
