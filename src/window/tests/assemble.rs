use super::*;
use tempfile::tempdir;

#[test]
fn test_enqueue_dequeue_coverage() {
    let dir = tempdir().unwrap();
    let mut assemble = WindowAssemble::new();
    assert!(assemble.is_empty());
    assert_eq!(assemble.coverage(), None);

    assemble.enqueue(create_test_window(dir.path(), 0, 6, &[]));
    assert_eq!(assemble.coverage(), Some((at(-3, 0), at(3, 0))));

    assemble.enqueue(create_test_window(dir.path(), 6, 6, &[]));
    assemble.enqueue(create_test_window(dir.path(), 12, 6, &[]));
    assert_eq!(assemble.len(), 3);
    assert_eq!(assemble.coverage(), Some((at(-3, 0), at(15, 0))));

    assert!(assemble.dequeue());
    assert_eq!(assemble.coverage(), Some((at(3, 0), at(15, 0))));
    assert_eq!(assemble.head().map(|w| w.center()), Some(at(6, 0)));

    assert!(assemble.dequeue());
    assert!(assemble.dequeue());
    assert_eq!(assemble.coverage(), None);
    assert!(!assemble.dequeue());
}

#[test]
fn test_contained_by_coverage() {
    let dir = tempdir().unwrap();
    let mut assemble = WindowAssemble::new();
    assemble.enqueue(create_test_window(dir.path(), 0, 6, &[]));

    let candidate = TimeWindow::new(at(3, 0), Duration::hours(3), "n.dat".into(), test_layout());
    assert!(!candidate.contained_by(&assemble));

    assemble.enqueue(create_test_window(dir.path(), 6, 6, &[]));
    assert!(candidate.contained_by(&assemble));

    let flush_with_end = TimeWindow::new(at(7, 30), Duration::hours(3), "n.dat".into(), test_layout());
    assert!(flush_with_end.contained_by(&assemble));
}

#[test]
fn test_populate_oldest_first() {
    let dir = tempdir().unwrap();
    let mut assemble = WindowAssemble::new();
    assemble.enqueue(create_test_window(dir.path(), 0, 6, &[at(2, 30), at(2, 0), at(0, 0)]));
    assemble.enqueue(create_test_window(dir.path(), 6, 6, &[at(4, 0), at(3, 30), at(8, 0)]));

    let path = dir.path().join("new_03.dat");
    let mut target = TimeWindow::new(at(3, 0), Duration::hours(3), path.clone(), test_layout());
    assert_eq!(assemble.populate(&mut target).unwrap(), 4);

    let layout = test_layout();
    let times: Vec<_> = crate::record::read_records(&path, &layout)
        .unwrap()
        .into_iter()
        .map(|(_, t)| t)
        .collect();
    assert_eq!(times, vec![at(2, 30), at(2, 0), at(4, 0), at(3, 30)]);

    // Queued windows still hold their data for the next target.
    let held: usize = assemble.windows().map(|w| w.record_count()).sum();
    assert_eq!(held, 6);
}

#[test]
fn test_close_all() {
    let dir = tempdir().unwrap();
    let mut assemble = WindowAssemble::new();
    assemble.enqueue(create_test_window(dir.path(), 0, 6, &[at(1, 0)]));
    assemble.enqueue(create_test_window(dir.path(), 6, 6, &[at(5, 0)]));

    assemble.close_all();
    assert!(assemble.is_empty());
    assert_eq!(assemble.coverage(), None);
}
